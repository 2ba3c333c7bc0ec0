pub mod catalog;
pub mod flight;
pub mod response;
pub mod search;
pub mod trip;
