pub mod error;
pub mod logging;
pub mod request_time;
pub mod rules;
pub mod swagger_doc;
