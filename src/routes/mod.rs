pub mod catalog_route;
pub mod catchers;
pub mod flight_route;
pub mod health_route;
pub mod trip_route;
