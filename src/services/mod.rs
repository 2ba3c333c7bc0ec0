pub mod catalog_service;
pub mod flight_service;
pub mod multi_city_service;
pub mod trip_service;
pub mod trip_validator;
