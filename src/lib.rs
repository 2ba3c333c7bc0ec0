#[macro_use]
extern crate rocket;
extern crate rocket_okapi;

pub mod config;
pub mod db;
pub mod models;
pub mod planner;
pub mod repository;
pub mod routes;
pub mod seed;
pub mod services;
pub mod swagger;
pub mod utils;

use crate::config::AppConfig;
use crate::db::Database;
use crate::repository::memory::InMemoryStore;
use crate::repository::mysql::MysqlStore;
use crate::repository::{CatalogRepository, FlightRepository, TripRepository};
use crate::services::catalog_service::CatalogService;
use crate::services::flight_service::FlightService;
use crate::services::multi_city_service::MultiCityService;
use crate::services::trip_service::TripService;
use crate::swagger::{rapidoc, swagger_ui};
use crate::utils::error::AppResult;
use chrono::Utc;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::rapidoc::make_rapidoc;
use rocket_okapi::swagger_ui::make_swagger_ui;
use std::sync::Arc;
use tracing::info;

/// The three storage seams, backed by one store.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogRepository>,
    pub flights: Arc<dyn FlightRepository>,
    pub trips: Arc<dyn TripRepository>,
}

impl Stores {
    pub fn memory(store: InMemoryStore) -> Self {
        Stores {
            catalog: Arc::new(store.clone()),
            flights: Arc::new(store.clone()),
            trips: Arc::new(store),
        }
    }

    pub fn mysql(store: MysqlStore) -> Self {
        Stores {
            catalog: Arc::new(store.clone()),
            flights: Arc::new(store.clone()),
            trips: Arc::new(store),
        }
    }
}

// Connect the configured store, then mount everything on it
pub async fn build_rocket(config: AppConfig) -> AppResult<Rocket<Build>> {
    let today = Utc::now().date_naive();

    let stores = match &config.database_url {
        Some(url) => {
            let database = Database::new(url, config.max_connections).await?;
            db::migrate(database.get_pool()).await?;
            if config.seed_sample_data {
                let catalog = seed::sample_catalog(today, &mut rand::thread_rng());
                if db::seed(database.get_pool(), &catalog).await? {
                    info!(flights = catalog.flights.len(), "seeded sample data");
                }
            }
            info!("using MySQL store");
            Stores::mysql(MysqlStore::new(database.pool))
        }
        None => {
            let catalog = if config.seed_sample_data {
                seed::sample_catalog(today, &mut rand::thread_rng())
            } else {
                seed::Catalog::default()
            };
            info!(flights = catalog.flights.len(), "DATABASE_URL not set, using in-memory store");
            Stores::memory(InMemoryStore::new(catalog))
        }
    };

    Ok(mount(&config, stores))
}

pub fn mount(config: &AppConfig, stores: Stores) -> Rocket<Build> {
    let flight_service = FlightService::new(stores.flights.clone(), config.pagination);
    let multi_city_service = MultiCityService::new(flight_service.clone(), config.multi_city_page_size);
    let trip_service = TripService::new(
        stores.flights,
        stores.trips,
        config.trip_policy,
        config.pagination,
    );
    let catalog_service = CatalogService::new(stores.catalog);

    rocket::build()
        .manage(flight_service)
        .manage(multi_city_service)
        .manage(trip_service)
        .manage(catalog_service)
        .mount(
            "/api",
            openapi_get_routes![
                routes::flight_route::search_flights,
                routes::flight_route::search_multi_city,
                routes::flight_route::list_flights,
                routes::flight_route::get_flight,
                routes::trip_route::validate_trip,
                routes::trip_route::create_trip,
                routes::trip_route::list_trips,
                routes::trip_route::get_trip,
                routes::catalog_route::list_airlines,
                routes::catalog_route::get_airline,
                routes::catalog_route::list_airports,
                routes::catalog_route::search_airports,
                routes::catalog_route::get_airport,
                routes::health_route::health,
            ],
        )
        .mount("/swagger", make_swagger_ui(&swagger_ui()))
        .mount("/rapidoc", make_rapidoc(&rapidoc()))
        .register(
            "/",
            catchers![
                routes::catchers::bad_request,
                routes::catchers::not_found,
                routes::catchers::unprocessable,
                routes::catchers::internal_error,
            ],
        )
        .attach(AdHoc::on_response("CORS", |_, res| {
            Box::pin(async move {
                res.set_header(rocket::http::Header::new(
                    "Access-Control-Allow-Origin",
                    "*",
                ));
            })
        }))
}
