#[macro_use]
extern crate rocket;

use dotenv::dotenv;
use flighthub::config::AppConfig;
use flighthub::utils::logging;

#[launch]
async fn rocket() -> _ {
    dotenv().ok();
    logging::init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    flighthub::build_rocket(config)
        .await
        .expect("Failed to initialize the data store")
}
