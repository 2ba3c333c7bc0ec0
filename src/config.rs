use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Largest page size any listing accepts.
pub const PER_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_per_page: 10,
            max_per_page: 100,
        }
    }
}

/// Business limits applied by the trip validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripPolicy {
    pub max_flights: usize,
    /// Lower bound for multi-city trips; `0` disables the check.
    pub min_multi_city_flights: usize,
    pub max_days_ahead: i64,
}

impl TripPolicy {
    /// Accepted values for `MAX_DAYS_AHEAD`.
    pub const HORIZON_DAYS: RangeInclusive<i64> = 1..=3650;
}

impl Default for TripPolicy {
    fn default() -> Self {
        TripPolicy {
            max_flights: 5,
            min_multi_city_flights: 2,
            max_days_ahead: 365,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MySQL connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub seed_sample_data: bool,
    pub pagination: PaginationConfig,
    pub multi_city_page_size: u32,
    pub trip_policy: TripPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            max_connections: 10,
            seed_sample_data: true,
            pagination: PaginationConfig::default(),
            multi_city_page_size: 10,
            trip_policy: TripPolicy::default(),
        }
    }
}

impl AppConfig {
    // Read settings from the environment (call dotenv first to pick up .env)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let config = AppConfig {
            database_url,
            max_connections: read("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            seed_sample_data: read("SEED_SAMPLE_DATA", defaults.seed_sample_data)?,
            pagination: PaginationConfig {
                default_per_page: read("DEFAULT_PER_PAGE", defaults.pagination.default_per_page)?,
                max_per_page: read_in(
                    "MAX_PER_PAGE",
                    defaults.pagination.max_per_page,
                    1..=PER_PAGE_LIMIT,
                )?,
            },
            multi_city_page_size: read("MULTI_CITY_PAGE_SIZE", defaults.multi_city_page_size)?,
            trip_policy: TripPolicy {
                max_flights: read("MAX_FLIGHTS_PER_TRIP", defaults.trip_policy.max_flights)?,
                min_multi_city_flights: read(
                    "MULTI_CITY_MIN_FLIGHTS",
                    defaults.trip_policy.min_multi_city_flights,
                )?,
                max_days_ahead: read_in(
                    "MAX_DAYS_AHEAD",
                    defaults.trip_policy.max_days_ahead,
                    TripPolicy::HORIZON_DAYS,
                )?,
            },
        };

        if config.pagination.default_per_page == 0
            || config.pagination.default_per_page > config.pagination.max_per_page
        {
            return Err(ConfigError::InvalidValue {
                key: "DEFAULT_PER_PAGE",
                value: config.pagination.default_per_page.to_string(),
            });
        }

        Ok(config)
    }
}

fn read<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        _ => Ok(default),
    }
}

fn read_in<T>(key: &'static str, default: T, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Display,
{
    let value = read(key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_limits() {
        let config = AppConfig::default();
        assert_eq!(config.pagination.default_per_page, 10);
        assert_eq!(config.pagination.max_per_page, 100);
        assert_eq!(config.multi_city_page_size, 10);
        assert_eq!(config.trip_policy.max_flights, 5);
        assert_eq!(config.trip_policy.min_multi_city_flights, 2);
        assert_eq!(config.trip_policy.max_days_ahead, 365);
    }

    #[test]
    fn unparseable_values_name_the_variable() {
        env::set_var("FLIGHTHUB_TEST_LIMIT", "lots");
        let err = read::<u32>("FLIGHTHUB_TEST_LIMIT", 3).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for FLIGHTHUB_TEST_LIMIT: lots");
        env::remove_var("FLIGHTHUB_TEST_LIMIT");

        assert_eq!(read::<u32>("FLIGHTHUB_TEST_UNSET", 3).unwrap(), 3);
    }

    #[test]
    fn horizon_outside_its_range_is_rejected() {
        let key = "FLIGHTHUB_TEST_HORIZON";
        for bad in ["0", "-5", "3651", "200000000"] {
            env::set_var(key, bad);
            let err = read_in(key, 365, TripPolicy::HORIZON_DAYS).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid value for {}: {}", key, bad));
        }

        for good in ["1", "3650"] {
            env::set_var(key, good);
            assert_eq!(
                read_in(key, 365, TripPolicy::HORIZON_DAYS).unwrap().to_string(),
                good
            );
        }
        env::remove_var(key);
    }

    #[test]
    fn page_size_cannot_exceed_the_listing_limit() {
        let key = "FLIGHTHUB_TEST_MAX_PER_PAGE";
        env::set_var(key, "500");
        assert!(read_in(key, 100, 1..=PER_PAGE_LIMIT).is_err());
        env::set_var(key, "50");
        assert_eq!(read_in(key, 100, 1..=PER_PAGE_LIMIT).unwrap(), 50);
        env::remove_var(key);
    }
}
