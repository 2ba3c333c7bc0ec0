use rocket::FromForm;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Airline {
    pub id: i32,
    pub name: String,
    /// Two-character IATA designator, e.g. `AC`.
    pub iata_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, sqlx::FromRow)]
pub struct Airport {
    pub id: i32,
    pub name: String,
    /// Three-letter IATA code, e.g. `YUL`.
    pub iata_code: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    /// Metropolitan area code shared by a city's airports, e.g. `YMQ`.
    pub city_code: Option<String>,
}

#[derive(Debug, Default, Clone, FromForm, JsonSchema)]
pub struct AirportFilter {
    /// Substring match on the city name.
    pub city: Option<String>,
    pub city_code: Option<String>,
}

impl Airport {
    pub fn matches_filter(&self, filter: &AirportFilter) -> bool {
        let city_ok = filter.city.as_deref().map_or(true, |city| {
            self.city.to_lowercase().contains(&city.to_lowercase())
        });
        let code_ok = filter
            .city_code
            .as_deref()
            .map_or(true, |code| self.city_code.as_deref() == Some(code));
        city_ok && code_ok
    }

    /// Free-text match over name, IATA code and city.
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.name, &self.iata_code, &self.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trudeau() -> Airport {
        Airport {
            id: 1,
            name: "Montréal-Trudeau International Airport".into(),
            iata_code: "YUL".into(),
            city: "Montreal".into(),
            latitude: 45.4706,
            longitude: -73.7408,
            timezone: "America/Montreal".into(),
            city_code: Some("YMQ".into()),
        }
    }

    #[test]
    fn filters_by_city_substring_and_city_code() {
        let airport = trudeau();
        assert!(airport.matches_filter(&AirportFilter::default()));
        assert!(airport.matches_filter(&AirportFilter { city: Some("mont".into()), city_code: None }));
        assert!(airport.matches_filter(&AirportFilter { city: None, city_code: Some("YMQ".into()) }));
        assert!(!airport.matches_filter(&AirportFilter { city: None, city_code: Some("YTO".into()) }));
    }

    #[test]
    fn text_search_covers_name_code_and_city() {
        let airport = trudeau();
        assert!(airport.matches_text("trudeau"));
        assert!(airport.matches_text("yul"));
        assert!(airport.matches_text("Montreal"));
        assert!(!airport.matches_text("Toronto"));
    }
}
