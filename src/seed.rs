//! Reference data and a generated flight schedule for fresh installs.

use crate::models::catalog::{Airline, Airport};
use crate::models::flight::FlightRecord;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

/// Everything needed to populate an empty store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub airlines: Vec<Airline>,
    pub airports: Vec<Airport>,
    pub flights: Vec<FlightRecord>,
}

const AIRLINES: &[(&str, &str)] = &[
    ("Air Canada", "AC"),
    ("WestJet", "WS"),
    ("Air Transat", "TS"),
    ("Porter Airlines", "PD"),
    ("Sunwing Airlines", "WG"),
    ("Flair Airlines", "F8"),
];

// name, iata, city, latitude, longitude, timezone, city code
const AIRPORTS: &[(&str, &str, &str, f64, f64, &str, &str)] = &[
    ("Montréal-Trudeau International Airport", "YUL", "Montreal", 45.4706, -73.7408, "America/Montreal", "YMQ"),
    ("Vancouver International Airport", "YVR", "Vancouver", 49.1967, -123.1815, "America/Vancouver", "YVR"),
    ("Toronto Pearson International Airport", "YYZ", "Toronto", 43.6777, -79.6248, "America/Toronto", "YYZ"),
    ("Calgary International Airport", "YYC", "Calgary", 51.1314, -114.0103, "America/Edmonton", "YYC"),
    ("Edmonton International Airport", "YEG", "Edmonton", 53.3097, -113.5792, "America/Edmonton", "YEG"),
    ("Ottawa Macdonald-Cartier International Airport", "YOW", "Ottawa", 45.3225, -75.6692, "America/Toronto", "YOW"),
    ("Halifax Stanfield International Airport", "YHZ", "Halifax", 44.8808, -63.5086, "America/Halifax", "YHZ"),
    ("Winnipeg James Armstrong Richardson International Airport", "YWG", "Winnipeg", 49.9100, -97.2399, "America/Winnipeg", "YWG"),
];

const POPULAR_ROUTES: &[(&str, &str)] = &[
    ("YUL", "YVR"),
    ("YYZ", "YVR"),
    ("YUL", "YYZ"),
    ("YYC", "YVR"),
    ("YOW", "YYZ"),
];

const RANDOM_FLIGHTS: usize = 100;
const SCHEDULE_DAYS: i64 = 30;

pub fn airlines() -> Vec<Airline> {
    AIRLINES
        .iter()
        .zip(1..)
        .map(|(&(name, code), id)| Airline {
            id,
            name: name.to_string(),
            iata_code: code.to_string(),
        })
        .collect()
}

pub fn airports() -> Vec<Airport> {
    AIRPORTS
        .iter()
        .zip(1..)
        .map(
            |(&(name, code, city, latitude, longitude, timezone, city_code), id)| Airport {
                id,
                name: name.to_string(),
                iata_code: code.to_string(),
                city: city.to_string(),
                latitude,
                longitude,
                timezone: timezone.to_string(),
                city_code: Some(city_code.to_string()),
            },
        )
        .collect()
}

/// Airlines, airports and a month of flights starting the day after `today`.
///
/// Each popular route gets three departures a day (08:00, 12:00, 16:00); on
/// top of that come random flights between arbitrary airport pairs.
pub fn sample_catalog<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Catalog {
    let airlines = airlines();
    let airports = airports();
    let mut flights = Vec::new();

    let midnight = today.and_hms_opt(0, 0, 0).unwrap_or_default();

    for &(from, to) in POPULAR_ROUTES {
        let (Some(from), Some(to)) = (find_airport(&airports, from), find_airport(&airports, to))
        else {
            continue;
        };
        for day in 1..=SCHEDULE_DAYS {
            for slot in 0..3 {
                let airline = &airlines[rng.gen_range(0..airlines.len())];
                let departure = midnight + Duration::days(day) + Duration::hours(8 + slot * 4);
                let hours = rng.gen_range(3..=5);
                let price = rng.gen_range(150..=600);
                let number = flight_number(airline, rng);
                flights.push(FlightRecord {
                    id: flights.len() as i32 + 1,
                    flight_number: number,
                    airline_id: airline.id,
                    departure_airport_id: from,
                    arrival_airport_id: to,
                    price: Decimal::new(price, 0),
                    departure_time: departure,
                    arrival_time: departure + Duration::hours(hours),
                });
            }
        }
    }

    for _ in 0..RANDOM_FLIGHTS {
        let from = rng.gen_range(0..airports.len());
        // Any airport except the departure one
        let to = (from + rng.gen_range(1..airports.len())) % airports.len();
        let airline = &airlines[rng.gen_range(0..airlines.len())];
        let departure = midnight
            + Duration::days(rng.gen_range(1..=SCHEDULE_DAYS))
            + Duration::hours(rng.gen_range(6..=22));
        let hours = rng.gen_range(1..=6);
        let price = rng.gen_range(100..=800);
        let number = flight_number(airline, rng);
        flights.push(FlightRecord {
            id: flights.len() as i32 + 1,
            flight_number: number,
            airline_id: airline.id,
            departure_airport_id: airports[from].id,
            arrival_airport_id: airports[to].id,
            price: Decimal::new(price, 0),
            departure_time: departure,
            arrival_time: departure + Duration::hours(hours),
        });
    }

    Catalog {
        airlines,
        airports,
        flights,
    }
}

fn flight_number<R: Rng + ?Sized>(airline: &Airline, rng: &mut R) -> String {
    format!("{}{}", airline.iata_code, rng.gen_range(100..=9999))
}

fn find_airport(airports: &[Airport], code: &str) -> Option<i32> {
    airports.iter().find(|a| a.iata_code == code).map(|a| a.id)
}
