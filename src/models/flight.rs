use crate::config::{PaginationConfig, PER_PAGE_LIMIT};
use crate::models::catalog::{Airline, Airport};
use crate::utils::error::{AppError, AppResult};
use crate::utils::rules::{self, FieldRule, Pattern, Rule, RuleContext};
use chrono::{NaiveDate, NaiveDateTime};
use rocket::FromForm;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::VariantNames;
use strum_macros::{AsRefStr, Display, EnumString, EnumVariantNames};

/// A scheduled flight with its airline and airports expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Flight {
    pub id: i32,
    pub flight_number: String,
    pub price: Decimal,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub airline: Airline,
    pub departure_airport: Airport,
    pub arrival_airport: Airport,
}

/// Flat flight row as stored, referencing airline and airports by id.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub id: i32,
    pub flight_number: String,
    pub airline_id: i32,
    pub departure_airport_id: i32,
    pub arrival_airport_id: i32,
    pub price: Decimal,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr, EnumVariantNames,
    Serialize, Deserialize, JsonSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FlightSortField {
    #[default]
    DepartureTime,
    ArrivalTime,
    Price,
    FlightNumber,
}

impl FlightSortField {
    pub fn compare(self, a: &Flight, b: &Flight) -> Ordering {
        match self {
            FlightSortField::DepartureTime => a.departure_time.cmp(&b.departure_time),
            FlightSortField::ArrivalTime => a.arrival_time.cmp(&b.arrival_time),
            FlightSortField::Price => a.price.cmp(&b.price),
            FlightSortField::FlightNumber => a.flight_number.cmp(&b.flight_number),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr, EnumVariantNames,
    Serialize, Deserialize, JsonSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Validated flight filter handed to the repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightQuery {
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub date: Option<NaiveDate>,
    pub airline: Option<String>,
    pub sort: FlightSortField,
    pub order: SortOrder,
    pub page: u32,
    pub per_page: u32,
}

impl FlightQuery {
    pub fn matches(&self, flight: &Flight) -> bool {
        self.departure_airport
            .as_deref()
            .map_or(true, |code| flight.departure_airport.iata_code == code)
            && self
                .arrival_airport
                .as_deref()
                .map_or(true, |code| flight.arrival_airport.iata_code == code)
            && self
                .date
                .map_or(true, |date| flight.departure_time.date() == date)
            && self
                .airline
                .as_deref()
                .map_or(true, |code| flight.airline.iata_code == code)
    }
}

pub const SEARCH_RULES: &[FieldRule] = &[
    FieldRule::new(
        "departure_airport",
        &[Rule::Required, Rule::Pattern(Pattern::AirportCode)],
    ),
    FieldRule::new(
        "arrival_airport",
        &[
            Rule::Required,
            Rule::Pattern(Pattern::AirportCode),
            Rule::DifferentFrom("departure_airport"),
        ],
    ),
    FieldRule::new("date", &[Rule::Required, Rule::Date, Rule::AfterToday]),
    FieldRule::new("airline", &[Rule::Pattern(Pattern::AirlineCode)]),
    FieldRule::new("sort", &[Rule::OneOf(FlightSortField::VARIANTS)]),
    FieldRule::new("order", &[Rule::OneOf(SortOrder::VARIANTS)]),
    FieldRule::new("page", &[Rule::Range { min: 1, max: i32::MAX as i64 }]),
    FieldRule::new("per_page", &[Rule::Range { min: 1, max: PER_PAGE_LIMIT as i64 }]),
];

const LIST_RULES: &[FieldRule] = &[
    FieldRule::new("departure_airport", &[Rule::Pattern(Pattern::AirportCode)]),
    FieldRule::new("arrival_airport", &[Rule::Pattern(Pattern::AirportCode)]),
    FieldRule::new("date", &[Rule::Date]),
    FieldRule::new("airline", &[Rule::Pattern(Pattern::AirlineCode)]),
    FieldRule::new("sort", &[Rule::OneOf(FlightSortField::VARIANTS)]),
    FieldRule::new("order", &[Rule::OneOf(SortOrder::VARIANTS)]),
    FieldRule::new("page", &[Rule::Range { min: 1, max: i32::MAX as i64 }]),
    FieldRule::new("limit", &[Rule::Range { min: 1, max: PER_PAGE_LIMIT as i64 }]),
];

/// Raw query string of `GET /flights/search`.
#[derive(Debug, Default, Clone, Serialize, FromForm, JsonSchema)]
pub struct FlightSearchParams {
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    /// Departure date, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub airline: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl FlightSearchParams {
    pub fn into_query(
        self,
        ctx: &RuleContext,
        pagination: &PaginationConfig,
    ) -> AppResult<FlightQuery> {
        rules::validate(SEARCH_RULES, &rules::fields_of(&self), ctx)
            .map_err(AppError::ValidationError)?;

        Ok(FlightQuery {
            departure_airport: self.departure_airport,
            arrival_airport: self.arrival_airport,
            date: parse_optional_date(self.date.as_deref())?,
            airline: self.airline,
            sort: parse_or_default(self.sort.as_deref())?,
            order: parse_or_default(self.order.as_deref())?,
            page: parse_count(self.page.as_deref(), 1)?,
            per_page: parse_count(self.per_page.as_deref(), pagination.default_per_page)?
                .min(pagination.max_per_page),
        })
    }
}

/// Raw query string of `GET /flights`; every filter is optional.
#[derive(Debug, Default, Clone, Serialize, FromForm, JsonSchema)]
pub struct FlightListParams {
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub date: Option<String>,
    pub airline: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
}

impl FlightListParams {
    pub fn into_query(
        self,
        ctx: &RuleContext,
        pagination: &PaginationConfig,
    ) -> AppResult<FlightQuery> {
        rules::validate(LIST_RULES, &rules::fields_of(&self), ctx)
            .map_err(AppError::ValidationError)?;

        Ok(FlightQuery {
            departure_airport: self.departure_airport,
            arrival_airport: self.arrival_airport,
            date: parse_optional_date(self.date.as_deref())?,
            airline: self.airline,
            sort: parse_or_default(self.sort.as_deref())?,
            order: parse_or_default(self.order.as_deref())?,
            page: parse_count(self.page.as_deref(), 1)?,
            per_page: parse_count(self.limit.as_deref(), pagination.default_per_page)?
                .min(pagination.max_per_page),
        })
    }
}

pub(crate) fn parse_optional_date(value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("Invalid date format: {}", s)))
        })
        .transpose()
}

pub(crate) fn parse_or_default<T>(value: Option<&str>) -> AppResult<T>
where
    T: std::str::FromStr + Default,
{
    match value.filter(|s| !s.trim().is_empty()) {
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Unsupported value: {}", s))),
        None => Ok(T::default()),
    }
}

pub(crate) fn parse_count(value: Option<&str>, default: u32) -> AppResult<u32> {
    match value.filter(|s| !s.trim().is_empty()) {
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Invalid number: {}", s))),
        None => Ok(default),
    }
}
