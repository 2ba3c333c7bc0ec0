use crate::config::{PaginationConfig, PER_PAGE_LIMIT};
use crate::models::flight::{parse_count, parse_optional_date, parse_or_default, Flight, SortOrder};
use crate::utils::error::{AppError, AppResult};
use crate::utils::rules::{self, FieldRule, Rule, RuleContext};
use chrono::{NaiveDate, NaiveDateTime};
use rocket::FromForm;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use strum::VariantNames;
use strum_macros::{AsRefStr, Display, EnumString, EnumVariantNames};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumVariantNames,
    Serialize, Deserialize, JsonSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

/// A booked itinerary; `flights` are in itinerary order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Trip {
    pub id: i32,
    pub trip_type: TripType,
    pub total_price: Decimal,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub flights: Vec<Flight>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Trip row written by the composer before its flights are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub trip_type: TripType,
    pub total_price: Decimal,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

const TRIP_RULES: &[FieldRule] = &[
    FieldRule::new("trip_type", &[Rule::Required, Rule::OneOf(TripType::VARIANTS)]),
    FieldRule::new("flights", &[Rule::Required, Rule::IdList { min: 1 }]),
    FieldRule::new(
        "departure_date",
        &[Rule::Required, Rule::Date, Rule::AfterToday],
    ),
    FieldRule::new(
        "return_date",
        &[Rule::Date, Rule::AfterField("departure_date")],
    ),
];

/// Body of `POST /trips` and `POST /trips/validate`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TripPayload {
    /// `one-way`, `round-trip` or `multi-city`.
    pub trip_type: Option<String>,
    /// Flight ids in itinerary order.
    pub flights: Option<Value>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub trip_type: TripType,
    pub flights: Vec<i32>,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl TripPayload {
    pub fn into_request(self, ctx: &RuleContext) -> AppResult<TripRequest> {
        rules::validate(TRIP_RULES, &rules::fields_of(&self), ctx)
            .map_err(AppError::ValidationError)?;

        let trip_type = self
            .trip_type
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| AppError::BadRequest("Unknown trip type".into()))?;
        let flights = self
            .flights
            .as_ref()
            .and_then(rules::parse_ids)
            .ok_or_else(|| AppError::BadRequest("Flights must be a list of ids".into()))?;
        let departure_date = parse_optional_date(self.departure_date.as_deref())?
            .ok_or_else(|| AppError::BadRequest("Departure date is required".into()))?;

        Ok(TripRequest {
            trip_type,
            flights,
            departure_date,
            return_date: parse_optional_date(self.return_date.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TripValidationResponse {
    pub success: bool,
    pub valid: bool,
    pub message: String,
    pub total_price: Decimal,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr, EnumVariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum TripSortField {
    #[default]
    CreatedAt,
    DepartureDate,
    TotalPrice,
    TripType,
}

impl TripSortField {
    pub fn compare(self, a: &Trip, b: &Trip) -> Ordering {
        match self {
            TripSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            TripSortField::DepartureDate => a.departure_date.cmp(&b.departure_date),
            TripSortField::TotalPrice => a.total_price.cmp(&b.total_price),
            TripSortField::TripType => {
                let (a, b): (&str, &str) = (a.trip_type.as_ref(), b.trip_type.as_ref());
                a.cmp(b)
            }
        }
    }
}

const TRIP_LIST_RULES: &[FieldRule] = &[
    FieldRule::new("sort", &[Rule::OneOf(TripSortField::VARIANTS)]),
    FieldRule::new("order", &[Rule::OneOf(SortOrder::VARIANTS)]),
    FieldRule::new("page", &[Rule::Range { min: 1, max: i32::MAX as i64 }]),
    FieldRule::new("limit", &[Rule::Range { min: 1, max: PER_PAGE_LIMIT as i64 }]),
];

#[derive(Debug, Default, Clone, Serialize, FromForm, JsonSchema)]
pub struct TripListParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripQuery {
    pub sort: TripSortField,
    pub order: SortOrder,
    pub page: u32,
    pub per_page: u32,
}

impl Default for TripQuery {
    fn default() -> Self {
        TripQuery {
            sort: TripSortField::CreatedAt,
            order: SortOrder::Desc,
            page: 1,
            per_page: 10,
        }
    }
}

impl TripListParams {
    pub fn into_query(
        self,
        ctx: &RuleContext,
        pagination: &PaginationConfig,
    ) -> AppResult<TripQuery> {
        rules::validate(TRIP_LIST_RULES, &rules::fields_of(&self), ctx)
            .map_err(AppError::ValidationError)?;

        // Newest trips first unless asked otherwise
        let order = match self.order.as_deref() {
            Some(order) => parse_or_default(Some(order))?,
            None => SortOrder::Desc,
        };

        Ok(TripQuery {
            sort: parse_or_default(self.sort.as_deref())?,
            order,
            page: parse_count(self.page.as_deref(), 1)?,
            per_page: parse_count(self.limit.as_deref(), pagination.default_per_page)?
                .min(pagination.max_per_page),
        })
    }
}
