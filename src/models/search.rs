use crate::models::flight::{
    parse_or_default, Flight, FlightSortField, SortOrder, SEARCH_RULES,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::rules::{self, FieldErrors, FieldRule, Pattern, Rule, RuleContext};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::VariantNames;

pub const MIN_SEGMENTS: usize = 2;
pub const MAX_SEGMENTS: usize = 5;

/// One leg of a multi-city itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    pub departure_airport: String,
    pub arrival_airport: String,
    pub date: NaiveDate,
}

impl Segment {
    pub fn new(departure_airport: &str, arrival_airport: &str, date: NaiveDate) -> Self {
        Segment {
            departure_airport: departure_airport.to_string(),
            arrival_airport: arrival_airport.to_string(),
            date,
        }
    }
}

const MULTI_CITY_RULES: &[FieldRule] = &[
    FieldRule::new(
        "segments",
        &[
            Rule::Required,
            Rule::Items {
                min: MIN_SEGMENTS,
                max: MAX_SEGMENTS,
            },
        ],
    ),
    FieldRule::new("airline", &[Rule::Pattern(Pattern::AirlineCode)]),
    FieldRule::new("sort", &[Rule::OneOf(FlightSortField::VARIANTS)]),
    FieldRule::new("order", &[Rule::OneOf(SortOrder::VARIANTS)]),
];

// Per-leg fields are checked with the single-search table, minus paging
fn segment_rules() -> impl Iterator<Item = &'static FieldRule> {
    SEARCH_RULES.iter().filter(|rule| {
        matches!(rule.field, "departure_airport" | "arrival_airport" | "date")
    })
}

/// Body of `POST /flights/search/multi-city`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MultiCitySearchPayload {
    /// Ordered legs: `[{departure_airport, arrival_airport, date}, ...]`.
    pub segments: Option<Value>,
    pub airline: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiCitySearchRequest {
    pub segments: Vec<Segment>,
    pub airline: Option<String>,
    pub sort: FlightSortField,
    pub order: SortOrder,
}

impl MultiCitySearchPayload {
    pub fn into_request(self, ctx: &RuleContext) -> AppResult<MultiCitySearchRequest> {
        let mut errors = FieldErrors::new();
        rules::check(MULTI_CITY_RULES, &rules::fields_of(&self), ctx, "", &mut errors);

        let legs = match (&self.segments, errors.contains_key("segments")) {
            (Some(Value::Array(legs)), false) => legs.as_slice(),
            _ => &[][..],
        };
        let per_leg: Vec<FieldRule> = segment_rules().copied().collect();
        for (index, leg) in legs.iter().enumerate() {
            let prefix = format!("segments.{}.", index);
            match leg {
                Value::Object(fields) => rules::check(&per_leg, fields, ctx, &prefix, &mut errors),
                _ => {
                    errors
                        .entry(format!("segments.{}", index))
                        .or_default()
                        .push(format!("The segments.{} must be an object.", index));
                }
            }
        }
        check_leg_order(legs, &mut errors);

        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        let segments = legs
            .iter()
            .map(segment_from_value)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(MultiCitySearchRequest {
            segments,
            airline: self.airline,
            sort: parse_or_default(self.sort.as_deref())?,
            order: parse_or_default(self.order.as_deref())?,
        })
    }
}

// Each leg must leave on a later date than the one before it
fn check_leg_order(legs: &[Value], errors: &mut FieldErrors) {
    let dates: Vec<Option<NaiveDate>> = legs
        .iter()
        .map(|leg| leg.get("date").and_then(rules::parse_date))
        .collect();

    for (index, pair) in dates.windows(2).enumerate() {
        let (Some(previous), Some(current)) = (pair[0], pair[1]) else {
            continue;
        };
        let key = format!("segments.{}.date", index + 1);
        if current <= previous && !errors.contains_key(&key) {
            errors.insert(
                key,
                vec![format!(
                    "The segments.{}.date must be a date after segments.{}.date.",
                    index + 1,
                    index
                )],
            );
        }
    }
}

fn segment_from_value(value: &Value) -> AppResult<Segment> {
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("Segment is missing {}", name)))
    };
    let date = value
        .get("date")
        .and_then(rules::parse_date)
        .ok_or_else(|| AppError::BadRequest("Segment date is invalid".into()))?;

    Ok(Segment {
        departure_airport: field("departure_airport")?,
        arrival_airport: field("arrival_airport")?,
        date,
    })
}

/// Results of one leg, as fetched from the flight repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentResult {
    pub segment_index: usize,
    pub segment: Segment,
    pub flights: Vec<Flight>,
    /// Matches for this leg across all pages.
    pub total: u64,
}

/// A flight tagged with the leg it was found for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentFlight {
    pub segment_index: usize,
    pub segment: Segment,
    #[serde(flatten)]
    pub flight: Flight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MultiCityResults {
    pub per_segment_results: Vec<SegmentResult>,
    pub combined_flights: Vec<SegmentFlight>,
    pub combined_total: u64,
}

impl MultiCityResults {
    /// Merge per-leg results, keeping leg order.
    pub fn combine(mut per_segment_results: Vec<SegmentResult>) -> Self {
        per_segment_results.sort_by_key(|result| result.segment_index);

        let combined_flights = per_segment_results
            .iter()
            .flat_map(|result| {
                result.flights.iter().map(move |flight| SegmentFlight {
                    segment_index: result.segment_index,
                    segment: result.segment.clone(),
                    flight: flight.clone(),
                })
            })
            .collect();
        let combined_total = per_segment_results.iter().map(|result| result.total).sum();

        MultiCityResults {
            per_segment_results,
            combined_flights,
            combined_total,
        }
    }
}
