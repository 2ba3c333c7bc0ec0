//! Request field validation.
//!
//! Each request type declares a table of [`FieldRule`]s. A field rule names a
//! field and the ordered list of [`Rule`]s it must satisfy; [`validate`] walks
//! the table and collects one message per failing field into a
//! [`FieldErrors`] map. Evaluation of a field stops at its first failing rule.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name → messages, reported as a 422 body.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Three uppercase letters, e.g. `YUL`.
    AirportCode,
    /// Two uppercase alphanumerics, e.g. `AC` or `F8`.
    AirlineCode,
}

impl Pattern {
    pub fn matches(self, value: &str) -> bool {
        match self {
            Pattern::AirportCode => {
                value.len() == 3 && value.chars().all(|c| c.is_ascii_uppercase())
            }
            Pattern::AirlineCode => {
                value.len() == 2
                    && value
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            }
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Pattern::AirportCode => "a valid IATA airport code (3 uppercase letters, e.g. YUL)",
            Pattern::AirlineCode => "a valid IATA airline code (2 uppercase characters, e.g. AC)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present, non-null and not blank.
    Required,
    Pattern(Pattern),
    OneOf(&'static [&'static str]),
    /// ISO `YYYY-MM-DD` calendar date.
    Date,
    /// Date strictly after the request's `today`.
    AfterToday,
    /// Date strictly after the date held by another field.
    AfterField(&'static str),
    /// Value must differ from another field's value.
    DifferentFrom(&'static str),
    /// Integer (or integer string) within `min..=max`.
    Range { min: i64, max: i64 },
    /// Array of positive integer ids with at least `min` entries.
    IdList { min: usize },
    /// Array holding `min..=max` entries of any shape.
    Items { min: usize, max: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRule {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        FieldRule { field, rules }
    }
}

/// Values shared by every rule of one validation pass.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub today: NaiveDate,
}

pub fn validate(
    rules: &[FieldRule],
    input: &Map<String, Value>,
    ctx: &RuleContext,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check(rules, input, ctx, "", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Evaluate `rules` against `input`, writing failures under `prefix + field`.
pub fn check(
    rules: &[FieldRule],
    input: &Map<String, Value>,
    ctx: &RuleContext,
    prefix: &str,
    errors: &mut FieldErrors,
) {
    for field_rule in rules {
        let key = format!("{}{}", prefix, field_rule.field);
        let label = humanize(&key);

        let Some(value) = present(input, field_rule.field) else {
            if field_rule.rules.contains(&Rule::Required) {
                errors
                    .entry(key)
                    .or_default()
                    .push(format!("The {} field is required.", label));
            }
            continue;
        };

        let failure = field_rule
            .rules
            .iter()
            .find_map(|rule| rule.evaluate(&label, value, input, ctx));
        if let Some(message) = failure {
            errors.entry(key).or_default().push(message);
        }
    }
}

impl Rule {
    fn evaluate(
        &self,
        label: &str,
        value: &Value,
        input: &Map<String, Value>,
        ctx: &RuleContext,
    ) -> Option<String> {
        match *self {
            Rule::Required => None,
            Rule::Pattern(pattern) => match value.as_str() {
                Some(s) if pattern.matches(s) => None,
                _ => Some(format!("The {} must be {}.", label, pattern.describe())),
            },
            Rule::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => None,
                _ => Some(format!("The selected {} is invalid.", label)),
            },
            Rule::Date => match parse_date(value) {
                Some(_) => None,
                None => Some(format!("The {} is not a valid date.", label)),
            },
            Rule::AfterToday => match parse_date(value) {
                Some(date) if date <= ctx.today => {
                    Some(format!("The {} must be a date after today.", label))
                }
                _ => None,
            },
            Rule::AfterField(other) => {
                let other_date = present(input, other).and_then(parse_date);
                match (parse_date(value), other_date) {
                    (Some(date), Some(other_date)) if date <= other_date => Some(format!(
                        "The {} must be a date after {}.",
                        label,
                        humanize(other)
                    )),
                    _ => None,
                }
            }
            Rule::DifferentFrom(other) => match present(input, other) {
                Some(other_value) if other_value == value => Some(format!(
                    "The {} and {} must be different.",
                    label,
                    humanize(other)
                )),
                _ => None,
            },
            Rule::Range { min, max } => match parse_integer(value) {
                Some(n) if (min..=max).contains(&n) => None,
                _ => Some(format!(
                    "The {} must be an integer between {} and {}.",
                    label, min, max
                )),
            },
            Rule::IdList { min } => match value {
                Value::Array(_) => match parse_ids(value) {
                    Some(ids) if ids.len() >= min => None,
                    Some(_) => Some(format!(
                        "The {} must contain at least {} item(s).",
                        label, min
                    )),
                    None => Some(format!("The {} must only contain flight ids.", label)),
                },
                _ => Some(format!("The {} must be an array.", label)),
            },
            Rule::Items { min, max } => match value.as_array() {
                Some(items) if (min..=max).contains(&items.len()) => None,
                Some(_) => Some(format!(
                    "The {} must contain between {} and {} items.",
                    label, min, max
                )),
                None => Some(format!("The {} must be an array.", label)),
            },
        }
    }
}

fn present<'a>(input: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    match input.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

/// Field map of a serializable request, the shape the rules run against.
pub fn fields_of<T: Serialize>(request: &T) -> Map<String, Value> {
    match serde_json::to_value(request) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}

pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn parse_ids(value: &Value) -> Option<Vec<i32>> {
    value.as_array()?.iter().map(|item| {
        item.as_i64()
            .filter(|id| *id > 0)
            .and_then(|id| i32::try_from(id).ok())
    }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SEARCH: &[FieldRule] = &[
        FieldRule::new("departure_airport", &[Rule::Required, Rule::Pattern(Pattern::AirportCode)]),
        FieldRule::new(
            "arrival_airport",
            &[
                Rule::Required,
                Rule::Pattern(Pattern::AirportCode),
                Rule::DifferentFrom("departure_airport"),
            ],
        ),
        FieldRule::new("date", &[Rule::Required, Rule::Date, Rule::AfterToday]),
        FieldRule::new("return_date", &[Rule::Date, Rule::AfterField("date")]),
        FieldRule::new("per_page", &[Rule::Range { min: 1, max: 100 }]),
        FieldRule::new("order", &[Rule::OneOf(&["asc", "desc"])]),
    ];

    fn ctx() -> RuleContext {
        RuleContext {
            today: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn accepts_a_well_formed_search() {
        let input = object(json!({
            "departure_airport": "YUL",
            "arrival_airport": "YYZ",
            "date": "2025-03-02",
            "per_page": "25",
            "order": "desc",
        }));
        assert!(validate(SEARCH, &input, &ctx()).is_ok());
    }

    #[test]
    fn reports_every_failing_field() {
        let input = object(json!({
            "departure_airport": "yul",
            "date": "2025-02-30",
            "per_page": 0,
            "order": "sideways",
        }));
        let errors = validate(SEARCH, &input, &ctx()).unwrap_err();

        assert_eq!(errors.len(), 5);
        assert!(errors["departure_airport"][0].contains("IATA airport code"));
        assert_eq!(errors["arrival_airport"], vec!["The arrival airport field is required."]);
        assert_eq!(errors["date"], vec!["The date is not a valid date."]);
        assert!(errors.contains_key("per_page"));
        assert_eq!(errors["order"], vec!["The selected order is invalid."]);
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let input = object(json!({"departure_airport": "  ", "arrival_airport": "YYZ", "date": "2025-03-05"}));
        let errors = validate(SEARCH, &input, &ctx()).unwrap_err();
        assert_eq!(errors["departure_airport"], vec!["The departure airport field is required."]);
    }

    #[test]
    fn dates_must_be_strictly_after_today_and_their_anchor() {
        let input = object(json!({
            "departure_airport": "YUL",
            "arrival_airport": "YUL",
            "date": "2025-03-01",
            "return_date": "2025-02-27",
        }));
        let errors = validate(SEARCH, &input, &ctx()).unwrap_err();
        assert_eq!(errors["date"], vec!["The date must be a date after today."]);
        assert_eq!(errors["return_date"], vec!["The return date must be a date after date."]);
        assert_eq!(
            errors["arrival_airport"],
            vec!["The arrival airport and departure airport must be different."]
        );
    }

    #[test]
    fn id_lists_reject_non_arrays_and_non_ids() {
        const TRIP: &[FieldRule] = &[FieldRule::new("flights", &[Rule::Required, Rule::IdList { min: 1 }])];

        let errors = validate(TRIP, &object(json!({"flights": "10,11"})), &ctx()).unwrap_err();
        assert_eq!(errors["flights"], vec!["The flights must be an array."]);

        let errors = validate(TRIP, &object(json!({"flights": [10, "x"]})), &ctx()).unwrap_err();
        assert_eq!(errors["flights"], vec!["The flights must only contain flight ids."]);

        let errors = validate(TRIP, &object(json!({"flights": []})), &ctx()).unwrap_err();
        assert_eq!(errors["flights"], vec!["The flights must contain at least 1 item(s)."]);

        assert!(validate(TRIP, &object(json!({"flights": [10, 11]})), &ctx()).is_ok());
    }

    #[test]
    fn prefixed_keys_are_reported_in_full() {
        let mut errors = FieldErrors::new();
        let input = object(json!({"departure_airport": "YUL"}));
        check(SEARCH, &input, &ctx(), "segments.1.", &mut errors);
        assert!(errors.contains_key("segments.1.arrival_airport"));
        assert!(errors.contains_key("segments.1.date"));
    }

    #[test]
    fn airline_codes_allow_digits() {
        assert!(Pattern::AirlineCode.matches("F8"));
        assert!(Pattern::AirlineCode.matches("AC"));
        assert!(!Pattern::AirlineCode.matches("ac"));
        assert!(!Pattern::AirlineCode.matches("ACA"));
        assert!(!Pattern::AirportCode.matches("Y1L"));
    }
}
