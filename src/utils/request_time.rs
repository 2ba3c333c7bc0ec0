use crate::utils::rules::RuleContext;
use chrono::{DateTime, NaiveDate, Utc};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket_okapi::request::OpenApiFromRequest;

/// Wall-clock instant captured once per request.
///
/// Every date rule evaluated while serving the request reads this value, so
/// "today" and the booking horizon cannot drift between checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, OpenApiFromRequest)]
pub struct RequestTime(pub DateTime<Utc>);

impl RequestTime {
    pub fn now() -> Self {
        RequestTime(Utc::now())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn today(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn rule_context(&self) -> RuleContext {
        RuleContext {
            today: self.today(),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestTime {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(*request.local_cache(RequestTime::now))
    }
}
