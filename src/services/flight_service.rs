use crate::config::PaginationConfig;
use crate::models::flight::{Flight, FlightListParams, FlightQuery, FlightSearchParams};
use crate::models::response::Page;
use crate::repository::FlightRepository;
use crate::utils::error::{AppError, AppResult};
use crate::utils::rules::RuleContext;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct FlightService {
    repository: Arc<dyn FlightRepository>,
    pagination: PaginationConfig,
}

impl FlightService {
    pub fn new(repository: Arc<dyn FlightRepository>, pagination: PaginationConfig) -> Self {
        FlightService {
            repository,
            pagination,
        }
    }

    // Search flights for one route and day
    pub async fn search_flights(
        &self,
        params: FlightSearchParams,
        ctx: &RuleContext,
    ) -> AppResult<Page<Flight>> {
        let query = params.into_query(ctx, &self.pagination)?;
        self.run(&query).await
    }

    // Browse flights with optional filters
    pub async fn list_flights(
        &self,
        params: FlightListParams,
        ctx: &RuleContext,
    ) -> AppResult<Page<Flight>> {
        let query = params.into_query(ctx, &self.pagination)?;
        self.run(&query).await
    }

    pub async fn get_flight(&self, id: i32) -> AppResult<Flight> {
        self.repository
            .find_flight(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Flight not found".into()))
    }

    /// Run an already validated query.
    pub async fn run(&self, query: &FlightQuery) -> AppResult<Page<Flight>> {
        let page = self.repository.search_flights(query).await?;
        debug!(
            departure = ?query.departure_airport,
            arrival = ?query.arrival_airport,
            date = ?query.date,
            total = page.total,
            "flight search"
        );
        Ok(page)
    }
}
