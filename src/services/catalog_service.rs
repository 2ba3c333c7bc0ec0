use crate::models::catalog::{Airline, Airport, AirportFilter};
use crate::repository::CatalogRepository;
use crate::utils::error::{AppError, AppResult};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        CatalogService { repository }
    }

    pub async fn list_airlines(&self) -> AppResult<Vec<Airline>> {
        self.repository.list_airlines().await
    }

    pub async fn get_airline(&self, id: i32) -> AppResult<Airline> {
        self.repository
            .find_airline(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Airline not found".into()))
    }

    pub async fn list_airports(&self, filter: &AirportFilter) -> AppResult<Vec<Airport>> {
        self.repository.list_airports(filter).await
    }

    // Free-text search; a blank query is a client error
    pub async fn search_airports(&self, query: Option<&str>) -> AppResult<Vec<Airport>> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest("Search query is required".into()))?;
        self.repository.search_airports(query).await
    }

    pub async fn get_airport(&self, id: i32) -> AppResult<Airport> {
        self.repository
            .find_airport(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Airport not found".into()))
    }
}
