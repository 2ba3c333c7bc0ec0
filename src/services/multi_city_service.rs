//! Concurrent fan-out of one flight search per multi-city leg.

use crate::models::flight::{Flight, FlightQuery};
use crate::models::response::Page;
use crate::models::search::{MultiCityResults, MultiCitySearchPayload, MultiCitySearchRequest, SegmentResult};
use crate::services::flight_service::FlightService;
use crate::utils::error::{AppError, AppResult};
use crate::utils::rules::RuleContext;
use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{info, warn};

/// Anything that can answer a single-leg flight query.
#[async_trait]
pub trait SegmentSearcher: Send + Sync {
    async fn search_segment(&self, query: FlightQuery) -> AppResult<Page<Flight>>;
}

#[async_trait]
impl SegmentSearcher for FlightService {
    async fn search_segment(&self, query: FlightQuery) -> AppResult<Page<Flight>> {
        self.run(&query).await
    }
}

pub struct MultiCityService<S: SegmentSearcher = FlightService> {
    searcher: S,
    page_size: u32,
}

impl<S: SegmentSearcher> MultiCityService<S> {
    pub fn new(searcher: S, page_size: u32) -> Self {
        MultiCityService {
            searcher,
            page_size: page_size.max(1),
        }
    }

    pub async fn search(
        &self,
        payload: MultiCitySearchPayload,
        ctx: &RuleContext,
    ) -> AppResult<MultiCityResults> {
        let request = payload.into_request(ctx)?;
        self.search_segments(&request).await
    }

    /// Search every leg at once. The first failing leg aborts the whole
    /// search; its error is tagged with the leg index.
    pub async fn search_segments(
        &self,
        request: &MultiCitySearchRequest,
    ) -> AppResult<MultiCityResults> {
        let searches = request.segments.iter().enumerate().map(|(index, segment)| {
            let query = FlightQuery {
                departure_airport: Some(segment.departure_airport.clone()),
                arrival_airport: Some(segment.arrival_airport.clone()),
                date: Some(segment.date),
                airline: request.airline.clone(),
                sort: request.sort,
                order: request.order,
                page: 1,
                per_page: self.page_size,
            };

            async move {
                let page = self.searcher.search_segment(query).await.map_err(|source| {
                    warn!(segment = index, error = %source, "segment search failed");
                    AppError::SegmentSearch {
                        segment: index,
                        source: Box::new(source),
                    }
                })?;

                Ok::<_, AppError>(SegmentResult {
                    segment_index: index,
                    segment: segment.clone(),
                    total: page.total,
                    flights: page.items,
                })
            }
        });

        let results = MultiCityResults::combine(try_join_all(searches).await?);
        info!(
            segments = results.per_segment_results.len(),
            combined_total = results.combined_total,
            "multi-city search"
        );
        Ok(results)
    }
}
