use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Envelope shared by every successful response.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, current_page: u32, per_page: u32) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page as u64).max(1) as u32;
        Page {
            items,
            current_page,
            last_page,
            total,
            per_page,
        }
    }

    /// Cut one page out of an already filtered and sorted collection.
    pub fn paginate(all: Vec<T>, current_page: u32, per_page: u32) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(offset(current_page, per_page) as usize)
            .take(per_page.max(1) as usize)
            .collect();
        Page::new(items, total, current_page, per_page)
    }
}

/// Row offset of the first item on `page` (pages are 1-based).
pub fn offset(page: u32, per_page: u32) -> u64 {
    page.saturating_sub(1) as u64 * per_page.max(1) as u64
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub service: String,
}
