//! API request and response types

pub mod ask;
pub mod cache;
pub mod error;
pub mod json;
pub mod project;

pub use ask::{AskRequest, StreamEvent, StreamEventType};
pub use cache::{
    CacheStatsQuery, CacheStatsResponse, CachedProjectsResponse, ClearCacheRequest,
    ClearCacheResponse, FrequentQuestionsQuery, FrequentQuestionsResponse,
};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use project::{WarmRequest, WarmResponse};
pub use unit_test::{UnitTestRequest, UnitTestResponse};
