use serde::{Deserialize, Serialize};

use crate::constants::limits;
use crate::db::repositories::catalog::{CRATES_FILTER, TEAM_FILTER};
use crate::domain::{ItemKind, SearchQuery};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Query string form of a search: `?q=&team=&crate=&page=&page_size=`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub team: Option<String>,
    #[serde(rename = "crate")]
    pub crate_name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<SearchParams> for SearchQuery {
    fn from(params: SearchParams) -> Self {
        let mut query = Self::new(params.q.as_deref()).with_page(
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(limits::DEFAULT_PAGE_SIZE),
        );
        if let Some(team) = params.team {
            query = query.with_filter(TEAM_FILTER, team);
        }
        if let Some(crate_name) = params.crate_name {
            query = query.with_filter(CRATES_FILTER, crate_name);
        }
        query
    }
}

#[derive(Debug, Serialize)]
pub struct KindCount {
    pub kind: ItemKind,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub counts: Vec<KindCount>,
}
