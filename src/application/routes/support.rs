use serde::Deserialize;

use crate::domain::listing::{
    DEFAULT_PAGE_SIZE, ListRequest, PageSize, SortDirection, SortKey,
};

/// Shared query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    page: Option<u32>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default, rename = "sort")]
    sort_key: Option<String>,
    #[serde(default, rename = "dir")]
    sort_dir: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

impl ListQuery {
    pub fn into_request_and_search<K: SortKey>(self) -> (ListRequest<K>, Option<String>) {
        let ListQuery {
            page,
            page_size,
            sort_key,
            sort_dir,
            search,
        } = self;

        let search = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let page = page.unwrap_or(1);
        let page_size = PageSize::limited(page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1));

        let sk = sort_key
            .as_deref()
            .and_then(K::from_query)
            .unwrap_or_else(K::default);

        let sd = sort_dir
            .as_deref()
            .and_then(parse_direction)
            .unwrap_or_else(|| sk.default_direction());

        (ListRequest::new(page, page_size, sk, sd), search)
    }
}

fn parse_direction(value: &str) -> Option<SortDirection> {
    match value.to_ascii_lowercase().as_str() {
        "asc" => Some(SortDirection::Asc),
        "desc" => Some(SortDirection::Desc),
        _ => None,
    }
}

/// Record an external provider call in the background. Failures are logged
/// but do not affect the response.
pub(crate) fn record_request_log(
    repo: std::sync::Arc<dyn crate::domain::repositories::RequestLogRepository>,
    user_id: crate::domain::ids::UserId,
    provider: &str,
    endpoint: &str,
    status: &str,
    duration_ms: i64,
) {
    let new_log = crate::domain::request_logs::NewRequestLog {
        user_id,
        provider: provider.to_string(),
        endpoint: endpoint.to_string(),
        status: status.to_string(),
        duration_ms,
    };
    tokio::spawn(async move {
        if let Err(err) = repo.insert(new_log).await {
            tracing::warn!(error = %err, "failed to record request log");
        }
    });
}
