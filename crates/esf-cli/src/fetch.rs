//! Live search results
//!
//! Requests one page from the store's infinite-scroll endpoint and runs it
//! through the same interceptor the browser overlay uses.

use std::time::Duration;

use esf_core::host::SEARCH_RESULTS_URL;
use esf_core::{CompletedRequest, Interceptor, SearchResponse};

const TIMEOUT: Duration = Duration::from_secs(20);

/// One results page request.
pub struct FetchOptions {
    pub term: String,
    pub start: u32,
    pub count: u32,
    pub country: Option<String>,
}

impl FetchOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("query", String::new()),
            ("term", self.term.clone()),
            ("start", self.start.to_string()),
            ("count", self.count.to_string()),
            ("infinite", "1".to_string()),
        ];
        if let Some(cc) = &self.country {
            query.push(("cc", cc.clone()));
        }
        query
    }
}

pub fn fetch_results(opts: &FetchOptions) -> Result<SearchResponse, String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    runtime.block_on(fetch_results_async(opts))
}

async fn fetch_results_async(opts: &FetchOptions) -> Result<SearchResponse, String> {
    let client = reqwest::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(SEARCH_RESULTS_URL)
        .query(&opts.query())
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let url = response.url().to_string();
    let status = response.status().as_u16();
    log::debug!("GET {url} -> {status}");

    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response body: {}", e))?;

    let mut captured = None;
    let mut interceptor = Interceptor::for_search_results(|response: SearchResponse| {
        captured = Some(response);
    });
    interceptor.observe(&CompletedRequest {
        url: &url,
        status,
        done: true,
        body: &body,
    });
    drop(interceptor);

    captured.ok_or_else(|| format!("Unusable search response from '{}' (HTTP {})", url, status))
}
