//! Network Interceptor
//!
//! Newly loaded results arrive as an HTML fragment inside the host's AJAX
//! response. They are screened from the raw response before the host renders
//! them, then hidden once the host has inserted them into the live list.
//!
//! The flow has two halves:
//! - [`Interceptor`] accepts completed requests, keeps those from the search
//!   results endpoint and hands their fragment to the callback registered at
//!   construction.
//! - [`PendingHide`] waits, one poll at a time, for the last screened row to
//!   show up in the live list and then hides every screened row.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ResponseError;
use crate::host::SEARCH_RESULTS_PATTERN;
use crate::options::FilterOptions;
use crate::predicate::{evaluate, ResultItem};
use crate::types::Verdict;

#[allow(clippy::expect_used)]
static SEARCH_RESULTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SEARCH_RESULTS_PATTERN).expect("valid regex")
});

// =============================================================================
// Responses
// =============================================================================

/// A finished request as seen by the interceptor.
#[derive(Debug, Clone, Copy)]
pub struct CompletedRequest<'a> {
    /// Final URL after redirects.
    pub url: &'a str,
    pub status: u16,
    /// The request reached its final state.
    pub done: bool,
    pub body: &'a str,
}

/// Body of the search results endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(deserialize_with = "deserialize_truthy")]
    pub success: bool,
    #[serde(default)]
    pub results_html: String,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub start: Option<u64>,
}

/// The host sends `success` as `1`, `true` or occasionally a string.
fn deserialize_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

impl SearchResponse {
    /// Decode a response body, rejecting non-JSON and unsuccessful responses.
    pub fn decode(body: &str) -> Result<Self, ResponseError> {
        if !body.starts_with('{') {
            return Err(ResponseError::NotJson);
        }
        let response: Self = serde_json::from_str(body)?;
        if !response.success {
            return Err(ResponseError::Unsuccessful);
        }
        Ok(response)
    }
}

// =============================================================================
// Interceptor
// =============================================================================

/// Observer for completed requests to the search results endpoint.
pub struct Interceptor<F> {
    pattern: Regex,
    callback: F,
}

impl<F: FnMut(SearchResponse)> Interceptor<F> {
    /// Observe URLs matching `pattern`.
    pub fn new(pattern: &str, callback: F) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            callback,
        })
    }

    /// Observe the host's search results endpoint.
    pub fn for_search_results(callback: F) -> Self {
        Self {
            pattern: SEARCH_RESULTS.clone(),
            callback,
        }
    }

    #[inline]
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    /// Inspect a completed request. Returns `true` if the callback ran.
    pub fn observe(&mut self, request: &CompletedRequest<'_>) -> bool {
        if !request.done || request.status != 200 || !self.matches(request.url) {
            return false;
        }

        match SearchResponse::decode(request.body) {
            Ok(response) => {
                (self.callback)(response);
                true
            }
            Err(e) => {
                log::debug!("Ignoring response from {}: {}", request.url, e);
                false
            }
        }
    }
}

/// App IDs of the candidates that must be hidden.
pub fn screen<'a, T, I>(candidates: I, options: &FilterOptions) -> Vec<String>
where
    T: ResultItem + 'a,
    I: IntoIterator<Item = &'a T>,
{
    candidates
        .into_iter()
        .filter(|candidate| evaluate(*candidate, options) == Verdict::Hide)
        .filter_map(|candidate| candidate.app_id())
        .collect()
}

// =============================================================================
// Pending Hide
// =============================================================================

/// Live result list, addressed by app ID.
pub trait ResultContainer {
    fn contains(&self, app_id: &str) -> bool;

    /// Hide the row for `app_id`. Returns `false` if no such row exists.
    fn hide(&mut self, app_id: &str) -> bool;
}

/// Polling cadence while waiting for the host to insert new rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_ms: u32,
    /// Polls before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 300,
            max_attempts: 40,
        }
    }
}

/// Shared flag to abandon a pending hide.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Rows not rendered yet; poll again after the interval.
    Waiting,
    /// Rows were hidden; carries how many were found.
    Applied(usize),
    /// Gave up after `max_attempts` polls.
    Expired,
    Cancelled,
}

impl PollState {
    #[inline]
    pub fn is_finished(self) -> bool {
        self != Self::Waiting
    }
}

/// Screened rows waiting for the host to render them.
#[derive(Debug, Clone)]
pub struct PendingHide {
    app_ids: Vec<String>,
    policy: PollPolicy,
    attempts: u32,
    token: CancelToken,
}

impl PendingHide {
    /// `None` when there is nothing to hide.
    pub fn new(app_ids: Vec<String>, policy: PollPolicy) -> Option<Self> {
        if app_ids.is_empty() {
            return None;
        }
        Some(Self {
            app_ids,
            policy,
            attempts: 0,
            token: CancelToken::new(),
        })
    }

    pub fn app_ids(&self) -> &[String] {
        &self.app_ids
    }

    #[inline]
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Check the live list once. Call until the state is finished.
    pub fn poll<C: ResultContainer + ?Sized>(&mut self, container: &mut C) -> PollState {
        if self.token.is_cancelled() {
            return PollState::Cancelled;
        }

        // The host appends rows in response order, so the last one marks completion.
        let rendered = self
            .app_ids
            .last()
            .map_or(false, |last| container.contains(last));
        if rendered {
            let hidden = self
                .app_ids
                .iter()
                .filter(|app_id| container.hide(app_id))
                .count();
            return PollState::Applied(hidden);
        }

        self.attempts += 1;
        if self.attempts >= self.policy.max_attempts {
            log::warn!(
                "Gave up waiting for {} loaded results after {} polls",
                self.app_ids.len(),
                self.attempts
            );
            return PollState::Expired;
        }
        PollState::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::tests::TestItem;
    use crate::types::{Bound, FilterFlags};
    use std::collections::HashSet;

    const RESULTS_URL: &str = "https://store.steampowered.com/search/results/?query&start=50&count=50&infinite=1";

    fn request<'a>(url: &'a str, status: u16, body: &'a str) -> CompletedRequest<'a> {
        CompletedRequest {
            url,
            status,
            done: true,
            body,
        }
    }

    #[test]
    fn test_decode_response() {
        let response = SearchResponse::decode(r#"{"success":1,"results_html":"<a></a>","total_count":120,"start":50}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.results_html, "<a></a>");
        assert_eq!(response.total_count, Some(120));

        assert!(matches!(SearchResponse::decode("<html>"), Err(ResponseError::NotJson)));
        assert!(matches!(SearchResponse::decode("{broken"), Err(ResponseError::Malformed(_))));
        assert!(matches!(
            SearchResponse::decode(r#"{"success":0,"results_html":""}"#),
            Err(ResponseError::Unsuccessful)
        ));
        assert!(matches!(
            SearchResponse::decode(r#"{"results_html":"x"}"#),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_interceptor_filters_requests() {
        let mut seen = Vec::new();
        let body = r#"{"success":true,"results_html":"<a class=\"search_result_row\"></a>"}"#;
        {
            let mut interceptor = Interceptor::for_search_results(|r: SearchResponse| seen.push(r.results_html));

            assert!(interceptor.observe(&request(RESULTS_URL, 200, body)));
            assert!(!interceptor.observe(&request(RESULTS_URL, 500, body)));
            assert!(!interceptor.observe(&request("https://store.steampowered.com/api/addtowishlist", 200, body)));
            assert!(!interceptor.observe(&request(RESULTS_URL, 200, "not json")));

            let mut pending = request(RESULTS_URL, 200, body);
            pending.done = false;
            assert!(!interceptor.observe(&pending));
        }
        assert_eq!(seen, vec![r#"<a class="search_result_row"></a>"#.to_string()]);
    }

    #[test]
    fn test_custom_pattern() {
        let mut calls = 0;
        let mut interceptor = Interceptor::new(r"/results\?", |_: SearchResponse| calls += 1).unwrap();
        assert!(interceptor.observe(&request("https://example.com/results?x", 200, r#"{"success":true}"#)));
        drop(interceptor);
        assert_eq!(calls, 1);
        assert!(Interceptor::new("(", |_: SearchResponse| {}).is_err());
    }

    #[derive(Debug, Clone)]
    struct Candidate {
        id: Option<&'static str>,
        item: TestItem,
    }

    impl ResultItem for Candidate {
        fn markers(&self) -> crate::types::HostMarkers {
            self.item.markers()
        }
        fn final_price(&self) -> Option<String> {
            self.item.final_price()
        }
        fn base_price_text(&self) -> Option<String> {
            None
        }
        fn discount_text(&self) -> Option<String> {
            None
        }
        fn title(&self) -> Option<String> {
            self.item.title()
        }
        fn rating_tooltip(&self) -> Option<String> {
            None
        }
        fn app_id(&self) -> Option<String> {
            self.id.map(str::to_string)
        }
    }

    #[test]
    fn test_screen_collects_hidden_ids() {
        let mut options = FilterOptions::new();
        options.set_flag(FilterFlags::PRICE_FILTERING, true);
        options.set_bound(Bound::MaxPrice, 20.0);

        let candidates = vec![
            Candidate { id: Some("10"), item: TestItem::priced(2500) },
            Candidate { id: Some("20"), item: TestItem::priced(1500) },
            Candidate { id: None, item: TestItem::priced(9900) },
            Candidate { id: Some("40"), item: TestItem::priced(3000) },
        ];

        assert_eq!(screen(candidates.iter(), &options), vec!["10".to_string(), "40".to_string()]);
    }

    #[derive(Default)]
    struct TestContainer {
        rendered: HashSet<String>,
        hidden: Vec<String>,
    }

    impl ResultContainer for TestContainer {
        fn contains(&self, app_id: &str) -> bool {
            self.rendered.contains(app_id)
        }
        fn hide(&mut self, app_id: &str) -> bool {
            if self.rendered.contains(app_id) {
                self.hidden.push(app_id.to_string());
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_pending_hide_waits_for_last_row() {
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let mut pending = PendingHide::new(ids, PollPolicy::default()).unwrap();
        let mut container = TestContainer::default();

        container.rendered.insert("1".to_string());
        container.rendered.insert("2".to_string());
        assert_eq!(pending.poll(&mut container), PollState::Waiting);
        assert!(container.hidden.is_empty());

        container.rendered.insert("3".to_string());
        assert_eq!(pending.poll(&mut container), PollState::Applied(3));
        assert_eq!(container.hidden, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_pending_hide_expires() {
        let policy = PollPolicy { interval_ms: 10, max_attempts: 3 };
        let mut pending = PendingHide::new(vec!["7".to_string()], policy).unwrap();
        let mut container = TestContainer::default();

        assert_eq!(pending.poll(&mut container), PollState::Waiting);
        assert_eq!(pending.poll(&mut container), PollState::Waiting);
        assert_eq!(pending.poll(&mut container), PollState::Expired);
        assert_eq!(pending.attempts(), 3);
    }

    #[test]
    fn test_pending_hide_cancel() {
        let mut pending = PendingHide::new(vec!["7".to_string()], PollPolicy::default()).unwrap();
        let token = pending.cancel_token();
        token.cancel();
        let mut container = TestContainer::default();
        container.rendered.insert("7".to_string());

        assert_eq!(pending.poll(&mut container), PollState::Cancelled);
        assert!(container.hidden.is_empty());
        assert!(PendingHide::new(Vec::new(), PollPolicy::default()).is_none());
    }
}
