//! Host page contract
//!
//! Identifiers, selectors and attribute names of the Steam store search page.
//! Any change to the host markup has to be mirrored here.

use std::sync::LazyLock;

use regex::Regex;

/// Search page URL, checked before the overlay starts.
pub const SEARCH_PAGE_PATTERN: &str = r"(?i)^https://store\.steampowered\.com/search/?\?";

#[allow(clippy::expect_used)]
static SEARCH_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SEARCH_PAGE_PATTERN).expect("valid regex")
});

/// Whether the overlay belongs on this page.
pub fn is_search_page(url: &str) -> bool {
    SEARCH_PAGE.is_match(url)
}

/// AJAX endpoint returning further result rows.
pub const SEARCH_RESULTS_PATTERN: &str = r"(?i)^https://store\.steampowered\.com/search/results/?\?";

/// Base URL of the results endpoint, used by the CLI.
pub const SEARCH_RESULTS_URL: &str = "https://store.steampowered.com/search/results/";

// =============================================================================
// Result List
// =============================================================================

pub const RESULT_CONTAINER_ID: &str = "search_result_container";
pub const RESULT_ROWS_ID: &str = "search_resultsRows";

/// Rendered rows, relative to the document.
pub const LIVE_ROW_SELECTOR: &str = "#search_resultsRows > a";

/// Rows inside an AJAX `results_html` fragment.
pub const FRAGMENT_ROW_SELECTOR: &str = "a.search_result_row";

pub const APP_ID_ATTR: &str = "data-ds-appid";

// =============================================================================
// Row Fields
// =============================================================================

pub const PRICE_SELECTOR: &str = "div[data-price-final]";
pub const PRICE_FINAL_ATTR: &str = "data-price-final";
/// Relative to the price element.
pub const BASE_PRICE_SELECTOR: &str = ".search_price strike";
pub const DISCOUNT_SELECTOR: &str = ".search_discount > span";
pub const TITLE_SELECTOR: &str = ".title";
pub const REVIEW_SELECTOR: &str = ".search_review_summary";
pub const REVIEW_TOOLTIP_ATTR: &str = "data-tooltip-html";

// =============================================================================
// Filter Panel
// =============================================================================

pub const OPTIONS_PANEL_ID: &str = "additional_search_options";
pub const PRICE_BLOCK_SELECTOR: &str = "#additional_search_options > [data-collapse-name=\"price\"]";
pub const CLIENT_FILTER_BLOCK_SELECTOR: &str = "#additional_search_options > [data-collapse-name=\"client_filter\"]";
pub const PRICE_RANGE_SELECTOR: &str = "input#price_range";
pub const SPECIALS_SELECTOR: &str = ".tab_filter_control[data-param=\"specials\"]";
pub const SPECIALS_ROW_SELECTOR: &str = ".tab_filter_control_row[data-param=\"specials\"]";
pub const BLOCK_RULE_SELECTOR: &str = ".block_rule";
pub const CHECKED_CLASS: &str = "checked";

/// Host global mapping a price slider step to a price ceiling.
pub const PRICE_STOPS_GLOBAL: &str = "rgPriceStopData";

/// Client filter toggle for a host marker class (`hide_owned`, ...).
pub fn client_filter_selector(value: &str) -> String {
    format!(".tab_filter_control[data-value=\"{value}\"]")
}

/// Live row carrying an app ID.
pub fn app_row_selector(app_id: &str) -> String {
    format!("#{RESULT_ROWS_ID} > a[{APP_ID_ATTR}=\"{app_id}\"]")
}

// =============================================================================
// Injected Controls
// =============================================================================

pub const FORM_ID: &str = "ex_filter_form";
pub const DEMO_TOGGLE_ID: &str = "ex_no_demo";
pub const F2P_TOGGLE_ID: &str = "ex_no_f2p";
pub const DISPLAY_SUFFIX: &str = "_display";

/// Discount slider range (percent).
pub const DISCOUNT_SLIDER: (f64, f64, f64) = (10.0, 90.0, 5.0);
/// Rating slider range (percent).
pub const RATING_SLIDER: (f64, f64, f64) = (0.0, 100.0, 10.0);
