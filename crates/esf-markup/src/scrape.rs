//! Field extraction from one result row.

use dom_query::Selection;

use esf_core::host::{
    APP_ID_ATTR, BASE_PRICE_SELECTOR, DISCOUNT_SELECTOR, PRICE_FINAL_ATTR, PRICE_SELECTOR,
    REVIEW_SELECTOR, REVIEW_TOOLTIP_ATTR, TITLE_SELECTOR,
};
use esf_core::{HostMarkers, ResultItem};

/// Scraped fields of one search result, detached from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedResult {
    pub app_id: Option<String>,
    pub href: Option<String>,
    pub markers: HostMarkers,
    pub final_price: Option<String>,
    pub base_price: Option<String>,
    pub discount: Option<String>,
    pub title: Option<String>,
    pub rating_tooltip: Option<String>,
}

/// Text of a selection, `None` if nothing matched.
fn text_of(sel: &Selection) -> Option<String> {
    if sel.is_empty() {
        return None;
    }
    Some(sel.text().trim().to_string())
}

impl ScrapedResult {
    /// Read every field from a row element.
    pub fn from_row(row: &Selection) -> Self {
        let price = row.select(PRICE_SELECTOR);

        Self {
            app_id: row.attr(APP_ID_ATTR).map(|s| s.to_string()),
            href: row.attr("href").map(|s| s.to_string()),
            markers: row
                .attr("class")
                .map(|classes| HostMarkers::from_class_list(&classes))
                .unwrap_or_default(),
            final_price: price.attr(PRICE_FINAL_ATTR).map(|s| s.to_string()),
            base_price: text_of(&price.select(BASE_PRICE_SELECTOR)),
            discount: text_of(&row.select(DISCOUNT_SELECTOR)),
            title: text_of(&row.select(TITLE_SELECTOR)),
            rating_tooltip: row
                .select(REVIEW_SELECTOR)
                .attr(REVIEW_TOOLTIP_ATTR)
                .map(|s| s.to_string()),
        }
    }
}

impl ResultItem for ScrapedResult {
    fn markers(&self) -> HostMarkers {
        self.markers
    }

    fn final_price(&self) -> Option<String> {
        self.final_price.clone()
    }

    fn base_price_text(&self) -> Option<String> {
        self.base_price.clone()
    }

    fn discount_text(&self) -> Option<String> {
        self.discount.clone()
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn rating_tooltip(&self) -> Option<String> {
        self.rating_tooltip.clone()
    }

    fn app_id(&self) -> Option<String> {
        self.app_id.clone()
    }
}
