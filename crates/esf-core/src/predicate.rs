//! Predicate Evaluator
//!
//! Decides whether one search result is shown, hidden, or left to the host.
//! Clauses run in a fixed order and stop at the first failure.

use crate::options::FilterOptions;
use crate::text::{extract_percentage, in_range, is_demo_title, to_float};
use crate::types::{FilterFlags, HostMarkers, Verdict};

/// Read access to the scraped fields of one search result.
///
/// Implemented by live DOM elements, parsed HTML fragments and test rows.
/// Every accessor returns `None` when the host markup lacks the field.
pub trait ResultItem {
    /// Membership classes assigned by the host (owned, ignored, wishlist).
    fn markers(&self) -> HostMarkers;

    /// Raw `data-price-final` attribute (price in cents).
    fn final_price(&self) -> Option<String>;

    /// Strike-through base price text shown for discounted products.
    fn base_price_text(&self) -> Option<String>;

    /// Discount badge text, e.g. "-35%".
    fn discount_text(&self) -> Option<String>;

    fn title(&self) -> Option<String>;

    /// Review summary tooltip, e.g. "Very Positive<br>87% of the ...".
    fn rating_tooltip(&self) -> Option<String>;

    /// Host app ID (`data-ds-appid`), used to find the row again once rendered.
    fn app_id(&self) -> Option<String> {
        None
    }
}

/// Final price in currency units, or `None` for free / unpriced results.
pub fn final_price_units<T: ResultItem + ?Sized>(item: &T) -> Option<f64> {
    let cents = item.final_price()?.trim().parse::<f64>().ok()?;
    (cents.is_finite() && cents != 0.0).then(|| cents / 100.0)
}

/// Evaluate one result against the options.
pub fn evaluate<T: ResultItem + ?Sized>(item: &T, options: &FilterOptions) -> Verdict {
    if options.flags().intersects(FilterFlags::PASS_ANY)
        && item.markers().intersects(HostMarkers::deferred_by(options.flags()))
    {
        return Verdict::Defer;
    }

    if options.has(FilterFlags::PRICE_FILTERING) && !price_passes(item, options) {
        return Verdict::Hide;
    }

    if options.has(FilterFlags::FILTER_DEMO)
        && item.title().map_or(false, |title| is_demo_title(&title))
    {
        return Verdict::Hide;
    }

    if let Some(threshold) = options.rating() {
        let rating = item
            .rating_tooltip()
            .filter(|tooltip| !tooltip.is_empty())
            .map(|tooltip| extract_percentage(&tooltip));
        if !rating.map_or(false, |rating| rating >= threshold) {
            return Verdict::Hide;
        }
    }

    Verdict::Show
}

fn price_passes<T: ResultItem + ?Sized>(item: &T, options: &FilterOptions) -> bool {
    let Some(price) = final_price_units(item) else {
        return options.has(FilterFlags::FILTER_F2P);
    };

    if !in_range(price, options.min_price(), options.max_price()) {
        return false;
    }

    if !options.has(FilterFlags::WITH_DISCOUNT) {
        return true;
    }

    if options.base_min_price().is_some() || options.base_max_price().is_some() {
        let base = item.base_price_text().map_or(0.0, |text| to_float(&text));
        if !in_range(base, options.base_min_price(), options.base_max_price()) {
            return false;
        }
    }

    if let Some(threshold) = options.discount() {
        let discount = item.discount_text().map_or(0.0, |text| to_float(&text));
        if discount < threshold {
            return false;
        }
    }

    true
}
