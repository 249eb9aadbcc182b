//! Extra Search Filters Markup Parser
//!
//! Parses search result rows out of HTML without a browser: full search pages
//! saved from the store, and the `results_html` fragments returned by the
//! infinite-scroll endpoint. Parsed rows never touch a live document.

pub mod scrape;

use dom_query::{Document, Selection};

use esf_core::host::{FRAGMENT_ROW_SELECTOR, LIVE_ROW_SELECTOR, RESULT_ROWS_ID};
use esf_core::{screen, FilterOptions};

pub use scrape::ScrapedResult;

/// Error type for page parsing.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("Search result list #{0} not found")]
    MissingResultList(&'static str),
}

fn collect_rows(doc: &Document, selector: &str) -> Vec<ScrapedResult> {
    doc.select(selector)
        .nodes()
        .iter()
        .map(|node| ScrapedResult::from_row(&Selection::from(*node)))
        .collect()
}

/// Rows of an AJAX `results_html` fragment.
pub fn parse_fragment(html: &str) -> Vec<ScrapedResult> {
    let doc = Document::from(html);
    let rows = collect_rows(&doc, FRAGMENT_ROW_SELECTOR);
    log::debug!("Parsed {} rows from results fragment", rows.len());
    rows
}

/// Rows rendered in a full search page.
pub fn parse_page(html: &str) -> Result<Vec<ScrapedResult>, MarkupError> {
    let doc = Document::from(html);
    if doc.select(&format!("#{RESULT_ROWS_ID}")).is_empty() {
        return Err(MarkupError::MissingResultList(RESULT_ROWS_ID));
    }
    Ok(collect_rows(&doc, LIVE_ROW_SELECTOR))
}

/// App IDs in a results fragment that the options hide.
pub fn screen_fragment(html: &str, options: &FilterOptions) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }
    let rows = parse_fragment(html);
    screen(rows.iter(), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esf_core::{evaluate, Bound, FilterFlags, HostMarkers, Verdict};

    const PORTAL_ROW: &str = r#"
        <a href="https://store.steampowered.com/app/620/Portal_2/" data-ds-appid="620"
           class="search_result_row ds_collapse_flag ds_owned app_impression_tracked">
          <div class="col search_capsule"><img src="capsule.jpg"></div>
          <div class="responsive_search_name_combined">
            <div class="col search_name ellipsis"><span class="title">Portal 2</span></div>
            <div class="col search_reviewscore responsive_secondrow">
              <span class="search_review_summary positive"
                    data-tooltip-html="Overwhelmingly Positive&lt;br&gt;98% of the 300,512 user reviews for this game are positive."></span>
            </div>
            <div class="col search_price_discount_combined responsive_secondrow" data-price-final="199">
              <div class="col search_discount responsive_secondrow"><span>-80%</span></div>
              <div class="col search_price discounted responsive_secondrow">
                <span style="color: #888888;"><strike>$9.99</strike></span><br>$1.99
              </div>
            </div>
          </div>
        </a>"#;

    const FREE_ROW: &str = r#"
        <a href="https://store.steampowered.com/app/570/Dota_2/" data-ds-appid="570" class="search_result_row ds_collapse_flag">
          <div class="responsive_search_name_combined">
            <div class="col search_name ellipsis"><span class="title">Dota 2</span></div>
            <div class="col search_price_discount_combined responsive_secondrow">
              <div class="col search_discount responsive_secondrow"></div>
              <div class="col search_price responsive_secondrow">Free to Play</div>
            </div>
          </div>
        </a>"#;

    const DEMO_ROW: &str = r#"
        <a href="https://store.steampowered.com/app/999/" data-ds-appid="999" class="search_result_row">
          <span class="title">Super Game: Prologue</span>
          <div class="col search_price_discount_combined" data-price-final="1500">
            <div class="col search_price">$15.00</div>
          </div>
        </a>"#;

    #[test]
    fn test_scrape_discounted_row() {
        let rows = parse_fragment(PORTAL_ROW);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.app_id.as_deref(), Some("620"));
        assert_eq!(row.title.as_deref(), Some("Portal 2"));
        assert_eq!(row.final_price.as_deref(), Some("199"));
        assert_eq!(row.base_price.as_deref(), Some("$9.99"));
        assert_eq!(row.discount.as_deref(), Some("-80%"));
        assert_eq!(row.markers, HostMarkers::OWNED);
        assert!(row
            .rating_tooltip
            .as_deref()
            .is_some_and(|t| t.starts_with("Overwhelmingly Positive<br>98%")));
    }

    #[test]
    fn test_scrape_free_row() {
        let rows = parse_fragment(FREE_ROW);
        let row = &rows[0];
        assert_eq!(row.final_price, None);
        assert_eq!(row.base_price, None);
        assert_eq!(row.rating_tooltip, None);
        assert!(row.markers.is_empty());
    }

    #[test]
    fn test_screen_fragment() {
        let html = format!("{PORTAL_ROW}{FREE_ROW}{DEMO_ROW}");

        let mut options = FilterOptions::new();
        options.set_flag(FilterFlags::PRICE_FILTERING, true);
        options.set_bound(Bound::MinPrice, 5.0);
        options.set_bound(Bound::MaxPrice, 20.0);

        // Portal 2 at $1.99 is below the range, Dota 2 has no price.
        assert_eq!(screen_fragment(&html, &options), vec!["620", "570"]);

        options.set_flag(FilterFlags::PASS_OWNED | FilterFlags::FILTER_F2P | FilterFlags::FILTER_DEMO, true);
        assert_eq!(screen_fragment(&html, &options), vec!["999"]);

        assert!(screen_fragment("", &options).is_empty());
    }

    #[test]
    fn test_parse_page() {
        let page = format!(
            r#"<html><body><div id="search_result_container"><div id="search_resultsRows">{PORTAL_ROW}{DEMO_ROW}</div></div></body></html>"#
        );
        let rows = parse_page(&page).unwrap();
        assert_eq!(rows.len(), 2);

        let mut options = FilterOptions::new();
        options.set_bound(Bound::Rating, 90.0);
        assert_eq!(evaluate(&rows[0], &options), Verdict::Show);
        assert_eq!(evaluate(&rows[1], &options), Verdict::Hide);

        assert!(matches!(
            parse_page("<html><body><p>Maintenance</p></body></html>"),
            Err(MarkupError::MissingResultList("search_resultsRows"))
        ));
    }
}
