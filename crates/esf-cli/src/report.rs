//! Filter reports
//!
//! JSON shapes printed by `filter` and `fetch`. TypeScript declarations are
//! generated from them for tooling that consumes `--json` output.

use serde::Serialize;
use ts_rs::TS;

use esf_core::predicate::final_price_units;
use esf_core::{evaluate, FilterOptions, ResultItem, Verdict};
use esf_markup::ScrapedResult;

/// Verdict for one result row.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct RowReport {
    pub app_id: Option<String>,
    pub title: Option<String>,
    /// Store page link of the row.
    pub url: Option<String>,
    /// Final price in currency units; absent for free or unpriced rows.
    pub price: Option<f64>,
    pub verdict: String,
}

/// Outcome of filtering one page or fragment.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct FilterReport {
    pub source: String,
    pub total: usize,
    pub shown: usize,
    pub hidden: usize,
    pub deferred: usize,
    pub active: bool,
    pub hidden_app_ids: Vec<String>,
    pub rows: Vec<RowReport>,
}

impl FilterReport {
    pub fn build(source: &str, results: &[ScrapedResult], options: &FilterOptions) -> Self {
        let mut report = Self {
            source: source.to_string(),
            total: results.len(),
            shown: 0,
            hidden: 0,
            deferred: 0,
            active: options.is_active(),
            hidden_app_ids: Vec::new(),
            rows: Vec::with_capacity(results.len()),
        };

        for result in results {
            let verdict = evaluate(result, options);
            match verdict {
                Verdict::Show => report.shown += 1,
                Verdict::Hide => {
                    report.hidden += 1;
                    if let Some(id) = &result.app_id {
                        report.hidden_app_ids.push(id.clone());
                    }
                }
                Verdict::Defer => report.deferred += 1,
            }
            report.rows.push(RowReport {
                app_id: result.app_id.clone(),
                title: result.title.clone(),
                url: result.href.clone(),
                price: final_price_units(result),
                verdict: verdict.as_str().to_string(),
            });
        }

        report
    }

    /// Human-readable listing.
    pub fn print(&self, verbose: bool) {
        println!("Filtered '{}'", self.source);
        println!("  Results:   {}", self.total);
        println!("  Shown:     {}", self.shown);
        println!("  Hidden:    {}", self.hidden);
        println!("  Deferred:  {}", self.deferred);
        if !self.active {
            println!("  (no active filters)");
        }

        if verbose {
            println!();
            for row in &self.rows {
                let price = row
                    .price
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
                println!(
                    "  {:<6} {:>8} {:>9}  {}",
                    row.verdict,
                    row.app_id.as_deref().unwrap_or("?"),
                    price,
                    row.title.as_deref().unwrap_or("")
                );
            }
        } else if !self.hidden_app_ids.is_empty() {
            println!("  Hidden IDs: {}", self.hidden_app_ids.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esf_core::{Bound, FilterFlags, HostMarkers};

    fn result(app_id: &str, cents: Option<&str>, markers: HostMarkers) -> ScrapedResult {
        ScrapedResult {
            app_id: Some(app_id.to_string()),
            title: Some(format!("App {app_id}")),
            href: Some(format!("https://store.steampowered.com/app/{app_id}/")),
            final_price: cents.map(str::to_string),
            markers,
            ..ScrapedResult::default()
        }
    }

    #[test]
    fn test_report_counts() {
        let results = vec![
            result("1", Some("2500"), HostMarkers::empty()),
            result("2", Some("1500"), HostMarkers::empty()),
            result("3", None, HostMarkers::empty()),
            result("4", Some("100"), HostMarkers::WISHLIST),
        ];

        let mut options = FilterOptions::new();
        options.set_flag(FilterFlags::PRICE_FILTERING | FilterFlags::PASS_WISHLIST, true);
        options.set_bound(Bound::MinPrice, 5.0);
        options.set_bound(Bound::MaxPrice, 20.0);

        let report = FilterReport::build("test", &results, &options);
        assert!(report.active);
        assert_eq!(report.total, 4);
        assert_eq!(report.shown, 1);
        assert_eq!(report.hidden, 2);
        assert_eq!(report.deferred, 1);
        assert_eq!(report.hidden_app_ids, vec!["1", "3"]);
        assert_eq!(report.rows[1].price, Some(15.0));
        assert_eq!(report.rows[3].verdict, "defer");
        assert_eq!(report.rows[0].url.as_deref(), Some("https://store.steampowered.com/app/1/"));
    }

    #[test]
    fn test_report_json() {
        let report = FilterReport::build("empty", &[], &FilterOptions::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["active"], false);
        assert!(json["rows"].as_array().unwrap().is_empty());
    }
}
