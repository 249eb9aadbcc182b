//! List Scanner
//!
//! Applies the evaluator to every rendered row, writes visibility only when it
//! has to change, and keeps the running count of hidden rows.

use crate::options::FilterOptions;
use crate::predicate::{evaluate, ResultItem};
use crate::types::Verdict;

/// A rendered result row whose visibility can be changed.
pub trait ResultRow: ResultItem {
    fn is_hidden(&self) -> bool;
    fn set_hidden(&mut self, hidden: bool);
}

/// Counters from one scanning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Rows with a `Hide` verdict.
    pub hidden: usize,
    /// Rows with a `Show` verdict.
    pub shown: usize,
    /// Rows left to the host's own filters.
    pub deferred: usize,
    /// Visibility writes actually performed.
    pub toggled: usize,
}

/// Evaluate and update every row.
pub fn scan<'a, T, I>(rows: I, options: &FilterOptions) -> ScanSummary
where
    T: ResultRow + 'a,
    I: IntoIterator<Item = &'a mut T>,
{
    let mut summary = ScanSummary::default();

    for row in rows {
        let verdict = evaluate(&*row, options);
        match verdict {
            Verdict::Show => summary.shown += 1,
            Verdict::Hide => summary.hidden += 1,
            Verdict::Defer => summary.deferred += 1,
        }

        let Some(hidden) = verdict.hidden() else {
            continue;
        };
        if row.is_hidden() != hidden {
            row.set_hidden(hidden);
            summary.toggled += 1;
        }
    }

    summary
}

// =============================================================================
// Filter Session
// =============================================================================

/// Options plus the running hidden count for one page.
#[derive(Debug, Clone, Default)]
pub struct FilterSession {
    options: FilterOptions,
    hidden: usize,
}

impl FilterSession {
    pub fn new(options: FilterOptions) -> Self {
        Self { options, hidden: 0 }
    }

    #[inline]
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    #[inline]
    pub fn options_mut(&mut self) -> &mut FilterOptions {
        &mut self.options
    }

    /// Rows currently hidden by this session.
    #[inline]
    pub fn hidden_count(&self) -> usize {
        self.hidden
    }

    /// Filtering is engaged while any option is active or rows are still
    /// hidden from an earlier pass.
    pub fn is_engaged(&self) -> bool {
        self.hidden > 0 || self.options.is_active()
    }

    /// Re-run the scanner over the rendered rows.
    ///
    /// Returns `None` when nothing is active and nothing needs restoring.
    pub fn refilter<'a, T, I>(&mut self, rows: I) -> Option<ScanSummary>
    where
        T: ResultRow + 'a,
        I: IntoIterator<Item = &'a mut T>,
    {
        if !self.is_engaged() {
            return None;
        }

        let summary = scan(rows, &self.options);
        log::debug!(
            "Filtered list: {} hidden, {} shown, {} deferred, {} toggled",
            summary.hidden,
            summary.shown,
            summary.deferred,
            summary.toggled
        );
        self.hidden = summary.hidden;
        Some(summary)
    }

    /// Account for rows hidden outside a full pass (newly loaded results).
    pub fn record_hidden(&mut self, count: usize) {
        self.hidden += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::tests::TestItem;
    use crate::types::{Bound, FilterFlags, HostMarkers};

    #[derive(Debug, Clone, Default)]
    struct TestRow {
        item: TestItem,
        hidden: bool,
        writes: usize,
    }

    impl TestRow {
        fn new(item: TestItem, hidden: bool) -> Self {
            Self { item, hidden, writes: 0 }
        }
    }

    impl ResultItem for TestRow {
        fn markers(&self) -> HostMarkers {
            self.item.markers()
        }
        fn final_price(&self) -> Option<String> {
            self.item.final_price()
        }
        fn base_price_text(&self) -> Option<String> {
            self.item.base_price_text()
        }
        fn discount_text(&self) -> Option<String> {
            self.item.discount_text()
        }
        fn title(&self) -> Option<String> {
            self.item.title()
        }
        fn rating_tooltip(&self) -> Option<String> {
            self.item.rating_tooltip()
        }
    }

    impl ResultRow for TestRow {
        fn is_hidden(&self) -> bool {
            self.hidden
        }
        fn set_hidden(&mut self, hidden: bool) {
            self.hidden = hidden;
            self.writes += 1;
        }
    }

    fn price_options() -> FilterOptions {
        let mut options = FilterOptions::new();
        options.set_flag(FilterFlags::PRICE_FILTERING, true);
        options.set_bound(Bound::MinPrice, 5.0);
        options.set_bound(Bound::MaxPrice, 20.0);
        options
    }

    #[test]
    fn test_scan_toggles_only_on_change() {
        let mut rows = vec![
            TestRow::new(TestItem::priced(1500), false),
            TestRow::new(TestItem::priced(1500), true),
            TestRow::new(TestItem::priced(2500), false),
            TestRow::new(TestItem::priced(2500), true),
        ];

        let summary = scan(rows.iter_mut(), &price_options());

        assert_eq!(summary.hidden, 2);
        assert_eq!(summary.shown, 2);
        assert_eq!(summary.toggled, 2);
        assert_eq!(rows.iter().map(|r| r.writes).collect::<Vec<_>>(), vec![0, 1, 1, 0]);
        assert_eq!(rows.iter().map(|r| r.hidden).collect::<Vec<_>>(), vec![false, false, true, true]);
    }

    #[test]
    fn test_scan_leaves_deferred_rows() {
        let mut options = price_options();
        options.set_flag(FilterFlags::PASS_IGNORED, true);

        let mut ignored = TestItem::priced(2500);
        ignored.markers = HostMarkers::IGNORED;
        let mut rows = vec![TestRow::new(ignored.clone(), false), TestRow::new(ignored, true)];

        let summary = scan(rows.iter_mut(), &options);

        assert_eq!(summary.deferred, 2);
        assert_eq!(summary.hidden, 0);
        assert_eq!(summary.toggled, 0);
        assert!(!rows[0].hidden);
        assert!(rows[1].hidden);
    }

    #[test]
    fn test_session_restores_rows_when_filters_cleared() {
        let mut session = FilterSession::new(price_options());
        let mut rows = vec![
            TestRow::new(TestItem::priced(1500), false),
            TestRow::new(TestItem::priced(2500), false),
        ];

        assert!(session.refilter(rows.iter_mut()).is_some());
        assert_eq!(session.hidden_count(), 1);
        assert!(rows[1].hidden);

        session.options_mut().set_flag(FilterFlags::PRICE_FILTERING, false);
        assert!(!session.options().is_active());
        assert!(session.is_engaged());

        let summary = session.refilter(rows.iter_mut());
        assert_eq!(summary.map(|s| s.toggled), Some(1));
        assert_eq!(session.hidden_count(), 0);
        assert!(!rows[1].hidden);

        // Nothing active and nothing hidden: no pass at all.
        assert!(session.refilter(rows.iter_mut()).is_none());
    }

    #[test]
    fn test_session_record_hidden() {
        let mut session = FilterSession::default();
        assert!(!session.is_engaged());
        session.record_hidden(3);
        assert_eq!(session.hidden_count(), 3);
        assert!(session.is_engaged());
    }
}
