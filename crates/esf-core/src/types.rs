//! Core type definitions shared by the evaluator, scanner and bindings.

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of evaluating one search result against the filter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Result passed every active filter and should be visible.
    Show,
    /// Result failed a filter and should be hidden.
    Hide,
    /// Visibility is owned by the host's own owned/ignored/wishlist filters.
    Defer,
}

impl Verdict {
    /// Desired hidden state, or `None` when the row must be left untouched.
    #[inline]
    pub fn hidden(self) -> Option<bool> {
        match self {
            Self::Show => Some(false),
            Self::Hide => Some(true),
            Self::Defer => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Defer => "defer",
        }
    }
}

// =============================================================================
// Filter Flags
// =============================================================================

bitflags::bitflags! {
    /// Boolean switches of the filter options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterFlags: u16 {
        /// Host price slider is above "free only"; price clauses apply
        const PRICE_FILTERING = 1 << 0;
        /// Host "specials" toggle is on; base price and discount clauses apply
        const WITH_DISCOUNT = 1 << 1;
        /// Results without a price pass the price clause
        const FILTER_F2P = 1 << 2;
        /// Hide demos and prologues
        const FILTER_DEMO = 1 << 3;
        /// Host hides owned products itself
        const PASS_OWNED = 1 << 4;
        /// Host hides ignored products itself
        const PASS_IGNORED = 1 << 5;
        /// Host hides wishlisted products itself
        const PASS_WISHLIST = 1 << 6;

        /// All host-owned visibility switches
        const PASS_ANY = Self::PASS_OWNED.bits() | Self::PASS_IGNORED.bits() | Self::PASS_WISHLIST.bits();
    }
}

// =============================================================================
// Host Markers
// =============================================================================

bitflags::bitflags! {
    /// Membership classes the host assigns to a result row.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HostMarkers: u8 {
        const OWNED = 1 << 0;
        const IGNORED = 1 << 1;
        const WISHLIST = 1 << 2;
    }
}

impl HostMarkers {
    /// Map a row class name to its marker.
    pub fn from_class(class: &str) -> Self {
        match class {
            "ds_owned" => Self::OWNED,
            "ds_ignored" => Self::IGNORED,
            "ds_wishlist" => Self::WISHLIST,
            _ => Self::empty(),
        }
    }

    /// Collect markers from a whitespace separated class list.
    pub fn from_class_list(classes: &str) -> Self {
        classes
            .split_ascii_whitespace()
            .fold(Self::empty(), |acc, class| acc | Self::from_class(class))
    }

    /// Markers whose visibility is delegated to the host under `flags`.
    pub fn deferred_by(flags: FilterFlags) -> Self {
        let mut markers = Self::empty();
        if flags.contains(FilterFlags::PASS_OWNED) {
            markers |= Self::OWNED;
        }
        if flags.contains(FilterFlags::PASS_IGNORED) {
            markers |= Self::IGNORED;
        }
        if flags.contains(FilterFlags::PASS_WISHLIST) {
            markers |= Self::WISHLIST;
        }
        markers
    }
}

// =============================================================================
// Bounds
// =============================================================================

/// Numeric option addressed by the injected controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    MinPrice,
    MaxPrice,
    BaseMinPrice,
    BaseMaxPrice,
    Discount,
    Rating,
}

impl Bound {
    /// Resolve the option addressed by an injected control ID (`ex_<name>`).
    pub fn from_control_id(id: &str) -> Option<Self> {
        match id.strip_prefix("ex_")? {
            "minprice" => Some(Self::MinPrice),
            "maxprice" => Some(Self::MaxPrice),
            "base_minprice" => Some(Self::BaseMinPrice),
            "base_maxprice" => Some(Self::BaseMaxPrice),
            "discount" => Some(Self::Discount),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }

    pub fn control_id(self) -> &'static str {
        match self {
            Self::MinPrice => "ex_minprice",
            Self::MaxPrice => "ex_maxprice",
            Self::BaseMinPrice => "ex_base_minprice",
            Self::BaseMaxPrice => "ex_base_maxprice",
            Self::Discount => "ex_discount",
            Self::Rating => "ex_rating",
        }
    }

    /// The other half of a min/max pair.
    pub fn partner(self) -> Option<Self> {
        match self {
            Self::MinPrice => Some(Self::MaxPrice),
            Self::MaxPrice => Some(Self::MinPrice),
            Self::BaseMinPrice => Some(Self::BaseMaxPrice),
            Self::BaseMaxPrice => Some(Self::BaseMinPrice),
            Self::Discount | Self::Rating => None,
        }
    }

    #[inline]
    pub fn is_lower(self) -> bool {
        matches!(self, Self::MinPrice | Self::BaseMinPrice)
    }

    #[inline]
    pub fn is_upper(self) -> bool {
        matches!(self, Self::MaxPrice | Self::BaseMaxPrice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_from_class_list() {
        let markers = HostMarkers::from_class_list("search_result_row ds_collapse_flag ds_owned ds_wishlist");
        assert_eq!(markers, HostMarkers::OWNED | HostMarkers::WISHLIST);
        assert!(HostMarkers::from_class_list("").is_empty());
    }

    #[test]
    fn test_deferred_by() {
        let flags = FilterFlags::PASS_IGNORED | FilterFlags::FILTER_DEMO;
        assert_eq!(HostMarkers::deferred_by(flags), HostMarkers::IGNORED);
        assert!(HostMarkers::deferred_by(FilterFlags::empty()).is_empty());
    }

    #[test]
    fn test_bound_control_ids() {
        for bound in [
            Bound::MinPrice,
            Bound::MaxPrice,
            Bound::BaseMinPrice,
            Bound::BaseMaxPrice,
            Bound::Discount,
            Bound::Rating,
        ] {
            assert_eq!(Bound::from_control_id(bound.control_id()), Some(bound));
        }
        assert_eq!(Bound::from_control_id("price_range"), None);
        assert_eq!(Bound::MinPrice.partner(), Some(Bound::MaxPrice));
        assert_eq!(Bound::Rating.partner(), None);
    }
}
