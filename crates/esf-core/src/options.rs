//! Filter options
//!
//! `FilterOptions` is the single record read by the evaluator. It is only
//! mutated through the setters below so the min/max pairs stay consistent.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;
use crate::types::{Bound, FilterFlags};

// =============================================================================
// Filter Options
// =============================================================================

/// Current filter settings. Numeric values are `None` when unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    flags: FilterFlags,
    rating: Option<f64>,
    discount: Option<f64>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    base_min_price: Option<f64>,
    base_max_price: Option<f64>,
}

/// Effect of a bound edit on the options and on the partner control.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundUpdate {
    /// The edited value differed from the stored one.
    pub changed: bool,
    /// Partner bound of a min/max pair, if any.
    pub partner: Option<Bound>,
    /// New limit for the partner control: its `min` when a lower bound was
    /// edited, its `max` when an upper bound was edited.
    pub partner_limit: Option<f64>,
    /// Value the partner was pulled to, when it crossed the edited bound.
    pub partner_value: Option<f64>,
}

/// Zero, negative and non-finite values mean "unset".
#[inline]
fn normalize(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn flags(&self) -> FilterFlags {
        self.flags
    }

    #[inline]
    pub fn has(&self, flag: FilterFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Set or clear a flag. Returns `true` if the flags changed.
    pub fn set_flag(&mut self, flag: FilterFlags, on: bool) -> bool {
        let before = self.flags;
        self.flags.set(flag, on);
        before != self.flags
    }

    /// Flip a flag and return its new state.
    pub fn toggle(&mut self, flag: FilterFlags) -> bool {
        self.flags.toggle(flag);
        self.flags.contains(flag)
    }

    pub fn get(&self, bound: Bound) -> Option<f64> {
        match bound {
            Bound::MinPrice => self.min_price,
            Bound::MaxPrice => self.max_price,
            Bound::BaseMinPrice => self.base_min_price,
            Bound::BaseMaxPrice => self.base_max_price,
            Bound::Discount => self.discount,
            Bound::Rating => self.rating,
        }
    }

    fn slot(&mut self, bound: Bound) -> &mut Option<f64> {
        match bound {
            Bound::MinPrice => &mut self.min_price,
            Bound::MaxPrice => &mut self.max_price,
            Bound::BaseMinPrice => &mut self.base_min_price,
            Bound::BaseMaxPrice => &mut self.base_max_price,
            Bound::Discount => &mut self.discount,
            Bound::Rating => &mut self.rating,
        }
    }

    /// Store a numeric option.
    ///
    /// Raising a lower bound above its upper partner pulls the partner up;
    /// lowering an upper bound below its lower partner pulls the partner down.
    pub fn set_bound(&mut self, bound: Bound, value: f64) -> BoundUpdate {
        let value = normalize(value);
        if self.get(bound) == value {
            return BoundUpdate::default();
        }

        let mut update = BoundUpdate {
            changed: true,
            partner: bound.partner(),
            ..BoundUpdate::default()
        };

        if let (Some(partner), Some(v)) = (bound.partner(), value) {
            update.partner_limit = Some(v);
            let crossed = match self.get(partner) {
                Some(p) if bound.is_lower() => p < v,
                Some(p) if bound.is_upper() => p > v,
                _ => false,
            };
            if crossed {
                *self.slot(partner) = Some(v);
                update.partner_value = Some(v);
            }
        }

        *self.slot(bound) = value;
        update
    }

    /// Drop the upper price bound when it exceeds the host's price ceiling.
    pub fn cap_max_price(&mut self, ceiling: Option<f64>) -> bool {
        match (self.max_price, ceiling) {
            (Some(max), Some(ceiling)) if max > ceiling => {
                self.max_price = Some(ceiling);
                if let Some(min) = self.min_price {
                    if min > ceiling {
                        self.min_price = Some(ceiling);
                    }
                }
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn rating(&self) -> Option<f64> {
        self.rating
    }

    #[inline]
    pub fn discount(&self) -> Option<f64> {
        self.discount
    }

    #[inline]
    pub fn min_price(&self) -> Option<f64> {
        self.min_price
    }

    #[inline]
    pub fn max_price(&self) -> Option<f64> {
        self.max_price
    }

    #[inline]
    pub fn base_min_price(&self) -> Option<f64> {
        self.base_min_price
    }

    #[inline]
    pub fn base_max_price(&self) -> Option<f64> {
        self.base_max_price
    }

    /// Whether any option can hide a result.
    pub fn is_active(&self) -> bool {
        if self.rating.is_some() || self.has(FilterFlags::FILTER_DEMO) {
            return true;
        }
        if !self.has(FilterFlags::PRICE_FILTERING) {
            return false;
        }
        self.has(FilterFlags::FILTER_F2P)
            || self.min_price.is_some()
            || self.max_price.is_some()
            || (self.has(FilterFlags::WITH_DISCOUNT)
                && (self.base_min_price.is_some()
                    || self.base_max_price.is_some()
                    || self.discount.is_some()))
    }

    /// Parse options from a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, OptionsError> {
        let config: OptionsConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(Self::from(config))
    }
}

// =============================================================================
// Options Config
// =============================================================================

/// Serialized form of [`FilterOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub price_filtering: bool,
    pub with_discount: bool,
    pub filter_f2p: bool,
    pub filter_demo: bool,
    pub pass_owned: bool,
    pub pass_ignored: bool,
    pub pass_wishlist: bool,
    pub rating: Option<f64>,
    pub discount: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub base_min_price: Option<f64>,
    pub base_max_price: Option<f64>,
}

impl OptionsConfig {
    fn validate(&self) -> Result<(), OptionsError> {
        let values = [
            ("rating", self.rating, Some(100.0)),
            ("discount", self.discount, Some(100.0)),
            ("min_price", self.min_price, None),
            ("max_price", self.max_price, None),
            ("base_min_price", self.base_min_price, None),
            ("base_max_price", self.base_max_price, None),
        ];
        for (name, value, limit) in values {
            let Some(value) = value else { continue };
            let over_limit = limit.map_or(false, |limit| value > limit);
            if !value.is_finite() || value < 0.0 || over_limit {
                return Err(OptionsError::InvalidValue { name, value });
            }
        }
        Ok(())
    }
}

impl From<OptionsConfig> for FilterOptions {
    fn from(config: OptionsConfig) -> Self {
        let mut flags = FilterFlags::empty();
        flags.set(FilterFlags::PRICE_FILTERING, config.price_filtering);
        flags.set(FilterFlags::WITH_DISCOUNT, config.with_discount);
        flags.set(FilterFlags::FILTER_F2P, config.filter_f2p);
        flags.set(FilterFlags::FILTER_DEMO, config.filter_demo);
        flags.set(FilterFlags::PASS_OWNED, config.pass_owned);
        flags.set(FilterFlags::PASS_IGNORED, config.pass_ignored);
        flags.set(FilterFlags::PASS_WISHLIST, config.pass_wishlist);

        let mut options = Self {
            flags,
            ..Self::default()
        };
        // Apply lower bounds after upper bounds so inverted pairs collapse upward.
        for (bound, value) in [
            (Bound::Rating, config.rating),
            (Bound::Discount, config.discount),
            (Bound::MaxPrice, config.max_price),
            (Bound::MinPrice, config.min_price),
            (Bound::BaseMaxPrice, config.base_max_price),
            (Bound::BaseMinPrice, config.base_min_price),
        ] {
            if let Some(value) = value {
                options.set_bound(bound, value);
            }
        }
        options
    }
}

impl From<&FilterOptions> for OptionsConfig {
    fn from(options: &FilterOptions) -> Self {
        Self {
            price_filtering: options.has(FilterFlags::PRICE_FILTERING),
            with_discount: options.has(FilterFlags::WITH_DISCOUNT),
            filter_f2p: options.has(FilterFlags::FILTER_F2P),
            filter_demo: options.has(FilterFlags::FILTER_DEMO),
            pass_owned: options.has(FilterFlags::PASS_OWNED),
            pass_ignored: options.has(FilterFlags::PASS_IGNORED),
            pass_wishlist: options.has(FilterFlags::PASS_WISHLIST),
            rating: options.rating,
            discount: options.discount,
            min_price: options.min_price,
            max_price: options.max_price,
            base_min_price: options.base_min_price,
            base_max_price: options.base_max_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raising_min_pulls_max_up() {
        let mut options = FilterOptions::new();
        options.set_bound(Bound::MaxPrice, 20.0);
        let update = options.set_bound(Bound::MinPrice, 30.0);

        assert!(update.changed);
        assert_eq!(update.partner, Some(Bound::MaxPrice));
        assert_eq!(update.partner_limit, Some(30.0));
        assert_eq!(update.partner_value, Some(30.0));
        assert_eq!(options.min_price(), Some(30.0));
        assert_eq!(options.max_price(), Some(30.0));
    }

    #[test]
    fn test_lowering_max_pulls_min_down() {
        let mut options = FilterOptions::new();
        options.set_bound(Bound::BaseMinPrice, 15.0);
        let update = options.set_bound(Bound::BaseMaxPrice, 10.0);

        assert_eq!(update.partner_value, Some(10.0));
        assert_eq!(options.base_min_price(), Some(10.0));
        assert_eq!(options.base_max_price(), Some(10.0));
    }

    #[test]
    fn test_bound_within_range_leaves_partner() {
        let mut options = FilterOptions::new();
        options.set_bound(Bound::MaxPrice, 20.0);
        let update = options.set_bound(Bound::MinPrice, 5.0);

        assert_eq!(update.partner_limit, Some(5.0));
        assert_eq!(update.partner_value, None);
        assert_eq!(options.max_price(), Some(20.0));
    }

    #[test]
    fn test_clearing_bound_does_not_touch_partner() {
        let mut options = FilterOptions::new();
        options.set_bound(Bound::MinPrice, 5.0);
        options.set_bound(Bound::MaxPrice, 20.0);
        let update = options.set_bound(Bound::MaxPrice, 0.0);

        assert!(update.changed);
        assert_eq!(update.partner_limit, None);
        assert_eq!(options.max_price(), None);
        assert_eq!(options.min_price(), Some(5.0));
    }

    #[test]
    fn test_unchanged_bound() {
        let mut options = FilterOptions::new();
        options.set_bound(Bound::Rating, 80.0);
        assert!(!options.set_bound(Bound::Rating, 80.0).changed);
        assert!(!options.set_bound(Bound::Discount, 0.0).changed);
    }

    #[test]
    fn test_is_active() {
        let mut options = FilterOptions::new();
        assert!(!options.is_active());

        // Price flag alone has nothing to filter on.
        options.set_flag(FilterFlags::PRICE_FILTERING, true);
        assert!(!options.is_active());

        // Discount threshold needs the specials toggle.
        options.set_bound(Bound::Discount, 50.0);
        assert!(!options.is_active());
        options.set_flag(FilterFlags::WITH_DISCOUNT, true);
        assert!(options.is_active());

        let mut options = FilterOptions::new();
        options.set_bound(Bound::MinPrice, 5.0);
        assert!(!options.is_active());
        options.set_flag(FilterFlags::PRICE_FILTERING, true);
        assert!(options.is_active());

        let mut options = FilterOptions::new();
        options.toggle(FilterFlags::FILTER_DEMO);
        assert!(options.is_active());
    }

    #[test]
    fn test_cap_max_price() {
        let mut options = FilterOptions::new();
        options.set_bound(Bound::MaxPrice, 40.0);
        options.set_bound(Bound::MinPrice, 35.0);
        assert!(options.cap_max_price(Some(30.0)));
        assert_eq!(options.max_price(), Some(30.0));
        assert_eq!(options.min_price(), Some(30.0));
        assert!(!options.cap_max_price(None));
    }

    #[test]
    fn test_from_json() {
        let options = FilterOptions::from_json(
            r#"{ "price_filtering": true, "min_price": 5, "max_price": 20, "rating": 80 }"#,
        )
        .unwrap();
        assert!(options.has(FilterFlags::PRICE_FILTERING));
        assert!(!options.has(FilterFlags::FILTER_F2P));
        assert_eq!(options.min_price(), Some(5.0));
        assert_eq!(options.max_price(), Some(20.0));
        assert_eq!(options.rating(), Some(80.0));

        let config = OptionsConfig::from(&options);
        assert_eq!(FilterOptions::from(config), options);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            FilterOptions::from_json(r#"{ "rating": 120 }"#),
            Err(OptionsError::InvalidValue { name: "rating", .. })
        ));
        assert!(matches!(
            FilterOptions::from_json(r#"{ "min_price": -1 }"#),
            Err(OptionsError::InvalidValue { name: "min_price", .. })
        ));
        assert!(matches!(
            FilterOptions::from_json("{ nope"),
            Err(OptionsError::Json(_))
        ));
    }
}
