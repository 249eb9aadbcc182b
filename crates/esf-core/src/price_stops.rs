//! Host price tiers
//!
//! The host's price slider works in discrete steps; a page global maps each
//! step to the price ceiling it stands for.

use serde::Deserialize;

/// One entry of the host price table. Other fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PriceStop {
    #[serde(default)]
    pub price: f64,
}

/// Price ceiling per slider step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceStops {
    stops: Vec<PriceStop>,
}

impl PriceStops {
    pub fn new(stops: Vec<PriceStop>) -> Self {
        Self { stops }
    }

    /// Parse the JSON serialisation of the host global.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Ceiling for a slider step; `None` for unknown steps or zero prices.
    pub fn ceiling(&self, step: usize) -> Option<f64> {
        self.stops
            .get(step)
            .map(|stop| stop.price)
            .filter(|price| *price > 0.0)
    }

    /// Ceiling for a slider value as read from the input element.
    pub fn ceiling_for(&self, value: &str) -> Option<f64> {
        value.trim().parse::<usize>().ok().and_then(|step| self.ceiling(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = r#"[
        {"price": 0, "label": "Free"},
        {"price": 5, "label": "Under $5.00"},
        {"price": 10, "label": "Under $10.00"},
        {"price": 60}
    ]"#;

    #[test]
    fn test_ceiling_lookup() {
        let stops = PriceStops::from_json(STOPS).unwrap();
        assert_eq!(stops.len(), 4);
        assert_eq!(stops.ceiling(0), None);
        assert_eq!(stops.ceiling(2), Some(10.0));
        assert_eq!(stops.ceiling_for("1"), Some(5.0));
        assert_eq!(stops.ceiling_for("9"), None);
        assert_eq!(stops.ceiling_for(""), None);
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(PriceStops::from_json(r#"{"price": 5}"#).is_err());
    }
}
