use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Directory price tier. `Unknown` is written as an empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceTier {
    #[default]
    Unknown,
    Cheapest,
    LowerPriced,
    ModeratelyPriced,
    MostExpensive,
}

impl PriceTier {
    /// Parse the directory's dollar-sign notation. Anything else is `Unknown`.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim() {
            "$" => Self::Cheapest,
            "$$" => Self::LowerPriced,
            "$$$" => Self::ModeratelyPriced,
            "$$$$" => Self::MostExpensive,
            _ => Self::Unknown,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Cheapest => "$",
            Self::LowerPriced => "$$",
            Self::ModeratelyPriced => "$$$",
            Self::MostExpensive => "$$$$",
        }
    }

    /// Ordinal label used by the charts.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Cheapest => Some("cheapest"),
            Self::LowerPriced => Some("lower-priced"),
            Self::ModeratelyPriced => Some("moderately-priced"),
            Self::MostExpensive => Some("most expensive"),
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Serialize for PriceTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for PriceTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_symbol(&raw))
    }
}

/// Fields extracted from one recommendation block of a post.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub recommender: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Business metadata returned by the directory lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub price: PriceTier,
    pub rating: Option<f64>,
    pub cuisine: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Enrichment {
    /// True when the directory resolved nothing at all.
    pub fn is_empty(&self) -> bool {
        !self.price.is_known()
            && self.rating.is_none()
            && self.cuisine.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// One row of the output table. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub location_str: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub price: PriceTier,
    pub rating: Option<f64>,
    pub cuisine: Option<String>,
    pub recommender: String,
    pub date: Option<NaiveDate>,
    pub neighborhood: Option<String>,
}

impl Recommendation {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_symbols() {
        assert_eq!(PriceTier::from_symbol("$$"), PriceTier::LowerPriced);
        assert_eq!(PriceTier::from_symbol(" $$$$ "), PriceTier::MostExpensive);
        assert_eq!(PriceTier::from_symbol(""), PriceTier::Unknown);
        assert_eq!(PriceTier::from_symbol("€€"), PriceTier::Unknown);
        assert_eq!(PriceTier::ModeratelyPriced.label(), Some("moderately-priced"));
        assert_eq!(PriceTier::Unknown.label(), None);
    }

    #[test]
    fn empty_enrichment() {
        assert!(Enrichment::default().is_empty());

        let rated = Enrichment {
            rating: Some(4.0),
            ..Enrichment::default()
        };
        assert!(!rated.is_empty());

        let priced = Enrichment {
            price: PriceTier::Cheapest,
            ..Enrichment::default()
        };
        assert!(!priced.is_empty());
    }
}
