use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The asset class a series belongs to, as tagged by the data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Index,
    Sector,
    Currency,
    Commodity,
    BondEtf,
    Style,
    Yield,
    Custom,
}

impl AssetCategory {
    /// Yield series are levels, not prices: they may be zero or negative and
    /// are never turned into returns.
    pub fn is_yield(&self) -> bool {
        matches!(self, AssetCategory::Yield)
    }
}

/// How the aligner treats an axis date on which an asset has no native price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Leave the slot explicitly missing.
    None,
    /// Carry the most recent prior price of the same asset forward.
    #[default]
    ForwardFill,
}

impl FromStr for FillPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(FillPolicy::None),
            "forward_fill" | "ffill" => Ok(FillPolicy::ForwardFill),
            other => Err(CoreError::UnknownVariant {
                kind: "fill policy",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillPolicy::None => write!(f, "none"),
            FillPolicy::ForwardFill => write!(f, "forward_fill"),
        }
    }
}

/// Which rendition of the aligned prices is handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Every asset rebased so its first valid price equals the base (100 by default).
    #[default]
    Normalized,
    /// Raw prices, untouched.
    Absolute,
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normalized" | "base100" => Ok(ViewMode::Normalized),
            "absolute" => Ok(ViewMode::Absolute),
            other => Err(CoreError::UnknownVariant {
                kind: "view mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Normalized => write!(f, "normalized"),
            ViewMode::Absolute => write!(f, "absolute"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_policy_parses_cli_spellings() {
        assert_eq!("none".parse::<FillPolicy>(), Ok(FillPolicy::None));
        assert_eq!("forward-fill".parse::<FillPolicy>(), Ok(FillPolicy::ForwardFill));
        assert_eq!("FFILL".parse::<FillPolicy>(), Ok(FillPolicy::ForwardFill));
        assert!("backfill".parse::<FillPolicy>().is_err());
    }

    #[test]
    fn view_mode_defaults_to_normalized() {
        assert_eq!(ViewMode::default(), ViewMode::Normalized);
        assert_eq!("Absolute".parse::<ViewMode>(), Ok(ViewMode::Absolute));
    }

    #[test]
    fn categories_deserialize_from_snake_case() {
        let category: AssetCategory = serde_json::from_str("\"bond_etf\"").unwrap();
        assert_eq!(category, AssetCategory::BondEtf);
        assert!(AssetCategory::Yield.is_yield());
    }
}
