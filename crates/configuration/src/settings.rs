use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::period::PeriodConfig;
use crate::universe::Universe;
use core_types::{FillPolicy, ViewMode};
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub universe: Universe,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub period: PeriodConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks the cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.universe.validate()?;
        self.analysis.validate()
    }
}

/// Contains the parameters consumed by the analytics engine on every request.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub fill_policy: FillPolicy,
    /// Trading periods per year used to annualise returns and volatility.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// The value every asset starts at in the normalized view.
    #[serde(default = "default_normalize_base")]
    pub normalize_base: f64,
    /// Number of daily returns in each rolling volatility window.
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,
    #[serde(default = "default_spread_proxies")]
    pub spread_proxies: Vec<SpreadProxySpec>,
    #[serde(default = "default_yield_curve")]
    pub yield_curve: Option<YieldCurveSpec>,
}

/// A credit-vs-government pair whose total-return difference is reported as a
/// spread-change proxy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpreadProxySpec {
    pub name: String,
    pub credit: String,
    pub government: String,
}

/// The two yield series whose difference is reported as the curve slope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YieldCurveSpec {
    pub short: String,
    pub long: String,
}

impl AnalysisConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.periods_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.periods_per_year must be greater than zero".to_string(),
            ));
        }
        if !(self.normalize_base.is_finite() && self.normalize_base > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "analysis.normalize_base must be a positive number, got {}",
                self.normalize_base
            )));
        }
        if self.rolling_window < 2 {
            return Err(ConfigError::ValidationError(
                "analysis.rolling_window must be at least 2".to_string(),
            ));
        }
        if let Some(proxy) = self
            .spread_proxies
            .iter()
            .find(|p| p.credit == p.government)
        {
            return Err(ConfigError::ValidationError(format!(
                "spread proxy '{}' compares '{}' with itself",
                proxy.name, proxy.credit
            )));
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fill_policy: FillPolicy::default(),
            periods_per_year: default_periods_per_year(),
            view_mode: ViewMode::default(),
            normalize_base: default_normalize_base(),
            rolling_window: default_rolling_window(),
            spread_proxies: default_spread_proxies(),
            yield_curve: default_yield_curve(),
        }
    }
}

// --- Default Implementations ---
// These allow a user to omit any key of the `[analysis]` section.

fn default_periods_per_year() -> u32 {
    252
}

fn default_normalize_base() -> f64 {
    100.0
}

fn default_rolling_window() -> usize {
    20
}

fn default_spread_proxies() -> Vec<SpreadProxySpec> {
    let proxy = |name: &str, credit: &str, government: &str| SpreadProxySpec {
        name: name.to_string(),
        credit: credit.to_string(),
        government: government.to_string(),
    };
    vec![
        proxy("US IG Spread Proxy", "US IG Corporate", "US Govt Bonds 7-10Y"),
        proxy("US HY Spread Proxy", "US HY Corporate", "US Govt Bonds 7-10Y"),
        proxy("EU IG Spread Proxy", "EU IG Corporate", "EU Govt Bonds 7-10Y"),
        proxy("EU HY Spread Proxy", "EU HY Corporate", "EU Govt Bonds 7-10Y"),
    ]
}

fn default_yield_curve() -> Option<YieldCurveSpec> {
    Some(YieldCurveSpec {
        short: "US 2Y Yield".to_string(),
        long: "US 10Y Yield".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_daily_equity_conventions() {
        let analysis = AnalysisConfig::default();
        assert_eq!(analysis.periods_per_year, 252);
        assert_eq!(analysis.fill_policy, FillPolicy::ForwardFill);
        assert_eq!(analysis.view_mode, ViewMode::Normalized);
        assert_eq!(analysis.spread_proxies.len(), 4);
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn zero_periods_per_year_is_rejected() {
        let analysis = AnalysisConfig {
            periods_per_year: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(analysis.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn self_referencing_proxy_is_rejected() {
        let analysis = AnalysisConfig {
            spread_proxies: vec![SpreadProxySpec {
                name: "bad".to_string(),
                credit: "X".to_string(),
                government: "X".to_string(),
            }],
            ..AnalysisConfig::default()
        };
        assert!(analysis.validate().is_err());
    }
}
