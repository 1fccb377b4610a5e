//! # Market Monitor Analytics Engine
//!
//! This crate turns raw daily price series for a cross-asset universe into
//! aligned views, return and risk metrics, correlations and fixed-income
//! indicators. It is the numeric core of the monitor.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of data
//!   providers, files or terminals. It depends only on `core-types` (Layer 0)
//!   and on `configuration` for its settings.
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless calculator.
//!   It takes raw series and a date range as input and produces an
//!   `AnalysisReport` as output. Nothing is cached between requests.
//! - **Partial Results:** A failure scoped to one asset or one pair is stored in
//!   place of that result. Only a request that is unusable as a whole fails.
//!
//! ## Public API
//!
//! - `align`: Merges raw series onto one common trading-day axis.
//! - `compute_metrics`: Per-asset return and risk figures.
//! - `compute_correlation`: Pairwise daily-return correlations.
//! - `transforms`: Normalized, absolute, windowed, drawdown and rolling views.
//! - `AnalyticsEngine`: Runs the whole pipeline and returns an `AnalysisReport`.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod align;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod metrics;
pub mod proxies;
pub mod report;
pub mod returns;
pub mod summary;
pub mod transforms;

mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use align::{Alignment, MIN_VALID_PRICES, align};
pub use correlation::{CorrelationMatrix, compute_correlation};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use matrix::{AlignedMatrix, AssetColumn};
pub use metrics::{
    DayReturn, MIN_VALID_RETURNS, MetricsByAsset, MetricsResult, TRADING_DAYS_PER_YEAR,
    compute_metrics,
};
pub use proxies::SpreadProxy;
pub use report::AnalysisReport;
pub use returns::{ReturnSeries, daily_returns};
pub use summary::{GroupLeaders, Overview, Performer};
