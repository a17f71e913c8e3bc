pub mod chart;
pub mod indicators;
pub mod patterns;
pub mod report;
pub mod signals;
pub mod trend;

#[cfg(test)]
mod indicators_tests;

pub use indicators::{compute_indicators, daily_change, rolling_sma, sma, MA_WINDOWS};
pub use patterns::{PatternDetector, PatternRule};
pub use report::analyze;
pub use signals::{compose_buy_report, compose_sell_report, ANALYSIS_WINDOW};
pub use trend::classify_trend;
