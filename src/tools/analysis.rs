//! Analysis helper tools.
//!
//! These combine other provider queries into data-driven summaries. They are
//! descriptive statistics, not investment advice, and say so in their output.

use chrono::{Datelike, Duration, Local};
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{
    MAX_TABLE_ROWS, error_result, is_valid_stock_code, source_error_result, success_result,
    tool_meta,
};
use super::registry::{SharedDataSource, ToolRegistry};
use crate::datasource::DataFrame;

pub const DOMAIN: &str = "analysis";

/// Calendar days of K-data backing the price statistics (~1 trading year).
const ANALYSIS_WINDOW_DAYS: i64 = 365;

const DISCLAIMER: &str =
    "_Data-driven summary generated from provider data; not investment advice._";

/// Attach the analysis tools to the registry.
pub fn register_analysis_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(
        DOMAIN,
        StockAnalysisTool::to_tool(),
        source,
        StockAnalysisTool::run,
    );
    registry.register(
        DOMAIN,
        AnalysisTimeframeTool::to_tool(),
        source,
        AnalysisTimeframeTool::run,
    );
}

// ============================================================================
// get_stock_analysis
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockAnalysisParams {
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,
}

pub struct StockAnalysisTool;

impl StockAnalysisTool {
    pub const NAME: &'static str = "get_stock_analysis";
    pub const DESCRIPTION: &'static str = "Summarize a stock from provider data: price statistics over the past year plus the most recent growth and DuPont metrics. Descriptive only, not investment advice.";

    pub fn to_tool() -> Tool {
        tool_meta::<StockAnalysisParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: StockAnalysisParams) -> CallToolResult {
        if !is_valid_stock_code(&params.code) {
            return error_result(&format!("Invalid stock code '{}'", params.code));
        }

        let today = Local::now().date_naive();
        let start = (today - Duration::days(ANALYSIS_WINDOW_DAYS))
            .format("%Y-%m-%d")
            .to_string();
        let end = today.format("%Y-%m-%d").to_string();

        info!("Analyzing {} ({} to {})", params.code, start, end);

        let k_data = match source
            .get_historical_k_data(&params.code, &start, &end, "d", "3", None)
            .await
        {
            Ok(frame) => frame,
            Err(e) => return source_error_result("Failed to fetch K-data for analysis", &e),
        };

        let closes: Vec<f64> = k_data
            .column_values("close")
            .iter()
            .filter_map(|v| v.parse().ok())
            .collect();

        let Some(stats) = PriceStats::from_closes(&closes) else {
            return error_result(&format!(
                "Not enough price data to analyze {} ({} to {})",
                params.code, start, end
            ));
        };

        let mut report = format!("## Analysis for {}\n\n", params.code);
        report.push_str(&format!(
            "### Price statistics ({} to {}, {} sessions)\n\n",
            start,
            end,
            closes.len()
        ));
        report.push_str(&stats.to_markdown());

        // Latest complete reporting year; a failed or empty fetch degrades to
        // a note instead of sinking the whole report.
        let report_year = today.year() - 1;
        let growth = source.get_growth_data(&params.code, report_year, 4).await;
        let dupont = source.get_dupont_data(&params.code, report_year, 4).await;

        report.push_str(&format!("\n### Growth metrics ({} Q4)\n\n", report_year));
        report.push_str(&section_body(growth));

        report.push_str(&format!(
            "\n### DuPont decomposition ({} Q4)\n\n",
            report_year
        ));
        report.push_str(&section_body(dupont));

        report.push_str(&format!("\n{}\n", DISCLAIMER));
        success_result(report)
    }
}

fn section_body(result: Result<DataFrame, crate::datasource::DataSourceError>) -> String {
    match result {
        Ok(frame) if !frame.is_empty() => frame.to_markdown(MAX_TABLE_ROWS),
        Ok(_) => "_No data published for this period._\n".to_string(),
        Err(e) => format!("_Unavailable: {}_\n", e),
    }
}

/// Descriptive statistics over a close-price series.
#[derive(Debug, Clone, PartialEq)]
struct PriceStats {
    latest: f64,
    mean: f64,
    low: f64,
    high: f64,
    /// Total change over the window, percent.
    change_pct: f64,
    /// Standard deviation of daily returns, percent.
    volatility_pct: f64,
}

impl PriceStats {
    /// Needs at least two sessions; returns `None` otherwise.
    fn from_closes(closes: &[f64]) -> Option<Self> {
        if closes.len() < 2 {
            return None;
        }

        let first = *closes.first()?;
        let latest = *closes.last()?;
        let mean = closes.iter().sum::<f64>() / closes.len() as f64;
        let low = closes.iter().cloned().fold(f64::INFINITY, f64::min);
        let high = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let returns: Vec<f64> = closes
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();
        let ret_mean = returns.iter().sum::<f64>() / returns.len().max(1) as f64;
        let variance = returns
            .iter()
            .map(|r| (r - ret_mean).powi(2))
            .sum::<f64>()
            / returns.len().max(1) as f64;

        Some(Self {
            latest,
            mean,
            low,
            high,
            change_pct: if first != 0.0 {
                (latest - first) / first * 100.0
            } else {
                0.0
            },
            volatility_pct: variance.sqrt() * 100.0,
        })
    }

    fn to_markdown(&self) -> String {
        format!(
            "| metric | value |\n| --- | --- |\n\
             | latest close | {:.2} |\n\
             | average close | {:.2} |\n\
             | low | {:.2} |\n\
             | high | {:.2} |\n\
             | change over window | {:+.2}% |\n\
             | daily volatility | {:.2}% |\n",
            self.latest, self.mean, self.low, self.high, self.change_pct, self.volatility_pct
        )
    }
}

// ============================================================================
// get_market_analysis_timeframe
// ============================================================================

fn default_period() -> String {
    "month".to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalysisTimeframeParams {
    /// Lookback period: `week`, `month`, `quarter` or `year`.
    #[schemars(description = "Lookback period: 'week', 'month', 'quarter' or 'year' (default 'month')")]
    #[serde(default = "default_period")]
    pub period: String,
}

pub struct AnalysisTimeframeTool;

impl AnalysisTimeframeTool {
    pub const NAME: &'static str = "get_market_analysis_timeframe";
    pub const DESCRIPTION: &'static str = "Suggest a date window for market analysis ending today, reporting how many A-share trading days it contains.";

    pub fn to_tool() -> Tool {
        tool_meta::<AnalysisTimeframeParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: AnalysisTimeframeParams) -> CallToolResult {
        let days = match params.period.as_str() {
            "week" => 7,
            "month" => 30,
            "quarter" => 90,
            "year" => 365,
            other => {
                return error_result(&format!(
                    "Invalid period '{}': expected 'week', 'month', 'quarter' or 'year'",
                    other
                ));
            }
        };

        let today = Local::now().date_naive();
        let start = (today - Duration::days(days)).format("%Y-%m-%d").to_string();
        let end = today.format("%Y-%m-%d").to_string();

        info!("Computing {} analysis timeframe", params.period);

        let frame = match source.get_trade_dates(Some(&start), Some(&end)).await {
            Ok(frame) => frame,
            Err(e) => return source_error_result("Failed to fetch trading calendar", &e),
        };

        let trading_days = count_trading_days(&frame);
        success_result(format!(
            "Analysis timeframe ({}): {} to {}, containing {} trading day(s).",
            params.period, start, end, trading_days
        ))
    }
}

fn count_trading_days(frame: &DataFrame) -> usize {
    frame
        .column_values("is_trading_day")
        .iter()
        .filter(|v| **v == "1")
        .count()
}
