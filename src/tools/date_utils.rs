//! Trading-calendar tools.

use chrono::{Duration, Local};
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{
    error_result, frame_result, is_valid_date, source_error_result, success_result, tool_meta,
};
use super::registry::{SharedDataSource, ToolRegistry};
use crate::datasource::DataFrame;

pub const DOMAIN: &str = "date_utils";

/// Window scanned backwards from today when resolving the latest trading day.
/// Long enough to bridge any A-share market closure.
const LATEST_LOOKBACK_DAYS: i64 = 30;

/// Attach the date-utility tools to the registry.
pub fn register_date_utils_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(
        DOMAIN,
        TradeDatesTool::to_tool(),
        source,
        TradeDatesTool::run,
    );
    registry.register(
        DOMAIN,
        LatestTradingDateTool::to_tool(),
        source,
        LatestTradingDateTool::run,
    );
}

// ============================================================================
// get_trade_dates
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TradeDatesParams {
    #[schemars(description = "Optional start date, YYYY-MM-DD")]
    #[serde(default)]
    pub start_date: Option<String>,

    #[schemars(description = "Optional end date, YYYY-MM-DD")]
    #[serde(default)]
    pub end_date: Option<String>,
}

pub struct TradeDatesTool;

impl TradeDatesTool {
    pub const NAME: &'static str = "get_trade_dates";
    pub const DESCRIPTION: &'static str = "Fetch the A-share trading calendar over a date range: each day with a flag marking whether the market is open.";

    pub fn to_tool() -> Tool {
        tool_meta::<TradeDatesParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: TradeDatesParams) -> CallToolResult {
        for date in [&params.start_date, &params.end_date].into_iter().flatten() {
            if !is_valid_date(date) {
                return error_result(&format!("Invalid date '{}': expected YYYY-MM-DD", date));
            }
        }

        info!("Fetching trading calendar");

        match source
            .get_trade_dates(params.start_date.as_deref(), params.end_date.as_deref())
            .await
        {
            Ok(frame) => frame_result("Trading calendar", &frame),
            Err(e) => source_error_result("Failed to fetch trading calendar", &e),
        }
    }
}

// ============================================================================
// get_latest_trading_date
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LatestTradingDateParams {}

pub struct LatestTradingDateTool;

impl LatestTradingDateTool {
    pub const NAME: &'static str = "get_latest_trading_date";
    pub const DESCRIPTION: &'static str =
        "Resolve the most recent A-share trading date on or before today.";

    pub fn to_tool() -> Tool {
        tool_meta::<LatestTradingDateParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, _params: LatestTradingDateParams) -> CallToolResult {
        let today = Local::now().date_naive();
        let start = today - Duration::days(LATEST_LOOKBACK_DAYS);
        let start = start.format("%Y-%m-%d").to_string();
        let end = today.format("%Y-%m-%d").to_string();

        info!("Resolving latest trading date ({} to {})", start, end);

        let frame = match source.get_trade_dates(Some(&start), Some(&end)).await {
            Ok(frame) => frame,
            Err(e) => return source_error_result("Failed to fetch trading calendar", &e),
        };

        match latest_trading_date(&frame) {
            Some(date) => success_result(format!("Latest trading date: {}", date)),
            None => error_result(&format!(
                "No trading day found between {} and {}",
                start, end
            )),
        }
    }
}

/// Last calendar row flagged as a trading day.
fn latest_trading_date(frame: &DataFrame) -> Option<String> {
    let date_idx = frame.column_index("calendar_date")?;
    let trading_idx = frame.column_index("is_trading_day")?;

    frame
        .rows
        .iter()
        .rev()
        .find(|row| row.get(trading_idx).map(String::as_str) == Some("1"))
        .and_then(|row| row.get(date_idx).cloned())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tools::testing::{MockDataSource, result_text};

    fn source() -> SharedDataSource {
        Arc::new(MockDataSource::new("mock"))
    }

    fn calendar(rows: &[(&str, &str)]) -> DataFrame {
        DataFrame {
            columns: vec!["calendar_date".to_string(), "is_trading_day".to_string()],
            rows: rows
                .iter()
                .map(|(d, t)| vec![d.to_string(), t.to_string()])
                .collect(),
        }
    }

    #[test]
    fn test_latest_trading_date_picks_last_open_day() {
        let frame = calendar(&[
            ("2024-01-02", "1"),
            ("2024-01-03", "1"),
            ("2024-01-06", "0"),
        ]);
        assert_eq!(
            latest_trading_date(&frame),
            Some("2024-01-03".to_string())
        );
    }

    #[test]
    fn test_latest_trading_date_none_when_all_closed() {
        let frame = calendar(&[("2024-01-06", "0"), ("2024-01-07", "0")]);
        assert_eq!(latest_trading_date(&frame), None);
    }

    #[test]
    fn test_latest_trading_date_missing_columns() {
        let frame = DataFrame::new(vec!["date".to_string()]);
        assert_eq!(latest_trading_date(&frame), None);
    }

    #[tokio::test]
    async fn test_trade_dates_renders_calendar() {
        let params = TradeDatesParams {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-01-31".to_string()),
        };
        let result = TradeDatesTool::run(source(), params).await;
        assert_ne!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Trading calendar"));
    }

    #[tokio::test]
    async fn test_latest_trading_date_via_source() {
        // The mock calendar ends with 2024-01-03 as a trading day.
        let result = LatestTradingDateTool::run(source(), LatestTradingDateParams {}).await;
        assert_ne!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Latest trading date: 2024-01-03"));
    }
}
