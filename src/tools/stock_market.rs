//! Stock market data tools: K-lines, listing info, dividends, adjust factors.

use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{
    error_result, frame_result, is_valid_date, is_valid_stock_code, source_error_result, tool_meta,
};
use super::registry::{SharedDataSource, ToolRegistry};

pub const DOMAIN: &str = "stock_market";

const FREQUENCIES: [&str; 7] = ["d", "w", "m", "5", "15", "30", "60"];
const ADJUST_FLAGS: [&str; 3] = ["1", "2", "3"];

fn default_frequency() -> String {
    "d".to_string()
}

fn default_adjust_flag() -> String {
    // No adjustment, matching the provider default.
    "3".to_string()
}

fn default_year_type() -> String {
    "report".to_string()
}

/// Attach the stock-market tools to the registry.
pub fn register_stock_market_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(
        DOMAIN,
        HistoricalKDataTool::to_tool(),
        source,
        HistoricalKDataTool::run,
    );
    registry.register(
        DOMAIN,
        StockBasicInfoTool::to_tool(),
        source,
        StockBasicInfoTool::run,
    );
    registry.register(
        DOMAIN,
        DividendDataTool::to_tool(),
        source,
        DividendDataTool::run,
    );
    registry.register(
        DOMAIN,
        AdjustFactorTool::to_tool(),
        source,
        AdjustFactorTool::run,
    );
}

// ============================================================================
// get_historical_k_data
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HistoricalKDataParams {
    /// Stock code with market prefix, e.g. `sh.600000`.
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,

    #[schemars(description = "Start date, YYYY-MM-DD")]
    pub start_date: String,

    #[schemars(description = "End date, YYYY-MM-DD")]
    pub end_date: String,

    /// K-line frequency: `d`, `w`, `m`, or minutes (`5`/`15`/`30`/`60`).
    #[schemars(description = "Frequency: 'd' daily, 'w' weekly, 'm' monthly, '5'/'15'/'30'/'60' minutes (default 'd')")]
    #[serde(default = "default_frequency")]
    pub frequency: String,

    /// Price adjustment: `1` post-adjusted, `2` pre-adjusted, `3` none.
    #[schemars(description = "Adjustment: '1' post, '2' pre, '3' none (default '3')")]
    #[serde(default = "default_adjust_flag")]
    pub adjust_flag: String,

    /// Columns to return; provider defaults apply when omitted.
    #[schemars(description = "Optional list of fields to return, e.g. ['date', 'close', 'volume']")]
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

pub struct HistoricalKDataTool;

impl HistoricalKDataTool {
    pub const NAME: &'static str = "get_historical_k_data";
    pub const DESCRIPTION: &'static str = "Fetch historical K-line (OHLCV) data for a Chinese A-share stock over a date range, with selectable frequency and price adjustment. Returns a markdown table.";

    pub fn to_tool() -> Tool {
        tool_meta::<HistoricalKDataParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: HistoricalKDataParams) -> CallToolResult {
        if !is_valid_stock_code(&params.code) {
            return error_result(&format!(
                "Invalid stock code '{}': expected market prefix plus six digits, e.g. 'sh.600000'",
                params.code
            ));
        }
        if !is_valid_date(&params.start_date) || !is_valid_date(&params.end_date) {
            return error_result("Dates must be formatted YYYY-MM-DD");
        }
        if !FREQUENCIES.contains(&params.frequency.as_str()) {
            return error_result(&format!(
                "Invalid frequency '{}': expected one of {:?}",
                params.frequency, FREQUENCIES
            ));
        }
        if !ADJUST_FLAGS.contains(&params.adjust_flag.as_str()) {
            return error_result(&format!(
                "Invalid adjust_flag '{}': expected '1', '2' or '3'",
                params.adjust_flag
            ));
        }

        info!(
            "Fetching K-data for {} ({} to {}, frequency {})",
            params.code, params.start_date, params.end_date, params.frequency
        );

        match source
            .get_historical_k_data(
                &params.code,
                &params.start_date,
                &params.end_date,
                &params.frequency,
                &params.adjust_flag,
                params.fields.as_deref(),
            )
            .await
        {
            Ok(frame) => frame_result(
                &format!(
                    "K-data for {} ({} to {})",
                    params.code, params.start_date, params.end_date
                ),
                &frame,
            ),
            Err(e) => source_error_result("Failed to fetch K-data", &e),
        }
    }
}

// ============================================================================
// get_stock_basic_info
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockBasicInfoParams {
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,
}

pub struct StockBasicInfoTool;

impl StockBasicInfoTool {
    pub const NAME: &'static str = "get_stock_basic_info";
    pub const DESCRIPTION: &'static str = "Fetch basic listing information for an A-share stock: name, IPO date, delisting date, type and trading status.";

    pub fn to_tool() -> Tool {
        tool_meta::<StockBasicInfoParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: StockBasicInfoParams) -> CallToolResult {
        if !is_valid_stock_code(&params.code) {
            return error_result(&format!("Invalid stock code '{}'", params.code));
        }

        info!("Fetching basic info for {}", params.code);

        match source.get_stock_basic_info(&params.code).await {
            Ok(frame) => frame_result(&format!("Basic info for {}", params.code), &frame),
            Err(e) => source_error_result("Failed to fetch basic info", &e),
        }
    }
}

// ============================================================================
// get_dividend_data
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DividendDataParams {
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,

    #[schemars(description = "Year to query, e.g. '2023'")]
    pub year: String,

    /// `report` for announcement year, `operate` for ex-dividend year.
    #[schemars(description = "'report' (announcement year) or 'operate' (ex-dividend year), default 'report'")]
    #[serde(default = "default_year_type")]
    pub year_type: String,
}

pub struct DividendDataTool;

impl DividendDataTool {
    pub const NAME: &'static str = "get_dividend_data";
    pub const DESCRIPTION: &'static str =
        "Fetch dividend records for an A-share stock in a given year.";

    pub fn to_tool() -> Tool {
        tool_meta::<DividendDataParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: DividendDataParams) -> CallToolResult {
        if !is_valid_stock_code(&params.code) {
            return error_result(&format!("Invalid stock code '{}'", params.code));
        }
        if params.year.len() != 4 || !params.year.chars().all(|c| c.is_ascii_digit()) {
            return error_result(&format!("Invalid year '{}': expected YYYY", params.year));
        }
        if params.year_type != "report" && params.year_type != "operate" {
            return error_result(&format!(
                "Invalid year_type '{}': expected 'report' or 'operate'",
                params.year_type
            ));
        }

        info!("Fetching dividends for {} in {}", params.code, params.year);

        match source
            .get_dividend_data(&params.code, &params.year, &params.year_type)
            .await
        {
            Ok(frame) => frame_result(
                &format!("Dividends for {} in {}", params.code, params.year),
                &frame,
            ),
            Err(e) => source_error_result("Failed to fetch dividend data", &e),
        }
    }
}

// ============================================================================
// get_adjust_factor_data
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AdjustFactorParams {
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,

    #[schemars(description = "Start date, YYYY-MM-DD")]
    pub start_date: String,

    #[schemars(description = "End date, YYYY-MM-DD")]
    pub end_date: String,
}

pub struct AdjustFactorTool;

impl AdjustFactorTool {
    pub const NAME: &'static str = "get_adjust_factor_data";
    pub const DESCRIPTION: &'static str =
        "Fetch price adjustment factors for an A-share stock over a date range.";

    pub fn to_tool() -> Tool {
        tool_meta::<AdjustFactorParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: AdjustFactorParams) -> CallToolResult {
        if !is_valid_stock_code(&params.code) {
            return error_result(&format!("Invalid stock code '{}'", params.code));
        }
        if !is_valid_date(&params.start_date) || !is_valid_date(&params.end_date) {
            return error_result("Dates must be formatted YYYY-MM-DD");
        }

        info!("Fetching adjust factors for {}", params.code);

        match source
            .get_adjust_factor_data(&params.code, &params.start_date, &params.end_date)
            .await
        {
            Ok(frame) => frame_result(&format!("Adjust factors for {}", params.code), &frame),
            Err(e) => source_error_result("Failed to fetch adjust factors", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tools::testing::{MockDataSource, result_text};

    fn source() -> SharedDataSource {
        Arc::new(MockDataSource::new("mock"))
    }

    #[test]
    fn test_k_data_params_defaults() {
        let json = r#"{"code": "sh.600000", "start_date": "2024-01-01", "end_date": "2024-02-01"}"#;
        let params: HistoricalKDataParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.frequency, "d");
        assert_eq!(params.adjust_flag, "3");
        assert!(params.fields.is_none());
    }

    #[tokio::test]
    async fn test_k_data_rejects_bad_code() {
        let params = HistoricalKDataParams {
            code: "600000".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-02-01".to_string(),
            frequency: default_frequency(),
            adjust_flag: default_adjust_flag(),
            fields: None,
        };
        let result = HistoricalKDataTool::run(source(), params).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Invalid stock code"));
    }

    #[tokio::test]
    async fn test_k_data_rejects_bad_frequency() {
        let params = HistoricalKDataParams {
            code: "sh.600000".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-02-01".to_string(),
            frequency: "hourly".to_string(),
            adjust_flag: default_adjust_flag(),
            fields: None,
        };
        let result = HistoricalKDataTool::run(source(), params).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Invalid frequency"));
    }

    #[tokio::test]
    async fn test_k_data_renders_frame() {
        let params = HistoricalKDataParams {
            code: "sh.600000".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-02-01".to_string(),
            frequency: default_frequency(),
            adjust_flag: default_adjust_flag(),
            fields: None,
        };
        let result = HistoricalKDataTool::run(source(), params).await;
        assert_ne!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.contains("K-data for sh.600000"));
        assert!(text.contains("| 2024-01-02 |"));
    }

    #[tokio::test]
    async fn test_dividend_rejects_bad_year_type() {
        let params = DividendDataParams {
            code: "sh.600000".to_string(),
            year: "2023".to_string(),
            year_type: "fiscal".to_string(),
        };
        let result = DividendDataTool::run(source(), params).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Invalid year_type"));
    }

    #[tokio::test]
    async fn test_basic_info() {
        let params = StockBasicInfoParams {
            code: "sz.000001".to_string(),
        };
        let result = StockBasicInfoTool::run(source(), params).await;
        assert_ne!(result.is_error, Some(true));
        assert!(result_text(&result).contains("get_stock_basic_info"));
    }
}
