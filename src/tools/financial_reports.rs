//! Financial report tools: quarterly statement metrics and report notices.

use chrono::Datelike;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{
    error_result, frame_result, is_valid_date, is_valid_quarter, is_valid_stock_code,
    source_error_result, tool_meta,
};
use super::registry::{SharedDataSource, ToolRegistry};
use crate::datasource::SourceResult;

pub const DOMAIN: &str = "financial_reports";

/// Earliest year baostock publishes quarterly statement data for.
const FIRST_REPORT_YEAR: i32 = 2007;

/// Attach the financial-report tools to the registry.
pub fn register_financial_report_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(DOMAIN, ProfitDataTool::to_tool(), source, ProfitDataTool::run);
    registry.register(
        DOMAIN,
        OperationDataTool::to_tool(),
        source,
        OperationDataTool::run,
    );
    registry.register(DOMAIN, GrowthDataTool::to_tool(), source, GrowthDataTool::run);
    registry.register(
        DOMAIN,
        BalanceDataTool::to_tool(),
        source,
        BalanceDataTool::run,
    );
    registry.register(
        DOMAIN,
        CashFlowDataTool::to_tool(),
        source,
        CashFlowDataTool::run,
    );
    registry.register(DOMAIN, DupontDataTool::to_tool(), source, DupontDataTool::run);
    registry.register(
        DOMAIN,
        PerformanceExpressTool::to_tool(),
        source,
        PerformanceExpressTool::run,
    );
    registry.register(
        DOMAIN,
        ForecastReportTool::to_tool(),
        source,
        ForecastReportTool::run,
    );
}

/// Parameters shared by every quarterly statement tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QuarterlyReportParams {
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,

    #[schemars(description = "Report year, e.g. 2023 (data available from 2007)")]
    pub year: i32,

    #[schemars(description = "Report quarter, 1-4")]
    pub quarter: u8,
}

/// Parameters shared by the report-notice tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReportWindowParams {
    #[schemars(description = "Stock code with market prefix, e.g. 'sh.600000'")]
    pub code: String,

    #[schemars(description = "Start of the publication window, YYYY-MM-DD")]
    pub start_date: String,

    #[schemars(description = "End of the publication window, YYYY-MM-DD")]
    pub end_date: String,
}

fn validate_quarterly(params: &QuarterlyReportParams) -> Result<(), CallToolResult> {
    if !is_valid_stock_code(&params.code) {
        return Err(error_result(&format!(
            "Invalid stock code '{}'",
            params.code
        )));
    }

    let current_year = chrono::Local::now().year();
    if params.year < FIRST_REPORT_YEAR || params.year > current_year {
        return Err(error_result(&format!(
            "Invalid year {}: expected {}-{}",
            params.year, FIRST_REPORT_YEAR, current_year
        )));
    }
    if !is_valid_quarter(params.quarter) {
        return Err(error_result(&format!(
            "Invalid quarter {}: expected 1-4",
            params.quarter
        )));
    }

    Ok(())
}

fn validate_window(params: &ReportWindowParams) -> Result<(), CallToolResult> {
    if !is_valid_stock_code(&params.code) {
        return Err(error_result(&format!(
            "Invalid stock code '{}'",
            params.code
        )));
    }
    if !is_valid_date(&params.start_date) || !is_valid_date(&params.end_date) {
        return Err(error_result("Dates must be formatted YYYY-MM-DD"));
    }
    Ok(())
}

fn quarterly_result(label: &str, params: &QuarterlyReportParams, result: SourceResult) -> CallToolResult {
    match result {
        Ok(frame) => frame_result(
            &format!(
                "{} for {} ({} Q{})",
                label, params.code, params.year, params.quarter
            ),
            &frame,
        ),
        Err(e) => source_error_result(&format!("Failed to fetch {}", label.to_lowercase()), &e),
    }
}

macro_rules! quarterly_tool {
    ($tool:ident, $name:literal, $description:literal, $label:literal, $method:ident) => {
        pub struct $tool;

        impl $tool {
            pub const NAME: &'static str = $name;
            pub const DESCRIPTION: &'static str = $description;

            pub fn to_tool() -> Tool {
                tool_meta::<QuarterlyReportParams>(Self::NAME, Self::DESCRIPTION)
            }

            pub async fn run(
                source: SharedDataSource,
                params: QuarterlyReportParams,
            ) -> CallToolResult {
                if let Err(result) = validate_quarterly(&params) {
                    return result;
                }

                info!(
                    "Fetching {} for {} ({} Q{})",
                    $name, params.code, params.year, params.quarter
                );

                let result = source
                    .$method(&params.code, params.year, params.quarter)
                    .await;
                quarterly_result($label, &params, result)
            }
        }
    };
}

quarterly_tool!(
    ProfitDataTool,
    "get_profit_data",
    "Fetch quarterly profitability metrics (ROE, net margin, EPS) for an A-share stock.",
    "Profitability",
    get_profit_data
);

quarterly_tool!(
    OperationDataTool,
    "get_operation_data",
    "Fetch quarterly operating-efficiency metrics (turnover ratios) for an A-share stock.",
    "Operating efficiency",
    get_operation_data
);

quarterly_tool!(
    GrowthDataTool,
    "get_growth_data",
    "Fetch quarterly growth metrics (year-over-year revenue and profit growth) for an A-share stock.",
    "Growth",
    get_growth_data
);

quarterly_tool!(
    BalanceDataTool,
    "get_balance_data",
    "Fetch quarterly balance-sheet metrics (liquidity and leverage ratios) for an A-share stock.",
    "Balance sheet",
    get_balance_data
);

quarterly_tool!(
    CashFlowDataTool,
    "get_cash_flow_data",
    "Fetch quarterly cash-flow metrics for an A-share stock.",
    "Cash flow",
    get_cash_flow_data
);

quarterly_tool!(
    DupontDataTool,
    "get_dupont_data",
    "Fetch quarterly DuPont decomposition metrics for an A-share stock.",
    "DuPont analysis",
    get_dupont_data
);

// ============================================================================
// get_performance_express_report
// ============================================================================

pub struct PerformanceExpressTool;

impl PerformanceExpressTool {
    pub const NAME: &'static str = "get_performance_express_report";
    pub const DESCRIPTION: &'static str = "Fetch performance express reports (unaudited preliminary results) published by an A-share company within a date window.";

    pub fn to_tool() -> Tool {
        tool_meta::<ReportWindowParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: ReportWindowParams) -> CallToolResult {
        if let Err(result) = validate_window(&params) {
            return result;
        }

        info!("Fetching express reports for {}", params.code);

        match source
            .get_performance_express_report(&params.code, &params.start_date, &params.end_date)
            .await
        {
            Ok(frame) => frame_result(
                &format!("Performance express reports for {}", params.code),
                &frame,
            ),
            Err(e) => source_error_result("Failed to fetch express reports", &e),
        }
    }
}

// ============================================================================
// get_forecast_report
// ============================================================================

pub struct ForecastReportTool;

impl ForecastReportTool {
    pub const NAME: &'static str = "get_forecast_report";
    pub const DESCRIPTION: &'static str = "Fetch performance forecast reports published by an A-share company within a date window.";

    pub fn to_tool() -> Tool {
        tool_meta::<ReportWindowParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: ReportWindowParams) -> CallToolResult {
        if let Err(result) = validate_window(&params) {
            return result;
        }

        info!("Fetching forecast reports for {}", params.code);

        match source
            .get_forecast_report(&params.code, &params.start_date, &params.end_date)
            .await
        {
            Ok(frame) => frame_result(&format!("Forecast reports for {}", params.code), &frame),
            Err(e) => source_error_result("Failed to fetch forecast reports", &e),
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

    fn quarterly(code: &str, year: i32, quarter: u8) -> QuarterlyReportParams {
        QuarterlyReportParams {
            code: code.to_string(),
            year,
            quarter,
        }
    }

    #[tokio::test]
    async fn test_profit_data_fetches() {
        let result = ProfitDataTool::run(source(), quarterly("sh.600000", 2023, 4)).await;
        assert_ne!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.contains("Profitability for sh.600000 (2023 Q4)"));
        assert!(text.contains("get_profit_data"));
    }

    #[tokio::test]
    async fn test_quarter_out_of_range() {
        let result = GrowthDataTool::run(source(), quarterly("sh.600000", 2023, 5)).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Invalid quarter"));
    }

    #[tokio::test]
    async fn test_year_before_first_report() {
        let result = BalanceDataTool::run(source(), quarterly("sh.600000", 1999, 1)).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Invalid year"));
    }

    #[tokio::test]
    async fn test_forecast_rejects_bad_dates() {
        let params = ReportWindowParams {
            code: "sh.600000".to_string(),
            start_date: "2023/01/01".to_string(),
            end_date: "2023-06-30".to_string(),
        };
        let result = ForecastReportTool::run(source(), params).await;
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn test_quarterly_params_schema_roundtrip() {
        let json = r#"{"code": "sz.000001", "year": 2022, "quarter": 2}"#;
        let params: QuarterlyReportParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.quarter, 2);
    }
}
