//! Macroeconomic series tools: benchmark rates, reserve ratios, money supply.

use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{error_result, frame_result, is_valid_date, source_error_result, tool_meta};
use super::registry::{SharedDataSource, ToolRegistry};
use crate::datasource::SourceResult;

pub const DOMAIN: &str = "macroeconomic";

/// Attach the macroeconomic tools to the registry.
pub fn register_macroeconomic_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(
        DOMAIN,
        DepositRateTool::to_tool(),
        source,
        DepositRateTool::run,
    );
    registry.register(DOMAIN, LoanRateTool::to_tool(), source, LoanRateTool::run);
    registry.register(
        DOMAIN,
        RequiredReserveRatioTool::to_tool(),
        source,
        RequiredReserveRatioTool::run,
    );
    registry.register(
        DOMAIN,
        MoneySupplyMonthTool::to_tool(),
        source,
        MoneySupplyMonthTool::run,
    );
    registry.register(
        DOMAIN,
        MoneySupplyYearTool::to_tool(),
        source,
        MoneySupplyYearTool::run,
    );
}

/// Date-range parameters shared by the series tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SeriesRangeParams {
    #[schemars(description = "Optional start date, YYYY-MM-DD; earliest available when omitted")]
    #[serde(default)]
    pub start_date: Option<String>,

    #[schemars(description = "Optional end date, YYYY-MM-DD; latest available when omitted")]
    #[serde(default)]
    pub end_date: Option<String>,
}

fn validate_range(params: &SeriesRangeParams) -> Result<(), CallToolResult> {
    for date in [&params.start_date, &params.end_date].into_iter().flatten() {
        if !is_valid_date(date) {
            return Err(error_result(&format!(
                "Invalid date '{}': expected YYYY-MM-DD",
                date
            )));
        }
    }
    Ok(())
}

fn series_result(label: &str, result: SourceResult) -> CallToolResult {
    match result {
        Ok(frame) => frame_result(label, &frame),
        Err(e) => source_error_result(&format!("Failed to fetch {}", label.to_lowercase()), &e),
    }
}

macro_rules! series_tool {
    ($tool:ident, $name:literal, $description:literal, $label:literal, $method:ident) => {
        pub struct $tool;

        impl $tool {
            pub const NAME: &'static str = $name;
            pub const DESCRIPTION: &'static str = $description;

            pub fn to_tool() -> Tool {
                tool_meta::<SeriesRangeParams>(Self::NAME, Self::DESCRIPTION)
            }

            pub async fn run(source: SharedDataSource, params: SeriesRangeParams) -> CallToolResult {
                if let Err(result) = validate_range(&params) {
                    return result;
                }

                info!("Fetching {}", $label);

                let result = source
                    .$method(params.start_date.as_deref(), params.end_date.as_deref())
                    .await;
                series_result($label, result)
            }
        }
    };
}

series_tool!(
    DepositRateTool,
    "get_deposit_rate_data",
    "Fetch benchmark deposit rates published by the People's Bank of China over a date range.",
    "Benchmark deposit rates",
    get_deposit_rate_data
);

series_tool!(
    LoanRateTool,
    "get_loan_rate_data",
    "Fetch benchmark loan rates published by the People's Bank of China over a date range.",
    "Benchmark loan rates",
    get_loan_rate_data
);

series_tool!(
    MoneySupplyMonthTool,
    "get_money_supply_data_month",
    "Fetch monthly money supply figures (M0, M1, M2) over a date range.",
    "Monthly money supply",
    get_money_supply_data_month
);

series_tool!(
    MoneySupplyYearTool,
    "get_money_supply_data_year",
    "Fetch year-end money supply figures (M0, M1, M2) over a date range.",
    "Yearly money supply",
    get_money_supply_data_year
);

// ============================================================================
// get_required_reserve_ratio_data
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReserveRatioParams {
    #[schemars(description = "Optional start date, YYYY-MM-DD")]
    #[serde(default)]
    pub start_date: Option<String>,

    #[schemars(description = "Optional end date, YYYY-MM-DD")]
    #[serde(default)]
    pub end_date: Option<String>,

    /// Date axis: `0` announcement date, `1` effective date.
    #[schemars(description = "Optional date axis: '0' announcement date (default), '1' effective date")]
    #[serde(default)]
    pub year_type: Option<String>,
}

pub struct RequiredReserveRatioTool;

impl RequiredReserveRatioTool {
    pub const NAME: &'static str = "get_required_reserve_ratio_data";
    pub const DESCRIPTION: &'static str =
        "Fetch required reserve ratios for financial institutions over a date range.";

    pub fn to_tool() -> Tool {
        tool_meta::<ReserveRatioParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: ReserveRatioParams) -> CallToolResult {
        for date in [&params.start_date, &params.end_date].into_iter().flatten() {
            if !is_valid_date(date) {
                return error_result(&format!("Invalid date '{}': expected YYYY-MM-DD", date));
            }
        }
        if let Some(year_type) = &params.year_type
            && year_type != "0"
            && year_type != "1"
        {
            return error_result(&format!(
                "Invalid year_type '{}': expected '0' or '1'",
                year_type
            ));
        }

        info!("Fetching required reserve ratios");

        let result = source
            .get_required_reserve_ratio_data(
                params.start_date.as_deref(),
                params.end_date.as_deref(),
                params.year_type.as_deref(),
            )
            .await;
        series_result("Required reserve ratios", result)
    }
}
