//! Market overview tools: full stock list and industry classification.

use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{
    error_result, frame_result, is_valid_date, is_valid_stock_code, source_error_result, tool_meta,
};
use super::registry::{SharedDataSource, ToolRegistry};

pub const DOMAIN: &str = "market_overview";

/// Attach the market-overview tools to the registry.
pub fn register_market_overview_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(DOMAIN, AllStockTool::to_tool(), source, AllStockTool::run);
    registry.register(
        DOMAIN,
        StockIndustryTool::to_tool(),
        source,
        StockIndustryTool::run,
    );
}

// ============================================================================
// get_all_stock
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AllStockParams {
    /// Trading day to list; the most recent one when omitted.
    #[schemars(description = "Optional trading day, YYYY-MM-DD; latest when omitted")]
    #[serde(default)]
    pub date: Option<String>,
}

pub struct AllStockTool;

impl AllStockTool {
    pub const NAME: &'static str = "get_all_stock";
    pub const DESCRIPTION: &'static str = "List all A-share stocks and indices with their trading status on a given day. The result can be large; it is truncated for display.";

    pub fn to_tool() -> Tool {
        tool_meta::<AllStockParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: AllStockParams) -> CallToolResult {
        if let Some(date) = &params.date
            && !is_valid_date(date)
        {
            return error_result(&format!("Invalid date '{}': expected YYYY-MM-DD", date));
        }

        info!("Fetching full stock list");

        match source.get_all_stock(params.date.as_deref()).await {
            Ok(frame) => frame_result("All listed stocks", &frame),
            Err(e) => source_error_result("Failed to fetch stock list", &e),
        }
    }
}

// ============================================================================
// get_stock_industry
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StockIndustryParams {
    /// Restrict to one stock; the whole market when omitted.
    #[schemars(description = "Optional stock code, e.g. 'sh.600000'; all stocks when omitted")]
    #[serde(default)]
    pub code: Option<String>,

    #[schemars(description = "Optional date, YYYY-MM-DD; latest classification when omitted")]
    #[serde(default)]
    pub date: Option<String>,
}

pub struct StockIndustryTool;

impl StockIndustryTool {
    pub const NAME: &'static str = "get_stock_industry";
    pub const DESCRIPTION: &'static str =
        "Fetch industry classification for one A-share stock or the whole market.";

    pub fn to_tool() -> Tool {
        tool_meta::<StockIndustryParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub async fn run(source: SharedDataSource, params: StockIndustryParams) -> CallToolResult {
        if let Some(code) = &params.code
            && !is_valid_stock_code(code)
        {
            return error_result(&format!("Invalid stock code '{}'", code));
        }
        if let Some(date) = &params.date
            && !is_valid_date(date)
        {
            return error_result(&format!("Invalid date '{}': expected YYYY-MM-DD", date));
        }

        info!("Fetching industry classification");

        match source
            .get_stock_industry(params.code.as_deref(), params.date.as_deref())
            .await
        {
            Ok(frame) => {
                let title = match &params.code {
                    Some(code) => format!("Industry classification for {}", code),
                    None => "Industry classification".to_string(),
                };
                frame_result(&title, &frame)
            }
            Err(e) => source_error_result("Failed to fetch industry classification", &e),
        }
    }
}
