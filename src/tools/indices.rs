//! Index constituent tools: SZSE 50, CSI 300, CSI 500.

use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::common::{error_result, frame_result, is_valid_date, source_error_result, tool_meta};
use super::registry::{SharedDataSource, ToolRegistry};
use crate::datasource::SourceResult;

pub const DOMAIN: &str = "indices";

/// Attach the index tools to the registry.
pub fn register_index_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    registry.register(DOMAIN, Sz50StocksTool::to_tool(), source, Sz50StocksTool::run);
    registry.register(
        DOMAIN,
        Hs300StocksTool::to_tool(),
        source,
        Hs300StocksTool::run,
    );
    registry.register(
        DOMAIN,
        Zz500StocksTool::to_tool(),
        source,
        Zz500StocksTool::run,
    );
}

/// Parameters shared by the constituent tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct IndexConstituentsParams {
    /// Constituents as of this date; latest published set when omitted.
    #[schemars(description = "Optional date, YYYY-MM-DD; latest constituents when omitted")]
    #[serde(default)]
    pub date: Option<String>,
}

fn validate_date(params: &IndexConstituentsParams) -> Result<(), CallToolResult> {
    if let Some(date) = &params.date
        && !is_valid_date(date)
    {
        return Err(error_result(&format!(
            "Invalid date '{}': expected YYYY-MM-DD",
            date
        )));
    }
    Ok(())
}

fn constituents_result(index_name: &str, result: SourceResult) -> CallToolResult {
    match result {
        Ok(frame) => frame_result(&format!("{} constituents", index_name), &frame),
        Err(e) => source_error_result(
            &format!("Failed to fetch {} constituents", index_name),
            &e,
        ),
    }
}

macro_rules! index_tool {
    ($tool:ident, $name:literal, $description:literal, $label:literal, $method:ident) => {
        pub struct $tool;

        impl $tool {
            pub const NAME: &'static str = $name;
            pub const DESCRIPTION: &'static str = $description;

            pub fn to_tool() -> Tool {
                tool_meta::<IndexConstituentsParams>(Self::NAME, Self::DESCRIPTION)
            }

            pub async fn run(
                source: SharedDataSource,
                params: IndexConstituentsParams,
            ) -> CallToolResult {
                if let Err(result) = validate_date(&params) {
                    return result;
                }

                info!("Fetching {} constituents", $label);

                let result = source.$method(params.date.as_deref()).await;
                constituents_result($label, result)
            }
        }
    };
}

index_tool!(
    Sz50StocksTool,
    "get_sz50_stocks",
    "Fetch the constituent stocks of the SZSE 50 index, optionally as of a given date.",
    "SZSE 50",
    get_sz50_stocks
);

index_tool!(
    Hs300StocksTool,
    "get_hs300_stocks",
    "Fetch the constituent stocks of the CSI 300 index, optionally as of a given date.",
    "CSI 300",
    get_hs300_stocks
);

index_tool!(
    Zz500StocksTool,
    "get_zz500_stocks",
    "Fetch the constituent stocks of the CSI 500 index, optionally as of a given date.",
    "CSI 500",
    get_zz500_stocks
);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tools::testing::{MockDataSource, result_text};

    fn source() -> SharedDataSource {
        Arc::new(MockDataSource::new("mock"))
    }

    #[tokio::test]
    async fn test_constituents_without_date() {
        let result = Hs300StocksTool::run(source(), IndexConstituentsParams { date: None }).await;
        assert_ne!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.contains("CSI 300 constituents"));
        assert!(text.contains("get_hs300_stocks"));
    }

    #[tokio::test]
    async fn test_constituents_rejects_bad_date() {
        let params = IndexConstituentsParams {
            date: Some("last tuesday".to_string()),
        };
        let result = Sz50StocksTool::run(source(), params).await;
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("Invalid date"));
    }

    #[test]
    fn test_params_date_optional() {
        let params: IndexConstituentsParams = serde_json::from_str("{}").unwrap();
        assert!(params.date.is_none());
    }
}
