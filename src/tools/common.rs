//! Shared helpers for tool implementations.
//!
//! Parameter validation for baostock-style identifiers, plus result
//! formatting shared by every domain.

use chrono::NaiveDate;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{CallToolResult, Content, Tool};
use tracing::warn;

use crate::datasource::{DataFrame, DataSourceError};

/// Rows rendered per table before truncation kicks in.
pub const MAX_TABLE_ROWS: usize = 250;

/// Build the MCP metadata for a tool whose parameters are `P`.
pub fn tool_meta<P: schemars::JsonSchema + 'static>(
    name: &'static str,
    description: &'static str,
) -> Tool {
    Tool {
        name: name.into(),
        description: Some(description.into()),
        input_schema: cached_schema_for_type::<P>(),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Check a baostock stock code: market prefix plus six digits,
/// e.g. `sh.600000` or `sz.000001`.
pub fn is_valid_stock_code(code: &str) -> bool {
    let Some((market, number)) = code.split_once('.') else {
        return false;
    };
    matches!(market, "sh" | "sz" | "bj")
        && number.len() == 6
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Check a `YYYY-MM-DD` date string.
pub fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Check a report quarter (1-4).
pub fn is_valid_quarter(quarter: u8) -> bool {
    (1..=4).contains(&quarter)
}

/// Create an error result with a formatted message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a success result with text content.
pub fn success_result(content: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(content)])
}

/// Render a provider frame under a markdown heading.
///
/// An empty frame becomes a tool-level error: the distinction between "the
/// provider failed" and "the provider had nothing" stays visible to clients.
pub fn frame_result(title: &str, frame: &DataFrame) -> CallToolResult {
    if frame.is_empty() {
        return error_result(&format!("No data found: {}", title));
    }

    success_result(format!(
        "## {}\n\n{}",
        title,
        frame.to_markdown(MAX_TABLE_ROWS)
    ))
}

/// Map a provider error to a tool-level error result.
pub fn source_error_result(context: &str, err: &DataSourceError) -> CallToolResult {
    error_result(&format!("{}: {}", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    fn result_text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_stock_code_valid() {
        assert!(is_valid_stock_code("sh.600000"));
        assert!(is_valid_stock_code("sz.000001"));
        assert!(is_valid_stock_code("bj.430047"));
    }

    #[test]
    fn test_stock_code_invalid() {
        assert!(!is_valid_stock_code("600000"));
        assert!(!is_valid_stock_code("sh.60000")); // five digits
        assert!(!is_valid_stock_code("sh.6000000")); // seven digits
        assert!(!is_valid_stock_code("ny.600000")); // unknown market
        assert!(!is_valid_stock_code("sh.60000a"));
    }

    #[test]
    fn test_date_validation() {
        assert!(is_valid_date("2024-01-02"));
        assert!(!is_valid_date("2024-13-02"));
        assert!(!is_valid_date("2024/01/02"));
        assert!(!is_valid_date("20240102"));
    }

    #[test]
    fn test_quarter_validation() {
        assert!(is_valid_quarter(1));
        assert!(is_valid_quarter(4));
        assert!(!is_valid_quarter(0));
        assert!(!is_valid_quarter(5));
    }

    #[test]
    fn test_frame_result_empty_is_error() {
        let frame = DataFrame::new(vec!["date".to_string()]);
        let result = frame_result("K-data for sh.600000", &frame);
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).contains("No data found"));
    }

    #[test]
    fn test_frame_result_renders_table() {
        let frame = DataFrame {
            columns: vec!["date".to_string()],
            rows: vec![vec!["2024-01-02".to_string()]],
        };
        let result = frame_result("Trade dates", &frame);
        assert_ne!(result.is_error, Some(true));
        let text = result_text(&result);
        assert!(text.contains("## Trade dates"));
        assert!(text.contains("| 2024-01-02 |"));
    }
}
