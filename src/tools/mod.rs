//! MCP tool surface, organized by functional domain.
//!
//! Each domain module owns its tool definitions and exposes one registration
//! function taking `(registry, data source handle)`. Registration appends to
//! the registry's tool table; calling a registrar twice duplicates its
//! entries, so each runs exactly once at startup.

pub mod analysis;
pub mod common;
pub mod date_utils;
pub mod financial_reports;
pub mod indices;
pub mod macroeconomic;
pub mod market_overview;
pub mod registry;
pub mod stock_market;

pub use registry::{SharedDataSource, ToolRegistry};

/// Run all seven domain registrars once, in a fixed order.
pub fn register_all_tools(registry: &mut ToolRegistry, source: &SharedDataSource) {
    stock_market::register_stock_market_tools(registry, source);
    financial_reports::register_financial_report_tools(registry, source);
    indices::register_index_tools(registry, source);
    market_overview::register_market_overview_tools(registry, source);
    macroeconomic::register_macroeconomic_tools(registry, source);
    date_utils::register_date_utils_tools(registry, source);
    analysis::register_analysis_tools(registry, source);
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test double for the data source seam.

    use async_trait::async_trait;
    use rmcp::model::{CallToolResult, RawContent};

    use crate::datasource::{DataFrame, FinancialDataSource, SourceResult};

    /// Extract the first text block of a tool result.
    pub fn result_text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    /// Data source stub tagging every frame with its construction tag, so
    /// tests can prove which handle a tool resolved through.
    pub struct MockDataSource {
        tag: &'static str,
    }

    impl MockDataSource {
        pub fn new(tag: &'static str) -> Self {
            Self { tag }
        }

        fn generic(&self, method: &str) -> SourceResult {
            Ok(DataFrame {
                columns: vec!["source".to_string(), "method".to_string()],
                rows: vec![vec![self.tag.to_string(), method.to_string()]],
            })
        }

        fn k_data(&self) -> SourceResult {
            let row = |date: &str, close: &str| {
                vec![
                    date.to_string(),
                    "sh.600000".to_string(),
                    close.to_string(),
                    self.tag.to_string(),
                ]
            };
            Ok(DataFrame {
                columns: ["date", "code", "close", "source"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                rows: vec![
                    row("2024-01-02", "10.0"),
                    row("2024-01-03", "10.5"),
                    row("2024-01-04", "11.0"),
                ],
            })
        }

        fn calendar(&self) -> SourceResult {
            let row = |date: &str, trading: &str| {
                vec![date.to_string(), trading.to_string(), self.tag.to_string()]
            };
            Ok(DataFrame {
                columns: ["calendar_date", "is_trading_day", "source"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                rows: vec![
                    row("2024-01-01", "0"),
                    row("2024-01-02", "1"),
                    row("2024-01-03", "1"),
                ],
            })
        }
    }

    #[async_trait]
    impl FinancialDataSource for MockDataSource {
        async fn get_historical_k_data(
            &self,
            _code: &str,
            _start_date: &str,
            _end_date: &str,
            _frequency: &str,
            _adjust_flag: &str,
            _fields: Option<&[String]>,
        ) -> SourceResult {
            self.k_data()
        }

        async fn get_stock_basic_info(&self, _code: &str) -> SourceResult {
            self.generic("get_stock_basic_info")
        }

        async fn get_dividend_data(
            &self,
            _code: &str,
            _year: &str,
            _year_type: &str,
        ) -> SourceResult {
            self.generic("get_dividend_data")
        }

        async fn get_adjust_factor_data(
            &self,
            _code: &str,
            _start_date: &str,
            _end_date: &str,
        ) -> SourceResult {
            self.generic("get_adjust_factor_data")
        }

        async fn get_profit_data(&self, _code: &str, _year: i32, _quarter: u8) -> SourceResult {
            self.generic("get_profit_data")
        }

        async fn get_operation_data(&self, _code: &str, _year: i32, _quarter: u8) -> SourceResult {
            self.generic("get_operation_data")
        }

        async fn get_growth_data(&self, _code: &str, _year: i32, _quarter: u8) -> SourceResult {
            self.generic("get_growth_data")
        }

        async fn get_balance_data(&self, _code: &str, _year: i32, _quarter: u8) -> SourceResult {
            self.generic("get_balance_data")
        }

        async fn get_cash_flow_data(&self, _code: &str, _year: i32, _quarter: u8) -> SourceResult {
            self.generic("get_cash_flow_data")
        }

        async fn get_dupont_data(&self, _code: &str, _year: i32, _quarter: u8) -> SourceResult {
            self.generic("get_dupont_data")
        }

        async fn get_performance_express_report(
            &self,
            _code: &str,
            _start_date: &str,
            _end_date: &str,
        ) -> SourceResult {
            self.generic("get_performance_express_report")
        }

        async fn get_forecast_report(
            &self,
            _code: &str,
            _start_date: &str,
            _end_date: &str,
        ) -> SourceResult {
            self.generic("get_forecast_report")
        }

        async fn get_sz50_stocks(&self, _date: Option<&str>) -> SourceResult {
            self.generic("get_sz50_stocks")
        }

        async fn get_hs300_stocks(&self, _date: Option<&str>) -> SourceResult {
            self.generic("get_hs300_stocks")
        }

        async fn get_zz500_stocks(&self, _date: Option<&str>) -> SourceResult {
            self.generic("get_zz500_stocks")
        }

        async fn get_all_stock(&self, _date: Option<&str>) -> SourceResult {
            self.generic("get_all_stock")
        }

        async fn get_stock_industry(
            &self,
            _code: Option<&str>,
            _date: Option<&str>,
        ) -> SourceResult {
            self.generic("get_stock_industry")
        }

        async fn get_deposit_rate_data(
            &self,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
        ) -> SourceResult {
            self.generic("get_deposit_rate_data")
        }

        async fn get_loan_rate_data(
            &self,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
        ) -> SourceResult {
            self.generic("get_loan_rate_data")
        }

        async fn get_required_reserve_ratio_data(
            &self,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
            _year_type: Option<&str>,
        ) -> SourceResult {
            self.generic("get_required_reserve_ratio_data")
        }

        async fn get_money_supply_data_month(
            &self,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
        ) -> SourceResult {
            self.generic("get_money_supply_data_month")
        }

        async fn get_money_supply_data_year(
            &self,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
        ) -> SourceResult {
            self.generic("get_money_supply_data_year")
        }

        async fn get_trade_dates(
            &self,
            _start_date: Option<&str>,
            _end_date: Option<&str>,
        ) -> SourceResult {
            self.calendar()
        }
    }
}
