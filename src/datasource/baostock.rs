//! Baostock-backed implementation of [`FinancialDataSource`].
//!
//! Baostock ships only a Python SDK with a proprietary wire protocol, so this
//! adapter speaks JSON to a baostock gateway service instead: one GET per
//! query (`{base}/query/{api}`), parameters as a query string, and a
//! `{error_code, error_msg, fields, rows}` body mirroring the upstream result
//! shape. The gateway endpoint is configurable via `BAOSTOCK_GATEWAY_URL`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{DataFrame, DataSourceError, FinancialDataSource, SourceResult};
use crate::core::config::DataSourceConfig;

/// Default K-line columns requested when the caller does not narrow them.
const DEFAULT_K_FIELDS: &str =
    "date,code,open,high,low,close,preclose,volume,amount,turn,pctChg";

/// Gateway response body, matching baostock's result set shape.
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default = "ok_code")]
    error_code: String,

    #[serde(default)]
    error_msg: String,

    #[serde(default)]
    fields: Vec<String>,

    #[serde(default)]
    rows: Vec<Vec<String>>,
}

fn ok_code() -> String {
    "0".to_string()
}

/// Data source adapter for the baostock gateway.
pub struct BaostockDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl BaostockDataSource {
    /// Build an adapter from configuration.
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: &DataSourceConfig) -> Result<Self, DataSourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataSourceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run one gateway query and convert the result set.
    #[instrument(skip(self, params), fields(api = api))]
    async fn query(&self, api: &str, params: Vec<(&'static str, String)>) -> SourceResult {
        let url = format!("{}/query/{}", self.base_url, api);
        debug!("Querying baostock gateway: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| DataSourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::Network(format!(
                "gateway returned HTTP {} for {}",
                status, api
            )));
        }

        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| DataSourceError::Network(format!("malformed gateway response: {}", e)))?;

        if body.error_code != "0" {
            return Err(DataSourceError::Provider {
                code: body.error_code,
                message: body.error_msg,
            });
        }

        Ok(DataFrame {
            columns: body.fields,
            rows: body.rows,
        })
    }
}

/// Push a parameter only when a value is present.
fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value {
        params.push((key, v.to_string()));
    }
}

#[async_trait]
impl FinancialDataSource for BaostockDataSource {
    async fn get_historical_k_data(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
        frequency: &str,
        adjust_flag: &str,
        fields: Option<&[String]>,
    ) -> SourceResult {
        let fields = match fields {
            Some(f) if !f.is_empty() => f.join(","),
            _ => DEFAULT_K_FIELDS.to_string(),
        };

        self.query(
            "query_history_k_data_plus",
            vec![
                ("code", code.to_string()),
                ("fields", fields),
                ("start_date", start_date.to_string()),
                ("end_date", end_date.to_string()),
                ("frequency", frequency.to_string()),
                ("adjustflag", adjust_flag.to_string()),
            ],
        )
        .await
    }

    async fn get_stock_basic_info(&self, code: &str) -> SourceResult {
        self.query("query_stock_basic", vec![("code", code.to_string())])
            .await
    }

    async fn get_dividend_data(&self, code: &str, year: &str, year_type: &str) -> SourceResult {
        self.query(
            "query_dividend_data",
            vec![
                ("code", code.to_string()),
                ("year", year.to_string()),
                ("yearType", year_type.to_string()),
            ],
        )
        .await
    }

    async fn get_adjust_factor_data(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> SourceResult {
        self.query(
            "query_adjust_factor",
            vec![
                ("code", code.to_string()),
                ("start_date", start_date.to_string()),
                ("end_date", end_date.to_string()),
            ],
        )
        .await
    }

    async fn get_profit_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.quarterly("query_profit_data", code, year, quarter).await
    }

    async fn get_operation_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.quarterly("query_operation_data", code, year, quarter)
            .await
    }

    async fn get_growth_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.quarterly("query_growth_data", code, year, quarter).await
    }

    async fn get_balance_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.quarterly("query_balance_data", code, year, quarter)
            .await
    }

    async fn get_cash_flow_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.quarterly("query_cash_flow_data", code, year, quarter)
            .await
    }

    async fn get_dupont_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.quarterly("query_dupont_data", code, year, quarter).await
    }

    async fn get_performance_express_report(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> SourceResult {
        self.query(
            "query_performance_express_report",
            vec![
                ("code", code.to_string()),
                ("start_date", start_date.to_string()),
                ("end_date", end_date.to_string()),
            ],
        )
        .await
    }

    async fn get_forecast_report(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> SourceResult {
        self.query(
            "query_forecast_report",
            vec![
                ("code", code.to_string()),
                ("start_date", start_date.to_string()),
                ("end_date", end_date.to_string()),
            ],
        )
        .await
    }

    async fn get_sz50_stocks(&self, date: Option<&str>) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "date", date);
        self.query("query_sz50_stocks", params).await
    }

    async fn get_hs300_stocks(&self, date: Option<&str>) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "date", date);
        self.query("query_hs300_stocks", params).await
    }

    async fn get_zz500_stocks(&self, date: Option<&str>) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "date", date);
        self.query("query_zz500_stocks", params).await
    }

    async fn get_all_stock(&self, date: Option<&str>) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "day", date);
        self.query("query_all_stock", params).await
    }

    async fn get_stock_industry(&self, code: Option<&str>, date: Option<&str>) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "code", code);
        push_opt(&mut params, "date", date);
        self.query("query_stock_industry", params).await
    }

    async fn get_deposit_rate_data(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult {
        self.macro_range("query_deposit_rate_data", start_date, end_date)
            .await
    }

    async fn get_loan_rate_data(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult {
        self.macro_range("query_loan_rate_data", start_date, end_date)
            .await
    }

    async fn get_required_reserve_ratio_data(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        year_type: Option<&str>,
    ) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "start_date", start_date);
        push_opt(&mut params, "end_date", end_date);
        push_opt(&mut params, "yearType", year_type);
        self.query("query_required_reserve_ratio_data", params).await
    }

    async fn get_money_supply_data_month(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult {
        self.macro_range("query_money_supply_data_month", start_date, end_date)
            .await
    }

    async fn get_money_supply_data_year(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult {
        self.macro_range("query_money_supply_data_year", start_date, end_date)
            .await
    }

    async fn get_trade_dates(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult {
        self.macro_range("query_trade_dates", start_date, end_date)
            .await
    }
}

impl BaostockDataSource {
    /// Shared shape of the quarterly report queries.
    async fn quarterly(&self, api: &str, code: &str, year: i32, quarter: u8) -> SourceResult {
        self.query(
            api,
            vec![
                ("code", code.to_string()),
                ("year", year.to_string()),
                ("quarter", quarter.to_string()),
            ],
        )
        .await
    }

    /// Shared shape of the date-range-only queries.
    async fn macro_range(
        &self,
        api: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult {
        let mut params = Vec::new();
        push_opt(&mut params, "start_date", start_date);
        push_opt(&mut params, "end_date", end_date);
        self.query(api, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_response_parses_result_set() {
        let json = r#"{
            "error_code": "0",
            "error_msg": "success",
            "fields": ["date", "close"],
            "rows": [["2024-01-02", "10.5"]]
        }"#;
        let body: GatewayResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.error_code, "0");
        assert_eq!(body.fields, vec!["date", "close"]);
        assert_eq!(body.rows.len(), 1);
    }

    #[test]
    fn test_gateway_response_defaults() {
        let body: GatewayResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.error_code, "0");
        assert!(body.fields.is_empty());
        assert!(body.rows.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = DataSourceConfig {
            gateway_url: "http://localhost:8765/".to_string(),
            timeout_secs: 5,
        };
        let source = BaostockDataSource::new(&config).unwrap();
        assert_eq!(source.base_url, "http://localhost:8765");
    }

    #[test]
    fn test_push_opt() {
        let mut params: Vec<(&'static str, String)> = Vec::new();
        push_opt(&mut params, "date", None);
        assert!(params.is_empty());
        push_opt(&mut params, "date", Some("2024-01-02"));
        assert_eq!(params, vec![("date", "2024-01-02".to_string())]);
    }
}
