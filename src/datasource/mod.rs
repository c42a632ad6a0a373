//! Financial data provider abstraction.
//!
//! The server talks to exactly one provider through the
//! [`FinancialDataSource`] trait; every registered tool shares one handle to
//! it. The concrete adapter ([`BaostockDataSource`]) is swappable behind the
//! trait, which is what the tool-registration tests rely on.

mod baostock;
mod frame;

pub use baostock::BaostockDataSource;
pub use frame::DataFrame;

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a data provider.
///
/// These propagate unmodified to the calling tool, which turns them into
/// tool-level error results for the MCP client.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// The query parameters were rejected before or by the provider.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The provider has no data for a well-formed query.
    #[error("no data available: {0}")]
    DataUnavailable(String),

    /// The provider reported an error of its own.
    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },

    /// Transport-level failure reaching the provider.
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for DataSourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result alias for provider calls.
pub type SourceResult = Result<DataFrame, DataSourceError>;

/// Capability set of the financial data backend.
///
/// One method per data-fetch capability; all take validated identifiers and
/// return a [`DataFrame`] or a [`DataSourceError`]. Implementations must be
/// safe for concurrent read access since the HTTP transport serves parallel
/// requests through one shared handle.
#[async_trait]
pub trait FinancialDataSource: Send + Sync {
    // --- Stock market ---

    /// Historical K-line (OHLCV) data for one stock.
    ///
    /// `frequency` is a baostock frequency code (`d`/`w`/`m`/`5`/`15`/`30`/
    /// `60`); `adjust_flag` selects price adjustment (`1` post, `2` pre,
    /// `3` none). `fields` limits the returned columns when present.
    async fn get_historical_k_data(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
        frequency: &str,
        adjust_flag: &str,
        fields: Option<&[String]>,
    ) -> SourceResult;

    /// Basic listing information (name, IPO date, status) for one stock.
    async fn get_stock_basic_info(&self, code: &str) -> SourceResult;

    /// Dividend records for a stock in one year.
    ///
    /// `year_type` is `report` (announcement year) or `operate`
    /// (ex-dividend year).
    async fn get_dividend_data(&self, code: &str, year: &str, year_type: &str) -> SourceResult;

    /// Price adjustment factors over a date range.
    async fn get_adjust_factor_data(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> SourceResult;

    // --- Financial reports (quarterly) ---

    /// Quarterly profitability metrics (ROE, net margin, EPS).
    async fn get_profit_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult;

    /// Quarterly operating-efficiency metrics (turnover ratios).
    async fn get_operation_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult;

    /// Quarterly growth metrics (YoY revenue/profit growth).
    async fn get_growth_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult;

    /// Quarterly balance-sheet metrics (liquidity, leverage).
    async fn get_balance_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult;

    /// Quarterly cash-flow metrics.
    async fn get_cash_flow_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult;

    /// Quarterly DuPont decomposition metrics.
    async fn get_dupont_data(&self, code: &str, year: i32, quarter: u8) -> SourceResult;

    /// Performance express reports published in a date range.
    async fn get_performance_express_report(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> SourceResult;

    /// Performance forecast reports published in a date range.
    async fn get_forecast_report(
        &self,
        code: &str,
        start_date: &str,
        end_date: &str,
    ) -> SourceResult;

    // --- Indices ---

    /// SZSE 50 index constituents as of `date` (latest when `None`).
    async fn get_sz50_stocks(&self, date: Option<&str>) -> SourceResult;

    /// CSI 300 index constituents as of `date` (latest when `None`).
    async fn get_hs300_stocks(&self, date: Option<&str>) -> SourceResult;

    /// CSI 500 index constituents as of `date` (latest when `None`).
    async fn get_zz500_stocks(&self, date: Option<&str>) -> SourceResult;

    // --- Market overview ---

    /// All listed stocks and their trading status on one day.
    async fn get_all_stock(&self, date: Option<&str>) -> SourceResult;

    /// Industry classification, optionally filtered to one stock.
    async fn get_stock_industry(&self, code: Option<&str>, date: Option<&str>) -> SourceResult;

    // --- Macroeconomic series ---

    /// Benchmark deposit rates over a date range.
    async fn get_deposit_rate_data(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult;

    /// Benchmark loan rates over a date range.
    async fn get_loan_rate_data(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult;

    /// Required reserve ratios over a date range.
    ///
    /// `year_type` selects the date axis: `0` announcement date, `1`
    /// effective date.
    async fn get_required_reserve_ratio_data(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
        year_type: Option<&str>,
    ) -> SourceResult;

    /// Monthly money supply figures (M0/M1/M2).
    async fn get_money_supply_data_month(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult;

    /// Year-end money supply figures (M0/M1/M2).
    async fn get_money_supply_data_year(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult;

    // --- Trading calendar ---

    /// Trading-calendar rows (`calendar_date`, `is_trading_day`) over a range.
    async fn get_trade_dates(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> SourceResult;
}
