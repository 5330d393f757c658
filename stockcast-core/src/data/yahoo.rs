//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API and parses the response.
//! A single request per fetch: failures are returned to the caller as-is.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, DataProvider, FetchResult, PriceRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    auto_adjust: bool,
}

impl YahooProvider {
    pub fn new(auto_adjust: bool) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            auto_adjust,
        })
    }

    /// Build the chart API URL for a symbol and `[start, end)` date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true&events=div,splits"
        )
    }

    /// Parse the chart API response into price records.
    fn parse_response(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        resp: ChartResponse,
        auto_adjust: bool,
    ) -> Result<Vec<PriceRecord>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A known symbol with no trading days in range comes back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut records = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays come back with every field empty
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            let record = PriceRecord {
                date,
                open,
                high,
                low,
                close,
                volume: volume.unwrap_or(0),
            };

            records.push(match (auto_adjust, adj_close) {
                (true, Some(adj)) => adjust(record, adj),
                _ => record,
            });
        }

        if records.is_empty() {
            return Err(DataError::NoTradingDays {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }

        Ok(records)
    }
}

/// Rescale OHLC so that close equals the dividend/split adjusted close.
fn adjust(record: PriceRecord, adj_close: f64) -> PriceRecord {
    match record.close {
        Some(close) if close != 0.0 => {
            let ratio = adj_close / close;
            PriceRecord {
                open: record.open.map(|v| v * ratio),
                high: record.high.map(|v| v * ratio),
                low: record.low.map(|v| v * ratio),
                close: Some(adj_close),
                ..record
            }
        }
        _ => record,
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let url = Self::chart_url(symbol, start, end);
        debug!(%url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let records = Self::parse_response(symbol, start, end, chart, self.auto_adjust)?;
        info!(symbol, rows = records.len(), "fetched daily prices");

        Ok(FetchResult {
            symbol: symbol.to_string(),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str, auto_adjust: bool) -> Result<Vec<PriceRecord>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("AAPL", day(2024, 1, 1), day(2024, 1, 5), resp, auto_adjust)
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TWO_DAYS_AND_A_HOLIDAY: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, null, 102.0],
                        "high":   [105.0, null, 106.0],
                        "low":    [99.0,  null, 101.0],
                        "close":  [104.0, null, 105.0],
                        "volume": [1000,  null, 1200]
                    }],
                    "adjclose": [{ "adjclose": [52.0, null, 52.5] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_url_uses_midnight_bounds() {
        let url = YahooProvider::chart_url(
            "AAPL",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
        );
        assert!(url.contains("/chart/AAPL?"));
        assert!(url.contains("period1=1577836800"));
        assert!(url.contains("period2=1577923200"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn parse_skips_empty_rows() {
        let records = parse(TWO_DAYS_AND_A_HOLIDAY, false).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(records[0].close, Some(104.0));
        assert_eq!(records[1].volume, 1200);
    }

    #[test]
    fn auto_adjust_rescales_ohlc() {
        let records = parse(TWO_DAYS_AND_A_HOLIDAY, true).unwrap();
        assert_eq!(records[0].close, Some(52.0));
        assert_eq!(records[0].open, Some(50.0));
        assert_eq!(records[0].high, Some(52.5));
        assert_eq!(records[0].volume, 1000);
    }

    #[test]
    fn not_found_maps_to_symbol_error() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(
            parse(json, true),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn empty_range_is_not_a_missing_symbol() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        match parse(json, true) {
            Err(DataError::NoTradingDays { symbol, start, end }) => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(start, day(2024, 1, 1));
                assert_eq!(end, day(2024, 1, 5));
            }
            other => panic!("expected NoTradingDays, got {other:?}"),
        }
    }

    #[test]
    fn other_api_error_is_format_change() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        assert!(matches!(
            parse(json, true),
            Err(DataError::ResponseFormatChanged(_))
        ));
    }
}
