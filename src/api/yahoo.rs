// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère les séries OHLC depuis l'API chart de Yahoo Finance.
//
// Les structures wire matchent exactement le JSON retourné pour que serde
// désérialise automatiquement. Les chandelles incomplètes (un champ de
// cotation absent) sont sautées au parsing plutôt que d'invalider la série.
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::api::MarketData;
use crate::models::{Interval, OHLCData, Timeframe, OHLC};

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================

/// Réponse complète de l'API chart
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

/// Données OHLCV (Open, High, Low, Close, Volume)
///
/// Chaque champ est doublement optionnel : l'array entier peut manquer, et
/// chaque position peut contenir null.
#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

// ============================================================================
// Client
// ============================================================================

/// Client de l'API chart de Yahoo Finance
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
}

impl YahooClient {
    /// Crée le client HTTP partagé par tous les fetchs
    ///
    /// Le User-Agent navigateur évite le blocage des clients anonymes par
    /// Yahoo.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .context("Échec de la création du client HTTP")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MarketData for YahooClient {
    #[instrument(skip(self, interval, timeframe), fields(interval = %interval.label()))]
    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        timeframe: Timeframe,
    ) -> Result<OHLCData> {
        let url = build_yahoo_url(symbol, interval, timeframe);
        debug!(url = %url, timeframe = %timeframe.label(), "Fetching from Yahoo Finance");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Échec de la requête HTTP vers Yahoo Finance")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Yahoo Finance a retourné une erreur : HTTP {}", status);
        }

        let yahoo_response: YahooResponse = response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse Yahoo")?;

        let data = parse_yahoo_response(yahoo_response, symbol, interval, timeframe)?;
        debug!(candles = data.len(), "Fetched ticker data");
        Ok(data)
    }
}

/// Construit l'URL de l'API chart
///
/// Le lookback se traduit en couple de timestamps Unix [period1, period2].
fn build_yahoo_url(symbol: &str, interval: Interval, timeframe: Timeframe) -> String {
    let now = chrono::Utc::now().timestamp();
    let days_ago = timeframe.to_days() as i64;
    let period1 = now - days_ago * 24 * 60 * 60;

    format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{}?interval={}&period1={}&period2={}",
        symbol,
        interval.to_yahoo_string(),
        period1,
        now
    )
}

/// Convertit la réponse Yahoo en série OHLC
///
/// Un résultat absent ou vide donne une série vide, pas une erreur : pour
/// le moteur c'est le même « pas de données » qu'un symbole sans cotation.
fn parse_yahoo_response(
    yahoo_response: YahooResponse,
    symbol: &str,
    interval: Interval,
    timeframe: Timeframe,
) -> Result<OHLCData> {
    let mut data = OHLCData::new(symbol.to_string(), interval, timeframe);

    if let Some(error) = yahoo_response.chart.error {
        warn!(symbol = %symbol, error = %error, "Yahoo chart error, returning empty series");
        return Ok(data);
    }

    let result = match yahoo_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    {
        Some(result) => result,
        None => {
            warn!(symbol = %symbol, "No chart result for symbol, returning empty series");
            return Ok(data);
        }
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .context("Pas de données OHLC dans la réponse")?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut skipped = 0usize;
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let fields = (
            opens.get(i).and_then(|&v| v),
            highs.get(i).and_then(|&v| v),
            lows.get(i).and_then(|&v| v),
            closes.get(i).and_then(|&v| v),
        );
        let (open, high, low, close) = match fields {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => {
                // Chandelle incomplète : on saute sans invalider la série
                skipped += 1;
                continue;
            }
        };
        let volume = volumes.get(i).and_then(|&v| v).unwrap_or(0);

        let datetime = DateTime::from_timestamp(timestamp, 0).context("Timestamp invalide")?;
        data.add_candle(OHLC::new(datetime, open, high, low, close, volume));
    }

    if skipped > 0 {
        warn!(
            symbol = %symbol,
            skipped,
            total = timestamps.len(),
            "Skipped candles with missing data"
        );
    }

    Ok(data)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_yahoo_url() {
        let url = build_yahoo_url("EURUSD=X", Interval::H1, Timeframe::TwoMonths);
        assert!(url.contains("EURUSD=X"));
        assert!(url.contains("interval=1h"));
        assert!(url.contains("yahoo.com"));
    }

    #[test]
    fn test_parse_skips_incomplete_candles() {
        let raw = serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700003600, 1700007200],
                    "indicators": {
                        "quote": [{
                            "open":   [1.08, null, 1.09],
                            "high":   [1.09, 1.10, 1.10],
                            "low":    [1.07, 1.08, 1.08],
                            "close":  [1.085, 1.09, 1.095],
                            "volume": [0, 0, null]
                        }]
                    }
                }],
                "error": null
            }
        });
        let response: YahooResponse = serde_json::from_value(raw).unwrap();
        let data =
            parse_yahoo_response(response, "EURUSD=X", Interval::H1, Timeframe::TwoMonths)
                .unwrap();

        // La chandelle du milieu (open null) est sautée
        assert_eq!(data.len(), 2);
        assert_eq!(data.last_close(), Some(1.095));
    }

    #[test]
    fn test_parse_chart_error_gives_empty_series() {
        let raw = serde_json::json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found" }
            }
        });
        let response: YahooResponse = serde_json::from_value(raw).unwrap();
        let data =
            parse_yahoo_response(response, "XXXYYY=X", Interval::H1, Timeframe::TwoMonths)
                .unwrap();

        assert!(data.is_empty());
    }

    #[test]
    fn test_parse_missing_result_gives_empty_series() {
        let raw = serde_json::json!({
            "chart": { "result": [], "error": null }
        });
        let response: YahooResponse = serde_json::from_value(raw).unwrap();
        let data = parse_yahoo_response(response, "EURUSD=X", Interval::M5, Timeframe::OneDay)
            .unwrap();

        assert!(data.is_empty());
    }
}
