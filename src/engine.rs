// ============================================================================
// Structure : TrendEngine
// ============================================================================
// Orchestre un cycle de rafraîchissement : fetch (à travers le cache TTL),
// indicateurs, agrégation. C'est ici que les erreurs de transport meurent :
// une série en erreur devient une série vide, un snapshot en erreur devient
// un vecteur nul, et les calculs purs dégradent proprement derrière.
//
// Chaque cycle retourne une valeur possédée par l'appelant (table de
// tendance, série détail, vecteur de force) ; le moteur ne garde aucun
// état de cycle, seulement ses caches.
// ============================================================================

use std::collections::HashMap;

use tracing::{info, warn};

use crate::api::MarketData;
use crate::cache::{CacheKey, TtlCache};
use crate::config::Config;
use crate::indicators::confluence;
use crate::models::{Interval, OHLCData, Pair, TickerTrend, TimeframeScale, TrendTable};
use crate::strength::{self, BasePair, CurrencyStrength, PairQuote, StrengthSnapshot};

/// Moteur de rafraîchissement : provider + caches + calculs
pub struct TrendEngine<P: MarketData> {
    provider: P,
    config: Config,

    /// Séries OHLC (horaires du scan, minute de la vue détail)
    series_cache: TtlCache<OHLCData>,

    /// Records de tendance agrégés par instrument
    trend_cache: TtlCache<TickerTrend>,

    /// Vecteur de force des devises
    strength_cache: TtlCache<CurrencyStrength>,
}

impl<P: MarketData> TrendEngine<P> {
    /// Crée un moteur avec des caches vides
    pub fn new(provider: P, config: Config) -> Self {
        Self {
            provider,
            config,
            series_cache: TtlCache::new(),
            trend_cache: TtlCache::new(),
            strength_cache: TtlCache::new(),
        }
    }

    /// Accès aux réglages du moteur (cadences pour l'appelant)
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scan complet : un record de tendance par instrument
    ///
    /// La table retournée est propre à ce cycle ; le cycle suivant en
    /// produit une nouvelle et l'ancienne est simplement abandonnée.
    pub async fn scan<'a>(&self, pairs: impl IntoIterator<Item = &'a Pair>) -> TrendTable {
        let mut table = TrendTable::new();
        for pair in pairs {
            table.push(self.ticker_trend(pair.symbol).await);
        }

        let trending = table.iter().filter(|t| t.trending).count();
        info!(instruments = table.len(), trending, "Trend scan complete");
        table
    }

    /// Record de tendance d'un instrument, mémoïzé sous le TTL le plus long
    pub async fn ticker_trend(&self, symbol: &str) -> TickerTrend {
        let result = self
            .trend_cache
            .get_or_compute(
                CacheKey::new("ticker_trend", symbol),
                self.config.trend_ttl(),
                || async move {
                    let series = self.hourly_series(symbol).await;
                    // La même série horaire sert les trois échelles : les
                    // fenêtres multipliées font office de timeframe
                    let series_by_scale: HashMap<TimeframeScale, &OHLCData> =
                        TimeframeScale::ALL.iter().map(|&s| (s, &series)).collect();
                    Ok(confluence::evaluate(symbol, &series_by_scale))
                },
            )
            .await;

        match result {
            Ok(trend) => trend,
            // Inatteignable tant que le calcul ci-dessus est infaillible ;
            // on dégrade quand même en record neutre plutôt que de paniquer
            Err(e) => {
                warn!(symbol = %symbol, error = ?e, "Trend evaluation failed, degrading to flat");
                confluence::evaluate(symbol, &HashMap::new())
            }
        }
    }

    /// Série courte pour la vue détail, mémoïzée sous le TTL minute
    ///
    /// Une erreur de fetch donne une série vide : la vue affiche « pas de
    /// données », le moteur ne propage rien.
    pub async fn detail_series(&self, symbol: &str) -> OHLCData {
        let interval = self.config.detail_interval;
        let result = self
            .series_cache
            .get_or_compute(
                CacheKey::new("detail_series", format!("{}:{}", symbol, interval.label())),
                self.config.minute_ttl(),
                || self.provider.fetch(symbol, interval, interval.default_timeframe()),
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(symbol = %symbol, error = ?e, "Detail fetch failed, returning empty series");
            OHLCData::with_interval(symbol.to_string(), interval)
        })
    }

    /// Vecteur de force des devises, mémoïzé sous le TTL le plus court
    pub async fn currency_strength(&self) -> CurrencyStrength {
        let result = self
            .strength_cache
            .get_or_compute(
                CacheKey::new("currency_strength", ""),
                self.config.strength_ttl(),
                || async move { Ok(self.compute_strength().await) },
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(error = ?e, "Strength evaluation failed, returning zero vector");
            CurrencyStrength::zeros()
        })
    }

    /// Série horaire d'un instrument, mémoïzée sous le TTL horaire
    async fn hourly_series(&self, symbol: &str) -> OHLCData {
        let result = self
            .series_cache
            .get_or_compute(
                CacheKey::new("hourly_series", symbol),
                self.config.hourly_ttl(),
                || self.provider.fetch(symbol, Interval::H1, Interval::H1.default_timeframe()),
            )
            .await;

        result.unwrap_or_else(|e| {
            warn!(symbol = %symbol, error = ?e, "Hourly fetch failed, returning empty series");
            OHLCData::with_interval(symbol.to_string(), Interval::H1)
        })
    }

    /// Reconstruit le snapshot du panier et évalue le vecteur de force
    ///
    /// Une paire de base qui ne livre pas ses deux derniers points est
    /// simplement absente du snapshot ; l'évaluation rend alors un vecteur
    /// entièrement nul (politique « tout ou rien » du panier).
    async fn compute_strength(&self) -> CurrencyStrength {
        let mut snapshot = StrengthSnapshot::new();
        for pair in BasePair::ALL {
            let series = match self
                .provider
                .fetch(pair.symbol(), Interval::M5, Interval::M5.default_timeframe())
                .await
            {
                Ok(series) => series,
                Err(e) => {
                    warn!(pair = pair.symbol(), error = ?e, "Strength fetch failed");
                    continue;
                }
            };

            match series.last_two_closes() {
                Some((prev, now)) => {
                    snapshot.insert(pair, PairQuote { prev, now });
                }
                None => {
                    warn!(pair = pair.symbol(), candles = series.len(), "Not enough candles for strength");
                }
            }
        }

        strength::evaluate(&snapshot)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    use crate::models::{Timeframe, TrendSignal, MAJOR_PAIRS, OHLC};

    /// Provider de test : sert la même forme de série à tous les symboles,
    /// compte les fetchs, peut échouer systématiquement
    struct StubProvider {
        rising: bool,
        failing: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn rising() -> Self {
            Self { rising: true, failing: false, calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { rising: false, failing: true, calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn series(&self, symbol: &str, interval: Interval, timeframe: Timeframe) -> OHLCData {
            let mut data = OHLCData::new(symbol.to_string(), interval, timeframe);
            let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let len = 1300usize;
            for i in 0..len {
                let step = if self.rising { 0.0001 } else { -0.0001 };
                let price = 1.0 + step * i as f64;
                data.add_candle(OHLC::new(
                    t0 + ChronoDuration::hours(i as i64),
                    price,
                    price + 0.00005,
                    price - 0.00005,
                    price + 0.00005,
                    0,
                ));
            }
            data
        }
    }

    #[async_trait]
    impl MarketData for StubProvider {
        async fn fetch(
            &self,
            symbol: &str,
            interval: Interval,
            timeframe: Timeframe,
        ) -> Result<OHLCData> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                anyhow::bail!("provider unavailable");
            }
            Ok(self.series(symbol, interval, timeframe))
        }
    }

    fn test_config() -> Config {
        Config {
            trend_ttl_secs: 60,
            hourly_ttl_secs: 60,
            minute_ttl_secs: 60,
            strength_ttl_secs: 60,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_scan_produces_one_record_per_pair() {
        let engine = TrendEngine::new(StubProvider::rising(), test_config());
        let table = engine.scan(MAJOR_PAIRS.iter()).await;

        assert_eq!(table.len(), MAJOR_PAIRS.len());
        for trend in &table {
            // Série montante : toutes les échelles Up, confluence acquise
            assert_eq!(trend.signal(TimeframeScale::H1), TrendSignal::Up);
            assert_eq!(trend.signal(TimeframeScale::D1), TrendSignal::Up);
            assert!(trend.trending);
        }
    }

    #[tokio::test]
    async fn test_scan_within_ttl_fetches_once_per_pair() {
        let engine = TrendEngine::new(StubProvider::rising(), test_config());

        engine.scan(MAJOR_PAIRS.iter()).await;
        let after_first = engine.provider.calls();
        assert_eq!(after_first, MAJOR_PAIRS.len());

        // Deuxième scan sous TTL : tout sort du cache
        engine.scan(MAJOR_PAIRS.iter()).await;
        assert_eq!(engine.provider.calls(), after_first);
    }

    #[tokio::test]
    async fn test_failing_provider_degrades_to_flat() {
        let engine = TrendEngine::new(StubProvider::failing(), test_config());
        let table = engine.scan(MAJOR_PAIRS[..2].iter()).await;

        for trend in &table {
            for scale in TimeframeScale::ALL {
                assert_eq!(trend.signal(scale), TrendSignal::Flat);
            }
            assert!(!trend.trending);
        }
    }

    #[tokio::test]
    async fn test_failing_provider_gives_empty_detail_series() {
        let engine = TrendEngine::new(StubProvider::failing(), test_config());
        let series = engine.detail_series("EURUSD=X").await;
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_failing_provider_gives_zero_strength() {
        let engine = TrendEngine::new(StubProvider::failing(), test_config());
        let vector = engine.currency_strength().await;
        for currency in crate::strength::Currency::ALL {
            assert_eq!(vector.get(currency), 0.0);
        }
    }

    #[tokio::test]
    async fn test_strength_is_cached_under_its_ttl() {
        let engine = TrendEngine::new(StubProvider::rising(), test_config());

        engine.currency_strength().await;
        let after_first = engine.provider.calls();
        assert_eq!(after_first, BasePair::ALL.len());

        engine.currency_strength().await;
        assert_eq!(engine.provider.calls(), after_first);
    }

    #[tokio::test]
    async fn test_detail_series_comes_from_provider() {
        let engine = TrendEngine::new(StubProvider::rising(), test_config());
        let series = engine.detail_series("EURUSD=X").await;

        assert!(!series.is_empty());
        assert_eq!(series.symbol, "EURUSD=X");
        assert_eq!(engine.provider.calls(), 1);

        // Sous TTL : pas de deuxième fetch
        engine.detail_series("EURUSD=X").await;
        assert_eq!(engine.provider.calls(), 1);
    }
}
