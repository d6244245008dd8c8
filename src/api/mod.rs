// ============================================================================
// Module : api
// ============================================================================
// La frontière avec les sources de données de marché. Le moteur ne connaît
// que le trait MarketData ; Yahoo Finance en est l'implémentation par
// défaut. Une erreur de transport reste de ce côté de la frontière : le
// moteur la traduit en « pas de données » et dégrade, il ne la propage
// jamais dans les types de tendance ou de force.
// ============================================================================

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Interval, OHLCData, Timeframe};

pub mod yahoo;  // Client API Yahoo Finance

// Re-export du client principal
pub use yahoo::YahooClient;

/// Provider de séries OHLC
///
/// `fetch` est faillible et peut aussi retourner une série vide : les deux
/// cas signifient « pas de données » pour l'appelant.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Récupère la série d'un symbole à une granularité et un lookback donnés
    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        timeframe: Timeframe,
    ) -> Result<OHLCData>;
}
