// ============================================================================
// Indicateur : confluence multi-timeframe
// ============================================================================
// Réduit les signaux par échelle d'un instrument en un seul verdict
// « trending ». La règle privilégie la précision : peu de faux positifs,
// quitte à rater des tendances naissantes.
// ============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::indicators::ichimoku;
use crate::models::{OHLCData, TickerTrend, TimeframeScale, TrendSignal};

/// Évalue un instrument : un signal par échelle configurée, puis confluence
///
/// `series_by_scale` associe chaque échelle à sa série ; une échelle absente
/// compte pour Flat. En pratique le moteur passe la même série horaire aux
/// trois échelles, les fenêtres multipliées faisant office de timeframe.
pub fn evaluate(
    symbol: &str,
    series_by_scale: &HashMap<TimeframeScale, &OHLCData>,
) -> TickerTrend {
    let mut signals = HashMap::with_capacity(TimeframeScale::ALL.len());
    for scale in TimeframeScale::ALL {
        let signal = series_by_scale
            .get(&scale)
            .map(|series| ichimoku::signal(series, scale))
            .unwrap_or_default();
        signals.insert(scale, signal);
    }

    let trending = is_trending(&signals);

    debug!(
        symbol = %symbol,
        h1 = ?signals[&TimeframeScale::H1],
        h4 = ?signals[&TimeframeScale::H4],
        d1 = ?signals[&TimeframeScale::D1],
        trending,
        "Trend evaluated"
    );

    TickerTrend {
        symbol: symbol.to_string(),
        signals,
        trending,
    }
}

/// Règle de confluence : le timeframe rapide doit montrer un signal vivant,
/// corroboré par au moins un timeframe lent
///
/// trending = (1h != Flat) && (1d == 1h || 4h == 1h)
fn is_trending(signals: &HashMap<TimeframeScale, TrendSignal>) -> bool {
    let h1 = signals
        .get(&TimeframeScale::H1)
        .copied()
        .unwrap_or_default();
    if h1 == TrendSignal::Flat {
        return false;
    }

    let h4 = signals
        .get(&TimeframeScale::H4)
        .copied()
        .unwrap_or_default();
    let d1 = signals
        .get(&TimeframeScale::D1)
        .copied()
        .unwrap_or_default();

    d1 == h1 || h4 == h1
}

// ============================================================================
// Tests unitaires
// ============================================================================
