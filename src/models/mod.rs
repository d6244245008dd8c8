// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod ohlc;   // Chandelles et séries OHLC
pub mod pair;   // Univers d'instruments (majeures + croisées)
pub mod trend;  // Échelles, signaux et verdicts de tendance

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazytrend::models::ohlc::OHLCData;
// On peut faire : use lazytrend::models::OHLCData;
pub use ohlc::{Interval, OHLCData, Timeframe, OHLC};
pub use pair::{all_pairs, label_for, symbol_for, Pair, MAJOR_PAIRS, OTHER_PAIRS};
pub use trend::{TickerTrend, TimeframeScale, TrendSignal, TrendTable};
