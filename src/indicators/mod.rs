// ============================================================================
// Module : indicators
// ============================================================================
// Le calcul de tendance proprement dit : l'indicateur Ichimoku par échelle
// de timeframe, et la règle de confluence qui agrège les échelles en un
// verdict par instrument. Tout est pur et synchrone.
// ============================================================================

pub mod confluence;  // Agrégation multi-timeframe
pub mod ichimoku;    // Lignes Ichimoku et signal directionnel

// Re-export des entrées principales
pub use confluence::evaluate;
pub use ichimoku::{signal, IchimokuSnapshot};
