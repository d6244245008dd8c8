// ============================================================================
// Structure : Pair
// ============================================================================
// L'univers d'instruments scannés est fermé et connu à la compilation :
// les paires majeures (plus or et argent) et les paires croisées. Chaque
// instrument associe un label d'affichage ("EUR/USD") au symbole compris
// par le provider ("EURUSD=X").
// ============================================================================

use serde::Serialize;

/// Un instrument affichable : label lisible + symbole provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pair {
    /// Label d'affichage (ex: "EUR/USD")
    pub label: &'static str,

    /// Symbole pour l'API Yahoo Finance (ex: "EURUSD=X")
    pub symbol: &'static str,
}

impl Pair {
    const fn new(label: &'static str, symbol: &'static str) -> Self {
        Self { label, symbol }
    }
}

/// Paires majeures (plus les métaux), affichées par défaut
pub const MAJOR_PAIRS: &[Pair] = &[
    Pair::new("EUR/USD", "EURUSD=X"),
    Pair::new("USD/JPY", "USDJPY=X"),
    Pair::new("GBP/USD", "GBPUSD=X"),
    Pair::new("USD/CHF", "USDCHF=X"),
    Pair::new("AUD/USD", "AUDUSD=X"),
    Pair::new("USD/CAD", "USDCAD=X"),
    Pair::new("NZD/USD", "NZDUSD=X"),
    Pair::new("Gold", "GC=F"),
    Pair::new("Silver", "SI=F"),
];

/// Paires croisées, optionnelles dans l'affichage mais toutes scannées
pub const OTHER_PAIRS: &[Pair] = &[
    // Paires EUR
    Pair::new("EUR/GBP", "EURGBP=X"),
    Pair::new("EUR/AUD", "EURAUD=X"),
    Pair::new("EUR/NZD", "EURNZD=X"),
    Pair::new("EUR/CAD", "EURCAD=X"),
    Pair::new("EUR/CHF", "EURCHF=X"),
    Pair::new("EUR/JPY", "EURJPY=X"),
    // Paires GBP
    Pair::new("GBP/JPY", "GBPJPY=X"),
    Pair::new("GBP/AUD", "GBPAUD=X"),
    Pair::new("GBP/NZD", "GBPNZD=X"),
    Pair::new("GBP/CAD", "GBPCAD=X"),
    Pair::new("GBP/CHF", "GBPCHF=X"),
    // Paires AUD
    Pair::new("AUD/JPY", "AUDJPY=X"),
    Pair::new("AUD/NZD", "AUDNZD=X"),
    Pair::new("AUD/CAD", "AUDCAD=X"),
    Pair::new("AUD/CHF", "AUDCHF=X"),
    // Paires NZD
    Pair::new("NZD/JPY", "NZDJPY=X"),
    Pair::new("NZD/CAD", "NZDCAD=X"),
    Pair::new("NZD/CHF", "NZDCHF=X"),
    // Paires CAD
    Pair::new("CAD/JPY", "CADJPY=X"),
    Pair::new("CAD/CHF", "CADCHF=X"),
    // Paires CHF
    Pair::new("CHF/JPY", "CHFJPY=X"),
];

/// Itère sur l'univers complet (majeures puis croisées)
pub fn all_pairs() -> impl Iterator<Item = &'static Pair> {
    MAJOR_PAIRS.iter().chain(OTHER_PAIRS.iter())
}

/// Retrouve le label d'affichage d'un symbole provider
pub fn label_for(symbol: &str) -> Option<&'static str> {
    all_pairs().find(|p| p.symbol == symbol).map(|p| p.label)
}

/// Retrouve le symbole provider d'un label d'affichage
pub fn symbol_for(label: &str) -> Option<&'static str> {
    all_pairs().find(|p| p.label == label).map(|p| p.symbol)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_size() {
        assert_eq!(MAJOR_PAIRS.len(), 9);
        assert_eq!(OTHER_PAIRS.len(), 21);
        assert_eq!(all_pairs().count(), 30);
    }

    #[test]
    fn test_label_symbol_roundtrip() {
        assert_eq!(label_for("EURUSD=X"), Some("EUR/USD"));
        assert_eq!(symbol_for("EUR/USD"), Some("EURUSD=X"));
        assert_eq!(label_for("GC=F"), Some("Gold"));
        assert_eq!(label_for("XXXYYY=X"), None);
    }

    #[test]
    fn test_symbols_are_unique() {
        let mut symbols: Vec<_> = all_pairs().map(|p| p.symbol).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 30);
    }
}
