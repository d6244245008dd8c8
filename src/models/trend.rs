// ============================================================================
// Structures : TimeframeScale, TrendSignal, TickerTrend
// ============================================================================
// Vocabulaire du scan de tendance multi-timeframe.
//
// Les trois échelles (1h, 4h, 1d) sont calculées à partir de la même série
// horaire : une échelle n'est qu'un multiplicateur appliqué aux fenêtres de
// base de l'indicateur (9, 26, 52 chandelles) et un pas de décalage pour
// l'état précédent. Table de données plutôt que branches par timeframe.
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Échelle de timeframe dérivée de la série horaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeframeScale {
    /// 1 heure (échelle de base, ×1)
    H1,
    /// 4 heures (×4)
    H4,
    /// 1 jour (×24)
    D1,
}

impl TimeframeScale {
    /// Les échelles configurées, de la plus rapide à la plus lente
    pub const ALL: [TimeframeScale; 3] = [
        TimeframeScale::H1,
        TimeframeScale::H4,
        TimeframeScale::D1,
    ];

    /// Multiplicateur appliqué aux fenêtres de base (9, 26, 52)
    pub fn multiplier(&self) -> usize {
        match self {
            TimeframeScale::H1 => 1,
            TimeframeScale::H4 => 4,
            TimeframeScale::D1 => 24,
        }
    }

    /// Pas de décalage (en chandelles horaires) pour l'état précédent
    ///
    /// Une unité de l'échelle : 1 chandelle à 1h, 4 à 4h, 24 à 1d.
    pub fn step(&self) -> usize {
        self.multiplier()
    }

    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            TimeframeScale::H1 => "1h",
            TimeframeScale::H4 => "4h",
            TimeframeScale::D1 => "1d",
        }
    }
}

/// Signal directionnel produit par l'indicateur
///
/// L'ordre n'a pas de sens de magnitude : seul le test d'égalité compte
/// pour la confluence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendSignal {
    /// Tendance baissière
    Down,
    /// Pas de tendance exploitable (ranging)
    Flat,
    /// Tendance haussière
    Up,
}

impl TrendSignal {
    /// Valeur numérique pour la heatmap (-1, 0, 1)
    pub fn value(&self) -> i8 {
        match self {
            TrendSignal::Down => -1,
            TrendSignal::Flat => 0,
            TrendSignal::Up => 1,
        }
    }

    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            TrendSignal::Down => "Downtrend",
            TrendSignal::Flat => "Ranging",
            TrendSignal::Up => "Uptrend",
        }
    }
}

impl Default for TrendSignal {
    /// Un signal absent (échelle non calculée, série vide) vaut Flat
    fn default() -> Self {
        TrendSignal::Flat
    }
}

/// Verdict de tendance d'un instrument, toutes échelles confondues
///
/// Recréé entièrement à chaque cycle d'évaluation ; l'instance précédente
/// est simplement remplacée, jamais mutée.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerTrend {
    /// Symbole de l'instrument
    pub symbol: String,

    /// Signal par échelle de timeframe
    pub signals: HashMap<TimeframeScale, TrendSignal>,

    /// Verdict de confluence : signal 1h vivant et corroboré par 4h ou 1d
    pub trending: bool,
}

impl TickerTrend {
    /// Retourne le signal d'une échelle, Flat si elle est absente
    pub fn signal(&self, scale: TimeframeScale) -> TrendSignal {
        self.signals.get(&scale).copied().unwrap_or_default()
    }
}

/// Table de tendance d'un cycle de scan complet
///
/// Valeur possédée par l'appelant et retournée par la routine de scan :
/// pas d'état global de module, le cycle suivant en produit une nouvelle.
pub type TrendTable = Vec<TickerTrend>;

// ============================================================================
// Tests unitaires
// ============================================================================
