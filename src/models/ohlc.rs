// ============================================================================
// Structure : OHLC (Open, High, Low, Close)
// ============================================================================
// Représente les données d'une chandelle japonaise (candlestick) et les
// séries de chandelles sur lesquelles tournent les indicateurs.
//
// Une série est immuable une fois parsée : le moteur ne modifie jamais une
// OHLCData après sa création, il en recrée une à chaque fetch.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Période de lookback pour les données OHLC
///
/// CONCEPT : Timeframe vs Interval
/// - Timeframe : profondeur d'historique demandée à l'API (1 jour, 60 jours)
/// - Interval : granularité des chandelles (5m, 1h)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1 jour de données
    OneDay,
    /// 5 jours de données
    FiveDay,
    /// 2 mois (60 jours) — couvre la fenêtre daily de 52 jours plus un pas
    TwoMonths,
}

impl Timeframe {
    /// Retourne le nombre de jours correspondant
    pub fn to_days(&self) -> u32 {
        match self {
            Timeframe::OneDay => 1,
            Timeframe::FiveDay => 5,
            Timeframe::TwoMonths => 60,
        }
    }

    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::FiveDay => "5D",
            Timeframe::TwoMonths => "2M",
        }
    }
}

/// Intervalle de temps entre les chandelles
///
/// Seules les granularités réellement demandées à l'API sont listées :
/// les chandelles 5 à 30 minutes pour la vue détail et le snapshot de force,
/// les chandelles 1 heure pour le scan de tendance (les échelles 4h et 1d
/// sont dérivées de la série horaire, voir `TimeframeScale`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// 5 minutes
    M5,
    /// 15 minutes
    M15,
    /// 30 minutes
    M30,
    /// 1 heure
    H1,
}

impl Interval {
    /// Convertit l'intervalle en string pour l'API Yahoo Finance
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
        }
    }

    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        self.to_yahoo_string()
    }

    /// Retourne le lookback par défaut pour cet intervalle
    ///
    /// Yahoo Finance limite l'intraday fin (< 1h) à quelques jours ; la série
    /// horaire doit couvrir 52 jours pour remplir la fenêtre daily (52 × 24
    /// chandelles) plus le pas de décalage de l'état précédent.
    pub fn default_timeframe(&self) -> Timeframe {
        match self {
            Interval::M5 => Timeframe::OneDay,
            Interval::M15 => Timeframe::FiveDay,
            Interval::M30 => Timeframe::FiveDay,
            Interval::H1 => Timeframe::TwoMonths,
        }
    }
}

impl Default for Interval {
    /// Intervalle par défaut de la vue détail : 5 minutes (le graphique
    /// « 5 min chart » du dashboard)
    fn default() -> Self {
        Interval::M5
    }
}

/// Une chandelle japonaise (candlestick)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OHLC {
    /// Timestamp de la chandelle
    pub timestamp: DateTime<Utc>,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé
    pub volume: u64,
}

impl OHLC {
    /// Constructeur : crée une nouvelle chandelle OHLC
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Collection de chandelles OHLC pour un instrument
///
/// Les chandelles sont triées par timestamp croissant. Une série vide est
/// valide : elle signifie « pas de données » et les indicateurs dégradent
/// en signal neutre plutôt que d'échouer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OHLCData {
    /// Symbole de l'instrument
    pub symbol: String,

    /// Intervalle entre les chandelles (5m, 1h, etc.)
    pub interval: Interval,

    /// Profondeur d'historique couverte
    pub timeframe: Timeframe,

    /// Liste des chandelles, triées par timestamp croissant
    pub candles: Vec<OHLC>,
}

impl OHLCData {
    /// Crée une nouvelle collection OHLC vide
    pub fn new(symbol: String, interval: Interval, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            interval,
            timeframe,
            candles: Vec::new(),
        }
    }

    /// Crée une collection vide avec le lookback par défaut de l'intervalle
    pub fn with_interval(symbol: String, interval: Interval) -> Self {
        let timeframe = interval.default_timeframe();
        Self::new(symbol, interval, timeframe)
    }

    /// Ajoute une chandelle
    pub fn add_candle(&mut self, candle: OHLC) {
        self.candles.push(candle);
    }

    /// Retourne le nombre de chandelles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Vérifie si la collection est vide
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Retourne la chandelle la plus récente
    pub fn last(&self) -> Option<&OHLC> {
        self.candles.last()
    }

    /// Retourne le prix de clôture le plus récent
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// Retourne les deux dernières clôtures (précédente, courante)
    ///
    /// Utilisé par le snapshot de force des devises : le rendement d'une
    /// paire se calcule entre ces deux points.
    pub fn last_two_closes(&self) -> Option<(f64, f64)> {
        if self.candles.len() < 2 {
            return None;
        }
        let prev = self.candles[self.candles.len() - 2].close;
        let now = self.candles[self.candles.len() - 1].close;
        Some((prev, now))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
