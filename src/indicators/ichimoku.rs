// ============================================================================
// Indicateur : Ichimoku
// ============================================================================
// Calcule le signal directionnel d'une série OHLC à une échelle de timeframe
// donnée. Fonction pure : mêmes entrées, même signal, aucun effet de bord.
//
// Les lignes sont des milieux de fourchette (max High + min Low) / 2 sur des
// fenêtres glissantes de 9, 26 et 52 chandelles multipliées par l'échelle.
// L'état « précédent » recule chaque fenêtre d'un pas de l'échelle (1, 4 ou
// 24 chandelles horaires).
//
// Une série vide ou trop courte ne produit jamais d'erreur : les fenêtres
// se referment sur les chandelles disponibles et le signal dégrade en Flat.
// ============================================================================

use tracing::trace;

use crate::models::{OHLCData, TimeframeScale, TrendSignal, OHLC};

/// Fenêtre de la ligne de conversion (Tenkan-sen), en chandelles de base
pub const CONVERSION_LINE_CANDLES: usize = 9;

/// Fenêtre de la ligne de base (Kijun-sen), en chandelles de base
pub const BASE_LINE_CANDLES: usize = 26;

/// Fenêtre du nuage côté lent (Senkou span B), en chandelles de base
pub const SSB_LINE_CANDLES: usize = 52;

/// Valeurs courantes et précédentes des lignes Ichimoku
///
/// Dérivé et éphémère : recalculé à chaque appel, jamais persisté.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IchimokuSnapshot {
    /// Ligne de conversion courante / précédente
    pub conversion: f64,
    pub prev_conversion: f64,

    /// Ligne de base courante / précédente
    pub base: f64,
    pub prev_base: f64,

    /// Senkou span A (milieu conversion/base) courante / précédente
    pub span_a: f64,
    pub prev_span_a: f64,

    /// Senkou span B (fourchette 52) courante / précédente
    pub span_b: f64,
    pub prev_span_b: f64,

    /// Dernière clôture de la série
    pub close: f64,
}

/// Milieu de fourchette sur une fenêtre : (max High + min Low) / 2
///
/// La fenêtre ne doit pas être vide ; les appelants garantissent len > 0.
fn midpoint(window: &[OHLC]) -> f64 {
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    for candle in window {
        high = high.max(candle.high);
        low = low.min(candle.low);
    }
    (high + low) / 2.0
}

/// Fenêtre courante : les `n` chandelles les plus récentes (clampée)
fn tail_window(candles: &[OHLC], n: usize) -> &[OHLC] {
    &candles[candles.len().saturating_sub(n)..]
}

/// Fenêtre précédente : `n` chandelles se terminant `step` pas plus tôt
///
/// Même sémantique que le couple tail/head de l'outillage d'analyse usuel :
/// quand la série est trop courte, le début se clampe à 0 et la fenêtre
/// recouvre ce qui existe.
fn offset_window(candles: &[OHLC], n: usize, step: usize) -> &[OHLC] {
    let start = candles.len().saturating_sub(n + step);
    let end = (start + n).min(candles.len());
    &candles[start..end]
}

/// Calcule le snapshot Ichimoku d'une série à une échelle donnée
///
/// Retourne None si la série est vide (pas de données, pas de snapshot).
pub fn snapshot(series: &OHLCData, scale: TimeframeScale) -> Option<IchimokuSnapshot> {
    let candles = series.candles.as_slice();
    let close = series.last_close()?;

    let m = scale.multiplier();
    let step = scale.step();

    let cl_window = CONVERSION_LINE_CANDLES * m;
    let bl_window = BASE_LINE_CANDLES * m;
    let ssb_window = SSB_LINE_CANDLES * m;

    let conversion = midpoint(tail_window(candles, cl_window));
    let base = midpoint(tail_window(candles, bl_window));
    let span_a = (conversion + base) / 2.0;
    let span_b = midpoint(tail_window(candles, ssb_window));

    let prev_conversion = midpoint(offset_window(candles, cl_window, step));
    let prev_base = midpoint(offset_window(candles, bl_window, step));
    let prev_span_a = (prev_conversion + prev_base) / 2.0;
    let prev_span_b = midpoint(offset_window(candles, ssb_window, step));

    Some(IchimokuSnapshot {
        conversion,
        prev_conversion,
        base,
        prev_base,
        span_a,
        prev_span_a,
        span_b,
        prev_span_b,
        close,
    })
}

/// Signal directionnel d'une série à une échelle donnée
///
/// Triple confirmation avant d'accepter une tendance :
/// 1. pente de la ligne de base (base courante vs précédente),
/// 2. position du prix et de la ligne de base par rapport au nuage,
/// 3. momentum du bord du nuage (span B), départagé par span A quand le
///    bord est plat.
///
/// Un seul croisement de ligne ne suffit pas : c'est ce qui évite les
/// faux signaux en marché sans direction.
pub fn signal(series: &OHLCData, scale: TimeframeScale) -> TrendSignal {
    let snap = match snapshot(series, scale) {
        Some(snap) => snap,
        None => return TrendSignal::Flat, // série vide : pas de données
    };

    trace!(
        symbol = %series.symbol,
        scale = %scale.label(),
        base = snap.base,
        prev_base = snap.prev_base,
        span_b = snap.span_b,
        close = snap.close,
        "Ichimoku snapshot"
    );

    let rising_edge = snap.span_b > snap.prev_span_b
        || (snap.span_b == snap.prev_span_b && snap.span_a > snap.prev_span_a);
    if snap.base > snap.prev_base && snap.base > snap.span_b && snap.close > snap.base && rising_edge
    {
        return TrendSignal::Up;
    }

    let falling_edge = snap.span_b < snap.prev_span_b
        || (snap.span_b == snap.prev_span_b && snap.span_a < snap.prev_span_a);
    if snap.base < snap.prev_base && snap.base < snap.span_b && snap.close < snap.base && falling_edge
    {
        return TrendSignal::Down;
    }

    TrendSignal::Flat
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Interval, Timeframe};
    use chrono::{Duration, TimeZone, Utc};

    /// Série synthétique : `len` chandelles horaires dont les prix évoluent
    /// linéairement de `start` à `end` (close collée au high en montée,
    /// au low en descente).
    fn linear_series(len: usize, start: f64, end: f64) -> OHLCData {
        let mut data = OHLCData::new(
            "TEST=X".to_string(),
            Interval::H1,
            Timeframe::TwoMonths,
        );
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let step = if len > 1 {
            (end - start) / (len - 1) as f64
        } else {
            0.0
        };
        for i in 0..len {
            let price = start + step * i as f64;
            let (high, low) = (price + 0.0001, price - 0.0001);
            let close = if end >= start { high } else { low };
            data.add_candle(OHLC::new(
                t0 + Duration::hours(i as i64),
                price,
                high,
                low,
                close,
                0,
            ));
        }
        data
    }

    #[test]
    fn test_empty_series_is_flat_at_every_scale() {
        let data = OHLCData::new("TEST=X".to_string(), Interval::H1, Timeframe::TwoMonths);
        for scale in TimeframeScale::ALL {
            assert_eq!(signal(&data, scale), TrendSignal::Flat);
        }
    }

    #[test]
    fn test_rising_series_is_up_at_every_scale() {
        // 1300 chandelles : remplit la fenêtre daily (52 × 24) plus son pas
        let data = linear_series(1300, 1.0000, 1.1300);
        for scale in TimeframeScale::ALL {
            assert_eq!(signal(&data, scale), TrendSignal::Up, "scale {:?}", scale);
        }
    }

    #[test]
    fn test_falling_series_is_down_at_every_scale() {
        let data = linear_series(1300, 1.1300, 1.0000);
        for scale in TimeframeScale::ALL {
            assert_eq!(signal(&data, scale), TrendSignal::Down, "scale {:?}", scale);
        }
    }

    #[test]
    fn test_signal_is_deterministic() {
        let data = linear_series(200, 1.0000, 1.0200);
        let first = snapshot(&data, TimeframeScale::H1).unwrap();
        let second = snapshot(&data, TimeframeScale::H1).unwrap();
        // Bit-identique : pure fonction des mêmes entrées
        assert_eq!(first, second);
        assert_eq!(
            signal(&data, TimeframeScale::H1),
            signal(&data, TimeframeScale::H1)
        );
    }

    #[test]
    fn test_sixty_rising_candles_scenario() {
        // 60 chandelles qui montent de 1.0000 à 1.0060 à l'échelle 1x :
        // lignes de queue plus hautes qu'un pas en arrière, clôture au-dessus
        // de la ligne de base, bord du nuage montant => Up.
        let data = linear_series(60, 1.0000, 1.0060);
        let snap = snapshot(&data, TimeframeScale::H1).unwrap();

        assert!(snap.conversion > snap.prev_conversion);
        assert!(snap.base > snap.prev_base);
        assert!(snap.close > snap.base);
        assert_eq!(signal(&data, TimeframeScale::H1), TrendSignal::Up);
    }

    #[test]
    fn test_short_series_degrades_without_error() {
        // 30 chandelles < fenêtre 52 : la fenêtre span B se clampe sur toute
        // la série des deux côtés (bord plat), c'est span A qui départage.
        let data = linear_series(30, 1.0000, 1.0030);
        let snap = snapshot(&data, TimeframeScale::H1).unwrap();

        assert_eq!(snap.span_b, snap.prev_span_b);
        assert!(snap.span_a > snap.prev_span_a);
        assert_eq!(signal(&data, TimeframeScale::H1), TrendSignal::Up);

        // Une seule chandelle : tout est plat, signal neutre
        let tiny = linear_series(1, 1.0000, 1.0000);
        assert_eq!(signal(&tiny, TimeframeScale::H1), TrendSignal::Flat);
    }

    #[test]
    fn test_ranging_series_is_flat() {
        // Prix constant : aucune pente, aucune position dominante
        let data = linear_series(120, 1.0500, 1.0500);
        assert_eq!(signal(&data, TimeframeScale::H1), TrendSignal::Flat);
    }

    #[test]
    fn test_window_clamping() {
        let data = linear_series(10, 1.0, 1.1);
        let candles = data.candles.as_slice();

        assert_eq!(tail_window(candles, 26).len(), 10);
        assert_eq!(tail_window(candles, 4).len(), 4);

        // Fenêtre précédente : se termine un pas plus tôt quand il y a assez
        // de chandelles, se clampe sinon
        assert_eq!(offset_window(candles, 4, 1).len(), 4);
        assert_eq!(offset_window(candles, 26, 1).len(), 10);
    }
}
