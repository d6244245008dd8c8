// ============================================================================
// Calcul : force relative des devises
// ============================================================================
// Mesure la force de chacune des 8 devises du panier à partir d'un snapshot
// de deux points de prix (précédent, courant) sur les 7 paires de base
// cotées contre USD.
//
// Les 21 paires croisées absentes du panier sont synthétisées à partir des
// paires de base : produit quand les deux jambes cotent l'USD en sens
// opposés (EURJPY = EURUSD × USDJPY), ratio quand elles partagent la même
// devise de cotation ou de base (EURGBP = EURUSD / GBPUSD).
//
// Le rendement d'une paire est un log-return en unités proches du point de
// base : ln(now / prev) × 10000. Un prix précédent nul rend le rendement
// indéfini ; la contribution est alors exclue de la somme, jamais NaN.
//
// Le score d'une devise est la somme signée de ses 7 paires (+ si elle est
// la base, - si elle est la cotation), divisée par 7. La table PAIR_BASKET
// encode tout le panier : pas de cas particulier par paire.
// ============================================================================

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Taille du panier : nombre de paires par devise, et normalisation du score
const PAIRS_COUNT: f64 = 7.0;

/// Les 8 devises du panier, ensemble fermé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Eur,
    Usd,
    Jpy,
    Chf,
    Gbp,
    Aud,
    Cad,
    Nzd,
}

impl Currency {
    /// Toutes les devises du panier
    pub const ALL: [Currency; 8] = [
        Currency::Eur,
        Currency::Usd,
        Currency::Jpy,
        Currency::Chf,
        Currency::Gbp,
        Currency::Aud,
        Currency::Cad,
        Currency::Nzd,
    ];

    /// Code ISO à 3 lettres
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Jpy => "JPY",
            Currency::Chf => "CHF",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Nzd => "NZD",
        }
    }
}

/// Les 7 paires de base observées directement chez le provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasePair {
    UsdCad,
    UsdChf,
    UsdJpy,
    AudUsd,
    EurUsd,
    GbpUsd,
    NzdUsd,
}

impl BasePair {
    /// Toutes les paires de base du panier
    pub const ALL: [BasePair; 7] = [
        BasePair::UsdCad,
        BasePair::UsdChf,
        BasePair::UsdJpy,
        BasePair::AudUsd,
        BasePair::EurUsd,
        BasePair::GbpUsd,
        BasePair::NzdUsd,
    ];

    /// Symbole pour l'API Yahoo Finance
    pub fn symbol(&self) -> &'static str {
        match self {
            BasePair::UsdCad => "USDCAD=X",
            BasePair::UsdChf => "USDCHF=X",
            BasePair::UsdJpy => "USDJPY=X",
            BasePair::AudUsd => "AUDUSD=X",
            BasePair::EurUsd => "EURUSD=X",
            BasePair::GbpUsd => "GBPUSD=X",
            BasePair::NzdUsd => "NZDUSD=X",
        }
    }
}

/// Deux points de prix d'une paire de base : point de départ et point courant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairQuote {
    /// Prix au point de départ de la fenêtre
    pub prev: f64,
    /// Prix courant
    pub now: f64,
}

/// Snapshot complet du panier : un couple de prix par paire de base
pub type StrengthSnapshot = HashMap<BasePair, PairQuote>;

/// Comment le rendement d'une paire se construit depuis les paires de base
#[derive(Debug, Clone, Copy)]
enum Composition {
    /// Paire observée directement
    Direct(BasePair),
    /// Produit des deux jambes : X/USD × USD/Y = X/Y
    Product(BasePair, BasePair),
    /// Ratio des deux jambes cotées contre la même troisième devise
    Ratio(BasePair, BasePair),
}

/// Le panier complet : 7 paires directes + 21 paires synthétisées
///
/// Chaque devise apparaît dans exactement 7 entrées, en base (+) ou en
/// cotation (-).
const PAIR_BASKET: &[(Currency, Currency, Composition)] = &[
    // Paires de base
    (Currency::Eur, Currency::Usd, Composition::Direct(BasePair::EurUsd)),
    (Currency::Usd, Currency::Jpy, Composition::Direct(BasePair::UsdJpy)),
    (Currency::Usd, Currency::Chf, Composition::Direct(BasePair::UsdChf)),
    (Currency::Gbp, Currency::Usd, Composition::Direct(BasePair::GbpUsd)),
    (Currency::Aud, Currency::Usd, Composition::Direct(BasePair::AudUsd)),
    (Currency::Usd, Currency::Cad, Composition::Direct(BasePair::UsdCad)),
    (Currency::Nzd, Currency::Usd, Composition::Direct(BasePair::NzdUsd)),
    // Croisées EUR
    (Currency::Eur, Currency::Jpy, Composition::Product(BasePair::EurUsd, BasePair::UsdJpy)),
    (Currency::Eur, Currency::Chf, Composition::Product(BasePair::EurUsd, BasePair::UsdChf)),
    (Currency::Eur, Currency::Gbp, Composition::Ratio(BasePair::EurUsd, BasePair::GbpUsd)),
    (Currency::Eur, Currency::Aud, Composition::Ratio(BasePair::EurUsd, BasePair::AudUsd)),
    (Currency::Eur, Currency::Cad, Composition::Product(BasePair::EurUsd, BasePair::UsdCad)),
    (Currency::Eur, Currency::Nzd, Composition::Ratio(BasePair::EurUsd, BasePair::NzdUsd)),
    // Croisées GBP
    (Currency::Gbp, Currency::Chf, Composition::Product(BasePair::GbpUsd, BasePair::UsdChf)),
    (Currency::Gbp, Currency::Jpy, Composition::Product(BasePair::GbpUsd, BasePair::UsdJpy)),
    (Currency::Gbp, Currency::Aud, Composition::Ratio(BasePair::GbpUsd, BasePair::AudUsd)),
    (Currency::Gbp, Currency::Cad, Composition::Product(BasePair::GbpUsd, BasePair::UsdCad)),
    (Currency::Gbp, Currency::Nzd, Composition::Ratio(BasePair::GbpUsd, BasePair::NzdUsd)),
    // Croisées AUD
    (Currency::Aud, Currency::Chf, Composition::Product(BasePair::AudUsd, BasePair::UsdChf)),
    (Currency::Aud, Currency::Jpy, Composition::Product(BasePair::AudUsd, BasePair::UsdJpy)),
    (Currency::Aud, Currency::Cad, Composition::Product(BasePair::AudUsd, BasePair::UsdCad)),
    (Currency::Aud, Currency::Nzd, Composition::Ratio(BasePair::AudUsd, BasePair::NzdUsd)),
    // Croisées NZD
    (Currency::Nzd, Currency::Cad, Composition::Product(BasePair::NzdUsd, BasePair::UsdCad)),
    (Currency::Nzd, Currency::Chf, Composition::Product(BasePair::NzdUsd, BasePair::UsdChf)),
    (Currency::Nzd, Currency::Jpy, Composition::Product(BasePair::NzdUsd, BasePair::UsdJpy)),
    // Croisées CAD et CHF (jambes inversées : la base vient du dénominateur)
    (Currency::Cad, Currency::Chf, Composition::Ratio(BasePair::UsdChf, BasePair::UsdCad)),
    (Currency::Cad, Currency::Jpy, Composition::Ratio(BasePair::UsdJpy, BasePair::UsdCad)),
    (Currency::Chf, Currency::Jpy, Composition::Ratio(BasePair::UsdJpy, BasePair::UsdChf)),
];

/// Vecteur de force : un score signé par devise du panier
///
/// Recalculé en bloc à chaque cycle, jamais fusionné avec le précédent.
/// La somme des 8 scores est proche de zéro pour des données cohérentes —
/// vérification de santé utile, pas un invariant imposé.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyStrength {
    scores: HashMap<Currency, f64>,
}

impl CurrencyStrength {
    /// Vecteur neutre : toutes les devises à zéro
    ///
    /// C'est aussi la sortie de repli quand le snapshot amont est incomplet
    /// ou en erreur.
    pub fn zeros() -> Self {
        Self {
            scores: Currency::ALL.iter().map(|&c| (c, 0.0)).collect(),
        }
    }

    /// Score d'une devise
    pub fn get(&self, currency: Currency) -> f64 {
        self.scores.get(&currency).copied().unwrap_or(0.0)
    }

    /// Scores triés du plus fort au plus faible, pour l'affichage
    pub fn sorted_desc(&self) -> Vec<(Currency, f64)> {
        let mut entries: Vec<_> = Currency::ALL.iter().map(|&c| (c, self.get(c))).collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }
}

/// Log-return en unités proches du point de base : ln(now / prev) × 10000
///
/// Indéfini (None) si l'un des prix n'est pas strictement positif : aucun
/// NaN ni infini ne doit sortir d'ici.
fn log_return(now: f64, prev: f64) -> Option<f64> {
    if !(now > 0.0 && prev > 0.0) {
        return None;
    }
    Some((now / prev).ln() * 10000.0)
}

/// Rendement d'une entrée du panier selon sa règle de composition
fn pair_return(comp: Composition, snapshot: &StrengthSnapshot) -> Option<f64> {
    match comp {
        Composition::Direct(pair) => {
            let q = snapshot.get(&pair)?;
            log_return(q.now, q.prev)
        }
        Composition::Product(left, right) => {
            let l = snapshot.get(&left)?;
            let r = snapshot.get(&right)?;
            log_return(l.now * r.now, l.prev * r.prev)
        }
        Composition::Ratio(num, den) => {
            let n = snapshot.get(&num)?;
            let d = snapshot.get(&den)?;
            if d.now == 0.0 || d.prev == 0.0 {
                return None;
            }
            log_return(n.now / d.now, n.prev / d.prev)
        }
    }
}

/// Évalue le vecteur de force depuis un snapshot du panier
///
/// Politique d'échec : un snapshot incomplet (paire de base manquante)
/// produit un vecteur entièrement nul plutôt qu'une arithmétique partielle.
/// Un rendement individuel indéfini (prix nul) est simplement exclu de la
/// somme de chaque devise concernée.
pub fn evaluate(snapshot: &StrengthSnapshot) -> CurrencyStrength {
    let missing: Vec<_> = BasePair::ALL
        .iter()
        .filter(|pair| !snapshot.contains_key(pair))
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "Incomplete strength snapshot, returning zero vector");
        return CurrencyStrength::zeros();
    }

    let mut scores: HashMap<Currency, f64> =
        Currency::ALL.iter().map(|&c| (c, 0.0)).collect();

    for &(base, quote, comp) in PAIR_BASKET {
        if let Some(r) = pair_return(comp, snapshot) {
            *scores.entry(base).or_insert(0.0) += r;
            *scores.entry(quote).or_insert(0.0) -= r;
        }
    }

    for score in scores.values_mut() {
        *score /= PAIRS_COUNT;
    }

    CurrencyStrength { scores }
}

// ============================================================================
// Tests unitaires
// ============================================================================
