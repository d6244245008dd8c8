// ============================================================================
// Structure : Config
// ============================================================================
// Réglages de l'application : TTLs du cache, cadences de rafraîchissement,
// granularité de la vue détail. Chargés depuis un fichier JSON optionnel ;
// chaque champ a une valeur par défaut, un fichier absent ou illisible ne
// bloque jamais le démarrage.
//
// Trois cadences distinctes pilotent le moteur, chacune adossée à son TTL :
// - scan complet de tendance (lent, données horaires),
// - vue détail de l'instrument sélectionné (moyen, données minute),
// - force des devises (rapide, deux points de prix).
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Interval;

/// Réglages de l'application, tous optionnels dans le fichier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TTL du record de tendance agrégé par instrument (secondes)
    pub trend_ttl_secs: u64,

    /// TTL des séries horaires du scan (secondes)
    pub hourly_ttl_secs: u64,

    /// TTL des séries minute de la vue détail (secondes)
    pub minute_ttl_secs: u64,

    /// TTL du vecteur de force des devises (secondes)
    pub strength_ttl_secs: u64,

    /// Cadence du scan complet de tendance (secondes)
    pub scan_every_secs: u64,

    /// Cadence de rafraîchissement de la vue détail (secondes)
    pub detail_every_secs: u64,

    /// Cadence de rafraîchissement de la force des devises (secondes)
    pub strength_every_secs: u64,

    /// Granularité des chandelles de la vue détail
    pub detail_interval: Interval,

    /// Symbole de l'instrument sélectionné pour la vue détail
    pub selected_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trend_ttl_secs: 15 * 60,
            hourly_ttl_secs: 15 * 60,
            minute_ttl_secs: 15,
            strength_ttl_secs: 5,
            scan_every_secs: 15 * 60,
            detail_every_secs: 20,
            strength_every_secs: 5,
            detail_interval: Interval::M5,
            selected_symbol: "EURUSD=X".to_string(),
        }
    }
}

impl Config {
    /// Charge la config depuis le fichier utilisateur, défauts sinon
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Charge la config depuis un chemin donné, défauts sinon
    pub fn load_from(path: &PathBuf) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!(?path, "Config loaded");
                    config
                }
                Err(e) => {
                    warn!(?path, error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            // Fichier absent : cas nominal au premier lancement
            Err(_) => Self::default(),
        }
    }

    /// Chemin du fichier de config utilisateur
    ///
    /// Linux : ~/.config/lazytrend/config.json
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lazytrend").join("config.json"))
    }

    /// TTL du record de tendance agrégé
    pub fn trend_ttl(&self) -> Duration {
        Duration::from_secs(self.trend_ttl_secs)
    }

    /// TTL des séries horaires
    pub fn hourly_ttl(&self) -> Duration {
        Duration::from_secs(self.hourly_ttl_secs)
    }

    /// TTL des séries minute
    pub fn minute_ttl(&self) -> Duration {
        Duration::from_secs(self.minute_ttl_secs)
    }

    /// TTL du vecteur de force
    pub fn strength_ttl(&self) -> Duration {
        Duration::from_secs(self.strength_ttl_secs)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
