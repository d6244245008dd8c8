// ============================================================================
// Structure : TtlCache
// ============================================================================
// Mémoïzation générique bornée dans le temps, posée devant les opérations
// coûteuses (fetchs soumis au rate-limiting du provider, scan de tendance).
//
// Une entrée est valide ssi `now - computed_at < ttl` ; une entrée périmée
// n'est jamais servie, elle est remplacée au prochain accès. Pas d'éviction
// proactive : l'univers de clés est petit et fermé (une poignée d'opérations
// × une trentaine d'instruments), la map ne grossit pas indéfiniment.
//
// Deux appels concurrents sur la même clé pendant la même fenêtre de
// recalcul peuvent recalculer en double : la source est idempotente en
// lecture, le dernier `computed_at` écrit gagne. Le verrou n'est jamais
// tenu pendant le calcul.
// ============================================================================

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Identité d'une opération mémoïzée : nom d'opération + arguments
///
/// Équivalent de la clé « fonction + tuple d'arguments » d'un décorateur de
/// mémoïzation : deux call sites distincts ne se marchent jamais dessus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Nom de l'opération (ex: "hourly_series")
    pub op: &'static str,

    /// Arguments sérialisés (ex: le symbole de l'instrument)
    pub args: String,
}

impl CacheKey {
    /// Construit une clé opération + arguments
    pub fn new(op: &'static str, args: impl Into<String>) -> Self {
        Self {
            op,
            args: args.into(),
        }
    }
}

/// Une valeur mémoïzée et son horodatage de calcul
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    computed_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Invariant de validité : l'âge de l'entrée est strictement sous son TTL
    fn is_valid(&self) -> bool {
        self.computed_at.elapsed() < self.ttl
    }
}

/// Cache TTL générique à clés, partageable entre tâches async
#[derive(Debug, Default)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<CacheKey, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Crée un cache vide
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Retourne la valeur mémoïzée, ou recalcule et mémorise
    ///
    /// Le TTL est fourni par l'appelant : c'est l'opération qui connaît sa
    /// fraîcheur acceptable, pas le cache. Un calcul en erreur n'est pas
    /// mémorisé — l'erreur remonte et le prochain accès retentera.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if entry.is_valid() {
                    trace!(op = key.op, args = %key.args, "Cache hit");
                    return Ok(entry.value.clone());
                }
            }
        }

        debug!(op = key.op, args = %key.args, ttl_secs = ttl.as_secs_f64(), "Cache miss, computing");
        let value = compute().await?;

        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                computed_at: Instant::now(),
                ttl,
            },
        );

        Ok(value)
    }

    /// Nombre d'entrées présentes (valides ou périmées)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Vérifie si le cache est vide
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_within_ttl_computes_once() {
        let cache: TtlCache<u32> = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_compute(
                    CacheKey::new("op", "EURUSD=X"),
                    Duration::from_secs(60),
                    || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(42)
                    },
                )
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_recomputes() {
        let cache: TtlCache<u32> = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let compute = || async move {
            Ok(calls.fetch_add(1, Ordering::SeqCst) as u32)
        };

        let key = CacheKey::new("op", "EURUSD=X");
        let ttl = Duration::from_millis(30);

        let first = cache.get_or_compute(key.clone(), ttl, compute).await.unwrap();
        assert_eq!(first, 0);

        // L'entrée expire, le prochain accès doit recalculer
        tokio::time::sleep(Duration::from_millis(60)).await;

        let second = cache.get_or_compute(key, ttl, compute).await.unwrap();
        assert_eq!(second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let cache: TtlCache<String> = TtlCache::new();
        let ttl = Duration::from_secs(60);

        let a = cache
            .get_or_compute(CacheKey::new("op", "EURUSD=X"), ttl, || async move {
                Ok("eurusd".to_string())
            })
            .await
            .unwrap();
        let b = cache
            .get_or_compute(CacheKey::new("op", "USDJPY=X"), ttl, || async move {
                Ok("usdjpy".to_string())
            })
            .await
            .unwrap();
        // Même arguments mais opération différente : clé distincte
        let c = cache
            .get_or_compute(CacheKey::new("other", "EURUSD=X"), ttl, || async move {
                Ok("other".to_string())
            })
            .await
            .unwrap();

        assert_eq!(a, "eurusd");
        assert_eq!(b, "usdjpy");
        assert_eq!(c, "other");
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test]
    async fn test_failed_compute_is_not_cached() {
        let cache: TtlCache<u32> = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        let key = CacheKey::new("op", "EURUSD=X");
        let ttl = Duration::from_secs(60);

        let err = cache
            .get_or_compute(key.clone(), ttl, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("fetch failed"))
            })
            .await;
        assert!(err.is_err());
        assert!(cache.is_empty().await);

        // L'échec n'a rien mémorisé : l'accès suivant recalcule
        let value = cache
            .get_or_compute(key, ttl, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
