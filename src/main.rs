// ============================================================================
// LazyTrend - Scanner de tendance multi-timeframe
// ============================================================================
// Point d'entrée : initialise le logging, charge la config, construit le
// moteur et pilote les trois boucles de rafraîchissement (scan de tendance,
// vue détail, force des devises). La sortie console tient lieu de couche de
// présentation : une table de tendance par scan, un classement de force par
// cycle rapide.
// ============================================================================

use anyhow::{Context, Result};
use tracing::{error, info};

use lazytrend::api::YahooClient;
use lazytrend::config::Config;
use lazytrend::engine::TrendEngine;
use lazytrend::models::{all_pairs, label_for, TimeframeScale, TrendTable};
use lazytrend::strength::CurrencyStrength;

// ============================================================================
// Initialisation du logging
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs vont dans ./logs avec rotation quotidienne ; le niveau se pilote
/// via RUST_LOG (par défaut : debug pour lazytrend, info pour le reste).
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/lazytrend.log
/// RUST_LOG=lazytrend=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazytrend.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazytrend=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Affichage console
// ============================================================================

/// Affiche la table de tendance du cycle (la heatmap du dashboard, en texte)
fn print_trend_table(table: &TrendTable) {
    println!();
    println!(
        "{:<10} {:>4} {:>4} {:>4}  {}",
        "Pair", "1d", "4h", "1h", "Trending"
    );
    for trend in table {
        let label = label_for(&trend.symbol).unwrap_or(trend.symbol.as_str());
        println!(
            "{:<10} {:>4} {:>4} {:>4}  {}",
            label,
            trend.signal(TimeframeScale::D1).value(),
            trend.signal(TimeframeScale::H4).value(),
            trend.signal(TimeframeScale::H1).value(),
            if trend.trending { "✔" } else { "" }
        );
    }
}

/// Affiche le classement de force des devises du cycle
fn print_strength(vector: &CurrencyStrength) {
    let ranked: Vec<String> = vector
        .sorted_desc()
        .into_iter()
        .map(|(currency, score)| format!("{} {:+.2}", currency.code(), score))
        .collect();
    println!("Force des devises : {}", ranked.join("  "));
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("LazyTrend starting up");

    let config = Config::load();
    let selected = config.selected_symbol.clone();
    let provider = YahooClient::new()?;
    let engine = TrendEngine::new(provider, config);

    // Premier scan complet avant d'entrer dans les boucles
    println!("📊 Scan initial de l'univers...");
    let table = engine.scan(all_pairs()).await;
    print_trend_table(&table);

    // Trois cadences distinctes, chacune adossée à son TTL dans le moteur
    let mut scan_tick =
        tokio::time::interval(std::time::Duration::from_secs(engine.config().scan_every_secs));
    let mut detail_tick =
        tokio::time::interval(std::time::Duration::from_secs(engine.config().detail_every_secs));
    let mut strength_tick = tokio::time::interval(std::time::Duration::from_secs(
        engine.config().strength_every_secs,
    ));

    // Le premier tick de chaque intervalle part immédiatement : on le
    // consomme pour ne pas doubler le scan initial
    scan_tick.tick().await;
    detail_tick.tick().await;
    strength_tick.tick().await;

    loop {
        tokio::select! {
            _ = scan_tick.tick() => {
                let table = engine.scan(all_pairs()).await;
                print_trend_table(&table);
            }
            _ = detail_tick.tick() => {
                let series = engine.detail_series(&selected).await;
                match series.last_close() {
                    Some(close) => {
                        let label = label_for(&selected).unwrap_or(selected.as_str());
                        println!(
                            "{} {} : {} ({} chandelles)",
                            label,
                            series.interval.label(),
                            close,
                            series.len()
                        );
                    }
                    None => error!(symbol = %selected, "No detail data available"),
                }
            }
            _ = strength_tick.tick() => {
                let vector = engine.currency_strength().await;
                print_strength(&vector);
            }
        }
    }
}
