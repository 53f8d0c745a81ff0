mod autopilot;
mod console_broadcaster;

use std::sync::Arc;
use clap::Parser;
use snake_engine::clock::GameClock;
use snake_engine::config::ConfigManager;
use snake_engine::game::{GameSession, GameSettings, HighScoreRecord, SessionRng};
use snake_engine::{log, logger};

use autopilot::AutopilotKind;
use console_broadcaster::{ConsoleBroadcaster, HighScoreManager};

#[derive(Parser)]
#[command(name = "snake_runner", about = "Headless snake arcade sessions driven by an autopilot")]
struct Args {
    /// YAML file with the game settings; created with defaults when missing.
    #[arg(long, default_value = "snake_arcade_config.yaml")]
    config: String,

    #[arg(long, default_value = "snake_arcade_high_score.yaml")]
    high_score_file: String,

    /// Seed for the session RNG; random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1)]
    games: u32,

    #[arg(long, value_enum, default_value_t = AutopilotKind::Greedy)]
    autopilot: AutopilotKind,

    /// A game still running after this many ticks counts as finished.
    #[arg(long, default_value_t = 5000)]
    max_ticks: u64,

    #[arg(long)]
    use_log_prefix: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Runner".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let settings_manager: ConfigManager<_, GameSettings> =
        ConfigManager::from_yaml_file(&args.config);
    let settings = settings_manager.get_config_or_default();
    if let Err(e) = settings_manager.set_config(&settings) {
        log!("Could not write settings to {}: {}", args.config, e);
    }

    let high_scores: Arc<HighScoreManager> =
        Arc::new(ConfigManager::from_yaml_file(&args.high_score_file));
    let high_score = high_scores.get_config_or_default().high_score;

    let mut rng = match args.seed {
        Some(seed) => SessionRng::new(seed),
        None => SessionRng::from_random(),
    };
    let steering_rng = SessionRng::new(rng.seed().wrapping_add(1));
    log!(
        "Starting {} game(s) on a {}x{} grid, seed {}, high score {}",
        args.games,
        settings.grid_size().width,
        settings.grid_size().height,
        rng.seed(),
        high_score
    );

    let session = GameSession::new(settings, high_score, &mut rng)?;
    let (clock, handle) = GameClock::new(session, rng);
    let broadcaster = ConsoleBroadcaster::new(
        handle.clone(),
        args.autopilot,
        steering_rng,
        high_scores.clone(),
        high_score,
        args.games.max(1),
        args.max_ticks,
    );

    let ctrl_c_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log!("Shutdown signal received, stopping the clock...");
            ctrl_c_handle.shutdown();
        }
    });

    handle.start();
    let session = clock.run(broadcaster.clone()).await;

    let stats = broadcaster.stats().await;
    log!(
        "Finished {} game(s), best score {}, {} ticks total, high score {}",
        stats.games_finished,
        stats.best_score,
        stats.total_ticks,
        session.high_score()
    );

    if session.high_score() > stats.saved_high_score {
        high_scores.set_config(&HighScoreRecord {
            high_score: session.high_score(),
        })?;
    }

    Ok(())
}
