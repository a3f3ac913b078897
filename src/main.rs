//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; the session flow lives in SessionController.

use dotenv::dotenv;
use leafscan::adapters::imaging::ImagePreprocessor;
use leafscan::adapters::model::BurnClassifier;
use leafscan::adapters::persistence::SqliteUserRepo;
use leafscan::adapters::security::Pbkdf2Hasher;
use leafscan::adapters::ui::tui::TuiInputPort;
use leafscan::ports::{
    ClassifierPort, ImageDecoderPort, InputPort, PasswordHasherPort, UserRepoPort,
};
use leafscan::shared::config::AppConfig;
use leafscan::usecases::{AuthService, ClassifyService, SessionController};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    // --- Credential store (startup-fatal if unreachable) ---
    let data_dir = cfg.data_dir_or_default();
    let repo = SqliteUserRepo::open(&data_dir, cfg.busy_timeout_or_default())
        .await
        .map_err(|e| anyhow::anyhow!("SQLite open failed: {}", e))?;
    repo.initialize()
        .await
        .map_err(|e| anyhow::anyhow!("SQLite schema init failed: {}", e))?;
    let repo: Arc<dyn UserRepoPort> = Arc::new(repo);

    // --- Classifier: weights loaded once, shared read-only ---
    let model_path = cfg.model_path_or_default();
    let classifier: Arc<dyn ClassifierPort> = Arc::new(
        BurnClassifier::load(&model_path)
            .map_err(|e| anyhow::anyhow!("{} (set LEAFSCAN_MODEL_PATH)", e))?,
    );
    let decoder: Arc<dyn ImageDecoderPort> = Arc::new(ImagePreprocessor::new());

    let rounds = cfg.pbkdf2_rounds_or_default();
    info!(rounds, "PBKDF2-SHA256 password hashing");
    let hasher: Arc<dyn PasswordHasherPort> = Arc::new(Pbkdf2Hasher::new(rounds));

    // --- Services ---
    let auth_service = Arc::new(AuthService::new(repo, hasher));
    let classify_service = Arc::new(ClassifyService::new(decoder, classifier));
    let controller = SessionController::new(auth_service, classify_service);

    leafscan::adapters::ui::init_ui();

    // --- Run (menu -> login/register -> upload -> advice) ---
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(controller));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("leafscan shutdown complete");
    Ok(())
}
