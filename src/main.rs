use anyhow::{Context, Result};
use prose_pause::config::AppConfig;
use prose_pause::context::AppContext;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a configuration file
const CONFIG_ENV: &str = "PROSE_PAUSE_CONFIG";

/// First argument, then the environment, then the default location if present
fn config_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(|| AppConfig::default_path().filter(|path| path.exists()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prose_pause=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prose & Pause");

    let config = match config_path() {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            AppConfig::load(&path).with_context(|| format!("loading {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    let context = AppContext::open(config).context("opening application context")?;
    prose_pause::ui::run(context).map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    info!("Prose & Pause exited");
    Ok(())
}
