mod app;
mod config;

use app::App;
use config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "room_perception=info,roomex_experiment=info,roomex_scene=info";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        api = %config.api_base_url,
        trial_type = %config.trial_type,
        dev_room = config.dev_room.is_some(),
        "starting room perception"
    );
    App::run(config)
}
