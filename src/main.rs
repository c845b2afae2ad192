mod modules;
mod state;
mod utils;

use anyhow::Context;
use folio_kernel::settings::Settings;
use folio_kernel::{InitCtx, ModuleRegistry};

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Folio settings")?;
    folio_telemetry::init(&settings).with_context(|| "failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        uploads = %settings.assets.upload_dir,
        "folio-app bootstrap starting"
    );

    let app_state = AppState::build(settings.clone())
        .await
        .with_context(|| "failed to build application state")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, app_state.clone());

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("folio-app bootstrap complete");

    folio_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;
    app_state.db.close();

    tracing::info!("folio-app shutdown complete");
    Ok(())
}
