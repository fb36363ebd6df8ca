use anyhow::Context;

use bookmart_kernel::settings::{Settings, StoreBackend};
use bookmart_kernel::{InitCtx, ModuleRegistry};
use bookmart_store::StoreHandle;

use bookmart_app::modules;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookmart settings")?;
    bookmart_telemetry::init(&settings.telemetry)
        .with_context(|| "failed to initialize telemetry")?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.store.backend,
        "bookmart bootstrap starting"
    );

    // The store handle is built once here and injected into every
    // module; nothing connects lazily on first access.
    let store = match settings.store.backend {
        StoreBackend::Memory => StoreHandle::memory(),
    };

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &settings, &store);

    let ctx = InitCtx {
        settings: &settings,
        store: &store,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    bookmart_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;

    tracing::info!("bookmart shutdown complete");
    Ok(())
}
