use std::sync::Arc;

use access_cli::{Driver, DriverConfig};
use access_engine::{EngineConfig, RoleAssignmentEngine, Session};
use access_provider::{ArmClient, AuthorizationProvider, MemoryProvider, ProviderConfig};
use access_rbac::CatalogConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with prompts.
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = DriverConfig::from_env()?;
    if std::env::args().skip(1).any(|arg| arg == "--offline") {
        config.offline = true;
    }
    let provider_config = ProviderConfig::from_env()?;

    let catalog = match config.catalog_path {
        Some(ref path) => CatalogConfig::from_json_file(path)?,
        None => CatalogConfig::default(),
    };
    let (catalog, directory) = catalog.build()?;

    let provider: Arc<dyn AuthorizationProvider> = if config.offline {
        info!("Using in-memory provider");
        Arc::new(MemoryProvider::new())
    } else {
        provider_config.validate_for_remote()?;
        Arc::new(ArmClient::new(provider_config.clone())?)
    };

    let engine = RoleAssignmentEngine::new(
        catalog,
        directory,
        provider,
        EngineConfig {
            subscription_id: provider_config.subscription_id.clone(),
            resource_group: config.resource_group.clone(),
            location: config.location.clone(),
            timeout: provider_config.timeout(),
        },
    );

    let stdin = std::io::stdin();
    let mut driver = Driver::new(Session::new(engine), stdin.lock(), std::io::stdout(), &config);
    driver.run().await?;
    Ok(())
}
