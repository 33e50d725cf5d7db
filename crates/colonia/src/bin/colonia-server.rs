//! Runs a Colonia server on the fixed starting world.
//!
//! Two development logins are accepted: token `dutch` and token
//! `english`. Settings come from `COLONIA_BIND`,
//! `COLONIA_IDLE_TIMEOUT_MS` and `COLONIA_LOGIN_TIMEOUT_MS`; log
//! verbosity from `RUST_LOG`.

use colonia::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(bind = %config.bind, idle_timeout_ms = config.idle_timeout_ms, "starting");

    let auth = StaticAuthenticator::new()
        .with_player("dutch", scenario::DUTCH)
        .with_player("english", scenario::ENGLISH);

    let server = ColoniaServerBuilder::new()
        .config(config)
        .build(auth, scenario::new_world()?)
        .await?;

    server.run().await?;
    Ok(())
}
