use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use mindful_onboarding::auth::{HttpGateway, IdentityGateway, MemoryGateway};
use mindful_onboarding::config::{GatewayConfig, PRODUCT_NAME, ServerConfig};
use mindful_onboarding::error::ConfigError;
use mindful_onboarding::onboarding::{SessionRegistry, onboarding_routes, spawn_expiry_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    eprintln!("🧠 {} onboarding v{}", PRODUCT_NAME, env!("CARGO_PKG_VERSION"));

    // ── Identity gateway ────────────────────────────────────────────────
    let gateway: Arc<dyn IdentityGateway> = match GatewayConfig::from_env() {
        Ok(config) => {
            eprintln!("   Gateway: {} (profiles table: {})", config.base_url, config.profiles_table);
            Arc::new(HttpGateway::new(config).context("Failed to create identity gateway")?)
        }
        Err(ConfigError::MissingEnvVar(var)) => {
            tracing::warn!(missing = %var, "No identity service configured, accounts live in memory");
            eprintln!("   Gateway: in-memory (set MINDFUL_GATEWAY_URL and MINDFUL_GATEWAY_ANON_KEY)");
            Arc::new(MemoryGateway::new())
        }
        Err(e) => return Err(e).context("Invalid gateway configuration"),
    };

    // ── HTTP server ─────────────────────────────────────────────────────
    let server = ServerConfig::from_env();
    let registry = SessionRegistry::with_ttl(gateway, server.session_ttl);
    let _expiry_handle = spawn_expiry_task(registry.clone(), Duration::from_secs(60));
    let app = onboarding_routes(registry);

    let listener = tokio::net::TcpListener::bind(server.addr())
        .await
        .with_context(|| format!("Failed to bind {}", server.addr()))?;
    eprintln!("   API: http://{}/api/onboarding/sessions\n", server.addr());
    tracing::info!(addr = %server.addr(), "Onboarding server started");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
