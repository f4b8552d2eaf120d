//! Backend entry-point: loads settings, wires adapters and serves the
//! callable, trigger and health endpoints.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use leafline::domain::ports::HealthScoreSource;
use leafline::inbound::http::health::HealthState;
use leafline::outbound::health_score::RandomHealthScoreSource;
use leafline::outbound::identity::StaticTokenIdentityProvider;
use leafline::settings::LeaflineSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let mut settings = LeaflineSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let delivery_policy = settings.delivery_policy().map_err(std::io::Error::other)?;

    let mut raw_tokens = settings.take_identity_tokens();
    let identity = StaticTokenIdentityProvider::parse(&mut raw_tokens)
        .map_err(std::io::Error::other)?;
    if identity.is_empty() {
        warn!("no identity tokens configured; every authenticated call will be rejected");
    }

    let health_scores: Arc<dyn HealthScoreSource> = match settings.health_score_seed {
        Some(seed) => Arc::new(RandomHealthScoreSource::seeded(seed)),
        None => Arc::new(RandomHealthScoreSource::from_entropy()),
    };

    let config = ServerConfig::new(bind_addr, Arc::new(identity), health_scores)
        .with_delivery_policy(delivery_policy);
    info!(%bind_addr, ?delivery_policy, "starting LeafLine backend");

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
