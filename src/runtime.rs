use std::net::SocketAddr;
use std::sync::Arc;

use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::HealthConfig;
use crate::monitor::{RateLimiter, StatusCache};
use crate::platform::{KubePlatform, PlatformClient};
use crate::web;

/// Everything the facade and the monitors share, built once at startup and
/// handed around by cloning.
#[derive(Clone)]
pub struct AppContext {
    pub cache: StatusCache,
    pub limiter: Arc<RateLimiter>,
    pub platform: Arc<dyn PlatformClient>,
    pub cfg: Arc<HealthConfig>,
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(platform: Arc<dyn PlatformClient>, cfg: HealthConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(cfg.limiter_rate, cfg.limiter_burst));
        Self {
            cache: StatusCache::new(),
            limiter,
            platform,
            cfg: Arc::new(cfg),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Compute the HTTP bind address based on config.
pub fn compute_http_addr(cfg: &HealthConfig) -> SocketAddr {
    ([0, 0, 0, 0], cfg.http_port).into()
}

/// Translate Ctrl-C into a cancellation of everything in flight.
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
        }
    });
}

/// Build the shared context and serve HTTP until shutdown.
pub async fn run(client: Client, cfg: HealthConfig) -> anyhow::Result<()> {
    let ctx = AppContext::new(Arc::new(KubePlatform::new(client)), cfg);
    let addr = compute_http_addr(&ctx.cfg);

    spawn_signal_listener(ctx.shutdown.clone());

    let result = web::run_http_server(addr, ctx.clone()).await;
    // No monitor outlives the server.
    ctx.shutdown.cancel();
    result
}
