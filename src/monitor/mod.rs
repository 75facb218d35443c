use tracing::{debug, info, warn};

use crate::checker::{self, CheckScope, aggregate};
use crate::errors::PlatformError;
use crate::models::{HealthState, ResourceHealth, ResourceKey};
use crate::platform::PlatformClient;
use crate::runtime::AppContext;

pub mod cache;
pub mod limiter;

pub use cache::StatusCache;
pub use limiter::RateLimiter;

const NOT_FOUND_MESSAGE: &str = "Resource not found after multiple checks";

/// Start a monitor for the key unless one is already active. Returns whether
/// a new task was spawned. The active claim is released when the task ends,
/// however it ends.
pub fn spawn_if_idle(ctx: AppContext, key: ResourceKey, scope: CheckScope) -> bool {
    if !ctx.cache.try_claim(&key) {
        debug!(%key, "monitor already active");
        return false;
    }
    tokio::spawn(async move {
        let _guard = ReleaseGuard {
            cache: ctx.cache.clone(),
            key: key.clone(),
        };
        run_monitor(ctx, key, scope).await;
    });
    true
}

struct ReleaseGuard {
    cache: StatusCache,
    key: ResourceKey,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

/// Poll one resource until it has been ready long enough, has been missing
/// too often, or the process shuts down.
async fn run_monitor(ctx: AppContext, key: ResourceKey, scope: CheckScope) {
    info!(%key, "monitor started");

    tokio::select! {
        _ = tokio::time::sleep(ctx.cfg.initial_delay) => {}
        _ = ctx.shutdown.cancelled() => return,
    }

    let mut local_not_found = 0u32;
    let mut delay = ctx.cfg.check_interval;
    let mut last_ready_note = tokio::time::Instant::now();

    loop {
        if ctx.limiter.acquire(&ctx.shutdown).await.is_err() {
            info!(%key, "monitor stopped while waiting for a token");
            return;
        }

        match run_pass(ctx.platform.as_ref(), &key, &scope).await {
            Err(err) => {
                warn!(%key, not_found = err.is_not_found(), error = %err, "check pass failed");
                local_not_found = ctx.cache.bump_not_found(&key, local_not_found);
                if local_not_found >= ctx.cfg.consec_failed {
                    ctx.cache.publish_failure(
                        &key,
                        ResourceHealth {
                            status: HealthState::Failed,
                            details: Vec::new(),
                            message: Some(NOT_FOUND_MESSAGE.to_string()),
                        },
                    );
                    warn!(%key, checks = local_not_found, "giving up on missing resource");
                    return;
                }
                delay += ctx.cfg.increase_interval;
            }
            Ok(health) => {
                let ready = health.status == HealthState::Ready;
                let healthy_streak = ctx.cache.publish(&key, health);
                local_not_found = 0;

                if ready {
                    if last_ready_note.elapsed() >= ctx.cfg.ready_check_interval {
                        info!(%key, "still rechecking a ready resource");
                        last_ready_note = tokio::time::Instant::now();
                    }
                    if healthy_streak >= ctx.cfg.consec_healthy {
                        info!(%key, checks = healthy_streak, "resource stayed ready, stopping monitor");
                        return;
                    }
                }
                delay = ctx.cfg.check_interval;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = ctx.shutdown.cancelled() => {
                info!(%key, "monitor stopped by shutdown");
                return;
            }
        }
    }
}

/// One full pass: confirm the custom resource exists, then run every
/// checker in order and fold the outcomes. Any error aborts the whole pass.
async fn run_pass(
    platform: &dyn PlatformClient,
    key: &ResourceKey,
    scope: &CheckScope,
) -> Result<ResourceHealth, PlatformError> {
    platform.fetch_custom_resource(key).await?;

    let mut outcomes = Vec::new();
    for checker in checker::ordered() {
        debug!(%key, checker = %checker.kind(), "running checker");
        outcomes.push(checker.check(platform, scope).await?);
    }

    let health = aggregate::resolve(aggregate::combine(outcomes));
    debug!(%key, status = ?health.status, issues = health.details.len(), "pass complete");
    Ok(health)
}
