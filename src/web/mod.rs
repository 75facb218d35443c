use std::net::SocketAddr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::checker::CheckScope;
use crate::models::{HealthState, ResourceHealth, ResourceKey};
use crate::monitor;
use crate::runtime::AppContext;

const INITIAL_CHECK_MESSAGE: &str = "Initial check in progress";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorQuery {
    pub label_selector: String,
    pub annotation_selector: String,
}

pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/health/{group}/{version}/{plural}/{namespace}/{name}",
            get(resource_health),
        )
        .route(
            "/reset/{group}/{version}/{plural}/{namespace}/{name}",
            post(reset_counters),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

pub async fn run_http_server(addr: SocketAddr, ctx: AppContext) -> anyhow::Result<()> {
    let shutdown = ctx.shutdown.clone();
    let app = build_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "OK"
}

/// Serve the cached status. A fresh entry is returned as-is; a stale entry
/// is returned while a refresh monitor is scheduled; a cold key gets a 202
/// placeholder while the first monitor warms the cache.
async fn resource_health(
    State(ctx): State<AppContext>,
    Path((group, version, plural, namespace, name)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
    Query(query): Query<SelectorQuery>,
) -> Response {
    let key = ResourceKey {
        group,
        version,
        plural,
        namespace,
        name,
    };

    let entry = ctx.cache.get(&key);
    if let Some(entry) = &entry {
        if entry.captured_at.elapsed() < ctx.cfg.check_interval {
            info!(%key, "serving fresh cached status");
            return (StatusCode::OK, Json(entry.health.clone())).into_response();
        }
    }

    let scope = CheckScope {
        namespace: key.namespace.clone(),
        label_selector: query.label_selector,
        annotation_selector: query.annotation_selector,
    };
    monitor::spawn_if_idle(ctx.clone(), key.clone(), scope);

    match entry {
        Some(entry) => {
            info!(%key, "serving stale cached status, refresh scheduled");
            (StatusCode::OK, Json(entry.health)).into_response()
        }
        None => {
            info!(%key, "no cached status yet, initial check scheduled");
            let placeholder = ResourceHealth {
                status: HealthState::Deploying,
                details: Vec::new(),
                message: Some(INITIAL_CHECK_MESSAGE.to_string()),
            };
            (StatusCode::ACCEPTED, Json(placeholder)).into_response()
        }
    }
}

/// Zero the escalation counters of a known key so the next monitor session
/// revalidates from scratch.
async fn reset_counters(
    State(ctx): State<AppContext>,
    Path((group, version, plural, namespace, name)): Path<(
        String,
        String,
        String,
        String,
        String,
    )>,
) -> Response {
    let key = ResourceKey {
        group,
        version,
        plural,
        namespace,
        name,
    };

    if ctx.cache.reset_counters(&key) {
        info!(%key, "counters reset");
        (
            StatusCode::OK,
            format!("Counters reset for resource: {key}"),
        )
            .into_response()
    } else {
        info!(%key, "reset requested for unknown resource");
        (StatusCode::NOT_FOUND, format!("Resource not found: {key}")).into_response()
    }
}
