use std::{
    net::SocketAddr,
    sync::{Arc, OnceLock},
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use mathsolve_core::{Config, ErrorBody, ProblemKind, ProblemRequest, SolutionResult};
use mathsolve_solver::{Dispatcher, SolveError};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

static METRICS: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: PrometheusHandle,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/solve", post(solve))
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// A failed solve, answered with 400 and an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError(pub SolveError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(self.0.to_string())),
        )
            .into_response()
    }
}

async fn index() -> Html<&'static str> {
    counter!("requests_total", 1, "endpoint" => "index");
    Html(INDEX_HTML)
}

async fn solve(
    State(state): State<AppState>,
    Json(req): Json<ProblemRequest>,
) -> Result<Json<SolutionResult>, ApiError> {
    counter!("requests_total", 1, "endpoint" => "solve");
    // unknown kinds share one label so the series stay bounded
    let kind = req
        .kind
        .trim()
        .parse::<ProblemKind>()
        .map_or("unknown", ProblemKind::as_str);
    let dispatcher = Arc::clone(&state.dispatcher);
    let result = tokio::task::spawn_blocking(move || dispatcher.handle(&req))
        .await
        .unwrap_or_else(|e| Err(SolveError::internal(format!("solver task failed: {e}"))));
    match result {
        Ok(solution) => {
            counter!("solve_total", 1, "type" => kind, "outcome" => "ok");
            Ok(Json(solution))
        }
        Err(e) => {
            counter!("solve_total", 1, "type" => kind, "outcome" => e.kind());
            warn!(kind, error = %e, "rejected problem");
            Err(ApiError(e))
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.metrics.render()
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The process-wide Prometheus recorder, installed on first use.
fn metrics_handle() -> Result<PrometheusHandle, ServerError> {
    METRICS
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(ServerError::Metrics)
}

/// Install the stderr log subscriber. Does nothing if one is already set.
pub fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init();
}

/// Bind `cfg.listen_addr()` and serve in a background task.
pub async fn start(cfg: Config) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
    let recorder = metrics_handle()?;
    let state = AppState {
        dispatcher: Arc::new(Dispatcher::new(cfg.solver.clone())),
        metrics: recorder,
    };
    let app = router(state);
    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(addr.as_str())
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("server stopped: {e}");
        }
    });
    info!("listening on {}", addr);
    Ok((addr, handle))
}
