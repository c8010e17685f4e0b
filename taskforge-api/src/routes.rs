//! HTTP route handlers for the task runner API.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use taskforge::io::data_dir::ReadError;
use taskforge::io::gateway::GatewayError;
use taskforge::io::sandbox::UvSandbox;
use taskforge::looping::{TaskStop, run_task};

use crate::state::AppState;

/// Build the router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/run", post(run))
        .route("/read", get(read))
}

async fn home() -> &'static str {
    "taskforge api"
}

#[derive(Deserialize)]
struct RunParams {
    task: String,
}

/// POST /run?task=... drives one task to a terminal state.
async fn run(State(state): State<AppState>, Query(params): Query<RunParams>) -> Response {
    let config = state.config.clone();
    let gateway = state.gateway.clone();

    let joined = tokio::task::spawn_blocking(move || {
        run_task(&config, gateway.as_ref(), &UvSandbox, &params.task)
    })
    .await;

    let result = match joined {
        Ok(result) => result,
        Err(err) => {
            error!(err = %err, "task worker panicked");
            return internal_error();
        }
    };

    match result {
        Ok(outcome) => match outcome.stop {
            TaskStop::Accepted => (
                StatusCode::OK,
                Json(json!({ "status": "executed", "attempts": outcome.executions })),
            )
                .into_response(),
            TaskStop::Exhausted { last_error } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "exhausted",
                    "attempts": outcome.executions,
                    "detail": last_error,
                })),
            )
                .into_response(),
        },
        Err(err) => task_error_response(&err),
    }
}

/// Map a fatal task error to a response carrying its taxonomy tag.
fn task_error_response(err: &anyhow::Error) -> Response {
    if let Some(gateway_err) = err.downcast_ref::<GatewayError>() {
        let detail = if gateway_err.is_timeout() {
            format!("{gateway_err} (timed out)")
        } else {
            gateway_err.to_string()
        };
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "status": gateway_err.tag(), "detail": detail })),
        )
            .into_response();
    }
    error!(err = %err, "task failed");
    internal_error()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "detail": "internal error" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct ReadParams {
    path: String,
}

/// GET /read?path=... returns file content from the data directory.
async fn read(State(state): State<AppState>, Query(params): Query<ReadParams>) -> Response {
    let data_dir = state.data_dir.clone();

    let joined = tokio::task::spawn_blocking(move || data_dir.read(&params.path)).await;

    match joined {
        Ok(Ok(content)) => (StatusCode::OK, content).into_response(),
        Ok(Err(ReadError::InvalidPath)) => {
            (StatusCode::BAD_REQUEST, "invalid path").into_response()
        }
        Ok(Err(ReadError::NotFound)) => StatusCode::NOT_FOUND.into_response(),
        Ok(Err(ReadError::Io(err))) => {
            error!(err = %err, "read failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            error!(err = %err, "read worker panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_map_to_bad_gateway_with_taxonomy_tag() {
        let err = anyhow::Error::new(GatewayError::Upstream {
            status: 503,
            body: "overloaded".to_string(),
        });
        let response = task_error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unknown_errors_map_to_internal_error() {
        let err = anyhow::anyhow!("scratch directory vanished");
        let response = task_error_response(&err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
