//! HTTP API handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use hostpool_core::{
    BookingOutcome, BookingRequest, Slot, WindowError, canonical_timezone, normalize_window,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::BookingError;
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query string of `GET /availability`.
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
}

/// `GET /health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub hosts: usize,
}

/// One roster entry as listed by `GET /hosts`.
#[derive(Debug, Serialize)]
pub struct HostSummary {
    pub id: String,
    pub name: String,
    pub priority_weight: i64,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_body: Option<String>,
}

/// An error response with its status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                upstream_status: None,
                upstream_body: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<WindowError> for ApiError {
    fn from(err: WindowError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MissingFields(_) | BookingError::InvalidSlot(_) => {
                Self::bad_request(err.to_string())
            }
            BookingError::NoAvailability { .. } => Self::new(StatusCode::CONFLICT, err.to_string()),
            BookingError::Upstream(ref e) => Self {
                status: StatusCode::BAD_GATEWAY,
                body: ErrorResponse {
                    error: err.to_string(),
                    upstream_status: e.status(),
                    upstream_body: e.body().map(str::to_string),
                },
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// ============================================================================
// Handler functions
// ============================================================================

/// Liveness plus roster size.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        hosts: state.pool.hosts().len(),
    })
}

/// Lists the configured roster without credentials.
pub async fn hosts(State(state): State<AppState>) -> Json<Vec<HostSummary>> {
    let hosts = state
        .pool
        .hosts()
        .iter()
        .map(|h| HostSummary {
            id: h.host_id.clone(),
            name: h.display_name.clone(),
            priority_weight: h.priority_weight,
        })
        .collect();
    Json(hosts)
}

/// Union of every host's free slots in the requested window.
pub async fn availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<Vec<Slot>>, ApiError> {
    let (Some(start), Some(end)) = (params.start.as_deref(), params.end.as_deref()) else {
        return Err(ApiError::bad_request("start and end are required"));
    };

    let window = normalize_window(start, end, Utc::now())?;
    let timezone = canonical_timezone(params.timezone.as_deref(), &state.default_timezone);
    debug!(
        start = %window.start_str(),
        end = %window.end_str(),
        timezone = %timezone,
        "availability request"
    );

    Ok(Json(state.pool.availability(&window, &timezone).await))
}

/// Assigns the request to one host and books it.
pub async fn book(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookingOutcome>, ApiError> {
    let Json(request) = payload?;

    match state.pool.book(&request).await {
        Ok(outcome) => {
            info!(
                host = %outcome.host_assigned(),
                redirect = outcome.is_redirect(),
                "booking completed"
            );
            Ok(Json(outcome))
        }
        Err(e) => {
            match &e {
                BookingError::Upstream(_) => error!(error = %e, "booking failed upstream"),
                _ if e.is_validation() => debug!(error = %e, "invalid booking request"),
                _ => info!(error = %e, "booking not possible"),
            }
            Err(e.into())
        }
    }
}
