use std::sync::Arc;

use application::usecases::{
    dispatch_mailing::DispatchError, mailing_scheduler::MailingSchedulerUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use domain::value_objects::dispatch::{DispatchSummary, RunResult};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::axum_http::error_responses::AppError;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/mailings/$MAILING_ID/send" \
//     -H "Authorization: Bearer $INTERNAL_DISPATCH_TOKEN"

#[derive(Clone)]
pub struct MailingDispatchRouteState {
    internal_token: Option<Arc<str>>,
    scheduler: Arc<MailingSchedulerUseCase>,
}

pub fn routes(internal_token: Option<String>, scheduler: Arc<MailingSchedulerUseCase>) -> Router {
    Router::new()
        .route("/reschedule", post(reschedule))
        .route("/:mailing_id/send", post(send_mailing))
        .with_state(MailingDispatchRouteState {
            internal_token: internal_token.map(Arc::from),
            scheduler,
        })
}

#[derive(Debug, Serialize)]
pub struct RescheduleResponse {
    pub generation: u64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub code: u16,
    pub message: String,
    pub attempted: usize,
    pub delivered: usize,
    pub undelivered: usize,
}

pub async fn reschedule(
    State(state): State<MailingDispatchRouteState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    state.authorize(&headers)?;

    let generation = state.scheduler.trigger_rescheduling();

    Ok((
        StatusCode::ACCEPTED,
        Json(RescheduleResponse {
            generation: generation.seq(),
            captured_at: generation.captured_at(),
        }),
    )
        .into_response())
}

pub async fn send_mailing(
    State(state): State<MailingDispatchRouteState>,
    headers: HeaderMap,
    Path(mailing_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.authorize(&headers)?;

    match state.scheduler.dispatch_now(mailing_id).await {
        Ok(summary) => {
            info!(
                %mailing_id,
                result = %summary.result,
                attempted = summary.attempted,
                "send_mailing: dispatch finished"
            );
            Ok(dispatch_response(&summary))
        }
        Err(DispatchError::MailingNotFound(mailing_id)) => Err(AppError::NotFound(mailing_id)),
        Err(DispatchError::Store(err)) => {
            error!(%mailing_id, error = ?err, "send_mailing: dispatch failed");
            Err(AppError::Internal(err))
        }
    }
}

fn dispatch_response(summary: &DispatchSummary) -> Response {
    let (status, message) = match summary.result {
        RunResult::Completed => (StatusCode::OK, "Mailing successfully completed"),
        RunResult::CompletedWithErrors => (
            StatusCode::OK,
            "Mailing completed successfully, but with errors",
        ),
        RunResult::DeadlineExpired => (StatusCode::REQUEST_TIMEOUT, "Mailing deadline expired"),
        RunResult::Superseded => (StatusCode::CONFLICT, "Mailing is already being dispatched"),
    };

    (
        status,
        Json(DispatchResponse {
            code: status.as_u16(),
            message: message.to_string(),
            attempted: summary.attempted,
            delivered: summary.delivered,
            undelivered: summary.undelivered,
        }),
    )
        .into_response()
}

impl MailingDispatchRouteState {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let expected_token = self.internal_token.as_deref().ok_or(AppError::NotConfigured)?;
        authorize_bearer(headers, expected_token)
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
