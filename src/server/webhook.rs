//! Webhook endpoint handler.
//!
//! Validates the signature, parses the delivery into a command event, and
//! spawns one task per addressed bot before answering. The replies are
//! posted by those tasks, not by this handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{AppState, InterpreterFactory};
use crate::engine::Dispatch;
use crate::types::DeliveryId;
use crate::webhooks::{CommandEvent, ParseError, SignatureError, parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when accepting a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("invalid payload: {0}")]
    Parse(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(SignatureError::InvalidKey) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::Parse(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload
///   - `X-GitHub-Event`: Event type (`issues`, `issue_comment`, ...)
/// - Optional `X-GitHub-Delivery`, used only for logging
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 202 Accepted: at least one bot is handling the event
/// - 200 OK: the event is not a command for any enabled bot
/// - 400 Bad Request: missing event header or unusable payload
/// - 401 Unauthorized: missing or wrong signature
pub async fn webhook_handler<F: InterpreterFactory>(
    State(app_state): State<AppState<F>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let delivery_id = DeliveryId::new(header(&headers, HEADER_DELIVERY).unwrap_or("unknown"));

    // Signature first: nothing in an unauthenticated body is looked at.
    if let Err(e) = verify_signature(
        &body,
        header(&headers, HEADER_SIGNATURE),
        app_state.webhook_secret(),
    ) {
        warn!(delivery_id = %delivery_id, error = %e, "Rejected webhook signature");
        return Err(e.into());
    }

    let event_type =
        header(&headers, HEADER_EVENT).ok_or(WebhookError::MissingHeader(HEADER_EVENT))?;

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    let event = match parse_webhook(event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring webhook");
            return Ok((StatusCode::OK, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Unusable webhook payload");
            return Err(e.into());
        }
    };

    let addressed: Vec<usize> = app_state
        .engines()
        .iter()
        .enumerate()
        .filter(|(_, engine)| !engine.route(&event).is_ignored())
        .map(|(index, _)| index)
        .collect();

    if addressed.is_empty() {
        debug!(
            delivery_id = %delivery_id,
            repo = %event.repo,
            issue = %event.issue.number,
            "No bot addressed"
        );
        return Ok((StatusCode::OK, "Ignored"));
    }

    for index in addressed {
        spawn_dispatch(&app_state, index, event.clone(), delivery_id.clone());
    }

    Ok((StatusCode::ACCEPTED, "Accepted"))
}

/// Runs engine `index` on `event` in the background.
fn spawn_dispatch<F: InterpreterFactory>(
    app_state: &AppState<F>,
    index: usize,
    event: CommandEvent,
    delivery_id: DeliveryId,
) {
    let state = app_state.clone();
    app_state.tracker().spawn(async move {
        let engine = &state.engines()[index];
        let github = state.github().for_repo(&event.repo);
        let bot = &engine.config().bot_name;

        match engine.handle_event(&github, &event).await {
            Ok(Dispatch::Replied { outcome, comment_id }) => info!(
                delivery_id = %delivery_id,
                bot = %bot,
                repo = %event.repo,
                issue = %event.issue.number,
                comment_id = %comment_id,
                success = outcome.is_success(),
                "Event handled"
            ),
            Ok(Dispatch::Ignored(reason)) => debug!(
                delivery_id = %delivery_id,
                bot = %bot,
                %reason,
                "Event ignored"
            ),
            Err(e) => error!(
                delivery_id = %delivery_id,
                bot = %bot,
                repo = %event.repo,
                error = %e,
                "Failed to reply"
            ),
        }
    });
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_reads_present_value() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_EVENT, HeaderValue::from_static("issues"));

        assert_eq!(header(&headers, HEADER_EVENT), Some("issues"));
        assert_eq!(header(&headers, HEADER_DELIVERY), None);
    }

    #[test]
    fn header_skips_non_utf8_value() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_EVENT, HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        assert_eq!(header(&headers, HEADER_EVENT), None);
    }

    #[test]
    fn errors_map_to_status_codes() {
        let cases = [
            (
                WebhookError::MissingHeader(HEADER_EVENT),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebhookError::InvalidSignature(SignatureError::Missing),
                StatusCode::UNAUTHORIZED,
            ),
            (
                WebhookError::InvalidSignature(SignatureError::Mismatch),
                StatusCode::UNAUTHORIZED,
            ),
            (
                WebhookError::InvalidSignature(SignatureError::InvalidKey),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn parse_error_is_bad_request() {
        let error = parse_webhook("issues", b"{").unwrap_err();
        assert_eq!(
            WebhookError::from(error).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
