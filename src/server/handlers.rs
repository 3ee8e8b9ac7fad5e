//! HTTP route handlers.
//!
//! Direct triggers (`/send/{key}`, `/send_all`, `/help`, `/menu`) report
//! delivery failures to the caller. The webhook always acknowledges once the
//! payload is understood, so Telegram does not redeliver an update because
//! the answer could not be sent.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
};
use log::{debug, error};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    commands::Dispatcher,
    server::ApiError,
    telegram::{DispatchResult, parse_update},
};

const SERVICE_NAME: &str = "Telegram Links Bot";
const SERVICE_DESCRIPTION: &str = "Bot sending links to the team databases";

/// `GET /`
pub async fn status(State(dispatcher): State<Arc<Dispatcher>>) -> Json<Value> {
    Json(json!({
        "status": "active",
        "service": SERVICE_NAME,
        "description": SERVICE_DESCRIPTION,
        "available_links": dispatcher.catalog().keys(),
        "endpoints": {
            "GET /": "This page",
            "GET /ping": "Liveness probe",
            "GET /debug": "Configuration diagnostics, ?send=true sends a test message",
            "POST /send/{key}": "Send one link",
            "POST /send_all": "Send all links",
            "POST /help": "Send the help message",
            "POST /menu": "Send the command menu",
            "POST /webhook": "Telegram webhook"
        }
    }))
}

/// `POST /send/{key}`
pub async fn send_link(
    State(dispatcher): State<Arc<Dispatcher>>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = dispatcher.send_link(&key, None).await?;
    delivery_response(result, format!("link '{}' sent", key))
}

/// `POST /send_all`
pub async fn send_all(
    State(dispatcher): State<Arc<Dispatcher>>,
) -> Result<Json<Value>, ApiError> {
    let result = dispatcher.send_all(None).await;
    delivery_response(result, "all links sent".to_owned())
}

/// `POST /help`
pub async fn send_help(
    State(dispatcher): State<Arc<Dispatcher>>,
) -> Result<Json<Value>, ApiError> {
    let result = dispatcher.send_help(None).await;
    delivery_response(result, "help sent".to_owned())
}

/// `POST /menu`
pub async fn send_menu(
    State(dispatcher): State<Arc<Dispatcher>>,
) -> Result<Json<Value>, ApiError> {
    let result = dispatcher.send_menu(None).await;
    delivery_response(result, "command menu sent".to_owned())
}

/// `GET /ping`
pub async fn ping() -> &'static str {
    "pong"
}

/// `POST /webhook`
pub async fn webhook(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let update = parse_update(&body).inspect_err(|e| error!("rejected webhook update: {}", e))?;

    match update {
        Some(command) => {
            // Failures are logged by the dispatcher and not reported to Telegram
            let result = dispatcher
                .dispatch(&command.text, Some(&command.chat_id))
                .await;
            debug!(
                "webhook update from chat {} handled, delivered: {}",
                command.chat_id, result.delivered
            );
        }
        None => debug!("webhook update without command"),
    }

    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct DebugParams {
    /// Send the welcome message to the default chat
    #[serde(default)]
    send: bool,
}

/// `GET /debug`
pub async fn debug(
    State(dispatcher): State<Arc<Dispatcher>>,
    Query(params): Query<DebugParams>,
) -> Json<Value> {
    let delivery = dispatcher.delivery();
    let mut report = json!({
        "bot_token_configured": delivery.has_bot_token(),
        "default_chat_configured": delivery.has_default_chat(),
        "link_count": dispatcher.catalog().len(),
    });

    if params.send {
        let result = dispatcher.send_welcome(None).await;
        report["test_send"] = json!({
            "delivered": result.delivered,
            "reason": result.reason.map(|reason| reason.to_string()),
        });
    }

    Json(report)
}

fn delivery_response(result: DispatchResult, message: String) -> Result<Json<Value>, ApiError> {
    match result.reason {
        None => Ok(Json(json!({ "message": message }))),
        Some(reason) => Err(ApiError::Delivery(reason)),
    }
}
