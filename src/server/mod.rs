//! HTTP surface of the bot.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/` | [`handlers::status`] |
//! | `GET` | `/ping` | [`handlers::ping`] |
//! | `GET` | `/debug` | [`handlers::debug`] |
//! | `POST` | `/send/{key}` | [`handlers::send_link`] |
//! | `POST` | `/send_all` | [`handlers::send_all`] |
//! | `POST` | `/help` | [`handlers::send_help`] |
//! | `POST` | `/menu` | [`handlers::send_menu`] |
//! | `POST` | `/webhook` | [`handlers::webhook`] |
//!
//! Requests are served concurrently by axum. The only shared state is the
//! read-only [`Dispatcher`].

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    commands::{Dispatcher, UnknownKey},
    telegram::{DeliveryError, MalformedUpdate},
};

mod handlers;

/// Errors returned by the route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400, the body lists the valid keys
    #[error(transparent)]
    UnknownKey(#[from] UnknownKey),
    /// 500, missing configuration or failed Bot API call
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    /// 500, the webhook body cannot be processed
    #[error(transparent)]
    MalformedPayload(#[from] MalformedUpdate),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::UnknownKey(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err.to_string(), "available_keys": err.available }),
            ),
            ApiError::Delivery(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "failed to send message to Telegram", "reason": err.to_string() }),
            ),
            ApiError::MalformedPayload(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Builds the application router.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/ping", get(handlers::ping))
        .route("/debug", get(handlers::debug))
        .route("/send/{key}", post(handlers::send_link))
        .route("/send_all", post(handlers::send_all))
        .route("/help", post(handlers::send_help))
        .route("/menu", post(handlers::send_menu))
        .route("/webhook", post(handlers::webhook))
        .with_state(dispatcher)
}

/// Serves the router until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(host: &str, port: u16, dispatcher: Arc<Dispatcher>) -> Result<(), anyhow::Error> {
    let listener = TcpListener::bind((host, port)).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    use super::*;
    use crate::{
        catalog::LinkCatalog,
        commands::MessageFormatter,
        config::Formatter,
        telegram::{DispatchResult, MockDelivery},
    };

    fn create_router(delivery: MockDelivery) -> Router {
        let catalog = Arc::new(LinkCatalog::default());
        let formatter = MessageFormatter::new(catalog.clone(), &Formatter::default());
        router(Arc::new(Dispatcher::new(catalog, formatter, Arc::new(delivery))))
    }

    fn failing_delivery(times: usize) -> MockDelivery {
        let mut delivery = MockDelivery::new();
        delivery.expect_send().times(times).returning(|_| {
            DispatchResult::failed(DeliveryError::Api {
                status: 403,
                body: "Forbidden: bot was blocked by the user".to_owned(),
            })
        });
        delivery
    }

    fn succeeding_delivery(times: usize) -> MockDelivery {
        let mut delivery = MockDelivery::new();
        delivery
            .expect_send()
            .times(times)
            .returning(|_| DispatchResult::delivered());
        delivery
    }

    async fn call(app: Router, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn call_json(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let (status, bytes) = call(app, method, uri, Body::from(body.to_owned())).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ping_without_credentials() {
        let mut delivery = MockDelivery::new();
        delivery.expect_send().times(0);
        delivery.expect_has_bot_token().times(0);

        let (status, body) = call(create_router(delivery), "GET", "/ping", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"pong");
    }

    #[tokio::test]
    async fn test_status_lists_keys() {
        let (status, body) = call_json(create_router(MockDelivery::new()), "GET", "/", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
        assert_eq!(
            body["available_links"],
            json!(["supplies", "database", "goods", "supports"])
        );
        assert!(body["endpoints"]["POST /webhook"].is_string());
    }

    #[tokio::test]
    async fn test_send_unknown_key_is_bad_request() {
        let mut delivery = MockDelivery::new();
        delivery.expect_send().times(0);

        let (status, body) =
            call_json(create_router(delivery), "POST", "/send/doesnotexist", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["available_keys"],
            json!(["supplies", "database", "goods", "supports"])
        );
        assert!(body["error"].as_str().unwrap().contains("doesnotexist"));
    }

    #[tokio::test]
    async fn test_send_known_key() {
        let (status, body) =
            call_json(create_router(succeeding_delivery(1)), "POST", "/send/goods", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "link 'goods' sent");
    }

    #[tokio::test]
    async fn test_send_known_key_delivery_failure() {
        let (status, body) =
            call_json(create_router(failing_delivery(1)), "POST", "/send/goods", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["reason"].as_str().unwrap().contains("403"));
    }

    #[tokio::test]
    async fn test_missing_token_is_server_error() {
        let mut delivery = MockDelivery::new();
        delivery
            .expect_send()
            .times(1)
            .returning(|_| DispatchResult::failed(DeliveryError::MissingBotToken));

        let (status, body) = call_json(create_router(delivery), "POST", "/send_all", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["reason"], "bot token is not configured");
    }

    #[tokio::test]
    async fn test_direct_triggers() {
        for (uri, message) in [
            ("/send_all", "all links sent"),
            ("/help", "help sent"),
            ("/menu", "command menu sent"),
        ] {
            let (status, body) =
                call_json(create_router(succeeding_delivery(1)), "POST", uri, "").await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], message);

            let (status, _) = call_json(create_router(failing_delivery(1)), "POST", uri, "").await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[tokio::test]
    async fn test_webhook_acknowledges_failed_delivery() {
        let (status, body) = call_json(
            create_router(failing_delivery(1)),
            "POST",
            "/webhook",
            r#"{"message":{"text":"/help","chat":{"id":"123"}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_webhook_answers_in_the_sender_chat() {
        let mut delivery = MockDelivery::new();
        delivery
            .expect_send()
            .withf(|message| message.target_chat_id.as_deref() == Some("-100200"))
            .times(1)
            .returning(|_| DispatchResult::delivered());

        let (status, _) = call_json(
            create_router(delivery),
            "POST",
            "/webhook",
            r#"{"update_id":1,"message":{"text":"/supplies","chat":{"id":-100200}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_ignores_unknown_command() {
        let mut delivery = MockDelivery::new();
        delivery.expect_send().times(0);

        let (status, body) = call_json(
            create_router(delivery),
            "POST",
            "/webhook",
            r#"{"message":{"text":"good morning","chat":{"id":"123"}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_webhook_handles_keyboard_press() {
        let mut delivery = MockDelivery::new();
        delivery
            .expect_send()
            .withf(|message| {
                message.text.starts_with("🤖 Links bot")
                    && message.target_chat_id.as_deref() == Some("55")
            })
            .times(1)
            .returning(|_| DispatchResult::delivered());

        let (status, _) = call_json(
            create_router(delivery),
            "POST",
            "/webhook",
            r#"{"callback_query":{"id":"1","data":"menu","message":{"chat":{"id":55}}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_malformed_payload() {
        let mut delivery = MockDelivery::new();
        delivery.expect_send().times(0);
        let app = create_router(delivery);

        let (status, _) = call_json(app.clone(), "POST", "/webhook", "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) =
            call_json(app, "POST", "/webhook", r#"{"message":{"text":"/help"}}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_debug_reports_configuration() {
        let mut delivery = MockDelivery::new();
        delivery.expect_has_bot_token().return_const(true);
        delivery.expect_has_default_chat().return_const(false);
        delivery.expect_send().times(0);

        let (status, body) = call_json(create_router(delivery), "GET", "/debug", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bot_token_configured"], true);
        assert_eq!(body["default_chat_configured"], false);
        assert_eq!(body["link_count"], 4);
        assert!(body.get("test_send").is_none());
    }

    #[tokio::test]
    async fn test_debug_live_send() {
        let mut delivery = MockDelivery::new();
        delivery.expect_has_bot_token().return_const(true);
        delivery.expect_has_default_chat().return_const(false);
        delivery
            .expect_send()
            .times(1)
            .returning(|_| DispatchResult::failed(DeliveryError::MissingChatId));

        let (status, body) =
            call_json(create_router(delivery), "GET", "/debug?send=true", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["test_send"]["delivered"], false);
        assert_eq!(
            body["test_send"]["reason"],
            "no target chat given and no default chat configured"
        );
    }
}
