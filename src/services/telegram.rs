//! Telegram Bot API delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, TelegramConfig};
use crate::services::Notifier;
use crate::utils::http::create_async_client;

/// Request body shared by `sendMessage`, `sendPhoto` and `sendVideo`.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    chat_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

impl<'a> SendRequest<'a> {
    fn new(chat_id: &'a str) -> Self {
        Self {
            chat_id,
            text: None,
            photo: None,
            video: None,
            caption: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// `Notifier` posting through a Telegram bot.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Build a notifier from configuration. Fails when no token is set.
    pub fn from_config(http: &HttpConfig, telegram: &TelegramConfig) -> Result<Self> {
        let token = telegram
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::config("There is no telegram.token"))?;
        Ok(Self::new(
            create_async_client(http)?,
            &telegram.api_base,
            token,
        ))
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Errors never carry the request URL, since it embeds the bot token.
    async fn call(&self, method: &str, request: &SendRequest<'_>) -> Result<()> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::delivery(method, e.without_url()))?;
        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::delivery(method, format!("{status}: {}", e.without_url())))?;

        if !body.ok {
            let reason = body.description.unwrap_or_else(|| status.to_string());
            return Err(AppError::delivery(method, reason));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        let request = SendRequest {
            text: Some(text),
            ..SendRequest::new(chat_id)
        };
        self.call("sendMessage", &request).await
    }

    async fn send_photo(&self, chat_id: &str, url: &str, caption: &str) -> Result<()> {
        let request = SendRequest {
            photo: Some(url),
            caption: Some(caption),
            ..SendRequest::new(chat_id)
        };
        self.call("sendPhoto", &request).await
    }

    async fn send_video(&self, chat_id: &str, url: &str, caption: &str) -> Result<()> {
        let request = SendRequest {
            video: Some(url),
            caption: Some(caption),
            ..SendRequest::new(chat_id)
        };
        self.call("sendVideo", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url() {
        let notifier =
            TelegramNotifier::new(Client::new(), "https://api.telegram.org/", "123:abc");
        assert_eq!(
            notifier.method_url("sendPhoto"),
            "https://api.telegram.org/bot123:abc/sendPhoto"
        );
    }

    #[test]
    fn test_request_body_omits_unused_fields() {
        let request = SendRequest {
            video: Some("https://x/video.mp4"),
            caption: Some("clip"),
            ..SendRequest::new("@chan")
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chat_id": "@chan",
                "video": "https://x/video.mp4",
                "caption": "clip"
            })
        );
    }

    #[test]
    fn test_from_config_requires_token() {
        let http = HttpConfig::default();
        let telegram = TelegramConfig::default();
        assert!(matches!(
            TelegramNotifier::from_config(&http, &telegram),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let notifier = TelegramNotifier::new(Client::new(), "http://127.0.0.1:9", "123:SECRET");

        let err = notifier.send_text("@chan", "hello").await.unwrap_err();

        assert!(matches!(err, AppError::Delivery { ref method, .. } if method == "sendMessage"));
        assert!(!err.to_string().contains("SECRET"));
        assert!(!format!("{err:?}").contains("SECRET"));
    }

    #[test]
    fn test_api_error_response() {
        let body: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request"}"#)
                .unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Bad Request"));
    }
}
