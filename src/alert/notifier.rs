//! Alert delivery over the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::alert::band::AlertKind;
use crate::alert::bounds::ThresholdBounds;
use crate::time;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram rejected the message: {0}")]
    Rejected(String),
}

/// Transport for crossing notifications.
///
/// A delivery failure is reported to the caller but never affects the
/// crossing state, which has already committed by the time dispatch
/// runs.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send_alert(
        &self,
        value: f64,
        kind: AlertKind,
        bounds: ThresholdBounds,
    ) -> Result<(), DeliveryError>;

    /// Connectivity probe, exposed for an administrative "test message"
    /// action.
    async fn send_test_message(&self) -> Result<(), DeliveryError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    http: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        base_url: String,
        token: String,
        chat_id: String,
    ) -> Result<Self, DeliveryError> {
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            http,
            base_url,
            token,
            chat_id,
        })
    }

    /// Builds a notifier from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`,
    /// or `None` when either is unset.
    pub fn from_env() -> Option<Result<Self, DeliveryError>> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        Some(Self::new(
            "https://api.telegram.org".to_string(),
            token,
            chat_id,
        ))
    }

    async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let resp: ApiResponse = self
            .http
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            return Err(DeliveryError::Rejected(
                resp.description.unwrap_or_else(|| "no description".to_string()),
            ));
        }

        debug!("telegram message accepted");
        Ok(())
    }
}

/// Message body for a crossing alert.
fn format_alert(value: f64, kind: AlertKind, bounds: ThresholdBounds, time_label: &str) -> String {
    match kind {
        AlertKind::High => format!(
            "*Caucion rate alert: HIGH*\n\nRate: *{value:.2}%*\nCeiling: {:.2}%\nTime: {time_label}",
            bounds.max
        ),
        AlertKind::Low => format!(
            "*Caucion rate alert: LOW*\n\nRate: *{value:.2}%*\nFloor: {:.2}%\nTime: {time_label}",
            bounds.min
        ),
    }
}

#[async_trait]
impl AlertNotifier for TelegramNotifier {
    async fn send_alert(
        &self,
        value: f64,
        kind: AlertKind,
        bounds: ThresholdBounds,
    ) -> Result<(), DeliveryError> {
        let label = time::time_label(time::now_ms());
        self.send_message(&format_alert(value, kind, bounds, &label))
            .await?;

        info!(value, kind = kind.as_str(), "crossing alert delivered");
        Ok(())
    }

    async fn send_test_message(&self) -> Result<(), DeliveryError> {
        let text = format!(
            "*Caucion monitor connected*\n\nAlerts fire when the rate leaves the configured band.\nTime: {}",
            time::time_label(time::now_ms())
        );
        self.send_message(&text).await
    }
}

/// Transport-free notifier used when no bot is configured. Alerts are
/// logged and reported as delivered.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl AlertNotifier for LogNotifier {
    async fn send_alert(
        &self,
        value: f64,
        kind: AlertKind,
        bounds: ThresholdBounds,
    ) -> Result<(), DeliveryError> {
        info!(
            value,
            kind = kind.as_str(),
            min = bounds.min,
            max = bounds.max,
            "crossing alert (telegram disabled)"
        );
        Ok(())
    }

    async fn send_test_message(&self) -> Result<(), DeliveryError> {
        info!("test message (telegram disabled)");
        Ok(())
    }
}
