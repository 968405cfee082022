//! InvertirOnline quotations client.
//!
//! Authenticates with a password-grant token per fetch, pulls the
//! caucion quote board and picks the row for the requested term.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::rate::errors::UpstreamError;
use crate::rate::fetcher::RateFetcher;
use crate::rate::iol::types::{QuoteBoard, TokenResponse};
use crate::rate::types::{RateSample, RateTerm};
use crate::time;

#[derive(Clone)]
pub struct IolClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl IolClient {
    pub fn new(
        base_url: String,
        username: String,
        password: String,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url,
            username,
            password,
        })
    }

    async fn request_token(&self) -> Result<String, UpstreamError> {
        let url = format!("{}/token", self.base_url);

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
                ("grant_type", "password"),
            ])
            .send()
            .await?;

        // The token endpoint reports bad credentials as 400/401.
        let status = resp.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(UpstreamError::Auth);
        }

        let token: TokenResponse = resp.error_for_status()?.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl RateFetcher for IolClient {
    #[instrument(skip(self), fields(term = %term), level = "debug")]
    async fn fetch_sample(&self, term: RateTerm) -> Result<RateSample, UpstreamError> {
        let token = self.request_token().await?;

        let url = format!(
            "{}/api/v2/Cotizaciones/cauciones/argentina/Todos",
            self.base_url
        );

        let board: QuoteBoard = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let row = board
            .titulos
            .iter()
            .find(|t| t.plazo == term.wire_code())
            .ok_or(UpstreamError::MissingTerm(term.wire_code()))?;

        debug!(rate = row.rate, rows = board.titulos.len(), "caucion board fetched");

        Ok(RateSample {
            value: row.rate,
            observed_at_ms: time::now_ms(),
        })
    }
}
