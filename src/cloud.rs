//! EO cloud API client
//!
//! The EO Mini has no local interface; charger state is read from the EO
//! cloud over HTTPS. This module provides the authenticated client plus the
//! [`CloudSession`] seam the coordinator polls through, so tests can script
//! a fake transport.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};

use crate::config::CloudConfig;
use crate::error::{EosError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::snapshot::LiveSnapshot;

/// Transport seam between the coordinator and the EO cloud
#[async_trait]
pub trait CloudSession: Send {
    /// Serial of the charger this account monitors
    async fn charger_serial(&mut self) -> Result<String>;

    /// Latest live session document
    async fn live_snapshot(&mut self) -> Result<LiveSnapshot>;
}

/// Authenticated HTTP client for the EO cloud API
pub struct EoCloudClient {
    config: CloudConfig,
    http: reqwest::Client,
    token: Option<String>,
    logger: StructuredLogger,
}

impl EoCloudClient {
    /// Create a new client; no network traffic until the first request
    pub fn new(config: CloudConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            config,
            http,
            token: None,
            logger: get_logger("cloud"),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Password-grant token request; caches the bearer token
    async fn login(&mut self) -> Result<String> {
        if self.config.username.trim().is_empty() {
            return Err(EosError::auth("EO cloud username is not configured"));
        }

        let resp = self
            .http
            .post(self.endpoint("/Token"))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, concat!("eos/", env!("CARGO_PKG_VERSION")))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED || resp.status() == StatusCode::BAD_REQUEST {
            return Err(EosError::auth("EO cloud rejected the credentials"));
        }
        if !resp.status().is_success() {
            return Err(EosError::api(format!(
                "Token request failed: {}",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp.json().await?;
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EosError::auth("Token response missing access_token"))?
            .to_string();

        self.logger.debug("Obtained EO cloud bearer token");
        self.token = Some(token.clone());
        Ok(token)
    }

    async fn bearer_token(&mut self) -> Result<String> {
        match &self.token {
            Some(token) => Ok(token.clone()),
            None => self.login().await,
        }
    }

    /// Authenticated GET with a single re-auth on 401
    async fn get_json(&mut self, path: &str) -> Result<serde_json::Value> {
        for attempt in 0..2 {
            let token = self.bearer_token().await?;
            let resp = self
                .http
                .get(self.endpoint(path))
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .header(ACCEPT, "application/json")
                .send()
                .await?;

            if resp.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                self.logger.warn("Bearer token rejected, re-authenticating");
                self.token = None;
                continue;
            }
            if !resp.status().is_success() {
                return Err(EosError::api(format!(
                    "GET {} failed: {}",
                    path,
                    resp.status()
                )));
            }
            return Ok(resp.json().await?);
        }

        Err(EosError::auth("Re-authentication did not yield a usable token"))
    }
}

#[async_trait]
impl CloudSession for EoCloudClient {
    async fn charger_serial(&mut self) -> Result<String> {
        // An explicitly configured serial wins over discovery
        if let Some(serial) = &self.config.serial {
            return Ok(serial.clone());
        }

        let body = self.get_json("/api/mini/list").await?;
        let minis = body
            .as_array()
            .ok_or_else(|| EosError::api("Charger list is not an array"))?;

        let first = minis
            .first()
            .ok_or_else(|| EosError::api("Account has no chargers"))?;
        extract_serial(first)
            .ok_or_else(|| EosError::api("Charger entry has no usable serial"))
    }

    async fn live_snapshot(&mut self) -> Result<LiveSnapshot> {
        let body = self.get_json("/api/session/alt").await?;
        LiveSnapshot::from_value(body)
    }
}

/// Pull the hub serial out of a charger list entry. The API has reported it
/// both as a string and as a bare number across firmware versions.
fn extract_serial(entry: &serde_json::Value) -> Option<String> {
    let field = entry.get("hubSerialNo").or_else(|| entry.get("serial"))?;
    match field {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_serial_handles_both_wire_shapes() {
        let entry = serde_json::json!({"hubSerialNo": "EO-00472"});
        assert_eq!(extract_serial(&entry), Some("EO-00472".to_string()));

        let entry = serde_json::json!({"hubSerialNo": 472});
        assert_eq!(extract_serial(&entry), Some("472".to_string()));

        let entry = serde_json::json!({"name": "garage"});
        assert_eq!(extract_serial(&entry), None);
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let mut config = CloudConfig::default();
        config.base_url = "https://eoappi.eocharging.com/".to_string();
        let client = EoCloudClient::new(config).unwrap();
        assert_eq!(
            client.endpoint("/api/session/alt"),
            "https://eoappi.eocharging.com/api/session/alt"
        );
    }

    #[test]
    fn configured_serial_short_circuits_discovery() {
        let mut config = CloudConfig::default();
        config.serial = Some("EO-1".to_string());
        let mut client = EoCloudClient::new(config).unwrap();

        let serial = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(client.charger_serial())
            .unwrap();
        assert_eq!(serial, "EO-1");
    }
}
