//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `rowsync-provider-google`) using JSON over stdin/stdout.
//!
//! Any executable that speaks the JSON protocol can be a provider.
//! Providers manage their own credentials; core only passes along the
//! calendar id and the `[remote]` parameters from the config.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{RowSyncError, RowSyncResult};
use crate::remote::protocol::{Command, ProviderCommand, Request, Response};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("rowsync-provider-{}", self.0)
    }

    pub fn is_installed(&self) -> bool {
        self.binary_path().is_ok()
    }

    fn binary_path(&self) -> RowSyncResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| RowSyncError::ProviderNotInstalled(binary_name))
    }

    /// Call a typed provider command and return the result.
    ///
    /// The response type is inferred from the command's associated type.
    pub async fn call<C: ProviderCommand>(
        &self,
        cmd: C,
        limit: Duration,
    ) -> RowSyncResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| RowSyncError::ProviderTimeout(limit.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> RowSyncResult<R> {
        let params = serde_json::to_value(params)?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.0, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RowSyncError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RowSyncError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(RowSyncError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(RowSyncError::Provider(
                "Provider returned no response".into(),
            ));
        }

        parse_response(&response_str)
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(raw: &str) -> RowSyncResult<R> {
    let response: Response<R> = serde_json::from_str(raw.trim())
        .map_err(|e| RowSyncError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::NotFound { error } => Err(RowSyncError::NotFound(error)),
        Response::Error { error } => Err(RowSyncError::Provider(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_name_is_prefixed() {
        assert_eq!(
            Provider::from_name("google").binary_name(),
            "rowsync-provider-google"
        );
    }

    #[test]
    fn not_found_responses_map_to_not_found() {
        let err = parse_response::<()>(r#"{"status":"not_found","error":"abc"}"#).unwrap_err();
        assert!(err.is_not_found());

        let err = parse_response::<()>(r#"{"status":"error","error":"boom"}"#).unwrap_err();
        assert!(matches!(err, RowSyncError::Provider(msg) if msg == "boom"));
    }

    #[test]
    fn garbage_response_is_a_provider_error() {
        let err = parse_response::<String>("not json").unwrap_err();
        assert!(matches!(err, RowSyncError::Provider(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let provider = Provider::from_name("definitely-not-installed-xyz");
        let err = provider
            .call(
                crate::remote::protocol::TimeZone {
                    target: crate::remote::protocol::Target {
                        calendar_id: "primary".into(),
                        remote_config: Default::default(),
                    },
                },
                DEFAULT_PROVIDER_TIMEOUT,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RowSyncError::ProviderNotInstalled(name) if name == "rowsync-provider-definitely-not-installed-xyz"));
    }
}
