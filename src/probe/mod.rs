//! HTTP reachability probes
//!
//! The readiness waiter polls a service address until a plain GET succeeds
//! or the deadline elapses. Scenario traffic checks run `curl` either on the
//! host or inside a pod and look for the demo server's liveness marker.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, warn};

use crate::error::CheckError;

/// Response body the demo image serves on its HTTP port
pub const LIVENESS_MARKER: &str = "HELLO! I AM ALIVE!!!";

/// Deadline-bounded service readiness waiter
#[derive(Clone)]
pub struct ReadinessProbe {
    client: Client,
    retry_interval: Duration,
}

impl ReadinessProbe {
    /// `request_timeout` bounds each probe request; `retry_interval` is the
    /// pause between failed attempts.
    pub fn new(request_timeout: Duration, retry_interval: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create probe client")?;

        Ok(Self {
            client,
            retry_interval,
        })
    }

    /// Probe `http://<service_ip>/` until any response arrives or `timeout`
    /// elapses. Any HTTP status counts as passing traffic; only transport
    /// failures are retried. Deadline expiry is a server fault.
    pub async fn wait_service_status(&self, service_ip: &str, timeout: Duration) -> Result<()> {
        let url = format!("http://{service_ip}");
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline {
            match self.client.get(&url).send().await {
                Ok(response) => {
                    debug!("Service {service_ip} answered with {}", response.status());
                    return Ok(());
                }
                Err(e) => {
                    warn!("No initial traffic is passing through: {e}");
                    sleep(self.retry_interval).await;
                }
            }
        }

        error!(
            "Traffic didn't pass within the period of {}s",
            timeout.as_secs()
        );
        Err(CheckError::ServerFault(timeout.as_secs()).into())
    }
}

/// Fetch an address with `curl` on the host and return its stdout.
///
/// A non-zero exit means the external path is broken and fails the scenario
/// with an unexpected-response error.
pub async fn curl_from_host(addr: &str) -> Result<String> {
    let output = tokio::process::Command::new("curl")
        .arg(addr)
        .output()
        .await
        .context("Failed to spawn curl")?;

    if !output.status.success() {
        return Err(CheckError::UnexpectedResponse(format!(
            "curl {addr} exited with status {:?}",
            output.status.code()
        ))
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Shell command that fetches `addr` from inside a pod
pub fn pod_curl_command(addr: &str) -> Vec<String> {
    vec![
        "/bin/sh".to_string(),
        "-c".to_string(),
        format!("curl {addr}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_http_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    )
                    .await;
            }
        });

        addr.to_string()
    }

    #[tokio::test]
    async fn test_wait_returns_on_first_success() {
        let addr = spawn_http_server().await;
        let probe =
            ReadinessProbe::new(Duration::from_secs(2), Duration::from_millis(50)).unwrap();

        probe
            .wait_service_status(&addr, Duration::from_secs(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_fails_with_server_fault_after_deadline() {
        // Bind then drop to get a port that refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let probe =
            ReadinessProbe::new(Duration::from_millis(200), Duration::from_millis(50)).unwrap();

        let err = probe
            .wait_service_status(&addr, Duration::from_millis(300))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CheckError>(),
            Some(CheckError::ServerFault(_))
        ));
    }

    #[test]
    fn test_pod_curl_command_shape() {
        let cmd = pod_curl_command("10.0.0.5:8080");
        assert_eq!(cmd[0], "/bin/sh");
        assert_eq!(cmd[1], "-c");
        assert_eq!(cmd[2], "curl 10.0.0.5:8080");
    }
}
