//! Local fixture site lifecycle.

use std::{path::Path, process::Stdio, time::Duration};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    process::{Child, Command},
    time::{sleep, Instant},
};
use tracing::{debug, info};

const FIXTURE_PACKAGE: &str = "translit-web";

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot derive a socket address from {0:?}")]
    BadUrl(String),

    #[error("failed to start the fixture site: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{address} not reachable after {}ms", .timeout.as_millis())]
    Unreachable { address: String, timeout: Duration },
}

/// `host:port` of an `http://` URL, defaulting the port to 80.
pub fn socket_address(url: &str) -> Option<String> {
    let rest = url.strip_prefix("http://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    if authority.is_empty() {
        return None;
    }
    if authority.contains(':') {
        Some(authority.to_string())
    } else {
        Some(format!("{}:80", authority))
    }
}

/// Retries a TCP connection to `address` until it succeeds or `timeout` elapses.
pub async fn wait_until_reachable(address: &str, timeout: Duration) -> Result<(), FixtureError> {
    let deadline = Instant::now() + timeout;
    loop {
        match TcpStream::connect(address).await {
            Ok(_) => return Ok(()),
            Err(err) => debug!(address = address, %err, "fixture not reachable yet"),
        }
        if Instant::now() >= deadline {
            return Err(FixtureError::Unreachable {
                address: address.to_string(),
                timeout,
            });
        }
        sleep(Duration::from_millis(200)).await;
    }
}

/// The fixture site, run through `cargo run` from the workspace root and killed
/// when dropped.
pub struct FixtureServer {
    child: Child,
}

impl FixtureServer {
    pub async fn start(
        workspace: &Path,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FixtureError> {
        let address =
            socket_address(base_url).ok_or_else(|| FixtureError::BadUrl(base_url.to_string()))?;

        let child = Command::new("cargo")
            .args(["run", "-p", FIXTURE_PACKAGE])
            .current_dir(workspace)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let server = FixtureServer { child };

        wait_until_reachable(&address, timeout).await?;
        info!(address = address.as_str(), "fixture site up");
        Ok(server)
    }

    pub async fn stop(mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}
