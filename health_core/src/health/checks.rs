//! Reference health checks

use crate::error::{HealthError, Result};
use std::path::PathBuf;
use tokio::{fs, net::TcpStream};

#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Wraps a synchronous closure.
pub struct FnCheck {
    name: String,
    check_fn: Box<dyn Fn() -> Result<()> + Send + Sync>,
}

impl FnCheck {
    pub fn new<F>(name: impl Into<String>, check_fn: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check_fn: Box::new(check_fn),
        }
    }
}

#[async_trait::async_trait]
impl HealthCheck for FnCheck {
    async fn check(&self) -> Result<()> {
        (self.check_fn)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Passes when every path exists and its metadata can be read.
pub struct FilesystemCheck {
    paths: Vec<PathBuf>,
}

impl FilesystemCheck {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait::async_trait]
impl HealthCheck for FilesystemCheck {
    async fn check(&self) -> Result<()> {
        let mut issues = Vec::new();

        for path in &self.paths {
            if let Err(e) = fs::metadata(path).await {
                issues.push(format!("{}: {}", path.display(), e));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(HealthError::check_failed(format!(
                "Filesystem access failed: {}",
                issues.join(", ")
            )))
        }
    }

    fn name(&self) -> &str {
        "filesystem"
    }
}

/// Passes when a TCP connection to `address` can be opened.
pub struct TcpCheck {
    name: String,
    address: String,
}

impl TcpCheck {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Names the check after the address, e.g. `tcp:localhost:5432`.
    pub fn for_address(address: impl Into<String>) -> Self {
        let address = address.into();
        Self::new(format!("tcp:{}", address), address)
    }
}

#[async_trait::async_trait]
impl HealthCheck for TcpCheck {
    async fn check(&self) -> Result<()> {
        TcpStream::connect(&self.address)
            .await
            .map(drop)
            .map_err(|e| HealthError::check_failed(format!("connect to {} failed: {}", self.address, e)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
