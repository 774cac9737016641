//! Reachability probes.
//!
//! A probe hands back a `'static` future so the monitor can spawn it and move
//! on; the monitor applies its own timeout around every probe.

use std::collections::HashMap;
use std::net::SocketAddr;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::net::TcpStream;

use crate::config::BackendConfig;
use crate::error::ProbeError;

pub type ProbeFuture = BoxFuture<'static, Result<(), ProbeError>>;

/// Non-blocking reachability check for a backend.
pub trait Probe: Send + Sync {
    fn probe(&self, id: &str) -> ProbeFuture;
}

/// Probe that succeeds when a TCP connection to the backend can be opened.
#[derive(Debug, Default)]
pub struct TcpProbe {
    addresses: HashMap<String, SocketAddr>,
}

impl TcpProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the configured address book, skipping unparsable entries.
    pub fn from_config(backends: &[BackendConfig]) -> Self {
        let mut probe = Self::new();
        for backend in backends {
            match backend.address.parse() {
                Ok(addr) => probe = probe.with_backend(&backend.name, addr),
                Err(_) => tracing::warn!(
                    backend = %backend.name,
                    address = %backend.address,
                    "Invalid backend address, backend will never probe healthy"
                ),
            }
        }
        probe
    }

    pub fn with_backend(mut self, id: &str, addr: SocketAddr) -> Self {
        self.addresses.insert(id.to_string(), addr);
        self
    }
}

impl Probe for TcpProbe {
    fn probe(&self, id: &str) -> ProbeFuture {
        let target = self.addresses.get(id).copied();
        let id = id.to_string();

        async move {
            let addr = target.ok_or(ProbeError::UnknownBackend(id))?;
            TcpStream::connect(addr).await?;
            Ok(())
        }
        .boxed()
    }
}
