//! Latency probes against the shared resolver

use crate::resolver::{ResolveStatus, Resolver};
use crate::ChannelError;
use log::debug;

/// A successful, timed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub elapsed_ms: u64,
    /// Whether the resolver reported the name as nonexistent
    pub not_found: bool,
}

impl Probe {
    /// A response at or under the threshold is a cache hit
    pub fn is_fast(&self, threshold_ms: i64) -> bool {
        (self.elapsed_ms as i64) <= threshold_ms
    }
}

/// Issues one timed lookup per call, with no local caching
pub struct Prober<R> {
    resolver: R,
    probes: u64,
}

impl<R: Resolver> Prober<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            probes: 0,
        }
    }

    /// Resolve `name` once and report its latency
    ///
    /// "Name not found" is a successful probe. Any other resolver error is a
    /// [`ChannelError::Resolver`]; callers must not read a latency out of it.
    pub fn probe(&mut self, name: &str) -> Result<Probe, ChannelError> {
        let resolution = self.resolver.resolve(name);
        self.probes += 1;

        let not_found = match resolution.status {
            ResolveStatus::Resolved => false,
            ResolveStatus::NameNotFound => true,
            ResolveStatus::Failed(reason) => {
                return Err(ChannelError::Resolver {
                    name: name.to_string(),
                    reason,
                })
            }
        };

        debug!("{}: {} ms", name, resolution.elapsed_ms);
        Ok(Probe {
            elapsed_ms: resolution.elapsed_ms,
            not_found,
        })
    }

    /// Number of lookups issued so far, failed ones included
    pub fn probes(&self) -> u64 {
        self.probes
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn into_resolver(self) -> R {
        self.resolver
    }
}
