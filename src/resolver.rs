//! Name resolution service binding
//!
//! The channel treats the resolver as a timing oracle: it only cares how long a
//! lookup took and whether the resolver itself worked. A negative answer
//! ("no such name") is as good as a positive one, since its latency still
//! reveals whether the resolver had it cached.

use std::ffi::{CStr, CString};
use std::time::Instant;

/// Outcome class of a single lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStatus {
    /// The name resolved to at least one address
    Resolved,
    /// The resolver answered that the name does not exist
    NameNotFound,
    /// The resolver could not produce an answer at all
    Failed(String),
}

/// A timed lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Wall-clock time spent in the lookup, truncated to whole milliseconds
    pub elapsed_ms: u64,
    pub status: ResolveStatus,
}

/// A synchronous, cache-backed name resolution service
pub trait Resolver {
    /// Issue exactly one lookup for `name` and time it
    fn resolve(&mut self, name: &str) -> Resolution;
}

impl<R: Resolver + ?Sized> Resolver for &mut R {
    fn resolve(&mut self, name: &str) -> Resolution {
        (**self).resolve(name)
    }
}

/// The host's stub resolver, reached through `getaddrinfo(3)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for SystemResolver {
    fn resolve(&mut self, name: &str) -> Resolution {
        let start = Instant::now();
        let status = getaddrinfo_status(name);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        Resolution { elapsed_ms, status }
    }
}

fn getaddrinfo_status(name: &str) -> ResolveStatus {
    let host = match CString::new(name) {
        Ok(host) => host,
        Err(_) => return ResolveStatus::Failed(format!("invalid host name {:?}", name)),
    };

    let mut result: *mut libc::addrinfo = std::ptr::null_mut();
    // SAFETY: `host` is a valid NUL-terminated string, service and hints may be
    // null, and `result` is a valid out-pointer.
    let rc = unsafe {
        libc::getaddrinfo(
            host.as_ptr(),
            std::ptr::null(),
            std::ptr::null(),
            &mut result,
        )
    };

    match rc {
        0 => {
            // SAFETY: a zero return hands us ownership of the list.
            unsafe { libc::freeaddrinfo(result) };
            ResolveStatus::Resolved
        }
        libc::EAI_NONAME => ResolveStatus::NameNotFound,
        code => {
            // SAFETY: gai_strerror returns a pointer to a static string.
            let reason = unsafe { CStr::from_ptr(libc::gai_strerror(code)) };
            ResolveStatus::Failed(reason.to_string_lossy().into_owned())
        }
    }
}
