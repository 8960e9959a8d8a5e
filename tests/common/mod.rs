//! Simulated caching resolver shared by both ends of a test channel

#![allow(dead_code)]

use dns_cache_channel::{Resolution, ResolveStatus, Resolver};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Mean latency of a cached answer (ms)
pub const HIT_MEAN_MS: f64 = 3.0;

/// Mean latency of an uncached answer (ms)
pub const MISS_MEAN_MS: f64 = 40.0;

/// Threshold comfortably between the two distributions
pub const THRESHOLD_MS: i64 = 10;

struct Inner {
    cache: HashSet<String>,
    rng: StdRng,
    hit: Normal<f64>,
    miss: Normal<f64>,
    lookups: usize,
    fail_at: Option<usize>,
}

/// A resolver whose cache every clone shares
///
/// First lookup of a name is a miss, later ones are hits. Latencies are drawn
/// from normal distributions with a fixed RNG seed so runs are reproducible.
#[derive(Clone)]
pub struct SimulatedCache(Rc<RefCell<Inner>>);

impl SimulatedCache {
    pub fn new(rng_seed: u64) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            cache: HashSet::new(),
            rng: StdRng::seed_from_u64(rng_seed),
            hit: Normal::new(HIT_MEAN_MS, 0.3).unwrap(),
            miss: Normal::new(MISS_MEAN_MS, 4.0).unwrap(),
            lookups: 0,
            fail_at: None,
        })))
    }

    /// Make the `n`-th lookup (1-based) and every later one fail
    pub fn fail_from(self, n: usize) -> Self {
        self.0.borrow_mut().fail_at = Some(n);
        self
    }

    pub fn lookups(&self) -> usize {
        self.0.borrow().lookups
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.0.borrow().cache.contains(name)
    }
}

impl Resolver for SimulatedCache {
    fn resolve(&mut self, name: &str) -> Resolution {
        let mut inner = self.0.borrow_mut();
        inner.lookups += 1;

        if inner.fail_at.is_some_and(|n| inner.lookups >= n) {
            return Resolution {
                elapsed_ms: 0,
                status: ResolveStatus::Failed("connection refused".to_string()),
            };
        }

        let miss = inner.cache.insert(name.to_string());
        let dist = if miss { inner.miss } else { inner.hit };
        let elapsed_ms = dist.sample(&mut inner.rng).max(0.0) as u64;

        Resolution {
            elapsed_ms,
            status: ResolveStatus::NameNotFound,
        }
    }
}

/// Reader yielding at most `chunk` bytes per call
pub struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> Trickle<'a> {
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        Self { data, chunk }
    }
}

impl std::io::Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}
