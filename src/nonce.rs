use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the `oauth_nonce` of each request.
pub trait NonceSource: Send + Sync {
    /// A non-negative 63-bit value, fresh for every call.
    fn next_nonce(&self) -> u64;
}

/// Produces the `oauth_timestamp` of each request.
pub trait Clock: Send + Sync {
    /// Whole seconds since the Unix epoch.
    fn unix_timestamp(&self) -> u64;
}

/// Pseudo-random nonces from a generator seeded once per client.
///
/// Good enough for replay avoidance, not for anything secret.
#[derive(Debug)]
pub struct RandomNonce {
    rng: Mutex<StdRng>,
}

impl RandomNonce {
    pub fn new() -> Self {
        RandomNonce {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomNonce {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomNonce {
    fn default() -> Self {
        RandomNonce::new()
    }
}

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> u64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random::<u64>() >> 1
    }
}

/// Always returns the same nonce.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub u64);

impl NonceSource for FixedNonce {
    fn next_nonce(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Always returns the same timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> u64 {
        self.0
    }
}
