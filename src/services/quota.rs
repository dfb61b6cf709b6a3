//! Per-credential request quota using fixed windows.

use crate::{config::QuotaConfig, services::clock::Clock};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

/// Counting state for a single credential
#[derive(Debug, Clone)]
struct CredentialState {
    /// Start of the current window; `None` until the first request
    window_start: Option<DateTime<Utc>>,
    count: u32,
}

/// Fixed-window quota gate keyed by API credential
///
/// The credential set is fixed at construction. Each credential owns its own
/// lock, so admissions for different credentials never contend, while admissions
/// for the same credential are serialized: the window check and the increment
/// happen inside one critical section.
#[derive(Debug)]
pub struct QuotaGate {
    max_requests: u32,
    window: TimeDelta,
    credentials: HashMap<String, Mutex<CredentialState>>,
    clock: Arc<dyn Clock>,
}

impl QuotaGate {
    /// Create a gate for the credentials listed in `config`
    ///
    /// No credential has a window yet, so its first request opens one.
    pub fn new(config: &QuotaConfig, clock: Arc<dyn Clock>) -> Self {
        let window = window_from_secs(config.window_seconds);

        let credentials = config
            .api_keys
            .iter()
            .map(|key| {
                (
                    key.clone(),
                    Mutex::new(CredentialState {
                        window_start: None,
                        count: 0,
                    }),
                )
            })
            .collect();

        Self {
            max_requests: config.max_requests,
            window,
            credentials,
            clock,
        }
    }

    /// Whether `credential` belongs to the registered set
    pub fn is_known(&self, credential: &str) -> bool {
        self.credentials.contains_key(credential)
    }

    /// Decide whether a request for `credential` may proceed
    ///
    /// Admitted requests are counted against the current window. Unknown
    /// credentials are refused without touching any state.
    pub fn admit(&self, credential: &str) -> bool {
        let Some(cell) = self.credentials.get(credential) else {
            return false;
        };

        let mut state = cell.lock();
        let now = self.clock.now();

        if self.window_elapsed(&state, now) {
            state.window_start = Some(now);
            state.count = 1;
            return true;
        }

        state.count = state.count.saturating_add(1);
        state.count <= self.max_requests
    }

    /// Admissions left in the current window, or `None` for unknown credentials
    pub fn remaining(&self, credential: &str) -> Option<u32> {
        let cell = self.credentials.get(credential)?;
        let state = cell.lock();

        if self.window_elapsed(&state, self.clock.now()) {
            Some(self.max_requests)
        } else {
            Some(self.max_requests.saturating_sub(state.count))
        }
    }

    /// Registered credentials, in no particular order
    pub fn credentials(&self) -> impl Iterator<Item = &str> {
        self.credentials.keys().map(String::as_str)
    }

    /// Whether `now` lies past the credential's current window
    ///
    /// A window whose end is not representable never elapses.
    fn window_elapsed(&self, state: &CredentialState, now: DateTime<Utc>) -> bool {
        match state.window_start {
            None => true,
            Some(start) => start
                .checked_add_signed(self.window)
                .is_some_and(|end| now >= end),
        }
    }
}

fn window_from_secs(secs: u64) -> TimeDelta {
    // TimeDelta::seconds panics above i64::MAX milliseconds
    let secs = secs.min((i64::MAX / 1_000) as u64) as i64;
    TimeDelta::seconds(secs)
}
