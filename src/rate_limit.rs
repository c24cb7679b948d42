use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::errors::AppError;

/// Sliding-window call budget: at most `max_calls` acquisitions within any
/// trailing `window`.
pub(crate) struct SlidingWindowLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    pub fn per_hour(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(60 * 60))
    }

    pub fn try_acquire(&self) -> Result<(), AppError> {
        self.try_acquire_at(Instant::now())
    }

    /// Prunes timestamps older than the window, then records `now` if the
    /// budget allows it.
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), AppError> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| AppError::RateLimit("limiter state poisoned".into()))?;

        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) > self.window {
                calls.pop_front();
            } else {
                break;
            }
        }

        if calls.len() >= self.max_calls {
            return Err(AppError::RateLimit(format!(
                "{} calls per {}s used",
                self.max_calls,
                self.window.as_secs()
            )));
        }
        calls.push_back(now);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.calls
            .lock()
            .map(|c| self.max_calls.saturating_sub(c.len()))
            .unwrap_or(0)
    }
}
