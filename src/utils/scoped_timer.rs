use std::time::Instant;

use tracing::debug;

/// Logs how long a dictionary operation took when dropped
pub struct ScopedTimer {
    start: Instant,
    operation: &'static str,
    location: String,
}

impl ScopedTimer {
    pub fn new(
        operation: &'static str,
        location: impl Into<String>,
    ) -> Self {
        Self {
            start: Instant::now(),
            operation,
            location: location.into(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        debug!(
            target: "timing",
            location = %self.location,
            "[TIMING] {} took {} ms",
            self.operation,
            self.elapsed_ms()
        );
    }
}
