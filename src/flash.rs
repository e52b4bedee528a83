use std::time::{Duration, Instant};

/// A single transient message that dismisses itself.
#[derive(Debug)]
pub struct Flash {
    message: Option<(String, Instant)>,
    duration: Duration,
    shown: usize,
}

impl Flash {
    pub fn new(duration: Duration) -> Self {
        Self { message: None, duration, shown: 0 }
    }

    /// Replaces any visible message and restarts the timer.
    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        tracing::warn!(%message, "flash");
        self.message = Some((message, now));
        self.shown += 1;
    }

    /// The visible message, dismissing it once expired.
    pub fn current(&mut self, now: Instant) -> Option<&str> {
        let expired = matches!(
            &self.message,
            Some((_, at)) if now.saturating_duration_since(*at) >= self.duration
        );
        if expired {
            self.message = None;
        }
        self.message.as_ref().map(|(m, _)| m.as_str())
    }

    /// Time left before the visible message goes away.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.message
            .as_ref()
            .map(|(_, at)| self.duration.saturating_sub(now.saturating_duration_since(*at)))
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn shown_count(&self) -> usize {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_after_duration() {
        let mut flash = Flash::new(Duration::from_secs(3));
        let t0 = Instant::now();
        flash.show_at("Missing API key", t0);
        assert_eq!(flash.current(t0 + Duration::from_millis(2999)), Some("Missing API key"));
        assert_eq!(flash.current(t0 + Duration::from_secs(3)), None);
        assert_eq!(flash.current(t0), None);
    }

    #[test]
    fn new_message_replaces_and_restarts() {
        let mut flash = Flash::new(Duration::from_secs(3));
        let t0 = Instant::now();
        flash.show_at("first", t0);
        flash.show_at("second", t0 + Duration::from_secs(2));
        assert_eq!(flash.current(t0 + Duration::from_secs(4)), Some("second"));
        assert_eq!(flash.remaining(t0 + Duration::from_secs(4)), Some(Duration::from_secs(1)));
        assert_eq!(flash.shown_count(), 2);
    }

    #[test]
    fn dismiss_clears_immediately() {
        let mut flash = Flash::new(Duration::from_secs(3));
        flash.show("x");
        flash.dismiss();
        assert_eq!(flash.current(Instant::now()), None);
        assert_eq!(flash.remaining(Instant::now()), None);
    }
}
