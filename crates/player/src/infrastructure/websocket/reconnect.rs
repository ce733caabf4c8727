//! Runtime-free core of the push channel's reconnect policy.
//!
//! Reconnects wait a fixed delay, target the other endpoint every time and
//! never give up. There is no backoff growth and no attempt limit.

use std::time::Duration;

use crate::infrastructure::endpoints::EndpointRole;

/// Wait between losing a connection and the next connect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Fixed-interval, endpoint-alternating reconnect schedule.
#[derive(Debug, Clone)]
pub struct ReconnectSchedule {
    delay: Duration,
    target: EndpointRole,
    attempts: u64,
}

impl Default for ReconnectSchedule {
    fn default() -> Self {
        Self::new(RECONNECT_DELAY)
    }
}

impl ReconnectSchedule {
    /// Start on the primary.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            target: EndpointRole::Primary,
            attempts: 0,
        }
    }

    /// Endpoint the next connect attempt goes to.
    pub fn target(&self) -> EndpointRole {
        self.target
    }

    /// Reconnect attempts since the last successful connect.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn mark_connected(&mut self) {
        self.attempts = 0;
    }

    /// Record a lost or failed connection.
    ///
    /// Flips the target unconditionally and returns the delay to wait before
    /// connecting to it.
    pub fn next_attempt(&mut self) -> (Duration, EndpointRole) {
        self.attempts = self.attempts.saturating_add(1);
        self.target = self.target.other();
        (self.delay, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_primary_and_alternates_strictly() {
        let mut schedule = ReconnectSchedule::default();
        assert_eq!(schedule.target(), EndpointRole::Primary);

        let targets: Vec<_> = (0..4).map(|_| schedule.next_attempt().1).collect();

        assert_eq!(
            targets,
            vec![
                EndpointRole::Secondary,
                EndpointRole::Primary,
                EndpointRole::Secondary,
                EndpointRole::Primary,
            ]
        );
    }

    #[test]
    fn delay_is_fixed_and_attempts_are_unbounded() {
        let mut schedule = ReconnectSchedule::default();
        for _ in 0..1_000 {
            let (delay, _) = schedule.next_attempt();
            assert_eq!(delay, RECONNECT_DELAY);
        }
        assert_eq!(schedule.attempts(), 1_000);
    }

    #[test]
    fn successful_connect_resets_count_but_not_target() {
        let mut schedule = ReconnectSchedule::default();
        schedule.next_attempt();
        schedule.mark_connected();

        assert_eq!(schedule.attempts(), 0);
        assert_eq!(schedule.target(), EndpointRole::Secondary);
    }
}
