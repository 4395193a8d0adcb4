use std::time::{Duration, Instant};

/// Link liveness, as observed from received traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    Disconnected,
    Connected,
}

/// Connection health monitor: liveness detection and reconnection marking.
///
/// The link starts `Disconnected`. The first successfully decoded frame
/// marks it up and stamps the connection time; `connection_timeout` of
/// silence marks it down again. The connection time is what the
/// change-triggered sender watches to force a full resync after each
/// (re)connection.
///
/// The monitor never reads the clock itself; every call takes `now` from
/// the host's timer.
#[derive(Debug)]
pub struct ConnectionMonitor {
    state: LinkState,
    timeout: Duration,
    last_contact: Option<Instant>,
    last_connection_time: Option<Instant>,
}

impl ConnectionMonitor {
    /// Default silence window after which the link is declared down.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

    pub fn new(timeout: Duration) -> Self {
        Self {
            state: LinkState::Disconnected,
            timeout,
            last_contact: None,
            last_connection_time: None,
        }
    }

    /// Record successful contact (one decoded frame).
    ///
    /// On a down-to-up transition this stamps a fresh connection time,
    /// which triggers the full-resync path downstream.
    pub fn record_contact(&mut self, now: Instant) {
        self.last_contact = Some(now);
        if self.state == LinkState::Disconnected {
            self.state = LinkState::Connected;
            self.last_connection_time = Some(now);
            tracing::info!("link up");
        }
    }

    /// Declare the link down if it has been silent for the full timeout.
    ///
    /// Returns true when this call performed the up-to-down transition.
    /// Driven by the host's watchdog timer, not the scheduler tick.
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        if self.state != LinkState::Connected {
            return false;
        }
        let silent = match self.last_contact {
            Some(last) => now.saturating_duration_since(last) >= self.timeout,
            None => true,
        };
        if silent {
            self.state = LinkState::Disconnected;
            tracing::warn!(timeout = ?self.timeout, "connection timed out");
        }
        silent
    }

    /// Queryable liveness flag.
    pub fn is_up(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// When the link last transitioned to up, if it ever has.
    pub fn last_connection_time(&self) -> Option<Instant> {
        self.last_connection_time
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(2000);

    #[test]
    fn starts_disconnected() {
        let monitor = ConnectionMonitor::new(TIMEOUT);
        assert!(!monitor.is_up());
        assert_eq!(monitor.last_connection_time(), None);
    }

    #[test]
    fn first_contact_brings_link_up() {
        let mut monitor = ConnectionMonitor::new(TIMEOUT);
        let now = Instant::now();

        monitor.record_contact(now);
        assert!(monitor.is_up());
        assert_eq!(monitor.last_connection_time(), Some(now));
    }

    #[test]
    fn contact_while_up_does_not_restamp_connection_time() {
        let mut monitor = ConnectionMonitor::new(TIMEOUT);
        let start = Instant::now();

        monitor.record_contact(start);
        monitor.record_contact(start + Duration::from_millis(500));
        assert_eq!(monitor.last_connection_time(), Some(start));
    }

    #[test]
    fn goes_down_at_timeout_and_stays_down() {
        let mut monitor = ConnectionMonitor::new(TIMEOUT);
        let start = Instant::now();
        monitor.record_contact(start);

        assert!(!monitor.check_timeout(start + Duration::from_millis(1999)));
        assert!(monitor.is_up());

        assert!(monitor.check_timeout(start + TIMEOUT));
        assert!(!monitor.is_up());

        // Repeated checks report the transition only once.
        assert!(!monitor.check_timeout(start + Duration::from_millis(5000)));
        assert!(!monitor.is_up());
    }

    #[test]
    fn reconnection_stamps_a_new_connection_time() {
        let mut monitor = ConnectionMonitor::new(TIMEOUT);
        let start = Instant::now();
        monitor.record_contact(start);
        monitor.check_timeout(start + TIMEOUT);

        let later = start + Duration::from_millis(6000);
        monitor.record_contact(later);
        assert!(monitor.is_up());
        assert_eq!(monitor.last_connection_time(), Some(later));
    }

    #[test]
    fn fresh_contact_resets_the_silence_window() {
        let mut monitor = ConnectionMonitor::new(TIMEOUT);
        let start = Instant::now();
        monitor.record_contact(start);
        monitor.record_contact(start + Duration::from_millis(1500));

        assert!(!monitor.check_timeout(start + Duration::from_millis(3000)));
        assert!(monitor.is_up());
    }
}
