//! Timeout configuration for vizinha-link client operations.
//!
//! Centralizes every deadline the client enforces: the transport-level
//! request timeout and the operation-level bounds used by the session
//! manager (bootstrap, sign-in, profile load).

use std::time::Duration;

/// Timeout configuration for client operations.
///
/// The session deadlines deliberately differ: a passive bootstrap check must
/// give up quickly and silently, while an explicit sign-in gets more time
/// because a user is waiting on the result.
///
/// # Examples
///
/// ```rust
/// use vizinha_link::VizinhaLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = VizinhaLinkTimeouts::default();
///
/// // Custom deadlines for a slow connection
/// let timeouts = VizinhaLinkTimeouts::builder()
///     .request_timeout(Duration::from_secs(30))
///     .sign_in_timeout(Duration::from_secs(20))
///     .build();
///
/// // Aggressive deadlines for local development
/// let timeouts = VizinhaLinkTimeouts::fast();
/// ```
#[derive(Debug, Clone)]
pub struct VizinhaLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Global per-request timeout applied to every HTTP call.
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Deadline for the passive session check during bootstrap.
    /// On expiry the session manager settles to anonymous, silently.
    /// Default: 5 seconds
    pub session_timeout: Duration,

    /// Deadline for an explicit password sign-in.
    /// Default: 10 seconds
    pub sign_in_timeout: Duration,

    /// Deadline for the profile load that follows a successful sign-in.
    /// On expiry the sign-in still succeeds with a minimal profile.
    /// Default: 5 seconds
    pub load_user_timeout: Duration,

    /// Delay before the deferred bootstrap task runs, so route guards
    /// evaluate against the default anonymous state first.
    /// Default: 500 milliseconds
    pub bootstrap_delay: Duration,
}

impl Default for VizinhaLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            session_timeout: Duration::from_secs(5),
            sign_in_timeout: Duration::from_secs(10),
            load_user_timeout: Duration::from_secs(5),
            bootstrap_delay: Duration::from_millis(500),
        }
    }
}

impl VizinhaLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> VizinhaLinkTimeoutsBuilder {
        VizinhaLinkTimeoutsBuilder::new()
    }

    /// Deadlines suited to fast local development against a nearby backend.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(3),
            session_timeout: Duration::from_secs(1),
            sign_in_timeout: Duration::from_secs(3),
            load_user_timeout: Duration::from_secs(1),
            bootstrap_delay: Duration::from_millis(50),
        }
    }

    /// Deadlines suited to high-latency or unreliable networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            session_timeout: Duration::from_secs(15),
            sign_in_timeout: Duration::from_secs(30),
            load_user_timeout: Duration::from_secs(15),
            bootstrap_delay: Duration::from_millis(500),
        }
    }
}

/// Builder for creating custom [`VizinhaLinkTimeouts`] configurations.
#[derive(Debug, Clone)]
pub struct VizinhaLinkTimeoutsBuilder {
    timeouts: VizinhaLinkTimeouts,
}

impl VizinhaLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: VizinhaLinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the global per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.request_timeout = timeout;
        self
    }

    /// Set the passive bootstrap session-check deadline.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.session_timeout = timeout;
        self
    }

    /// Set the explicit sign-in deadline.
    pub fn sign_in_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.sign_in_timeout = timeout;
        self
    }

    /// Set the post-sign-in profile-load deadline.
    pub fn load_user_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.load_user_timeout = timeout;
        self
    }

    /// Set the deferred-bootstrap delay.
    pub fn bootstrap_delay(mut self, delay: Duration) -> Self {
        self.timeouts.bootstrap_delay = delay;
        self
    }

    /// Build the timeout configuration.
    pub fn build(self) -> VizinhaLinkTimeouts {
        self.timeouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = VizinhaLinkTimeouts::default();
        assert_eq!(timeouts.request_timeout, Duration::from_secs(10));
        assert_eq!(timeouts.session_timeout, Duration::from_secs(5));
        assert_eq!(timeouts.sign_in_timeout, Duration::from_secs(10));
        assert_eq!(timeouts.load_user_timeout, Duration::from_secs(5));
        assert_eq!(timeouts.bootstrap_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_builder() {
        let timeouts = VizinhaLinkTimeouts::builder()
            .request_timeout(Duration::from_secs(60))
            .session_timeout(Duration::from_millis(250))
            .bootstrap_delay(Duration::ZERO)
            .build();

        assert_eq!(timeouts.request_timeout, Duration::from_secs(60));
        assert_eq!(timeouts.session_timeout, Duration::from_millis(250));
        assert_eq!(timeouts.bootstrap_delay, Duration::ZERO);
        // untouched fields keep their defaults
        assert_eq!(timeouts.sign_in_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_fast_preset() {
        let timeouts = VizinhaLinkTimeouts::fast();
        assert!(timeouts.session_timeout <= Duration::from_secs(2));
        assert!(timeouts.sign_in_timeout <= Duration::from_secs(5));
    }

    #[test]
    fn test_relaxed_preset() {
        let timeouts = VizinhaLinkTimeouts::relaxed();
        assert!(timeouts.request_timeout >= Duration::from_secs(30));
        assert!(timeouts.sign_in_timeout >= Duration::from_secs(30));
    }

    #[test]
    fn test_sign_in_outlives_load_user() {
        // The availability contract depends on the profile-load deadline
        // expiring before the sign-in deadline would.
        for timeouts in [
            VizinhaLinkTimeouts::default(),
            VizinhaLinkTimeouts::fast(),
            VizinhaLinkTimeouts::relaxed(),
        ] {
            assert!(timeouts.load_user_timeout <= timeouts.sign_in_timeout);
        }
    }
}
