//! Session lifecycle state machine
//!
//! Holds identity (username, token) and connection state for one session.
//! The token is non-null exactly while the state is Connecting or
//! Connected; `reset` restores the logged-out state wholesale.

/// Connection state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No identity, no channel.
    LoggedOut,
    /// Credentials accepted, channel opening.
    Connecting,
    /// Channel open, events flowing.
    Connected,
}

/// The one session owned by the client.
#[derive(Debug, Clone)]
pub struct Session {
    username: Option<String>,
    token: Option<String>,
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            username: None,
            token: None,
            state: SessionState::LoggedOut,
        }
    }

    /// Adopt credentials returned by a successful login and move to
    /// Connecting. The caller opens the channel next.
    pub fn begin(&mut self, username: String, token: String) {
        self.username = Some(username);
        self.token = Some(token);
        self.state = SessionState::Connecting;
    }

    /// The channel opened.
    pub fn mark_connected(&mut self) {
        if self.token.is_some() {
            self.state = SessionState::Connected;
        }
    }

    /// Tear the session down: logout, or any transport failure.
    pub fn reset(&mut self) {
        self.username = None;
        self.token = None;
        self.state = SessionState::LoggedOut;
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_transitions() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.token().is_none());

        session.begin("alice".to_string(), "tok-1".to_string());
        assert_eq!(session.state(), SessionState::Connecting);
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(session.token(), Some("tok-1"));

        session.mark_connected();
        assert!(session.is_connected());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new();
        session.begin("alice".to_string(), "tok-1".to_string());
        session.mark_connected();

        session.reset();

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert!(session.username().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_token_present_iff_not_logged_out() {
        let mut session = Session::new();
        assert_eq!(session.token().is_some(), session.state() != SessionState::LoggedOut);

        session.begin("alice".to_string(), "tok-1".to_string());
        assert_eq!(session.token().is_some(), session.state() != SessionState::LoggedOut);

        session.mark_connected();
        assert_eq!(session.token().is_some(), session.state() != SessionState::LoggedOut);

        session.reset();
        assert_eq!(session.token().is_some(), session.state() != SessionState::LoggedOut);
    }

    #[test]
    fn test_mark_connected_without_token_is_a_no_op() {
        let mut session = Session::new();
        session.mark_connected();
        assert_eq!(session.state(), SessionState::LoggedOut);
    }
}
