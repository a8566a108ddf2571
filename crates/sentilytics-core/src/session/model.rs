//! Session model.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// The authenticated identity and credential token bound to this client.
///
/// The only ways to build a session are [`Session::anonymous`] and
/// [`Session::authenticated`], so `is_authenticated()` always equals
/// "token present and user present".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
}

impl Session {
    /// The signed-out session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session for `user` holding `token`.
    pub fn authenticated(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// How far a register-then-login sequence got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationStage {
    /// The account exists but the follow-up login has not succeeded yet.
    Registered,
    /// The follow-up login succeeded.
    LoggedIn,
}

/// The most recent register-then-login sequence.
///
/// Kept in application state so the caller can retry only the failed step
/// while `stage` is [`RegistrationStage::Registered`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub email: String,
    pub stage: RegistrationStage,
}

impl PendingRegistration {
    pub fn registered(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            stage: RegistrationStage::Registered,
        }
    }

    /// The same registration with its login step done.
    pub fn logged_in(self) -> Self {
        Self {
            stage: RegistrationStage::LoggedIn,
            ..self
        }
    }

    /// Whether the login step is still outstanding.
    pub fn is_pending(&self) -> bool {
        self.stage == RegistrationStage::Registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            email: "al@x.com".to_string(),
            name: "Al".to_string(),
        }
    }

    #[test]
    fn test_anonymous() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_authenticated() {
        let session = Session::authenticated(user(), "tok");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.user().map(|u| u.id.as_str()), Some("u-1"));
    }

    #[test]
    fn test_registration_stages() {
        let pending = PendingRegistration::registered("al@x.com");
        assert!(pending.is_pending());

        let done = pending.logged_in();
        assert_eq!(done.stage, RegistrationStage::LoggedIn);
        assert_eq!(done.email, "al@x.com");
        assert!(!done.is_pending());
    }

    #[test]
    fn test_default_is_anonymous() {
        assert_eq!(Session::default(), Session::anonymous());
    }
}
