use sentilytics_core::session::{PendingRegistration, Session, TokenStore};
use sentilytics_core::state::StateAction;
use sentilytics_core::{PersistenceService, Result, SentilyticsError};
use std::sync::Arc;

use crate::state::StateHandle;

/// Owns authentication state.
///
/// `SessionManager` is responsible for:
/// - Restoring a persisted session at startup
/// - Logging in and out
/// - Running the register-then-login sequence
/// - Keeping the durable token slot in step with the in-memory session
pub struct SessionManager {
    persistence: Arc<dyn PersistenceService>,
    token_store: Arc<dyn TokenStore>,
    state: StateHandle,
}

impl SessionManager {
    pub fn new(
        persistence: Arc<dyn PersistenceService>,
        token_store: Arc<dyn TokenStore>,
        state: StateHandle,
    ) -> Self {
        Self {
            persistence,
            token_store,
            state,
        }
    }

    /// Re-establishes the session from the persisted token, if any.
    ///
    /// Never fails: an unreadable token slot is cleared and counts as
    /// "no token", and a token the backend does not recognise (or cannot
    /// check) is discarded.
    pub async fn restore_session(&self) -> Session {
        let token = match self.token_store.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "[SessionManager] Failed to read persisted token, clearing it");
                if let Err(e) = self.token_store.clear().await {
                    tracing::warn!(error = %e, "[SessionManager] Failed to clear persisted token");
                }
                None
            }
        };

        let Some(token) = token else {
            tracing::debug!("[SessionManager] No persisted token, staying signed out");
            return self.current_session();
        };

        match self.persistence.fetch_profile(&token).await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "[SessionManager] Session restored");
                let session = Session::authenticated(user, token);
                self.state
                    .dispatch(StateAction::SessionEstablished(session.clone()));
                session
            }
            Ok(None) => {
                tracing::info!("[SessionManager] Persisted token no longer valid, signing out");
                self.logout().await;
                self.current_session()
            }
            Err(e) => {
                tracing::warn!(error = %e, "[SessionManager] Profile lookup failed, signing out");
                self.logout().await;
                self.current_session()
            }
        }
    }

    /// Signs in with email and password.
    ///
    /// # Errors
    ///
    /// - `Authentication` when the credentials are rejected or the backend
    ///   cannot check them. The session is left untouched.
    /// - `Storage` when the token cannot be persisted. The session is left
    ///   untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let grant = self
            .persistence
            .login(email, password)
            .await
            .map_err(|e| match e {
                SentilyticsError::Authentication(_) => e,
                other => SentilyticsError::authentication(other.to_string()),
            })?
            .ok_or_else(|| SentilyticsError::authentication("Invalid credentials"))?;

        self.token_store
            .save(&grant.token)
            .await
            .map_err(|e| match e {
                SentilyticsError::Storage { .. } => e,
                other => SentilyticsError::storage(other.to_string()),
            })?;

        let switching_user = self
            .state
            .read(|s| s.session.user().is_some_and(|u| u.id != grant.user.id));
        if switching_user {
            // Datasets and results belong to the previous account
            self.state.dispatch(StateAction::SessionCleared);
        }

        tracing::info!(user_id = %grant.user.id, "[SessionManager] Logged in");
        let session = Session::authenticated(grant.user, grant.token);
        self.state
            .dispatch(StateAction::SessionEstablished(session.clone()));
        Ok(session)
    }

    /// Creates an account, then signs in with it.
    ///
    /// When the account is created but the login step fails, the registration
    /// stays pending and [`SessionManager::complete_registration`] retries
    /// only the login.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        self.persistence
            .register(name, email, password)
            .await
            .map_err(|e| match e {
                SentilyticsError::Registration(_) => e,
                other => SentilyticsError::registration(other.to_string()),
            })?;

        tracing::info!(email, "[SessionManager] Account registered");
        self.state
            .dispatch(StateAction::RegistrationRecorded(
                PendingRegistration::registered(email),
            ));

        self.finish_registration(email, password).await
    }

    /// Retries the login step of a pending registration.
    pub async fn complete_registration(&self, password: &str) -> Result<Session> {
        let pending = self
            .state
            .read(|s| s.registration.clone())
            .filter(PendingRegistration::is_pending)
            .ok_or_else(|| SentilyticsError::registration("No registration is pending"))?;

        self.finish_registration(&pending.email, password).await
    }

    async fn finish_registration(&self, email: &str, password: &str) -> Result<Session> {
        match self.login(email, password).await {
            Ok(session) => {
                let record = PendingRegistration::registered(email).logged_in();
                tracing::debug!(
                    email,
                    stage = ?record.stage,
                    "[SessionManager] Registration finished"
                );
                self.state.dispatch(StateAction::RegistrationRecorded(record));
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(
                    email,
                    error = %e,
                    "[SessionManager] Login after registration failed, registration left pending"
                );
                Err(e)
            }
        }
    }

    /// Signs out and drops everything scoped to the session.
    ///
    /// The backend is asked to revoke the token first. Failing to revoke or to
    /// clear the token slot is logged and does not stop the logout.
    pub async fn logout(&self) {
        if let Some(token) = self.current_token() {
            if let Err(e) = self.persistence.revoke(&token).await {
                tracing::warn!(error = %e, "[SessionManager] Failed to revoke session token");
            }
        }
        if let Err(e) = self.token_store.clear().await {
            tracing::warn!(error = %e, "[SessionManager] Failed to clear persisted token");
        }
        self.state.dispatch(StateAction::SessionCleared);
        tracing::info!("[SessionManager] Logged out");
    }

    pub fn current_session(&self) -> Session {
        self.state.read(|s| s.session.clone())
    }

    pub fn current_token(&self) -> Option<String> {
        self.state.read(|s| s.session.token().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sentilytics_core::session::RegistrationStage;
    use sentilytics_core::dataset::Dataset;
    use sentilytics_core::user::{AuthGrant, User};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryTokens {
        token: Mutex<Option<String>>,
        fail_save: bool,
        /// Makes `load` fail until the slot is cleared
        corrupt: Mutex<bool>,
    }

    #[async_trait]
    impl TokenStore for MemoryTokens {
        async fn load(&self) -> Result<Option<String>> {
            if *self.corrupt.lock().unwrap() {
                return Err(SentilyticsError::storage("unreadable token file"));
            }
            Ok(self.token.lock().unwrap().clone())
        }

        async fn save(&self, token: &str) -> Result<()> {
            if self.fail_save {
                return Err(SentilyticsError::storage("disk full"));
            }
            *self.token.lock().unwrap() = Some(token.to_string());
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.token.lock().unwrap() = None;
            *self.corrupt.lock().unwrap() = false;
            Ok(())
        }
    }

    /// Accepts `al@x.com` / `pw`; refuses the first `login_failures` logins.
    #[derive(Default)]
    struct FakeBackend {
        login_failures: AtomicUsize,
        login_calls: AtomicUsize,
        register_calls: AtomicUsize,
        revoked: Mutex<Vec<String>>,
    }

    fn al() -> User {
        User {
            id: "u-al".to_string(),
            email: "al@x.com".to_string(),
            name: "Al".to_string(),
        }
    }

    #[async_trait]
    impl PersistenceService for FakeBackend {
        async fn login(&self, email: &str, password: &str) -> Result<Option<AuthGrant>> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if self
                .login_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(SentilyticsError::persistence("backend unavailable"));
            }
            if email == "al@x.com" && password == "pw" {
                Ok(Some(AuthGrant {
                    token: "tok-al".to_string(),
                    user: al(),
                }))
            } else {
                Ok(None)
            }
        }

        async fn register(&self, _name: &str, email: &str, _password: &str) -> Result<()> {
            self.register_calls.fetch_add(1, Ordering::SeqCst);
            if email == "taken@x.com" {
                return Err(SentilyticsError::registration("Email already registered"));
            }
            Ok(())
        }

        async fn fetch_profile(&self, token: &str) -> Result<Option<User>> {
            match token {
                "tok-al" => Ok(Some(al())),
                "tok-broken" => Err(SentilyticsError::persistence("backend unavailable")),
                _ => Ok(None),
            }
        }

        async fn save_dataset(&self, _token: &str, _dataset: &Dataset) -> Result<()> {
            Ok(())
        }

        async fn list_datasets(&self, _token: &str) -> Result<Vec<Dataset>> {
            Ok(Vec::new())
        }

        async fn fetch_dataset(&self, _token: &str, _id: &str) -> Result<Option<Dataset>> {
            Ok(None)
        }

        async fn revoke(&self, token: &str) -> Result<()> {
            self.revoked.lock().unwrap().push(token.to_string());
            Ok(())
        }
    }

    fn manager(backend: FakeBackend, tokens: MemoryTokens) -> (SessionManager, Arc<MemoryTokens>) {
        let tokens = Arc::new(tokens);
        let manager = SessionManager::new(Arc::new(backend), tokens.clone(), StateHandle::new());
        (manager, tokens)
    }

    fn with_token(token: &str) -> MemoryTokens {
        MemoryTokens {
            token: Mutex::new(Some(token.to_string())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let (manager, tokens) = manager(FakeBackend::default(), MemoryTokens::default());

        let session = manager.login("al@x.com", "pw").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(manager.current_token().as_deref(), Some("tok-al"));
        assert_eq!(tokens.load().await.unwrap().as_deref(), Some("tok-al"));
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_session_untouched() {
        let (manager, tokens) = manager(FakeBackend::default(), MemoryTokens::default());

        let err = manager.login("al@x.com", "nope").await.unwrap_err();
        assert!(err.is_authentication());
        assert!(!manager.current_session().is_authenticated());
        assert!(tokens.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_token_save_failure_is_storage_error() {
        let tokens = MemoryTokens {
            fail_save: true,
            ..Default::default()
        };
        let (manager, _) = manager(FakeBackend::default(), tokens);

        let err = manager.login("al@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, SentilyticsError::Storage { .. }));
        assert!(!manager.current_session().is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_valid_token() {
        let (manager, _) = manager(FakeBackend::default(), with_token("tok-al"));

        let session = manager.restore_session().await;
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().email, "al@x.com");
    }

    #[tokio::test]
    async fn test_restore_unknown_token_clears_slot() {
        let (manager, tokens) = manager(FakeBackend::default(), with_token("tok-stale"));

        let session = manager.restore_session().await;
        assert!(!session.is_authenticated());
        assert!(tokens.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_backend_error_clears_slot() {
        let (manager, tokens) = manager(FakeBackend::default(), with_token("tok-broken"));

        assert!(!manager.restore_session().await.is_authenticated());
        assert!(tokens.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_unreadable_slot_is_cleared() {
        let tokens = MemoryTokens {
            token: Mutex::new(Some("tok-al".to_string())),
            corrupt: Mutex::new(true),
            ..Default::default()
        };
        let (manager, tokens) = manager(FakeBackend::default(), tokens);

        assert!(!manager.restore_session().await.is_authenticated());
        assert!(tokens.load().await.unwrap().is_none());

        manager.login("al@x.com", "pw").await.unwrap();
        assert_eq!(tokens.load().await.unwrap().as_deref(), Some("tok-al"));
    }

    #[tokio::test]
    async fn test_restore_without_token() {
        let (manager, _) = manager(FakeBackend::default(), MemoryTokens::default());
        assert!(!manager.restore_session().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_duplicate_records_nothing() {
        let (manager, _) = manager(FakeBackend::default(), MemoryTokens::default());

        let err = manager.register("T", "taken@x.com", "pw").await.unwrap_err();
        assert!(err.is_registration());
        assert!(manager.state.read(|s| s.registration.is_none()));
    }

    #[tokio::test]
    async fn test_register_pending_then_complete() {
        let backend = FakeBackend {
            login_failures: AtomicUsize::new(1),
            ..Default::default()
        };
        let backend = Arc::new(backend);
        let state = StateHandle::new();
        let manager = SessionManager::new(
            backend.clone(),
            Arc::new(MemoryTokens::default()),
            state.clone(),
        );

        let err = manager.register("Al", "al@x.com", "pw").await.unwrap_err();
        assert!(err.is_authentication());
        let pending = state.read(|s| s.registration.clone()).unwrap();
        assert_eq!(pending.stage, RegistrationStage::Registered);
        assert_eq!(pending.email, "al@x.com");

        let session = manager.complete_registration("pw").await.unwrap();
        assert!(session.is_authenticated());
        let registration = state.read(|s| s.registration.clone()).unwrap();
        assert_eq!(registration.stage, RegistrationStage::LoggedIn);
        assert_eq!(backend.register_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.login_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_complete_registration_without_pending() {
        let (manager, _) = manager(FakeBackend::default(), MemoryTokens::default());
        let err = manager.complete_registration("pw").await.unwrap_err();
        assert!(err.is_registration());
    }

    #[tokio::test]
    async fn test_logout_resets_session() {
        let (manager, tokens) = manager(FakeBackend::default(), MemoryTokens::default());
        manager.login("al@x.com", "pw").await.unwrap();

        manager.logout().await;
        assert!(!manager.current_session().is_authenticated());
        assert!(manager.current_token().is_none());
        assert!(tokens.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let backend = Arc::new(FakeBackend::default());
        let manager = SessionManager::new(
            backend.clone(),
            Arc::new(MemoryTokens::default()),
            StateHandle::new(),
        );
        manager.login("al@x.com", "pw").await.unwrap();

        manager.logout().await;
        assert_eq!(*backend.revoked.lock().unwrap(), vec!["tok-al".to_string()]);

        // Signed out already: nothing to revoke
        manager.logout().await;
        assert_eq!(backend.revoked.lock().unwrap().len(), 1);
    }
}
