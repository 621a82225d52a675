//! Authorization service.
//!
//! One instance per tab/process, handed to whoever needs it. Its state changes
//! only through `login`, `logout` and `check_auth_status`; everything else is
//! a read of the current session.

use serde::Serialize;
use taskflow_core::{Result, User};
use taskflow_logging::{SessionEvent, SessionEventLogger};
use tracing::info;

use crate::store::{Session, SessionStore};

/// Role summary for the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleInfo {
    pub role: Option<String>,
    pub role_name: Option<String>,
    pub role_rank: Option<i64>,
    pub is_manager: bool,
}

pub struct AuthorizationService<S> {
    store: S,
    session: Option<Session>,
}

impl<S: SessionStore> AuthorizationService<S> {
    /// Starts unauthenticated. Call [`check_auth_status`](Self::check_auth_status)
    /// to pick up a session persisted earlier in the same scope.
    pub fn new(store: S) -> Self {
        Self { store, session: None }
    }

    /// Build and immediately reload from the store.
    pub fn restore(store: S) -> Self {
        let mut service = Self::new(store);
        service.check_auth_status();
        service
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mark `user` as logged in and persist the session.
    ///
    /// The record is taken as-is. The in-memory session is updated even when
    /// persisting fails; the error is returned so the caller can warn that the
    /// login will not survive a reload.
    pub fn login(&mut self, user: User) -> Result<()> {
        let session = Session::new(user);
        SessionEventLogger::log_event(
            self.store.scope(),
            SessionEvent::LoggedIn {
                user_id: session.user.id.clone(),
                email: session.user.email.clone(),
                division: session.user.division_name.clone(),
            },
        );
        let persisted = self.store.persist(&session);
        self.session = Some(session);
        persisted
    }

    /// Drop the session from memory and storage.
    pub fn logout(&mut self) -> Result<()> {
        self.session = None;
        SessionEventLogger::log_event(self.store.scope(), SessionEvent::LoggedOut);
        self.store.clear()
    }

    /// Reload from storage. This is the authoritative check: memory is
    /// overwritten with whatever the store holds, or reset when it holds
    /// nothing usable.
    pub fn check_auth_status(&mut self) -> bool {
        match self.store.load() {
            Some(session) => {
                if self.session.as_ref() != Some(&session) {
                    SessionEventLogger::log_event(
                        self.store.scope(),
                        SessionEvent::Restored { user_id: session.user.id.clone() },
                    );
                }
                self.session = Some(session);
                true
            }
            None => {
                if self.session.take().is_some() {
                    SessionEventLogger::log_event(
                        self.store.scope(),
                        SessionEvent::Rejected { reason: "no usable session in storage".into() },
                    );
                }
                false
            }
        }
    }

    /// In-memory view only; use [`check_auth_status`](Self::check_auth_status)
    /// when it matters.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn current_division(&self) -> Option<&str> {
        self.current_user()?.division_name.as_deref()
    }

    pub fn role_rank(&self) -> Option<i64> {
        self.current_user()?.role_rank()
    }

    pub fn is_manager(&self) -> bool {
        self.current_user().is_some_and(User::is_manager)
    }

    /// Exact, case-sensitive match against the user's single division.
    pub fn has_division_access(&self, target_division: &str) -> bool {
        self.current_division() == Some(target_division)
    }

    /// Reloads the session first; a missing session denies access whatever
    /// the division.
    pub fn validate_division_access(&mut self, target_division: &str) -> bool {
        if !self.check_auth_status() {
            info!(division = target_division, "Division access denied: not authenticated");
            return false;
        }
        self.has_division_access(target_division)
    }

    pub fn role_info(&self) -> RoleInfo {
        let Some(user) = self.current_user() else {
            return RoleInfo::default();
        };
        RoleInfo {
            role: user.role.clone(),
            role_name: user.role_name.clone(),
            role_rank: user.role_rank(),
            is_manager: user.is_manager(),
        }
    }
}
