//! Session persistence and authorization for the taskflow client.
//!
//! [`SessionStore`] keeps the session for one tab/process scope;
//! [`AuthorizationService`] owns the session lifecycle and answers role and
//! division questions about the current user.

pub mod auth;
pub mod store;

pub use auth::{AuthorizationService, RoleInfo};
pub use store::{FileSessionStore, MemorySessionStore, Session, SessionStore};
