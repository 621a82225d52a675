//! Scoped session persistence.
//!
//! A stored session is a single JSON document holding the logged-in flag and
//! the user record side by side. It only counts as a session when both are
//! present and well formed; anything else loads as "no session".

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Value, json};
use taskflow_core::{ClientError, Result, User};
use tracing::{debug, warn};

const LOGGED_IN_KEY: &str = "isLoggedIn";
const USER_KEY: &str = "user";
const FILE_SUFFIX: &str = ".session.json";

/// An authenticated session. Holding one means the user is logged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

/// Storage for the session of one tab/process scope.
pub trait SessionStore: Send + Sync {
    /// Label used in logs.
    fn scope(&self) -> &str;

    /// Replace the stored session. A later `load` sees either the old or the
    /// new session in full, never a mix.
    fn persist(&self, session: &Session) -> Result<()>;

    /// Remove every trace of the session.
    fn clear(&self) -> Result<()>;

    /// The last persisted session, or `None` if there is none or it is unreadable.
    fn load(&self) -> Option<Session>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn scope(&self) -> &str {
        (**self).scope()
    }

    fn persist(&self, session: &Session) -> Result<()> {
        (**self).persist(session)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }

    fn load(&self) -> Option<Session> {
        (**self).load()
    }
}

pub(crate) fn encode(session: &Session) -> Result<String> {
    let doc = json!({ LOGGED_IN_KEY: true, USER_KEY: session.user });
    serde_json::to_string(&doc).map_err(|e| ClientError::Storage(e.to_string()))
}

pub(crate) fn decode(raw: &str) -> std::result::Result<Session, String> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| format!("unparseable: {e}"))?;
    if doc.get(LOGGED_IN_KEY).and_then(Value::as_bool) != Some(true) {
        return Err("logged-in flag missing".into());
    }
    let user = doc
        .get(USER_KEY)
        .filter(|u| u.is_object())
        .ok_or_else(|| "user record missing".to_string())?;
    let user: User =
        serde_json::from_value(user.clone()).map_err(|e| format!("malformed user record: {e}"))?;
    Ok(Session { user })
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-scoped store. Lives exactly as long as the value does.
///
/// Keeps the serialized document rather than the parsed session, so what
/// `load` sees is what a real storage medium would hand back.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from arbitrary stored text, e.g. left over from an older client.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Mutex::new(Some(raw.into())) }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn scope(&self) -> &str {
        "memory"
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let encoded = encode(session)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        let raw = self.raw()?;
        decode(&raw)
            .inspect_err(|reason| warn!(scope = "memory", %reason, "Discarding stored session"))
            .ok()
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// One session document per named scope under a directory.
///
/// Writes go to a temp file that is renamed over the target, so readers never
/// see half a document. Two processes sharing a scope race; the last write wins.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    scope: String,
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl AsRef<Path>, scope: &str) -> Self {
        let scope = sanitize_scope(scope);
        let path = dir.as_ref().join(format!("{scope}{FILE_SUFFIX}"));
        Self { scope, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Keep scope names usable as file names.
fn sanitize_scope(scope: &str) -> String {
    let cleaned: String = scope
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "default".to_string() } else { cleaned }
}

impl SessionStore for FileSessionStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let storage_err = |e: std::io::Error| ClientError::Storage(format!("{}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let encoded = encode(session)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, encoded.as_bytes()).map_err(storage_err)?;
        fs::rename(&tmp_path, &self.path).map_err(storage_err)?;
        debug!(scope = %self.scope, path = %self.path.display(), "Persisted session");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(scope = %self.scope, error = %e, "Failed to read stored session");
                return None;
            }
        };
        decode(&raw)
            .inspect_err(|reason| warn!(scope = %self.scope, %reason, "Discarding stored session"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn alice() -> User {
        serde_json::from_value(json!({
            "id": "u-1",
            "name": "Alice",
            "email": "alice@example.com",
            "division_name": "Sales",
            "role": "Sales Manager",
            "role_name": "manager",
            "role_num": 3
        }))
        .unwrap()
    }

    #[test]
    fn memory_store_returns_last_persisted_session() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load(), None);

        store.persist(&Session::new(User::default())).unwrap();
        store.persist(&Session::new(alice())).unwrap();
        assert_eq!(store.load(), Some(Session::new(alice())));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        assert_eq!(store.raw(), None);
    }

    #[test]
    fn corrupt_or_partial_data_loads_as_empty() {
        let cases = [
            "not json",
            r#"{"isLoggedIn": true}"#,
            r#"{"user": {"id": "u-1"}}"#,
            r#"{"isLoggedIn": "true", "user": {"id": "u-1"}}"#,
            r#"{"isLoggedIn": false, "user": {"id": "u-1"}}"#,
            r#"{"isLoggedIn": true, "user": "u-1"}"#,
            r#"{"isLoggedIn": true, "user": [{"id": "u-1"}]}"#,
        ];
        for raw in cases {
            assert_eq!(MemorySessionStore::with_raw(raw).load(), None, "case {raw}");
        }
    }

    #[test]
    fn minimal_record_is_well_formed() {
        let store = MemorySessionStore::with_raw(r#"{"isLoggedIn": true, "user": {}}"#);
        assert_eq!(store.load(), Some(Session::new(User::default())));
    }

    #[test]
    fn record_field_types_are_not_validated() {
        let store = MemorySessionStore::with_raw(
            r#"{"isLoggedIn": true, "user": {"id": 42, "role_num": 4.0, "division_name": "Sales"}}"#,
        );
        let session = store.load().unwrap();
        assert_eq!(session.user.id.as_deref(), Some("42"));
        assert_eq!(session.user.role_rank(), Some(4));
        assert_eq!(session.user.division_name.as_deref(), Some("Sales"));
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"), "tab-1");

        assert_eq!(store.load(), None);
        store.persist(&Session::new(alice())).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load(), Some(Session::new(alice())));

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn file_scopes_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileSessionStore::new(dir.path(), "first");
        let second = FileSessionStore::new(dir.path(), "second");

        first.persist(&Session::new(alice())).unwrap();
        assert_eq!(second.load(), None);
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), "default");
        fs::write(store.path(), "{\"isLoggedIn\": tr").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn scope_names_are_sanitized() {
        let store = FileSessionStore::new("/tmp", "../evil scope");
        assert_eq!(store.scope(), "___evil_scope");
        assert_eq!(FileSessionStore::new("/tmp", "").scope(), "default");
    }
}
