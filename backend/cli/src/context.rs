use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use taskflow_api::Backend;
use taskflow_config::{
    apply_env_overrides, config_dir, config_file_path, load_config, prepare, ClientConfig,
};
use taskflow_logging::init_logger;
use taskflow_session::{AuthorizationService, FileSessionStore};
use tracing::debug;

/// Everything a command needs: config, backend APIs and the restored session.
pub struct AppContext {
    pub config: ClientConfig,
    pub backend: Backend,
    pub auth: AuthorizationService<FileSessionStore>,
}

impl AppContext {
    /// Read config, start logging, then restore the session for the scope.
    pub async fn load(config_path: Option<PathBuf>, scope: Option<String>) -> Result<Self> {
        let dir = config_dir();
        let path = config_path.unwrap_or_else(|| config_file_path(&dir));

        let mut config = apply_env_overrides(load_config(&path).await?);
        if let Some(scope) = scope {
            config.session_scope = scope;
        }
        init_logger(config.log_dir.as_deref(), &config.log_level);
        let config = prepare(config)?;

        let backend = Backend::from_config(&config).context("Failed to set up backend client")?;
        let store = FileSessionStore::new(config.session_dir_in(&dir), &config.session_scope);
        debug!(path = %store.path().display(), "Using session file");
        let auth = AuthorizationService::restore(store);

        Ok(Self { config, backend, auth })
    }

    pub fn session_file(&self) -> &Path {
        self.auth.store().path()
    }

    /// Id of the logged-in user, or a hint to log in.
    pub fn require_user_id(&self) -> Result<String> {
        match self.auth.current_user().and_then(|u| u.id.clone()) {
            Some(id) => Ok(id),
            None => bail!("Not logged in. Run `taskflow login` first."),
        }
    }
}
