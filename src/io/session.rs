use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tempfile::NamedTempFile;

/// Key under which the bearer token is persisted
pub const TOKEN_KEY: &str = "devtrackr_token";

const SESSION_FILE: &str = "session.json";

/// Error type for token persistence
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not remove {path}: {source}")]
    RemoveError { path: PathBuf, source: io::Error },
    #[error("could not encode session: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// Durable storage for the session token.
pub trait TokenStore: Send + Sync {
    /// The persisted token, if any. Unreadable storage reads as logged out.
    fn load(&self) -> Option<String>;
    /// Persist `token`, or remove the entry entirely when `None`.
    fn save(&self, token: Option<&str>) -> Result<(), SessionError>;
}

/// Token persisted as `session.json` in the config directory
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(config_dir: &Path) -> Self {
        FileTokenStore {
            path: config_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&content).ok()?;
        entries.get(TOKEN_KEY).filter(|t| !t.is_empty()).cloned()
    }

    fn save(&self, token: Option<&str>) -> Result<(), SessionError> {
        match token {
            Some(token) => {
                let mut entries = BTreeMap::new();
                entries.insert(TOKEN_KEY, token);
                let content = serde_json::to_vec_pretty(&entries)?;
                atomic_write(&self.path, &content).map_err(|e| SessionError::WriteError {
                    path: self.path.clone(),
                    source: e,
                })
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(SessionError::RemoveError {
                    path: self.path.clone(),
                    source: e,
                }),
            },
        }
    }
}

/// Write `content` to `path` atomically using a temp file + rename. The file
/// is readable by the owner only.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// In-memory store, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        MemoryTokenStore {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok()?.clone()
    }

    fn save(&self, token: Option<&str>) -> Result<(), SessionError> {
        if let Ok(mut slot) = self.token.lock() {
            *slot = token.map(str::to_string);
        }
        Ok(())
    }
}

/// The process-wide session: one cached bearer token, written through to a
/// durable store. Clones share the same token.
#[derive(Clone)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    store: Arc<dyn TokenStore>,
}

impl Session {
    /// Open a session, loading any previously persisted token.
    pub fn open(store: Arc<dyn TokenStore>) -> Self {
        let token = store.load();
        Session {
            token: Arc::new(RwLock::new(token)),
            store,
        }
    }

    /// A session backed by the token file in `config_dir`.
    pub fn from_config_dir(config_dir: &Path) -> Self {
        Session::open(Arc::new(FileTokenStore::new(config_dir)))
    }

    /// A session that is never persisted.
    pub fn ephemeral() -> Self {
        Session::open(Arc::new(MemoryTokenStore::default()))
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.read().is_ok_and(|t| t.is_some())
    }

    /// Replace the token. `None` logs out and removes the persisted entry.
    /// Persistence failures are logged; the in-memory token is always updated.
    pub fn set_token(&self, token: Option<&str>) {
        let token = token.filter(|t| !t.is_empty());
        if let Ok(mut slot) = self.token.write() {
            *slot = token.map(str::to_string);
        }
        if let Err(e) = self.store.save(token) {
            tracing::warn!(error = %e, "could not persist session token");
        }
        if token.is_some() {
            tracing::debug!("session token stored");
        } else {
            tracing::debug!("session token cleared");
        }
    }

    pub fn clear(&self) {
        self.set_token(None);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}
