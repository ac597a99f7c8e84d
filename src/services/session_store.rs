use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use crate::errors::ClientResult;

/// Durable home for the bearer credential between runs.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn remove(&self) -> io::Result<()>;
}

// Token kept in a single file, readable only by the owner on unix
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        // mode() only applies on creation, so tighten a pre-existing file too
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        io::Write::write_all(&mut file, token.as_bytes())
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

// Process-local storage; nothing survives a restart
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())) }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Holds the session credential for the application root.
///
/// The token is cached in memory and written through to the backing
/// [`TokenStorage`]. There is no expiry: a token stays until it is cleared,
/// either by logout or after the backend refuses it.
pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    token: RwLock<Option<String>>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        let token = storage.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read stored session token: {}", e);
            None
        });
        tracing::debug!("Session store opened (credential present: {})", token.is_some());

        Self {
            storage,
            token: RwLock::new(token),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileTokenStorage::new(path)))
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryTokenStorage::default()))
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    // Persisted first; the cached credential only changes once storage accepts it
    pub fn set_token(&self, token: &str) -> ClientResult<()> {
        self.storage.save(token).map_err(|e| {
            tracing::error!("Failed to persist session token: {}", e);
            e
        })?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    pub fn clear_token(&self) -> ClientResult<()> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.storage.remove().map_err(|e| {
            tracing::error!("Failed to remove stored session token: {}", e);
            e.into()
        })
    }
}
