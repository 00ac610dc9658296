//! # Filesystem-backed token store
//!
//! [`FileTokenStore`] persists each stored name as a single file under a
//! base directory, so credentials survive process restarts:
//!
//! ```text
//! <base_dir>/
//! ├── accessToken        # raw token string
//! └── refreshToken
//! ```
//!
//! Writes and clears are best-effort: I/O failures are swallowed and the
//! name simply reads back as absent. Use [`dirs::data_dir()`] to obtain a
//! platform-appropriate base in applications.

use std::path::PathBuf;

use crate::TokenStore;

/// Filesystem-backed TokenStore for desktop persistence.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    base: PathBuf,
}

impl FileTokenStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, name: &str) -> Option<String> {
        let content = std::fs::read_to_string(self.path_for(name)).ok()?;
        if content.is_empty() {
            return None;
        }
        Some(content)
    }

    fn set(&self, name: &str, value: &str) {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(path, value);
    }

    fn clear(&self, name: &str) {
        let _ = std::fs::remove_file(self.path_for(name));
    }
}
