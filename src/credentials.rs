use anyhow::Result;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

const ENV_API_KEY: &str = "OPENAI_API_KEY";
const KEYRING_SERVICE: &str = "mailgen";
const KEYRING_KEY: &str = "openai-api-key";

/// Where a resolved API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keyring,
    File,
    Env,
}

/// Resolver and store for the OpenAI API key.
///
/// Lookup order is keyring (hosted secret store), then the local key file in
/// the config directory, then the `OPENAI_API_KEY` environment variable.
/// First non-empty match wins. A completely absent key is not an error; the
/// application degrades to mock mode instead.
pub struct ApiKeyStore {
    key_file: PathBuf,
}

impl Default for ApiKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyStore {
    pub fn new() -> Self {
        let key_file = crate::config::Config::config_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".openai_key");
        Self { key_file }
    }

    #[cfg(test)]
    fn with_key_file(key_file: PathBuf) -> Self {
        Self { key_file }
    }

    /// Try to get the key from the OS keyring
    fn keyring_get(&self) -> Option<String> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY).ok()?;
        entry.get_password().ok()
    }

    /// Try to set the key in the OS keyring
    fn keyring_set(&self, key: &str) -> bool {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY) {
            entry.set_password(key).is_ok()
        } else {
            false
        }
    }

    /// Read the key from the local file fallback
    fn file_get(&self) -> Option<String> {
        fs::read_to_string(&self.key_file)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Write the key to the local file fallback (with restricted permissions)
    fn file_set(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.key_file.parent() {
            fs::create_dir_all(parent)?;
        }

        // Create file with restricted permissions atomically to avoid TOCTOU
        #[cfg(unix)]
        {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.key_file)?;
            file.write_all(key.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.key_file, key)?;
        }

        Ok(())
    }

    /// Check for the key in the environment
    fn env_get() -> Option<String> {
        env::var(ENV_API_KEY)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Resolve the API key from the first non-empty source.
    ///
    /// Returns the trimmed key, or an empty string when no source has one.
    pub fn resolve(&self) -> String {
        match self.resolve_with_source() {
            Some((key, source)) => {
                tracing::info!("Using OpenAI API key from {:?}", source);
                key
            }
            None => {
                tracing::warn!(
                    "No OpenAI API key found in keyring, {} or ${}",
                    self.key_file.display(),
                    ENV_API_KEY
                );
                String::new()
            }
        }
    }

    fn resolve_with_source(&self) -> Option<(String, KeySource)> {
        if let Some(key) = self.keyring_get().map(|k| k.trim().to_string())
            && !key.is_empty()
        {
            return Some((key, KeySource::Keyring));
        }

        if let Some(key) = self.file_get() {
            return Some((key, KeySource::File));
        }

        Self::env_get().map(|key| (key, KeySource::Env))
    }

    /// Store the API key: keyring first, file fallback.
    pub fn store(&self, key: &str) -> Result<()> {
        if self.keyring_set(key) {
            // Verify it actually worked
            if self.keyring_get().is_some() {
                return Ok(());
            }
        }

        eprintln!("Note: Keyring unavailable, using file-based storage.");
        self.file_set(key)?;

        Ok(())
    }

    pub fn has_key(&self) -> bool {
        !self.resolve().is_empty()
    }
}
