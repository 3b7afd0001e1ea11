//! Guards that put process-global state back after a test.
//!
//! The working directory and environment variables are shared by every test
//! thread, so tests using these guards are also marked `#[serial]`.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Restores the working directory captured at construction
pub struct CwdGuard {
    original: PathBuf,
}

impl CwdGuard {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            original: env::current_dir()?,
        })
    }

    /// Capture the working directory, then change into `dir`
    pub fn enter(dir: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let guard = Self::new()?;
        env::set_current_dir(dir)?;
        Ok(guard)
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.original);
    }
}

/// Restores an environment variable (or its absence) on drop
pub struct EnvGuard {
    key: String,
    original: Option<OsString>,
}

impl EnvGuard {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            original: env::var_os(key),
        }
    }

    /// # Safety
    /// Calls `std::env::set_var`; the test must be `#[serial]`.
    pub unsafe fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let guard = Self::new(key);
        unsafe { env::set_var(key, value) };
        guard
    }

    /// # Safety
    /// Calls `std::env::remove_var`; the test must be `#[serial]`.
    pub unsafe fn remove(key: &str) -> Self {
        let guard = Self::new(key);
        unsafe { env::remove_var(key) };
        guard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: only used from #[serial] tests
        match &self.original {
            Some(val) => unsafe { env::set_var(&self.key, val) },
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cwd_guard_restores_on_drop() {
        let original = env::current_dir().unwrap();
        let tmp = tempfile::TempDir::new().unwrap();
        {
            let _guard = CwdGuard::enter(tmp.path()).unwrap();
            assert_ne!(env::current_dir().unwrap(), original);
        }
        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    #[serial]
    fn test_env_guard_restores_absent_var() {
        let key = "NEWSDESK_TEST_GUARD_ABSENT";
        unsafe { env::remove_var(key) };
        {
            let _guard = unsafe { EnvGuard::set(key, "temporary") };
            assert_eq!(env::var(key).unwrap(), "temporary");
        }
        assert!(env::var(key).is_err());
    }
}
