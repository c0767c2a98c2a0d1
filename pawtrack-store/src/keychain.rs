//! Account password storage in the system keychain.
//!
//! This module provides synchronous access to the system's secure credential storage:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Passwords are stored under the `pawtrack` service with the account
//! e-mail as the keychain account.
//!
//! ## Caching
//!
//! Lookups are cached for the lifetime of the process, including misses,
//! so a `run` loop never prompts more than once.
//!
//! ```ignore
//! use pawtrack_store::keychain;
//!
//! keychain::store_password("cat@example.com", "hunter2")?;
//! if let Some(password) = keychain::get_password("cat@example.com") {
//!     // log in...
//! }
//! ```

use keyring::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use tracing::{debug, trace, warn};

use crate::error::StoreError;

/// Keychain service name.
pub const SERVICE: &str = "pawtrack";

// ============================================================================
// Cache
// ============================================================================

/// Account -> password, `None` meaning "no entry found".
static CACHE: OnceLock<Mutex<HashMap<String, Option<String>>>> = OnceLock::new();

fn cache() -> &'static Mutex<HashMap<String, Option<String>>> {
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn cached(account: &str) -> Option<Option<String>> {
    cache().lock().ok()?.get(account).cloned()
}

fn remember(account: &str, value: Option<String>) {
    if let Ok(mut cache) = cache().lock() {
        cache.insert(account.to_string(), value);
    }
}

/// Drops a cached lookup so the next read goes to the keychain.
pub fn invalidate(account: &str) {
    if let Ok(mut cache) = cache().lock() {
        cache.remove(account);
        debug!(account = %account, "Invalidated keychain cache entry");
    }
}

// ============================================================================
// Keychain Operations
// ============================================================================

fn entry(account: &str) -> Result<Entry, StoreError> {
    Entry::new(SERVICE, account)
        .map_err(|e| StoreError::Keychain(format!("Failed to create keychain entry: {e}")))
}

/// Stores the password for an account.
///
/// # Errors
///
/// Returns [`StoreError::Keychain`] if the keychain rejects the write.
pub fn store_password(account: &str, password: &str) -> Result<(), StoreError> {
    entry(account)?
        .set_password(password)
        .map_err(|e| StoreError::Keychain(format!("Failed to store password: {e}")))?;

    invalidate(account);
    debug!(account = %account, "Password stored in keychain");
    Ok(())
}

/// Returns the stored password for an account, if any.
///
/// Errors are logged and treated as "not found".
pub fn get_password(account: &str) -> Option<String> {
    if let Some(hit) = cached(account) {
        trace!(account = %account, hit = true, "Keychain cache lookup");
        return hit;
    }

    trace!(account = %account, hit = false, "Keychain cache miss, reading from keychain");
    let result = match entry(account) {
        Ok(entry) => match entry.get_password() {
            Ok(password) if !password.is_empty() => Some(password),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to get password from keychain");
                None
            }
        },
        Err(e) => {
            warn!(account = %account, error = %e, "Keychain unavailable");
            None
        }
    };

    remember(account, result.clone());
    result
}

/// Returns true if a non-empty password is stored for the account.
pub fn has_password(account: &str) -> bool {
    get_password(account).is_some()
}

// ============================================================================
// Tests
// ============================================================================
