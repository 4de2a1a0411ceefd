use std::collections::BTreeMap;
use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use super::storage::{KeyValueStore, StorageError, StorageResult};

/// Keychain service name
pub const SERVICE_NAME: &str = "hdnotes";

/// Keychain account holding the session blob
const SESSION_ACCOUNT: &str = "session";

/// Session storage in the OS keychain.
///
/// All keys are kept together as one JSON object in a single keychain
/// entry, so a multi-key write is one keychain write.
pub struct KeyringStore {
    entry: Entry,
    lock: Mutex<()>,
}

impl KeyringStore {
    pub fn new() -> StorageResult<Self> {
        Self::with_account(SERVICE_NAME, SESSION_ACCOUNT)
    }

    pub fn with_account(service: &str, account: &str) -> StorageResult<Self> {
        let entry = Entry::new(service, account)
            .map_err(|e| StorageError::Keychain(format!("Failed to create keyring entry: {}", e)))?;
        Ok(Self {
            entry,
            lock: Mutex::new(()),
        })
    }

    fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.entry.get_password() {
            Ok(blob) => serde_json::from_str(&blob).map_err(|e| StorageError::Corrupt(e.to_string())),
            Err(keyring::Error::NoEntry) => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Keychain(format!(
                "Failed to read session from keychain: {}",
                e
            ))),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if map.is_empty() {
            return match self.entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(StorageError::Keychain(format!(
                    "Failed to delete session from keychain: {}",
                    e
                ))),
            };
        }
        let blob = serde_json::to_string(map).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.entry
            .set_password(&blob)
            .map_err(|e| StorageError::Keychain(format!("Failed to store session in keychain: {}", e)))?;
        debug!(keys = map.len(), "Session written to keychain");
        Ok(())
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.remove_many(&[key])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(StorageError::Corrupt(_)) => BTreeMap::new(),
            Err(e) => return Err(e),
        };
        for key in keys {
            map.remove(*key);
        }
        self.write_map(&map)
    }
}
