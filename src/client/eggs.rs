//! Easter egg found flags.
//!
//! Eggs are only visible once the portal is solved, and each one remembers
//! whether it has been found.

use super::puzzle::PuzzleContext;
use super::storage::{easter_egg_key, ClientStorage};

/// Every hidden egg on the site.
pub const EASTER_EGG_IDS: &[&str] = &["vinyl", "cassette", "antenna", "moth"];

impl<S: ClientStorage> PuzzleContext<S> {
    /// Record an egg as found. Returns false while eggs are hidden, for unknown
    /// ids, and when the flag could not be stored.
    pub fn mark_egg_found(&mut self, id: &str) -> bool {
        if !self.can_access_easter_eggs() || !EASTER_EGG_IDS.contains(&id) {
            return false;
        }

        match self.storage_mut().set(&easter_egg_key(id), "true") {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist easter egg {}: {}", id, e);
                false
            }
        }
    }

    pub fn is_egg_found(&self, id: &str) -> bool {
        self.storage().get(&easter_egg_key(id)).as_deref() == Some("true")
    }

    /// Number of distinct eggs found so far.
    pub fn found_egg_count(&self) -> usize {
        EASTER_EGG_IDS
            .iter()
            .filter(|id| self.is_egg_found(id))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::{MemoryStorage, StorageError};

    /// Storage that reads fine but refuses every write.
    struct ReadOnlyStorage;

    impl ClientStorage for ReadOnlyStorage {
        fn get(&self, key: &str) -> Option<String> {
            (key == crate::client::storage::PORTAL_SOLVED_KEY).then(|| "true".to_string())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_eggs_hidden_until_portal_solved() {
        let mut ctx = PuzzleContext::load(MemoryStorage::new());

        assert!(!ctx.mark_egg_found("vinyl"));
        assert!(!ctx.is_egg_found("vinyl"));
        assert_eq!(ctx.found_egg_count(), 0);
    }

    #[test]
    fn test_found_flags_persist() {
        let mut ctx = PuzzleContext::load(MemoryStorage::new());
        ctx.set_portal_solved(true);

        assert!(ctx.mark_egg_found("vinyl"));
        assert!(ctx.mark_egg_found("moth"));
        assert!(ctx.mark_egg_found("vinyl"));
        assert!(!ctx.mark_egg_found("unicorn"));

        let reloaded = PuzzleContext::load(ctx.into_storage());
        assert!(reloaded.is_egg_found("vinyl"));
        assert!(reloaded.is_egg_found("moth"));
        assert!(!reloaded.is_egg_found("cassette"));
        assert_eq!(reloaded.found_egg_count(), 2);
    }

    #[test]
    fn test_failed_write_is_not_reported_as_found() {
        let mut ctx = PuzzleContext::load(ReadOnlyStorage);
        assert!(ctx.can_access_easter_eggs());

        assert!(!ctx.mark_egg_found("vinyl"));
        assert!(!ctx.is_egg_found("vinyl"));
        assert_eq!(ctx.found_egg_count(), 0);
    }
}
