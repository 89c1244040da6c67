//! Puzzle progress state machine.
//!
//! Five hidden levels unlock in a fixed order once the portal riddle is solved.
//! Each level moves Locked -> Unlocked -> Solved and never back. State is written
//! to client storage after every mutation and re-read on load.
//!
//! This only decides which hidden content to reveal. Anyone can edit their own
//! storage, so it is not an access-control boundary; admin access goes through
//! [`crate::auth`].

use serde::{Deserialize, Serialize};

use super::storage::{ClientStorage, StorageError, PORTAL_SOLVED_KEY, PUZZLE_PROGRESS_KEY};

/// One step of the unlock chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleLevel {
    pub id: String,
    pub name: String,
    pub is_unlocked: bool,
    pub is_solved: bool,
    /// Hidden route this level reveals
    pub path: String,
}

impl PuzzleLevel {
    fn locked(id: &str, name: &str, path: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_unlocked: false,
            is_solved: false,
            path: path.to_string(),
        }
    }
}

/// The fixed level sequence, all locked.
pub fn default_levels() -> Vec<PuzzleLevel> {
    vec![
        PuzzleLevel::locked("echoes", "Echoes", "/echoes"),
        PuzzleLevel::locked("whispers", "Whispers", "/whispers"),
        PuzzleLevel::locked("reflection", "Reflection", "/reflection"),
        PuzzleLevel::locked("resonance", "Resonance", "/resonance"),
        PuzzleLevel::locked("convergence", "Convergence", "/convergence"),
    ]
}

/// Serialized form of the progress blob.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Progress {
    puzzle_levels: Vec<PuzzleLevel>,
    current_level: usize,
}

/// Puzzle state for one client, bound to that client's storage.
#[derive(Debug)]
pub struct PuzzleContext<S: ClientStorage> {
    storage: S,
    portal_solved: bool,
    levels: Vec<PuzzleLevel>,
    current_level: usize,
}

impl<S: ClientStorage> PuzzleContext<S> {
    /// Load state from storage, falling back to defaults for anything unreadable.
    pub fn load(storage: S) -> Self {
        let portal_solved = storage.get(PORTAL_SOLVED_KEY).as_deref() == Some("true");

        let mut context = Self {
            storage,
            portal_solved,
            levels: default_levels(),
            current_level: 0,
        };

        if let Some(blob) = context.storage.get(PUZZLE_PROGRESS_KEY) {
            match serde_json::from_str::<Progress>(&blob) {
                Ok(progress) => context.restore(progress),
                Err(e) => tracing::warn!("Ignoring unreadable puzzle progress: {}", e),
            }
        }

        context
    }

    /// Copy stored flags onto the fixed level list; unknown ids are dropped.
    fn restore(&mut self, progress: Progress) {
        for stored in progress.puzzle_levels {
            if let Some(level) = self.levels.iter_mut().find(|l| l.id == stored.id) {
                level.is_unlocked = stored.is_unlocked;
                level.is_solved = stored.is_solved;
            }
        }
        self.current_level = progress.current_level.min(self.levels.len() - 1);
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_progress() {
            tracing::warn!("Failed to persist puzzle progress: {}", e);
        }
    }

    fn write_progress(&mut self) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&Progress {
            puzzle_levels: self.levels.clone(),
            current_level: self.current_level,
        })?;
        self.storage.set(PUZZLE_PROGRESS_KEY, &blob)?;
        self.storage.set(
            PORTAL_SOLVED_KEY,
            if self.portal_solved { "true" } else { "false" },
        )
    }

    pub fn portal_solved(&self) -> bool {
        self.portal_solved
    }

    /// Easter eggs show exactly when the portal is solved.
    pub fn can_access_easter_eggs(&self) -> bool {
        self.portal_solved
    }

    pub fn levels(&self) -> &[PuzzleLevel] {
        &self.levels
    }

    pub fn level(&self, id: &str) -> Option<&PuzzleLevel> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Set the portal flag. Solving it unlocks the first level; clearing it
    /// never re-locks anything.
    pub fn set_portal_solved(&mut self, solved: bool) {
        self.portal_solved = solved;
        if solved {
            if let Some(first) = self.levels.first_mut() {
                first.is_unlocked = true;
            }
        }
        self.persist();
    }

    /// Unlock a level directly. Returns false for an unknown id.
    pub fn unlock_puzzle(&mut self, id: &str) -> bool {
        let Some(level) = self.levels.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        level.is_unlocked = true;
        self.persist();
        true
    }

    /// Mark a level solved and unlock its successor. Returns false for an unknown id.
    pub fn solve_puzzle(&mut self, id: &str) -> bool {
        let Some(index) = self.levels.iter().position(|l| l.id == id) else {
            return false;
        };

        self.levels[index].is_solved = true;
        if let Some(next) = self.levels.get_mut(index + 1) {
            next.is_unlocked = true;
            self.current_level = index + 1;
        }
        self.persist();
        true
    }

    /// Whether a level is reachable. Always false while the portal is unsolved.
    pub fn is_level_unlocked(&self, id: &str) -> bool {
        self.portal_solved && self.level(id).is_some_and(|l| l.is_unlocked)
    }

    /// Whether a level is solved, regardless of the portal gate.
    pub fn is_level_solved(&self, id: &str) -> bool {
        self.level(id).is_some_and(|l| l.is_solved)
    }

    /// First unlocked, unsolved level in sequence order.
    pub fn next_puzzle_level(&self) -> Option<&PuzzleLevel> {
        self.levels.iter().find(|l| l.is_unlocked && !l.is_solved)
    }

    /// Forget all progress.
    pub fn reset(&mut self) {
        self.portal_solved = false;
        self.levels = default_levels();
        self.current_level = 0;

        for key in [PORTAL_SOLVED_KEY, PUZZLE_PROGRESS_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to clear {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;

    fn fresh() -> PuzzleContext<MemoryStorage> {
        PuzzleContext::load(MemoryStorage::new())
    }

    #[test]
    fn test_initial_state() {
        let ctx = fresh();
        assert!(!ctx.portal_solved());
        assert!(!ctx.can_access_easter_eggs());
        assert_eq!(ctx.current_level(), 0);
        assert_eq!(ctx.levels().len(), 5);
        assert!(ctx.levels().iter().all(|l| !l.is_unlocked && !l.is_solved));
        assert!(ctx.next_puzzle_level().is_none());
    }

    #[test]
    fn test_portal_unlocks_first_level() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);

        assert!(ctx.can_access_easter_eggs());
        assert!(ctx.is_level_unlocked("echoes"));
        assert!(!ctx.is_level_unlocked("whispers"));
        assert_eq!(ctx.next_puzzle_level().map(|l| l.id.as_str()), Some("echoes"));
    }

    #[test]
    fn test_solve_chain() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);
        assert!(ctx.solve_puzzle("echoes"));

        assert!(ctx.is_level_solved("echoes"));
        assert!(ctx.level("whispers").unwrap().is_unlocked);
        assert!(ctx.is_level_unlocked("whispers"));
        assert!(!ctx.is_level_unlocked("reflection"));
        assert_eq!(ctx.current_level(), 1);
        assert_eq!(
            ctx.next_puzzle_level().map(|l| l.id.as_str()),
            Some("whispers")
        );
    }

    #[test]
    fn test_solving_last_level_keeps_index() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);
        for id in ["echoes", "whispers", "reflection", "resonance", "convergence"] {
            assert!(ctx.solve_puzzle(id));
        }

        assert_eq!(ctx.current_level(), 4);
        assert!(ctx.levels().iter().all(|l| l.is_solved && l.is_unlocked));
        assert!(ctx.next_puzzle_level().is_none());
    }

    #[test]
    fn test_gate_precedence() {
        let mut ctx = fresh();
        for level in default_levels() {
            ctx.unlock_puzzle(&level.id);
        }
        assert!(ctx.levels().iter().all(|l| l.is_unlocked));

        for level in default_levels() {
            assert!(!ctx.is_level_unlocked(&level.id));
        }
    }

    #[test]
    fn test_solved_ignores_gate() {
        let mut ctx = fresh();
        ctx.solve_puzzle("echoes");
        assert!(ctx.is_level_solved("echoes"));
        assert!(!ctx.is_level_unlocked("echoes"));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);
        let before = ctx.levels().to_vec();

        assert!(!ctx.solve_puzzle("nope"));
        assert!(!ctx.unlock_puzzle("nope"));
        assert_eq!(ctx.levels(), before.as_slice());
        assert!(!ctx.is_level_unlocked("nope"));
        assert!(!ctx.is_level_solved("nope"));
    }

    #[test]
    fn test_clearing_portal_does_not_relock() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);
        ctx.set_portal_solved(false);

        assert!(ctx.level("echoes").unwrap().is_unlocked);
        assert!(!ctx.is_level_unlocked("echoes"));
    }

    #[test]
    fn test_progress_survives_reload() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);
        ctx.solve_puzzle("echoes");

        let reloaded = PuzzleContext::load(ctx.into_storage());
        assert!(reloaded.portal_solved());
        assert!(reloaded.is_level_solved("echoes"));
        assert!(reloaded.is_level_unlocked("whispers"));
        assert_eq!(reloaded.current_level(), 1);
    }

    #[test]
    fn test_progress_blob_shape() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);

        let blob = ctx.storage().get(PUZZLE_PROGRESS_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(value["currentLevel"], 0);
        assert_eq!(value["puzzleLevels"][0]["id"], "echoes");
        assert_eq!(value["puzzleLevels"][0]["isUnlocked"], true);
        assert_eq!(value["puzzleLevels"][0]["isSolved"], false);
        assert_eq!(ctx.storage().get(PORTAL_SOLVED_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_corrupt_progress_falls_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(PORTAL_SOLVED_KEY, "true").unwrap();
        storage.set(PUZZLE_PROGRESS_KEY, "{not json").unwrap();

        let ctx = PuzzleContext::load(storage);
        assert!(ctx.portal_solved());
        assert_eq!(ctx.levels(), default_levels().as_slice());
        assert_eq!(ctx.current_level(), 0);
    }

    #[test]
    fn test_restore_keeps_fixed_order() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                PUZZLE_PROGRESS_KEY,
                r#"{"puzzleLevels":[
                    {"id":"bogus","name":"Bogus","isUnlocked":true,"isSolved":true,"path":"/x"},
                    {"id":"whispers","name":"Renamed","isUnlocked":true,"isSolved":false,"path":"/y"}
                ],"currentLevel":99}"#,
            )
            .unwrap();

        let ctx = PuzzleContext::load(storage);
        let ids: Vec<&str> = ctx.levels().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(
            ids,
            ["echoes", "whispers", "reflection", "resonance", "convergence"]
        );
        let whispers = ctx.level("whispers").unwrap();
        assert!(whispers.is_unlocked);
        assert_eq!(whispers.name, "Whispers");
        assert_eq!(whispers.path, "/whispers");
        assert_eq!(ctx.current_level(), 4);
    }

    #[test]
    fn test_reset() {
        let mut ctx = fresh();
        ctx.set_portal_solved(true);
        ctx.solve_puzzle("echoes");
        ctx.reset();

        assert!(!ctx.portal_solved());
        assert_eq!(ctx.levels(), default_levels().as_slice());
        assert_eq!(ctx.storage().get(PUZZLE_PROGRESS_KEY), None);
        assert_eq!(ctx.storage().get(PORTAL_SOLVED_KEY), None);
    }
}
