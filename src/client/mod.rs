//! Client-side state for the website's hidden content.
//!
//! Everything here lives in one visitor's local storage and is never sent to
//! the server.

pub mod eggs;
pub mod portal;
pub mod puzzle;
pub mod storage;

pub use eggs::EASTER_EGG_IDS;
pub use portal::{Portal, PortalOutcome};
pub use puzzle::{default_levels, PuzzleContext, PuzzleLevel};
pub use storage::{ClientStorage, JsonFileStorage, MemoryStorage, StorageError};
