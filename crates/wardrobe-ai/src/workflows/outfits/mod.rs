//! Outfit generation: color model, style scoring, best-first search, and the
//! reject/lock/save session built on top of them.
//!
//! Stores are injected as `Arc`s of the gateway traits; the in-memory
//! implementations back both the tests and the API binary.

pub mod color;
pub mod domain;
pub mod enumerator;
pub mod memory;
pub mod rejection;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod similarity;

#[cfg(test)]
mod tests;

pub use color::{BrightColor, Rgb, RgbRange};
pub use domain::{
    Category, Combination, Disposition, GeneratedOutfit, ItemSnapshot, ItemUrl, OutfitDraft,
    SavedOutfit, ScoredItem, SlotLocks, Style, WardrobeCount, WardrobeItem,
};
pub use enumerator::{
    EnumeratorError, LockToggle, OutfitEnumerator, SavedIndex, SavedLookup, Step, StepStatus,
};
pub use memory::{InMemoryItemStore, InMemoryOutfitStore};
pub use rejection::{DispositionPrompt, RejectionTracker};
pub use repository::{ItemStore, OutfitStore, StoreError};
pub use router::{outfit_router, SharedSession};
pub use scoring::{SandwichPair, ScoringConfig, ScoringEngine};
pub use service::{OutfitSession, PromptOutcome, RejectOutcome, SessionConfig, SessionError};
pub use similarity::SimilarityMatrix;
