use async_trait::async_trait;

use super::domain::{Combination, ItemUrl, OutfitDraft, SavedOutfit, WardrobeItem};

/// Persistence of saved outfits, injected so the session can run against fakes.
#[async_trait]
pub trait OutfitStore: Send + Sync {
    async fn name_exists(&self, name: &str) -> Result<bool, StoreError>;

    async fn combination_exists(&self, combination: &Combination) -> Result<bool, StoreError>;

    /// Stores the draft; fails with `NameTaken` or `CombinationTaken` on collision.
    async fn persist(&self, draft: OutfitDraft) -> Result<SavedOutfit, StoreError>;

    async fn list_saved(&self) -> Result<Vec<SavedOutfit>, StoreError>;

    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}

/// Wardrobe items and their persisted rejection counters.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_items(&self) -> Result<Vec<WardrobeItem>, StoreError>;

    async fn rejection_count(&self, url: &ItemUrl) -> Result<u32, StoreError>;

    /// Adds one to the counter and returns the new value.
    async fn increment_rejection(&self, url: &ItemUrl) -> Result<u32, StoreError>;

    /// Overwrites the counter; used to undo increments when a reject fails partway.
    async fn restore_rejection(&self, url: &ItemUrl, count: u32) -> Result<(), StoreError>;

    async fn reset_rejection(&self, url: &ItemUrl) -> Result<(), StoreError>;

    async fn reset_all_rejections(&self) -> Result<(), StoreError>;

    async fn delete_item(&self, url: &ItemUrl) -> Result<(), StoreError>;
}

/// Gateway failure, keeping user-correctable collisions apart from I/O trouble.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("an outfit named \"{0}\" already exists")]
    NameTaken(String),
    #[error("this outfit combination is already saved")]
    CombinationTaken,
    #[error("{0} not found")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
