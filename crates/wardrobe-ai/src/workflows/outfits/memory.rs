//! Process-local gateways backing the API binary and the tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{Combination, ItemUrl, OutfitDraft, SavedOutfit, WardrobeItem};
use super::repository::{ItemStore, OutfitStore, StoreError};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable(format!("{what} mutex poisoned")))
}

#[derive(Default, Clone)]
pub struct InMemoryOutfitStore {
    outfits: Arc<Mutex<Vec<SavedOutfit>>>,
}

impl InMemoryOutfitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outfits(outfits: Vec<SavedOutfit>) -> Self {
        Self {
            outfits: Arc::new(Mutex::new(outfits)),
        }
    }
}

#[async_trait]
impl OutfitStore for InMemoryOutfitStore {
    async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let outfits = lock(&self.outfits, "outfit store")?;
        Ok(outfits.iter().any(|outfit| outfit.name == name))
    }

    async fn combination_exists(&self, combination: &Combination) -> Result<bool, StoreError> {
        let outfits = lock(&self.outfits, "outfit store")?;
        Ok(outfits
            .iter()
            .any(|outfit| &outfit.combination() == combination))
    }

    async fn persist(&self, draft: OutfitDraft) -> Result<SavedOutfit, StoreError> {
        let mut outfits = lock(&self.outfits, "outfit store")?;
        if outfits.iter().any(|outfit| outfit.name == draft.name) {
            return Err(StoreError::NameTaken(draft.name));
        }
        let combination = draft.combination();
        if outfits
            .iter()
            .any(|outfit| outfit.combination() == combination)
        {
            return Err(StoreError::CombinationTaken);
        }
        let saved = draft.into_saved(Utc::now());
        outfits.push(saved.clone());
        Ok(saved)
    }

    async fn list_saved(&self) -> Result<Vec<SavedOutfit>, StoreError> {
        let outfits = lock(&self.outfits, "outfit store")?;
        Ok(outfits.clone())
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut outfits = lock(&self.outfits, "outfit store")?;
        let before = outfits.len();
        outfits.retain(|outfit| outfit.name != name);
        if outfits.len() == before {
            return Err(StoreError::NotFound(format!("outfit \"{name}\"")));
        }
        Ok(())
    }
}

/// Items keyed by URL, remembering insertion order for listing.
#[derive(Default, Clone)]
pub struct InMemoryItemStore {
    items: Arc<Mutex<ItemTable>>,
}

#[derive(Default)]
struct ItemTable {
    order: Vec<ItemUrl>,
    by_url: HashMap<ItemUrl, WardrobeItem>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<WardrobeItem>) -> Self {
        let mut table = ItemTable::default();
        for item in items {
            if !table.by_url.contains_key(&item.url) {
                table.order.push(item.url.clone());
            }
            table.by_url.insert(item.url.clone(), item);
        }
        Self {
            items: Arc::new(Mutex::new(table)),
        }
    }
}

fn missing_item(url: &ItemUrl) -> StoreError {
    StoreError::NotFound(format!("item {url}"))
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_items(&self) -> Result<Vec<WardrobeItem>, StoreError> {
        let table = lock(&self.items, "item store")?;
        Ok(table
            .order
            .iter()
            .filter_map(|url| table.by_url.get(url).cloned())
            .collect())
    }

    async fn rejection_count(&self, url: &ItemUrl) -> Result<u32, StoreError> {
        let table = lock(&self.items, "item store")?;
        table
            .by_url
            .get(url)
            .map(|item| item.rejection_count)
            .ok_or_else(|| missing_item(url))
    }

    async fn increment_rejection(&self, url: &ItemUrl) -> Result<u32, StoreError> {
        let mut table = lock(&self.items, "item store")?;
        let item = table.by_url.get_mut(url).ok_or_else(|| missing_item(url))?;
        item.rejection_count = item.rejection_count.saturating_add(1);
        Ok(item.rejection_count)
    }

    async fn restore_rejection(&self, url: &ItemUrl, count: u32) -> Result<(), StoreError> {
        let mut table = lock(&self.items, "item store")?;
        let item = table.by_url.get_mut(url).ok_or_else(|| missing_item(url))?;
        item.rejection_count = count;
        Ok(())
    }

    async fn reset_rejection(&self, url: &ItemUrl) -> Result<(), StoreError> {
        self.restore_rejection(url, 0).await
    }

    async fn reset_all_rejections(&self) -> Result<(), StoreError> {
        let mut table = lock(&self.items, "item store")?;
        for item in table.by_url.values_mut() {
            item.rejection_count = 0;
        }
        Ok(())
    }

    async fn delete_item(&self, url: &ItemUrl) -> Result<(), StoreError> {
        let mut table = lock(&self.items, "item store")?;
        if table.by_url.remove(url).is_none() {
            return Err(missing_item(url));
        }
        table.order.retain(|existing| existing != url);
        Ok(())
    }
}
