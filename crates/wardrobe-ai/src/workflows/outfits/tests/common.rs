use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::workflows::outfits::color::Rgb;
use crate::workflows::outfits::domain::{
    Category, Combination, ItemUrl, OutfitDraft, SavedOutfit, WardrobeItem,
};
use crate::workflows::outfits::memory::{InMemoryItemStore, InMemoryOutfitStore};
use crate::workflows::outfits::repository::{ItemStore, OutfitStore, StoreError};
use crate::workflows::outfits::router::{outfit_router, SharedSession};
use crate::workflows::outfits::scoring::{ScoringConfig, ScoringEngine};
use crate::workflows::outfits::service::{OutfitSession, SessionConfig};

pub(super) fn item(url: &str, category: Category, rgb: (f64, f64, f64)) -> WardrobeItem {
    WardrobeItem {
        url: ItemUrl::from(url),
        category,
        brand: format!("{}-brand", url),
        size: "M".to_string(),
        rgb: Rgb::new(rgb.0, rgb.1, rgb.2),
        rejection_count: 0,
    }
}

/// Grey items whose Casual score falls as they move away from (150,150,150).
pub(super) fn greys(prefix: &str, category: Category, count: usize) -> Vec<WardrobeItem> {
    (0..count)
        .map(|index| {
            let value = 150.0 - 20.0 * index as f64;
            item(&format!("{prefix}{index}"), category, (value, value, value))
        })
        .collect()
}

/// Tops, bottoms, and shoes ranked `{t,b,s}0` first under Casual.
pub(super) fn grey_wardrobe(tops: usize, bottoms: usize, shoes: usize) -> Vec<WardrobeItem> {
    let mut items = greys("t", Category::Top, tops);
    items.extend(greys("b", Category::Bottom, bottoms));
    items.extend(greys("s", Category::Shoes, shoes));
    items
}

/// Three tops (red, charcoal, neutral grey) with three bottoms and shoes.
pub(super) fn scenario_wardrobe() -> Vec<WardrobeItem> {
    vec![
        item("top-red", Category::Top, (255.0, 0.0, 0.0)),
        item("top-charcoal", Category::Top, (10.0, 10.0, 10.0)),
        item("top-grey", Category::Top, (150.0, 150.0, 150.0)),
        item("bottom-navy", Category::Bottom, (20.0, 30.0, 90.0)),
        item("bottom-stone", Category::Bottom, (140.0, 135.0, 130.0)),
        item("bottom-cream", Category::Bottom, (245.0, 240.0, 230.0)),
        item("shoes-black", Category::Shoes, (12.0, 12.0, 12.0)),
        item("shoes-white", Category::Shoes, (250.0, 250.0, 250.0)),
        item("shoes-tan", Category::Shoes, (170.0, 140.0, 100.0)),
    ]
}

pub(super) fn combination(top: &str, bottom: &str, shoes: &str) -> Combination {
    Combination {
        top: ItemUrl::from(top),
        bottom: ItemUrl::from(bottom),
        shoes: ItemUrl::from(shoes),
    }
}

pub(super) fn saved_outfit(
    name: &str,
    style: &str,
    day: u32,
    items: &[WardrobeItem],
    urls: (&str, &str, &str),
) -> SavedOutfit {
    let find = |url: &str| {
        items
            .iter()
            .find(|item| item.url.as_str() == url)
            .expect("fixture item exists")
            .snapshot()
    };
    OutfitDraft {
        name: name.to_string(),
        style: style.to_string(),
        top: find(urls.0),
        bottom: find(urls.1),
        shoes: find(urls.2),
    }
    .into_saved(
        Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}

pub(super) fn seeded_scoring() -> ScoringConfig {
    ScoringConfig {
        random_seed: Some(42),
        ..ScoringConfig::default()
    }
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(seeded_scoring())
}

pub(super) type MemorySession = OutfitSession<InMemoryOutfitStore, InMemoryItemStore>;

pub(super) fn build_session(
    items: Vec<WardrobeItem>,
) -> (MemorySession, Arc<InMemoryOutfitStore>, Arc<InMemoryItemStore>) {
    build_session_with_saved(items, Vec::new())
}

pub(super) fn build_session_with_saved(
    items: Vec<WardrobeItem>,
    saved: Vec<SavedOutfit>,
) -> (MemorySession, Arc<InMemoryOutfitStore>, Arc<InMemoryItemStore>) {
    let outfits = Arc::new(InMemoryOutfitStore::with_outfits(saved));
    let item_store = Arc::new(InMemoryItemStore::with_items(items));
    let session = OutfitSession::new(
        outfits.clone(),
        item_store.clone(),
        seeded_scoring(),
        SessionConfig::default(),
    );
    (session, outfits, item_store)
}

pub(super) fn shared<O, I>(session: OutfitSession<O, I>) -> SharedSession<O, I> {
    Arc::new(Mutex::new(session))
}

pub(super) fn router_for(session: MemorySession) -> axum::Router {
    outfit_router(shared(session))
}

/// Outfit store that can be switched offline mid-test.
#[derive(Default)]
pub(super) struct SwitchableOutfitStore {
    pub(super) inner: InMemoryOutfitStore,
    pub(super) offline: AtomicBool,
}

impl SwitchableOutfitStore {
    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("outfit store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OutfitStore for SwitchableOutfitStore {
    async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.check()?;
        self.inner.name_exists(name).await
    }

    async fn combination_exists(&self, combination: &Combination) -> Result<bool, StoreError> {
        self.check()?;
        self.inner.combination_exists(combination).await
    }

    async fn persist(&self, draft: OutfitDraft) -> Result<SavedOutfit, StoreError> {
        self.check()?;
        self.inner.persist(draft).await
    }

    async fn list_saved(&self) -> Result<Vec<SavedOutfit>, StoreError> {
        self.check()?;
        self.inner.list_saved().await
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(name).await
    }
}

/// Item store whose writes fail once switched offline; reads keep working.
/// Increments can also be made to fail for a single url.
pub(super) struct SwitchableItemStore {
    pub(super) inner: InMemoryItemStore,
    pub(super) offline: AtomicBool,
    failing_url: StdMutex<Option<ItemUrl>>,
}

impl SwitchableItemStore {
    pub(super) fn new(items: Vec<WardrobeItem>) -> Self {
        Self {
            inner: InMemoryItemStore::with_items(items),
            offline: AtomicBool::new(false),
            failing_url: StdMutex::new(None),
        }
    }

    pub(super) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(super) fn fail_increments_for(&self, url: Option<&str>) {
        *self.failing_url.lock().expect("failing url lock") = url.map(ItemUrl::from);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("item store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for SwitchableItemStore {
    async fn list_items(&self) -> Result<Vec<WardrobeItem>, StoreError> {
        self.inner.list_items().await
    }

    async fn rejection_count(&self, url: &ItemUrl) -> Result<u32, StoreError> {
        self.inner.rejection_count(url).await
    }

    async fn increment_rejection(&self, url: &ItemUrl) -> Result<u32, StoreError> {
        self.check()?;
        if self.failing_url.lock().expect("failing url lock").as_ref() == Some(url) {
            return Err(StoreError::Unavailable(format!("write to {url} failed")));
        }
        self.inner.increment_rejection(url).await
    }

    async fn restore_rejection(&self, url: &ItemUrl, count: u32) -> Result<(), StoreError> {
        self.check()?;
        self.inner.restore_rejection(url, count).await
    }

    async fn reset_rejection(&self, url: &ItemUrl) -> Result<(), StoreError> {
        self.check()?;
        self.inner.reset_rejection(url).await
    }

    async fn reset_all_rejections(&self) -> Result<(), StoreError> {
        self.check()?;
        self.inner.reset_all_rejections().await
    }

    async fn delete_item(&self, url: &ItemUrl) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete_item(url).await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
