use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    Category, Disposition, GeneratedOutfit, ItemUrl, OutfitDraft, SavedOutfit, ScoredItem, Style,
    WardrobeCount, WardrobeItem,
};
use super::enumerator::{EnumeratorError, LockToggle, OutfitEnumerator, SavedIndex, Step};
use super::rejection::{DispositionPrompt, RejectionTracker, DEFAULT_REJECTION_THRESHOLD};
use super::repository::{ItemStore, OutfitStore, StoreError};
use super::scoring::{SandwichPair, ScoringConfig, ScoringEngine};

pub const DEFAULT_MINIMUM_ITEMS_PER_CATEGORY: usize = 3;
pub const DEFAULT_DONATION_URL: &str = "https://donateclothes.uk/";

/// Shown alongside an outfit when every combination for the style is saved.
pub const EXHAUSTED_MESSAGE: &str =
    "Every outfit combination for this style is already saved; showing the best match again.";

/// Session tunables that are not part of scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub rejection_threshold: u32,
    pub minimum_items_per_category: usize,
    pub donation_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rejection_threshold: DEFAULT_REJECTION_THRESHOLD,
            minimum_items_per_category: DEFAULT_MINIMUM_ITEMS_PER_CATEGORY,
            donation_url: DEFAULT_DONATION_URL.to_string(),
        }
    }
}

/// Result of rejecting the current outfit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RejectOutcome {
    /// No item reached the threshold; the next outfit is ready.
    Advanced { step: Step },
    /// At least one item needs a disposition before the flow continues.
    Prompt { prompt: DispositionPrompt },
}

/// Result of answering a disposition prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromptOutcome {
    NextPrompt { prompt: DispositionPrompt },
    /// The queue drained and the outfit flow moved on.
    Resumed { step: Step },
    /// Link-out only; the prompt stays at the front of the queue.
    Donate {
        url: String,
        prompt: DispositionPrompt,
    },
}

/// One user's outfit session: enumerator, rejection tracker, and both stores.
///
/// Every store call completes before in-memory state changes, so a failed call
/// leaves the session exactly as it was.
pub struct OutfitSession<O, I> {
    outfits: Arc<O>,
    items: Arc<I>,
    config: SessionConfig,
    wardrobe: Vec<WardrobeItem>,
    saved: SavedIndex,
    enumerator: OutfitEnumerator,
    tracker: RejectionTracker,
}

impl<O, I> OutfitSession<O, I>
where
    O: OutfitStore + 'static,
    I: ItemStore + 'static,
{
    pub fn new(
        outfits: Arc<O>,
        items: Arc<I>,
        scoring: ScoringConfig,
        config: SessionConfig,
    ) -> Self {
        let tracker = RejectionTracker::new(config.rejection_threshold);
        Self {
            outfits,
            items,
            config,
            wardrobe: Vec::new(),
            saved: SavedIndex::default(),
            enumerator: OutfitEnumerator::new(ScoringEngine::new(scoring)),
            tracker,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn wardrobe(&self) -> &[WardrobeItem] {
        &self.wardrobe
    }

    pub fn wardrobe_count(&self) -> WardrobeCount {
        WardrobeCount::from_items(&self.wardrobe)
    }

    pub fn style(&self) -> Option<Style> {
        self.enumerator.style()
    }

    pub fn current(&self) -> Option<&GeneratedOutfit> {
        self.enumerator.current()
    }

    pub fn ranking(&self, slot: Category) -> Option<&[ScoredItem]> {
        self.enumerator.ranking(slot)
    }

    pub fn sandwich_pairs(&self) -> Option<&[SandwichPair]> {
        self.enumerator.sandwich_pairs()
    }

    pub fn current_prompt(&self) -> Option<&DispositionPrompt> {
        self.tracker.current_prompt()
    }

    pub fn pending_prompts(&self) -> usize {
        self.tracker.pending()
    }

    /// Pulls the flat item list from the item store.
    pub async fn load_wardrobe(&mut self) -> Result<WardrobeCount, SessionError> {
        let items = self.items.list_items().await?;
        self.wardrobe = items;
        let count = self.wardrobe_count();
        info!(%count, "wardrobe loaded");
        Ok(count)
    }

    /// Loads the wardrobe and saved outfits, then shows the best unsaved outfit for `style`.
    pub async fn start(&mut self, style: Style) -> Result<Step, SessionError> {
        let items = self.items.list_items().await?;
        let count = WardrobeCount::from_items(&items);
        let minimum = self.config.minimum_items_per_category;
        if !count.has_minimum_items(minimum) {
            warn!(%count, minimum, "wardrobe below minimum, refusing to generate");
            return Err(SessionError::InsufficientWardrobe { count, minimum });
        }
        let saved = self.fetch_saved_index().await?;

        let step = self.enumerator.generate(style, &items, &saved)?;
        self.wardrobe = items;
        self.saved = saved;
        self.tracker.clear();
        log_step("generated", &step);
        Ok(step)
    }

    /// Next unsaved outfit; refused while a disposition prompt is open.
    pub async fn next(&mut self) -> Result<Step, SessionError> {
        self.ensure_no_prompt()?;
        self.ensure_started()?;
        let step = self.enumerator.advance(&self.saved)?;
        log_step("advanced", &step);
        Ok(step)
    }

    pub fn toggle_lock(&mut self, slot: Category) -> Result<LockToggle, SessionError> {
        self.ensure_started()?;
        let toggle = self.enumerator.toggle_lock(slot)?;
        info!(slot = %slot, locked = toggle.locked, ready_to_save = toggle.ready_to_save, "lock toggled");
        Ok(toggle)
    }

    /// Counts a rejection against every unlocked item, then advances unless a prompt was queued.
    pub async fn reject(&mut self) -> Result<RejectOutcome, SessionError> {
        self.ensure_no_prompt()?;
        let outfit = self.current().cloned().ok_or(SessionError::NotStarted)?;
        let targets = RejectionTracker::rejection_targets(&outfit);

        let mut priors = Vec::with_capacity(targets.len());
        for (_, item) in &targets {
            priors.push(self.items.rejection_count(&item.url).await?);
        }
        let mut counts = Vec::with_capacity(targets.len());
        for (_, item) in &targets {
            match self.items.increment_rejection(&item.url).await {
                Ok(count) => counts.push(count),
                Err(error) => {
                    self.roll_back_increments(&targets[..counts.len()], &priors).await;
                    return Err(error.into());
                }
            }
        }

        for (((slot, item), prior), count) in targets.into_iter().zip(priors).zip(counts) {
            info!(item = %item.url, slot = %slot, rejection_count = count, "rejection recorded");
            let mut updated = item.clone();
            updated.rejection_count = count;
            self.set_local_count(&updated.url, count);
            if self.tracker.reaches_threshold(prior) {
                self.tracker.enqueue(slot, updated, count);
            }
        }

        if let Some(prompt) = self.tracker.current_prompt() {
            return Ok(RejectOutcome::Prompt {
                prompt: prompt.clone(),
            });
        }
        let step = self.enumerator.advance(&self.saved)?;
        log_step("advanced after rejection", &step);
        Ok(RejectOutcome::Advanced { step })
    }

    /// Answers the prompt at the front of the queue.
    pub async fn resolve_prompt(
        &mut self,
        disposition: Disposition,
    ) -> Result<PromptOutcome, SessionError> {
        let prompt = self
            .tracker
            .current_prompt()
            .cloned()
            .ok_or(SessionError::NoPendingPrompt)?;
        let url = prompt.item.url.clone();

        match disposition {
            Disposition::Donate => {
                info!(item = %url, "donation link requested");
                return Ok(PromptOutcome::Donate {
                    url: self.config.donation_url.clone(),
                    prompt,
                });
            }
            Disposition::Keep => {
                self.items.reset_rejection(&url).await?;
                self.tracker.complete_current();
                self.set_local_count(&url, 0);
                info!(item = %url, "item kept, rejection count reset");
            }
            Disposition::Delete => {
                self.items.delete_item(&url).await?;
                // Dequeue the answered prompt first; forget_item only drops stale duplicates.
                self.tracker.complete_current();
                self.forget_item(&url);
                info!(item = %url, "item deleted from wardrobe");
            }
        }

        if let Some(next) = self.tracker.current_prompt() {
            return Ok(PromptOutcome::NextPrompt {
                prompt: next.clone(),
            });
        }
        let step = self.enumerator.advance(&self.saved)?;
        log_step("resumed", &step);
        Ok(PromptOutcome::Resumed { step })
    }

    /// Persists the current outfit under `name`.
    pub async fn save(&mut self, name: &str) -> Result<SavedOutfit, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidName);
        }
        let outfit = self.current().ok_or(SessionError::NotStarted)?;
        let style = self.style().ok_or(SessionError::NotStarted)?;
        let (Some(top), Some(bottom), Some(shoes)) = (&outfit.top, &outfit.bottom, &outfit.shoes)
        else {
            return Err(SessionError::IncompleteOutfit);
        };
        let draft = OutfitDraft {
            name: name.to_string(),
            style: style.label().to_string(),
            top: top.item.snapshot(),
            bottom: bottom.item.snapshot(),
            shoes: shoes.item.snapshot(),
        };

        if self.outfits.name_exists(name).await? {
            warn!(name, "outfit name already taken");
            return Err(StoreError::NameTaken(name.to_string()).into());
        }
        let combination = draft.combination();
        if self.outfits.combination_exists(&combination).await? {
            warn!(name, "outfit combination already saved");
            return Err(StoreError::CombinationTaken.into());
        }

        let saved = self.outfits.persist(draft).await?;
        info!(name = %saved.name, style = %saved.style, "outfit saved");

        match self.fetch_saved_index().await {
            Ok(index) => self.saved = index,
            Err(error) => {
                warn!(%error, "could not reload saved outfits, keeping local index");
                self.saved.insert(combination);
            }
        }
        Ok(saved)
    }

    /// Zeroes every rejection counter.
    pub async fn reset_rejections(&mut self) -> Result<(), SessionError> {
        self.items.reset_all_rejections().await?;
        for item in &mut self.wardrobe {
            item.rejection_count = 0;
        }
        info!("all rejection counters reset");
        Ok(())
    }

    /// Saved outfits, newest first, optionally filtered on name or style.
    pub async fn saved_outfits(&self, filter: Option<&str>) -> Result<Vec<SavedOutfit>, SessionError> {
        let mut outfits = self.outfits.list_saved().await?;
        if let Some(query) = filter {
            outfits.retain(|outfit| outfit.matches_filter(query));
        }
        outfits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(outfits)
    }

    /// Deletes a saved outfit so its combination can be generated again.
    pub async fn delete_saved(&mut self, name: &str) -> Result<(), SessionError> {
        self.outfits.delete(name).await?;
        info!(name, "saved outfit deleted");
        self.saved = self.fetch_saved_index().await?;
        Ok(())
    }

    async fn fetch_saved_index(&self) -> Result<SavedIndex, SessionError> {
        let outfits = self.outfits.list_saved().await?;
        Ok(SavedIndex::from_combinations(
            outfits.iter().map(SavedOutfit::combination),
        ))
    }

    fn ensure_no_prompt(&self) -> Result<(), SessionError> {
        if self.tracker.has_pending() {
            return Err(SessionError::PromptPending);
        }
        Ok(())
    }

    fn ensure_started(&self) -> Result<(), SessionError> {
        if self.current().is_none() {
            return Err(SessionError::NotStarted);
        }
        Ok(())
    }

    async fn roll_back_increments(&self, applied: &[(Category, &WardrobeItem)], priors: &[u32]) {
        for ((_, item), prior) in applied.iter().zip(priors) {
            if let Err(error) = self.items.restore_rejection(&item.url, *prior).await {
                warn!(item = %item.url, %error, "could not roll back rejection count");
            }
        }
    }

    fn set_local_count(&mut self, url: &ItemUrl, count: u32) {
        if let Some(item) = self.wardrobe.iter_mut().find(|item| &item.url == url) {
            item.rejection_count = count;
        }
    }

    fn forget_item(&mut self, url: &ItemUrl) {
        self.wardrobe.retain(|item| &item.url != url);
        self.enumerator.remove_item(url);
        self.tracker.discard(url);
    }
}

fn log_step(action: &str, step: &Step) {
    if step.is_exhausted() {
        warn!(action, "{EXHAUSTED_MESSAGE}");
    } else {
        info!(
            action,
            status = ?step.status,
            score = step.outfit.overall_score(),
            "outfit ready"
        );
    }
}

/// Error raised by the outfit session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("wardrobe has {count}; at least {minimum} of each are needed")]
    InsufficientWardrobe { count: WardrobeCount, minimum: usize },
    #[error("resolve the pending item prompt before continuing")]
    PromptPending,
    #[error("there is no pending item prompt")]
    NoPendingPrompt,
    #[error("outfit name must not be empty")]
    InvalidName,
    #[error("the current outfit is missing an item")]
    IncompleteOutfit,
    #[error("no outfit session has been started")]
    NotStarted,
    #[error(transparent)]
    Enumerator(#[from] EnumeratorError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
