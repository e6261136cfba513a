//! Deterministic best-first walk over outfit combinations.
//!
//! Casual, Streetwear, and Random rank each category independently and walk the
//! combinations as a mixed-radix counter over the unlocked slots (shoes turn
//! fastest, then bottoms, then tops), so a full cycle visits every reachable
//! combination exactly once. Sandwich ranks (top, shoes) pairs and completes
//! each pair with its highest-contrast bottom.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{Category, Combination, GeneratedOutfit, ItemUrl, ScoredItem, SlotLocks, Style, WardrobeItem};
use super::scoring::{of_category, SandwichPair, ScoringEngine};
use super::similarity::SimilarityMatrix;

/// Answers "is this combination already saved" for the walk.
pub trait SavedLookup {
    fn is_saved(&self, combination: &Combination) -> bool;
}

impl<F> SavedLookup for F
where
    F: Fn(&Combination) -> bool,
{
    fn is_saved(&self, combination: &Combination) -> bool {
        self(combination)
    }
}

/// Snapshot of the saved combinations, rebuilt after every save or delete.
#[derive(Debug, Clone, Default)]
pub struct SavedIndex {
    combinations: HashSet<Combination>,
}

impl SavedIndex {
    pub fn from_combinations<I>(combinations: I) -> Self
    where
        I: IntoIterator<Item = Combination>,
    {
        Self {
            combinations: combinations.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, combination: Combination) -> bool {
        self.combinations.insert(combination)
    }

    pub fn contains(&self, combination: &Combination) -> bool {
        self.combinations.contains(combination)
    }
}

impl SavedLookup for SavedIndex {
    fn is_saved(&self, combination: &Combination) -> bool {
        self.contains(combination)
    }
}

/// How a generate or advance call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// An unsaved combination was found.
    Fresh,
    /// Every reachable combination is saved; the best one is shown instead.
    Exhausted,
    /// All slots are locked, nothing to advance.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub outfit: GeneratedOutfit,
    pub status: StepStatus,
}

impl Step {
    pub fn is_exhausted(&self) -> bool {
        self.status == StepStatus::Exhausted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockToggle {
    pub outfit: GeneratedOutfit,
    pub slot: Category,
    pub locked: bool,
    pub ready_to_save: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumeratorError {
    #[error("not enough {category} items to build an outfit")]
    InsufficientItems { category: Category },
    #[error("no outfit has been generated yet")]
    NoActiveOutfit,
    #[error("the {slot} slot is empty and cannot be locked")]
    EmptySlot { slot: Category },
}

/// Items held by locked slots.
#[derive(Debug, Clone, Default)]
struct Pins {
    top: Option<ScoredItem>,
    bottom: Option<ScoredItem>,
    shoes: Option<ScoredItem>,
}

impl Pins {
    fn from_outfit(outfit: &GeneratedOutfit) -> Self {
        Self {
            top: outfit.locked_item(Category::Top).cloned(),
            bottom: outfit.locked_item(Category::Bottom).cloned(),
            shoes: outfit.locked_item(Category::Shoes).cloned(),
        }
    }

    fn get(&self, slot: Category) -> Option<&ScoredItem> {
        match slot {
            Category::Top => self.top.as_ref(),
            Category::Bottom => self.bottom.as_ref(),
            Category::Shoes => self.shoes.as_ref(),
        }
    }

    fn locks(&self) -> SlotLocks {
        SlotLocks {
            top: self.top.is_some(),
            bottom: self.bottom.is_some(),
            shoes: self.shoes.is_some(),
        }
    }

    /// Drops pins whose item left the wardrobe.
    fn retain_present(mut self, items: &[WardrobeItem]) -> Self {
        let present = |pin: &Option<ScoredItem>| {
            pin.as_ref()
                .map_or(false, |scored| items.iter().any(|item| &item.url == scored.url()))
        };
        if !present(&self.top) {
            self.top = None;
        }
        if !present(&self.bottom) {
            self.bottom = None;
        }
        if !present(&self.shoes) {
            self.shoes = None;
        }
        self
    }
}

const fn slot_index(slot: Category) -> usize {
    match slot {
        Category::Top => 0,
        Category::Bottom => 1,
        Category::Shoes => 2,
    }
}

#[derive(Debug, Clone)]
struct RankedPlan {
    lists: [Vec<ScoredItem>; 3],
    cursor: [usize; 3],
}

impl RankedPlan {
    fn list(&self, slot: Category) -> &[ScoredItem] {
        &self.lists[slot_index(slot)]
    }

    fn first_empty(&self) -> Option<Category> {
        Category::ordered()
            .into_iter()
            .find(|slot| self.list(*slot).is_empty())
    }

    /// Points pinned slots at their item and unlocked slots at the head of their list.
    fn rewind(&mut self, pins: &Pins) {
        for slot in Category::ordered() {
            let position = pins.get(slot).and_then(|pinned| {
                self.list(slot)
                    .iter()
                    .position(|entry| entry.url() == pinned.url())
            });
            self.cursor[slot_index(slot)] = position.unwrap_or(0);
        }
    }

    fn cycle_len(&self, pins: &Pins) -> usize {
        Category::ordered()
            .into_iter()
            .filter(|slot| pins.get(*slot).is_none())
            .map(|slot| self.list(slot).len())
            .product()
    }

    /// Advances the counter by one; pinned slots never move.
    fn step(&mut self, pins: &Pins) {
        for slot in [Category::Shoes, Category::Bottom, Category::Top] {
            if pins.get(slot).is_some() {
                continue;
            }
            let index = slot_index(slot);
            let len = self.lists[index].len();
            self.cursor[index] = (self.cursor[index] + 1) % len;
            if self.cursor[index] != 0 {
                break;
            }
        }
    }

    fn outfit(&self, pins: &Pins, keep_pinned: bool) -> GeneratedOutfit {
        let pick = |slot: Category| match pins.get(slot) {
            Some(pinned) if keep_pinned => pinned.clone(),
            _ => self.list(slot)[self.cursor[slot_index(slot)]].clone(),
        };
        GeneratedOutfit::new(
            pick(Category::Top),
            pick(Category::Bottom),
            pick(Category::Shoes),
            pins.locks(),
        )
    }

    fn remove(&mut self, url: &ItemUrl) {
        for index in 0..self.lists.len() {
            let list = &mut self.lists[index];
            if let Some(position) = list.iter().position(|entry| entry.url() == url) {
                list.remove(position);
                let cursor = &mut self.cursor[index];
                if *cursor > position {
                    *cursor -= 1;
                }
                if *cursor >= list.len() {
                    *cursor = 0;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct SandwichPlan {
    pairs: Vec<SandwichPair>,
    bottoms: Vec<WardrobeItem>,
    tops: usize,
    shoes: usize,
    cursor: usize,
}

impl SandwichPlan {
    fn first_empty(&self) -> Option<Category> {
        if self.tops == 0 {
            Some(Category::Top)
        } else if self.bottoms.is_empty() {
            Some(Category::Bottom)
        } else if self.shoes == 0 {
            Some(Category::Shoes)
        } else {
            None
        }
    }

    fn is_compatible(&self, index: usize, pins: &Pins) -> bool {
        let pair = &self.pairs[index];
        let fits = |pin: Option<&ScoredItem>, candidate: &ScoredItem| {
            pin.map_or(true, |pinned| pinned.url() == candidate.url())
        };
        fits(pins.get(Category::Top), &pair.top) && fits(pins.get(Category::Shoes), &pair.shoes)
    }

    fn first_compatible(&self, pins: &Pins) -> Option<usize> {
        (0..self.pairs.len()).find(|index| self.is_compatible(*index, pins))
    }

    fn outfit(
        &self,
        index: usize,
        pins: &Pins,
        scoring: &ScoringEngine,
        keep_pinned: bool,
    ) -> Option<GeneratedOutfit> {
        let pair = &self.pairs[index];
        let bottom = match pins.get(Category::Bottom) {
            Some(pinned) if keep_pinned => pinned.clone(),
            Some(pinned) => scoring.score_bottom(&pinned.item, pair),
            None => scoring.best_bottom(&self.bottoms, pair)?,
        };
        let pick = |slot: Category, fresh: &ScoredItem| match pins.get(slot) {
            Some(pinned) if keep_pinned => pinned.clone(),
            _ => fresh.clone(),
        };
        Some(GeneratedOutfit::new(
            pick(Category::Top, &pair.top),
            bottom,
            pick(Category::Shoes, &pair.shoes),
            pins.locks(),
        ))
    }

    fn remove(&mut self, url: &ItemUrl) {
        let removed_before = self
            .pairs
            .iter()
            .take(self.cursor)
            .filter(|pair| pair.top.url() == url || pair.shoes.url() == url)
            .count();
        if self.pairs.iter().any(|pair| pair.top.url() == url) {
            self.tops = self.tops.saturating_sub(1);
        }
        if self.pairs.iter().any(|pair| pair.shoes.url() == url) {
            self.shoes = self.shoes.saturating_sub(1);
        }
        self.pairs
            .retain(|pair| pair.top.url() != url && pair.shoes.url() != url);
        self.bottoms.retain(|bottom| &bottom.url != url);
        self.cursor = self.cursor.saturating_sub(removed_before);
        if self.cursor >= self.pairs.len() {
            self.cursor = 0;
        }
    }
}

#[derive(Debug, Clone)]
enum Plan {
    Ranked(RankedPlan),
    Sandwich(SandwichPlan),
}

/// Stateful outfit search for one user session.
pub struct OutfitEnumerator {
    scoring: ScoringEngine,
    style: Option<Style>,
    plan: Option<Plan>,
    current: Option<GeneratedOutfit>,
}

impl OutfitEnumerator {
    pub fn new(scoring: ScoringEngine) -> Self {
        Self {
            scoring,
            style: None,
            plan: None,
            current: None,
        }
    }

    pub fn style(&self) -> Option<Style> {
        self.style
    }

    pub fn current(&self) -> Option<&GeneratedOutfit> {
        self.current.as_ref()
    }

    /// Sorted candidates for one slot under a per-item style.
    pub fn ranking(&self, slot: Category) -> Option<&[ScoredItem]> {
        match self.plan.as_ref()? {
            Plan::Ranked(plan) => Some(plan.list(slot)),
            Plan::Sandwich(_) => None,
        }
    }

    /// Sorted (top, shoes) pairs under the Sandwich style.
    pub fn sandwich_pairs(&self) -> Option<&[SandwichPair]> {
        match self.plan.as_ref()? {
            Plan::Sandwich(plan) => Some(&plan.pairs),
            Plan::Ranked(_) => None,
        }
    }

    /// Scores the wardrobe for `style` and selects the best unsaved outfit.
    ///
    /// Locks on the current outfit carry over when regenerating the same style,
    /// as long as the locked item is still in the wardrobe.
    pub fn generate<L: SavedLookup + ?Sized>(
        &mut self,
        style: Style,
        items: &[WardrobeItem],
        saved: &L,
    ) -> Result<Step, EnumeratorError> {
        let pins = match (&self.current, self.style) {
            (Some(current), Some(previous)) if previous == style => {
                Pins::from_outfit(current).retain_present(items)
            }
            _ => Pins::default(),
        };

        let tops = of_category(items, Category::Top);
        let bottoms = of_category(items, Category::Bottom);
        let shoes = of_category(items, Category::Shoes);
        for (category, list) in [
            (Category::Top, &tops),
            (Category::Bottom, &bottoms),
            (Category::Shoes, &shoes),
        ] {
            if list.is_empty() {
                return Err(EnumeratorError::InsufficientItems { category });
            }
        }

        info!(
            style = style.label(),
            tops = tops.len(),
            bottoms = bottoms.len(),
            shoes = shoes.len(),
            "generating outfits"
        );

        let step = if style == Style::Sandwich {
            let matrix = SimilarityMatrix::build(items);
            let pairs = self.scoring.rank_sandwich_pairs(&tops, &shoes, &matrix);
            let mut plan = SandwichPlan {
                pairs,
                tops: tops.len(),
                shoes: shoes.len(),
                bottoms,
                cursor: 0,
            };
            let step = self.walk_sandwich(&mut plan, &pins, None, false, saved)?;
            self.plan = Some(Plan::Sandwich(plan));
            step
        } else {
            let mut plan = RankedPlan {
                lists: [
                    self.scoring.rank_category(style, &tops),
                    self.scoring.rank_category(style, &bottoms),
                    self.scoring.rank_category(style, &shoes),
                ],
                cursor: [0; 3],
            };
            plan.rewind(&pins);
            let step = walk_ranked(&mut plan, &pins, false, false, saved);
            self.plan = Some(Plan::Ranked(plan));
            step
        };

        self.style = Some(style);
        self.current = Some(step.outfit.clone());
        Ok(step)
    }

    /// Moves to the next unsaved outfit without touching locked slots.
    pub fn advance<L: SavedLookup + ?Sized>(&mut self, saved: &L) -> Result<Step, EnumeratorError> {
        let current = self.current.as_ref().ok_or(EnumeratorError::NoActiveOutfit)?;
        if current.all_locked() {
            debug!("all slots locked, nothing to advance");
            return Ok(Step {
                outfit: current.clone(),
                status: StepStatus::Unchanged,
            });
        }
        let pins = Pins::from_outfit(current);

        let mut plan = self.plan.take().ok_or(EnumeratorError::NoActiveOutfit)?;
        let result = match &mut plan {
            Plan::Ranked(ranked) => match ranked.first_empty() {
                Some(category) => Err(EnumeratorError::InsufficientItems { category }),
                None => Ok(walk_ranked(ranked, &pins, true, true, saved)),
            },
            Plan::Sandwich(sandwich) => match sandwich.first_empty() {
                Some(category) => Err(EnumeratorError::InsufficientItems { category }),
                None => {
                    let after = Some(sandwich.cursor);
                    self.walk_sandwich(sandwich, &pins, after, true, saved)
                }
            },
        };
        self.plan = Some(plan);

        let step = result?;
        self.current = Some(step.outfit.clone());
        Ok(step)
    }

    /// Flips one slot's lock; an empty slot cannot be locked.
    pub fn toggle_lock(&mut self, slot: Category) -> Result<LockToggle, EnumeratorError> {
        let current = self.current.as_mut().ok_or(EnumeratorError::NoActiveOutfit)?;
        let locked = !current.is_locked(slot);
        if locked && current.item(slot).is_none() {
            return Err(EnumeratorError::EmptySlot { slot });
        }
        current.locks.set(slot, locked);

        Ok(LockToggle {
            outfit: current.clone(),
            slot,
            locked,
            ready_to_save: current.all_locked(),
        })
    }

    /// Forgets an item for the rest of the session.
    pub fn remove_item(&mut self, url: &ItemUrl) {
        match &mut self.plan {
            Some(Plan::Ranked(plan)) => plan.remove(url),
            Some(Plan::Sandwich(plan)) => plan.remove(url),
            None => {}
        }
        if let Some(current) = &mut self.current {
            for slot in Category::ordered() {
                if current.item(slot).map_or(false, |scored| scored.url() == url) {
                    current.clear(slot);
                }
            }
        }
    }

    /// Walks pairs from the top of the list, or from the pair after `after`, wrapping once.
    fn walk_sandwich<L: SavedLookup + ?Sized>(
        &self,
        plan: &mut SandwichPlan,
        pins: &Pins,
        after: Option<usize>,
        keep_pinned: bool,
        saved: &L,
    ) -> Result<Step, EnumeratorError> {
        let len = plan.pairs.len();
        // Advancing never lands back on the pair it started from.
        let (start, span) = match after {
            Some(cursor) => (cursor + 1, len.saturating_sub(1)),
            None => (0, len),
        };
        for offset in 0..span {
            let index = (start + offset) % len;
            if !plan.is_compatible(index, pins) {
                continue;
            }
            let Some(outfit) = plan.outfit(index, pins, &self.scoring, keep_pinned) else {
                return Err(EnumeratorError::InsufficientItems {
                    category: Category::Bottom,
                });
            };
            if is_saved(&outfit, saved) {
                debug!(pair = index, "skipping saved sandwich combination");
                continue;
            }
            plan.cursor = index;
            return Ok(Step {
                outfit,
                status: StepStatus::Fresh,
            });
        }

        warn!("every sandwich combination is already saved");
        let index = plan
            .first_compatible(pins)
            .ok_or(EnumeratorError::InsufficientItems {
                category: Category::Top,
            })?;
        let outfit = plan
            .outfit(index, pins, &self.scoring, keep_pinned)
            .ok_or(EnumeratorError::InsufficientItems {
                category: Category::Bottom,
            })?;
        plan.cursor = index;
        Ok(Step {
            outfit,
            status: StepStatus::Exhausted,
        })
    }
}

/// Walks one counter cycle; `skip_start` steps before the first check and never
/// re-checks the starting combination.
fn walk_ranked<L: SavedLookup + ?Sized>(
    plan: &mut RankedPlan,
    pins: &Pins,
    skip_start: bool,
    keep_pinned: bool,
    saved: &L,
) -> Step {
    let cycle = plan.cycle_len(pins).max(1);
    let attempts = if skip_start { cycle - 1 } else { cycle };
    for attempt in 0..attempts {
        if skip_start || attempt > 0 {
            plan.step(pins);
        }
        let outfit = plan.outfit(pins, keep_pinned);
        if !is_saved(&outfit, saved) {
            return Step {
                outfit,
                status: StepStatus::Fresh,
            };
        }
        debug!(cursor = ?plan.cursor, "skipping saved combination");
    }

    warn!("every reachable combination is already saved");
    for slot in Category::ordered() {
        if pins.get(slot).is_none() {
            plan.cursor[slot_index(slot)] = 0;
        }
    }
    Step {
        outfit: plan.outfit(pins, keep_pinned),
        status: StepStatus::Exhausted,
    }
}

fn is_saved<L: SavedLookup + ?Sized>(outfit: &GeneratedOutfit, saved: &L) -> bool {
    outfit
        .combination()
        .map_or(false, |combination| saved.is_saved(&combination))
}
