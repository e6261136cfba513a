use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::color::{
    are_similar_colors, is_bright_color, Rgb, BRIGHT_COLOR_THRESHOLD, DARK_RANGE, NEUTRAL_RANGE,
};

/// Source URL of an item photo; the item's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemUrl(pub String);

impl ItemUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemUrl {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Garment category, doubling as the outfit slot an item fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Top,
    Bottom,
    Shoes,
}

impl Category {
    /// Slot evaluation order used by generation, rejection, and prompts.
    pub const fn ordered() -> [Self; 3] {
        [Self::Top, Self::Bottom, Self::Shoes]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Shoes => "shoes",
        }
    }

    /// Plural label used by wardrobe exports.
    pub const fn export_label(self) -> &'static str {
        match self {
            Self::Top => "Tops",
            Self::Bottom => "Bottoms",
            Self::Shoes => "Shoes",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top" | "tops" => Some(Self::Top),
            "bottom" | "bottoms" => Some(Self::Bottom),
            "shoe" | "shoes" => Some(Self::Shoes),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A piece of clothing in the user's wardrobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub url: ItemUrl,
    pub category: Category,
    pub brand: String,
    pub size: String,
    pub rgb: Rgb,
    pub rejection_count: u32,
}

impl WardrobeItem {
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            brand: self.brand.clone(),
            size: self.size.clone(),
            category: self.category,
            url: self.url.clone(),
            rgb: self.rgb,
        }
    }
}

/// Item paired with the match score computed for the active generation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item: WardrobeItem,
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item: WardrobeItem, score: f64) -> Self {
        Self { item, score }
    }

    pub fn url(&self) -> &ItemUrl {
        &self.item.url
    }
}

/// Per-category item counts used to gate generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WardrobeCount {
    pub tops: usize,
    pub bottoms: usize,
    pub shoes: usize,
}

impl WardrobeCount {
    pub fn from_items(items: &[WardrobeItem]) -> Self {
        items.iter().fold(Self::default(), |mut count, item| {
            match item.category {
                Category::Top => count.tops += 1,
                Category::Bottom => count.bottoms += 1,
                Category::Shoes => count.shoes += 1,
            }
            count
        })
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Top => self.tops,
            Category::Bottom => self.bottoms,
            Category::Shoes => self.shoes,
        }
    }

    pub fn has_minimum_items(&self, minimum: usize) -> bool {
        Category::ordered()
            .into_iter()
            .all(|category| self.get(category) >= minimum)
    }

    /// Total number of complete combinations.
    pub fn combinations(&self) -> usize {
        self.tops * self.bottoms * self.shoes
    }
}

impl fmt::Display for WardrobeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tops, {} bottoms, {} shoes",
            self.tops, self.bottoms, self.shoes
        )
    }
}

/// Color-compatibility rule applied across an outfit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Casual,
    Streetwear,
    Sandwich,
    Random,
}

impl Style {
    pub const fn ordered() -> [Self; 4] {
        [Self::Casual, Self::Streetwear, Self::Sandwich, Self::Random]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Casual => "Casual",
            Self::Streetwear => "Streetwear",
            Self::Sandwich => "Sandwich method",
            Self::Random => "Random",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Casual => "Everyday wear",
            Self::Streetwear => "Streetwear style",
            Self::Sandwich => {
                "Top and shoes are the same colour while the bottoms are different"
            }
            Self::Random => "Completely random",
        }
    }

    pub const fn color_rule_description(self) -> &'static str {
        match self {
            Self::Casual => "Neutral colors (RGB: 100-200) for all pieces",
            Self::Streetwear => {
                "Bright top (Red, Green, Blue, Yellow, Cyan, or Magenta) with dark bottoms and shoes (RGB: 0-100)"
            }
            Self::Sandwich => "Top and shoes must have similar RGB values (within 30 points)",
            Self::Random => "No color restrictions",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "casual" => Some(Self::Casual),
            "streetwear" => Some(Self::Streetwear),
            "sandwich" | "sandwich method" | "sandwich_method" => Some(Self::Sandwich),
            "random" => Some(Self::Random),
            _ => None,
        }
    }

    /// Strict pass/fail form of the style's color rule.
    pub fn validate_colors(self, top: Rgb, bottom: Rgb, shoes: Rgb) -> bool {
        match self {
            Self::Casual => {
                NEUTRAL_RANGE.contains(top)
                    && NEUTRAL_RANGE.contains(bottom)
                    && NEUTRAL_RANGE.contains(shoes)
            }
            Self::Streetwear => {
                is_bright_color(top) && DARK_RANGE.contains(bottom) && DARK_RANGE.contains(shoes)
            }
            Self::Sandwich => are_similar_colors(top, shoes, BRIGHT_COLOR_THRESHOLD),
            Self::Random => true,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lock flags for the three slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLocks {
    pub top: bool,
    pub bottom: bool,
    pub shoes: bool,
}

impl SlotLocks {
    pub fn is_locked(&self, slot: Category) -> bool {
        match slot {
            Category::Top => self.top,
            Category::Bottom => self.bottom,
            Category::Shoes => self.shoes,
        }
    }

    pub(crate) fn set(&mut self, slot: Category, locked: bool) {
        match slot {
            Category::Top => self.top = locked,
            Category::Bottom => self.bottom = locked,
            Category::Shoes => self.shoes = locked,
        }
    }

    pub fn all(&self) -> bool {
        self.top && self.bottom && self.shoes
    }
}

/// Candidate outfit shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedOutfit {
    pub top: Option<ScoredItem>,
    pub bottom: Option<ScoredItem>,
    pub shoes: Option<ScoredItem>,
    pub locks: SlotLocks,
}

impl GeneratedOutfit {
    pub fn new(top: ScoredItem, bottom: ScoredItem, shoes: ScoredItem, locks: SlotLocks) -> Self {
        Self {
            top: Some(top),
            bottom: Some(bottom),
            shoes: Some(shoes),
            locks,
        }
    }

    pub fn item(&self, slot: Category) -> Option<&ScoredItem> {
        match slot {
            Category::Top => self.top.as_ref(),
            Category::Bottom => self.bottom.as_ref(),
            Category::Shoes => self.shoes.as_ref(),
        }
    }

    pub(crate) fn clear(&mut self, slot: Category) {
        match slot {
            Category::Top => self.top = None,
            Category::Bottom => self.bottom = None,
            Category::Shoes => self.shoes = None,
        }
        self.locks.set(slot, false);
    }

    pub fn is_locked(&self, slot: Category) -> bool {
        self.locks.is_locked(slot)
    }

    /// Item held by a locked slot, if any.
    pub fn locked_item(&self, slot: Category) -> Option<&ScoredItem> {
        if self.is_locked(slot) {
            self.item(slot)
        } else {
            None
        }
    }

    pub fn all_locked(&self) -> bool {
        self.locks.all()
    }

    pub fn combination(&self) -> Option<Combination> {
        Some(Combination {
            top: self.top.as_ref()?.url().clone(),
            bottom: self.bottom.as_ref()?.url().clone(),
            shoes: self.shoes.as_ref()?.url().clone(),
        })
    }

    pub fn contains(&self, url: &ItemUrl) -> bool {
        Category::ordered()
            .into_iter()
            .filter_map(|slot| self.item(slot))
            .any(|scored| scored.url() == url)
    }

    /// Mean of the filled slots' scores.
    pub fn overall_score(&self) -> f64 {
        let scores: Vec<f64> = Category::ordered()
            .into_iter()
            .filter_map(|slot| self.item(slot).map(|scored| scored.score))
            .collect();
        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }
}

/// Identity of an outfit regardless of its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub top: ItemUrl,
    pub bottom: ItemUrl,
    pub shoes: ItemUrl,
}

/// Frozen copy of an item's essential fields inside a saved outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub brand: String,
    pub size: String,
    pub category: Category,
    pub url: ItemUrl,
    pub rgb: Rgb,
}

/// Request to persist the current outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitDraft {
    pub name: String,
    pub style: String,
    pub top: ItemSnapshot,
    pub bottom: ItemSnapshot,
    pub shoes: ItemSnapshot,
}

impl OutfitDraft {
    pub fn combination(&self) -> Combination {
        Combination {
            top: self.top.url.clone(),
            bottom: self.bottom.url.clone(),
            shoes: self.shoes.url.clone(),
        }
    }

    pub fn into_saved(self, created_at: DateTime<Utc>) -> SavedOutfit {
        SavedOutfit {
            name: self.name,
            style: self.style,
            created_at,
            top: self.top,
            bottom: self.bottom,
            shoes: self.shoes,
        }
    }
}

/// Outfit persisted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedOutfit {
    pub name: String,
    pub style: String,
    pub created_at: DateTime<Utc>,
    pub top: ItemSnapshot,
    pub bottom: ItemSnapshot,
    pub shoes: ItemSnapshot,
}

impl SavedOutfit {
    pub fn combination(&self) -> Combination {
        Combination {
            top: self.top.url.clone(),
            bottom: self.bottom.url.clone(),
            shoes: self.shoes.url.clone(),
        }
    }

    pub fn matches_filter(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.style.to_lowercase().contains(&query)
    }

    pub fn share_summary(&self) -> String {
        format!(
            "Outfit: {}\nStyle: {}\nItems:\n- {}\n- {}\n- {}",
            self.name, self.style, self.top.brand, self.bottom.brand, self.shoes.brand
        )
    }
}

/// Decision taken on a disposition prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Keep,
    Delete,
    Donate,
}
