mod config;
mod rules;

pub use config::ScoringConfig;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::color::raw_distance;
use super::domain::{Category, ScoredItem, Style, WardrobeItem};
use super::similarity::SimilarityMatrix;

/// Top and shoes scored together under the Sandwich rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SandwichPair {
    pub top: ScoredItem,
    pub shoes: ScoredItem,
    pub score: f64,
}

/// Applies the style rules to wardrobe items.
///
/// Holds the RNG for the Random style so a pinned seed reproduces the same
/// sequence of generation cycles.
pub struct ScoringEngine {
    config: ScoringConfig,
    rng: Pcg32,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        let seed = config
            .random_seed
            .unwrap_or_else(|| rand::thread_rng().gen());
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Standalone score of one item, `None` for Sandwich which only scores pairs.
    pub fn item_score(&mut self, style: Style, item: &WardrobeItem) -> Option<f64> {
        match style {
            Style::Casual => Some(rules::casual_score(item.rgb)),
            Style::Streetwear => Some(rules::streetwear_score(
                item.category,
                item.rgb,
                self.config.streetwear_dark_boost,
            )),
            Style::Random => Some(self.rng.gen_range(0.0..=rules::MAX_SCORE)),
            Style::Sandwich => None,
        }
    }

    /// Scores one category and sorts it best first; ties keep input order.
    ///
    /// Sandwich has no per-item rule, so its items keep input order at score zero.
    pub fn rank_category(&mut self, style: Style, items: &[WardrobeItem]) -> Vec<ScoredItem> {
        let mut scored: Vec<ScoredItem> = items
            .iter()
            .map(|item| {
                let score = self.item_score(style, item).unwrap_or(0.0);
                ScoredItem::new(item.clone(), score)
            })
            .collect();
        sort_best_first(&mut scored, |entry| entry.score);
        scored
    }

    /// Every top/shoe pair, best match first; ties keep top-major input order.
    pub fn rank_sandwich_pairs(
        &self,
        tops: &[WardrobeItem],
        shoes: &[WardrobeItem],
        matrix: &SimilarityMatrix,
    ) -> Vec<SandwichPair> {
        let mut pairs = Vec::with_capacity(tops.len() * shoes.len());
        for top in tops {
            for shoe in shoes {
                let distance = matrix
                    .distance(&top.url, &shoe.url)
                    .unwrap_or_else(|| raw_distance(top.rgb, shoe.rgb));
                let score = rules::sandwich_match_score(distance);
                pairs.push(SandwichPair {
                    top: ScoredItem::new(top.clone(), score),
                    shoes: ScoredItem::new(shoe.clone(), score),
                    score,
                });
            }
        }
        sort_best_first(&mut pairs, |pair| pair.score);
        pairs
    }

    /// Contrast score of a bottom against a specific pair.
    pub fn score_bottom(&self, bottom: &WardrobeItem, pair: &SandwichPair) -> ScoredItem {
        let score = rules::sandwich_contrast_score(
            bottom.rgb,
            pair.top.item.rgb,
            pair.shoes.item.rgb,
            self.config.sandwich_bottom_weight,
        );
        ScoredItem::new(bottom.clone(), score)
    }

    /// Highest-contrast bottom for a pair; the first one wins ties.
    pub fn best_bottom(&self, bottoms: &[WardrobeItem], pair: &SandwichPair) -> Option<ScoredItem> {
        bottoms
            .iter()
            .map(|bottom| self.score_bottom(bottom, pair))
            .fold(None, |best: Option<ScoredItem>, candidate| match best {
                Some(current) if current.score >= candidate.score => Some(current),
                _ => Some(candidate),
            })
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

fn sort_best_first<T>(entries: &mut [T], score: impl Fn(&T) -> f64) {
    entries.sort_by(|a, b| score(b).total_cmp(&score(a)));
}

/// Items of one category, in input order.
pub(crate) fn of_category(items: &[WardrobeItem], category: Category) -> Vec<WardrobeItem> {
    items
        .iter()
        .filter(|item| item.category == category)
        .cloned()
        .collect()
}
