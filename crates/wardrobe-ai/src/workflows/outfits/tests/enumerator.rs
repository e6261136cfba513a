use std::collections::HashSet;

use super::common::*;
use crate::workflows::outfits::domain::{Category, Combination, ItemUrl, Style};
use crate::workflows::outfits::enumerator::{
    EnumeratorError, OutfitEnumerator, SavedIndex, StepStatus,
};

fn nothing_saved(_: &Combination) -> bool {
    false
}

fn everything_saved(_: &Combination) -> bool {
    true
}

fn url_of(outfit: &crate::workflows::outfits::domain::GeneratedOutfit, slot: Category) -> String {
    outfit
        .item(slot)
        .map(|scored| scored.url().as_str().to_string())
        .unwrap_or_default()
}

#[test]
fn casual_generation_starts_from_the_best_item_per_slot() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let step = enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &nothing_saved)
        .expect("outfit generated");

    assert_eq!(step.status, StepStatus::Fresh);
    assert_eq!(url_of(&step.outfit, Category::Top), "t0");
    assert_eq!(url_of(&step.outfit, Category::Bottom), "b0");
    assert_eq!(url_of(&step.outfit, Category::Shoes), "s0");

    let ranking = enumerator.ranking(Category::Top).expect("ranked tops");
    assert!(ranking.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn advancing_visits_every_combination_once_before_repeating() {
    let items = grey_wardrobe(3, 3, 3);
    let mut enumerator = OutfitEnumerator::new(engine());
    let first = enumerator
        .generate(Style::Casual, &items, &nothing_saved)
        .expect("outfit generated");

    let mut seen = HashSet::new();
    seen.insert(first.outfit.combination().expect("complete"));
    for _ in 1..27 {
        let step = enumerator.advance(&nothing_saved).expect("advance");
        assert_eq!(step.status, StepStatus::Fresh);
        let combination = step.outfit.combination().expect("complete");
        assert!(seen.insert(combination), "combination repeated early");
    }
    assert_eq!(seen.len(), 27);

    let wrapped = enumerator.advance(&nothing_saved).expect("advance");
    assert_eq!(wrapped.outfit.combination(), first.outfit.combination());
}

#[test]
fn shoes_turn_fastest() {
    let mut enumerator = OutfitEnumerator::new(engine());
    enumerator
        .generate(Style::Casual, &grey_wardrobe(2, 2, 2), &nothing_saved)
        .expect("outfit generated");

    let second = enumerator.advance(&nothing_saved).expect("advance");
    assert_eq!(url_of(&second.outfit, Category::Shoes), "s1");
    assert_eq!(url_of(&second.outfit, Category::Bottom), "b0");

    let third = enumerator.advance(&nothing_saved).expect("advance");
    assert_eq!(url_of(&third.outfit, Category::Shoes), "s0");
    assert_eq!(url_of(&third.outfit, Category::Bottom), "b1");
    assert_eq!(url_of(&third.outfit, Category::Top), "t0");
}

#[test]
fn locked_slots_never_change_on_advance() {
    let mut enumerator = OutfitEnumerator::new(engine());
    enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &nothing_saved)
        .expect("outfit generated");
    enumerator.toggle_lock(Category::Top).expect("lock top");
    let locked_top = enumerator
        .current()
        .and_then(|outfit| outfit.top.clone())
        .expect("top present");

    let mut seen = HashSet::new();
    for _ in 0..9 {
        let step = enumerator.advance(&nothing_saved).expect("advance");
        assert_eq!(step.outfit.top.as_ref(), Some(&locked_top));
        assert!(step.outfit.is_locked(Category::Top));
        seen.insert(step.outfit.combination().expect("complete"));
    }
    assert_eq!(seen.len(), 9);
}

#[test]
fn all_locked_outfit_is_left_unchanged() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let first = enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &nothing_saved)
        .expect("outfit generated");
    enumerator.toggle_lock(Category::Top).expect("lock");
    enumerator.toggle_lock(Category::Bottom).expect("lock");
    let toggle = enumerator.toggle_lock(Category::Shoes).expect("lock");
    assert!(toggle.ready_to_save);

    let step = enumerator.advance(&nothing_saved).expect("advance");
    assert_eq!(step.status, StepStatus::Unchanged);
    assert_eq!(step.outfit.combination(), first.outfit.combination());
}

#[test]
fn generation_skips_saved_combinations() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let saved = SavedIndex::from_combinations([
        combination("t0", "b0", "s0"),
        combination("t0", "b0", "s1"),
    ]);

    let step = enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &saved)
        .expect("outfit generated");
    assert_eq!(
        step.outfit.combination(),
        Some(combination("t0", "b0", "s2"))
    );

    let next = enumerator.advance(&saved).expect("advance");
    assert_eq!(
        next.outfit.combination(),
        Some(combination("t0", "b1", "s0"))
    );
}

#[test]
fn exhaustion_terminates_and_falls_back_to_the_best_combination() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let step = enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &everything_saved)
        .expect("outfit generated");
    assert!(step.is_exhausted());
    assert_eq!(
        step.outfit.combination(),
        Some(combination("t0", "b0", "s0"))
    );

    let advanced = enumerator.advance(&everything_saved).expect("advance");
    assert_eq!(advanced.status, StepStatus::Exhausted);
    assert_eq!(
        advanced.outfit.combination(),
        Some(combination("t0", "b0", "s0"))
    );
}

#[test]
fn exhaustion_with_a_lock_keeps_the_locked_item() {
    let mut enumerator = OutfitEnumerator::new(engine());
    enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &nothing_saved)
        .expect("outfit generated");
    enumerator.advance(&nothing_saved).expect("advance");
    enumerator.toggle_lock(Category::Shoes).expect("lock shoes");

    let step = enumerator.advance(&everything_saved).expect("advance");
    assert!(step.is_exhausted());
    assert_eq!(url_of(&step.outfit, Category::Shoes), "s1");
    assert_eq!(url_of(&step.outfit, Category::Top), "t0");
    assert_eq!(url_of(&step.outfit, Category::Bottom), "b0");
}

#[test]
fn locks_carry_over_when_regenerating_the_same_style() {
    let items = grey_wardrobe(3, 3, 3);
    let mut enumerator = OutfitEnumerator::new(engine());
    enumerator
        .generate(Style::Casual, &items, &nothing_saved)
        .expect("outfit generated");
    enumerator.advance(&nothing_saved).expect("advance");
    enumerator.toggle_lock(Category::Shoes).expect("lock shoes");

    let regenerated = enumerator
        .generate(Style::Casual, &items, &nothing_saved)
        .expect("regenerated");
    assert!(regenerated.outfit.is_locked(Category::Shoes));
    assert_eq!(url_of(&regenerated.outfit, Category::Shoes), "s1");

    let other_style = enumerator
        .generate(Style::Streetwear, &items, &nothing_saved)
        .expect("new style");
    assert!(!other_style.outfit.is_locked(Category::Shoes));
}

#[test]
fn sandwich_pairs_matching_top_and_shoes_with_a_contrasting_bottom() {
    let items = vec![
        item("top-black", Category::Top, (10.0, 10.0, 10.0)),
        item("top-white", Category::Top, (240.0, 240.0, 240.0)),
        item("bottom-black", Category::Bottom, (15.0, 15.0, 15.0)),
        item("bottom-cream", Category::Bottom, (245.0, 245.0, 245.0)),
        item("shoes-black", Category::Shoes, (10.0, 10.0, 10.0)),
        item("shoes-red", Category::Shoes, (200.0, 20.0, 20.0)),
    ];
    let mut enumerator = OutfitEnumerator::new(engine());
    let step = enumerator
        .generate(Style::Sandwich, &items, &nothing_saved)
        .expect("outfit generated");

    assert_eq!(
        step.outfit.combination(),
        Some(combination("top-black", "bottom-cream", "shoes-black"))
    );
    let pairs = enumerator.sandwich_pairs().expect("sandwich pairs").to_vec();
    assert_eq!(pairs.len(), 4);
    assert!(pairs.windows(2).all(|pair| pair[0].score >= pair[1].score));
    assert!(enumerator.ranking(Category::Top).is_none());

    let next = enumerator.advance(&nothing_saved).expect("advance");
    let expected = &pairs[1];
    assert_eq!(next.outfit.top.as_ref().map(|top| top.url()), Some(expected.top.url()));
    assert_eq!(
        next.outfit.shoes.as_ref().map(|shoes| shoes.url()),
        Some(expected.shoes.url())
    );
}

#[test]
fn sandwich_advance_respects_a_locked_top() {
    let items = vec![
        item("top-black", Category::Top, (10.0, 10.0, 10.0)),
        item("top-white", Category::Top, (240.0, 240.0, 240.0)),
        item("bottom-cream", Category::Bottom, (245.0, 245.0, 245.0)),
        item("shoes-black", Category::Shoes, (10.0, 10.0, 10.0)),
        item("shoes-grey", Category::Shoes, (120.0, 120.0, 120.0)),
        item("shoes-white", Category::Shoes, (235.0, 235.0, 235.0)),
    ];
    let mut enumerator = OutfitEnumerator::new(engine());
    enumerator
        .generate(Style::Sandwich, &items, &nothing_saved)
        .expect("outfit generated");
    enumerator.toggle_lock(Category::Top).expect("lock top");

    let mut shoes_seen = HashSet::new();
    for _ in 0..3 {
        let step = enumerator.advance(&nothing_saved).expect("advance");
        assert_eq!(url_of(&step.outfit, Category::Top), "top-black");
        shoes_seen.insert(url_of(&step.outfit, Category::Shoes));
    }
    assert_eq!(shoes_seen.len(), 3);
}

#[test]
fn sandwich_exhaustion_is_signalled() {
    let items = grey_wardrobe(2, 2, 2);
    let mut enumerator = OutfitEnumerator::new(engine());
    let step = enumerator
        .generate(Style::Sandwich, &items, &everything_saved)
        .expect("outfit generated");
    assert!(step.is_exhausted());

    let advanced = enumerator.advance(&everything_saved).expect("advance");
    assert!(advanced.is_exhausted());
}

#[test]
fn sandwich_advance_does_not_return_the_current_pair_as_fresh() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let first = enumerator
        .generate(Style::Sandwich, &grey_wardrobe(2, 2, 2), &nothing_saved)
        .expect("outfit generated");
    let current = first.outfit.combination().expect("complete");
    let all_but_current = |combination: &Combination| combination != &current;

    let advanced = enumerator.advance(&all_but_current).expect("advance");
    assert_eq!(advanced.status, StepStatus::Exhausted);
    assert_eq!(advanced.outfit.combination(), Some(current.clone()));
}

#[test]
fn ranked_advance_does_not_return_the_current_combination_as_fresh() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let first = enumerator
        .generate(Style::Casual, &grey_wardrobe(2, 2, 2), &nothing_saved)
        .expect("outfit generated");
    let current = first.outfit.combination().expect("complete");
    let all_but_current = |combination: &Combination| combination != &current;

    let advanced = enumerator.advance(&all_but_current).expect("advance");
    assert_eq!(advanced.status, StepStatus::Exhausted);
    assert_eq!(advanced.outfit.combination(), Some(current.clone()));

    let fresh = enumerator.advance(&nothing_saved).expect("advance");
    assert_eq!(fresh.status, StepStatus::Fresh);
    assert_ne!(fresh.outfit.combination(), Some(current.clone()));
}

#[test]
fn removed_items_disappear_from_future_outfits() {
    let mut enumerator = OutfitEnumerator::new(engine());
    enumerator
        .generate(Style::Casual, &grey_wardrobe(3, 3, 3), &nothing_saved)
        .expect("outfit generated");

    let removed = ItemUrl::from("s0");
    enumerator.remove_item(&removed);
    let current = enumerator.current().expect("current outfit");
    assert!(current.shoes.is_none());
    assert!(matches!(
        enumerator.toggle_lock(Category::Shoes),
        Err(EnumeratorError::EmptySlot {
            slot: Category::Shoes
        })
    ));

    for _ in 0..18 {
        let step = enumerator.advance(&nothing_saved).expect("advance");
        assert!(!step.outfit.contains(&removed));
        assert!(step.outfit.combination().is_some());
    }
}

#[test]
fn empty_category_reports_insufficient_items() {
    let mut enumerator = OutfitEnumerator::new(engine());
    let result = enumerator.generate(Style::Casual, &grey_wardrobe(3, 0, 3), &nothing_saved);
    assert_eq!(
        result,
        Err(EnumeratorError::InsufficientItems {
            category: Category::Bottom
        })
    );
    assert!(matches!(
        enumerator.advance(&nothing_saved),
        Err(EnumeratorError::NoActiveOutfit)
    ));
}

#[test]
fn random_style_is_reproducible_with_a_pinned_seed() {
    let items = grey_wardrobe(3, 3, 3);
    let mut first = OutfitEnumerator::new(engine());
    let mut second = OutfitEnumerator::new(engine());

    let a = first
        .generate(Style::Random, &items, &nothing_saved)
        .expect("outfit generated");
    let b = second
        .generate(Style::Random, &items, &nothing_saved)
        .expect("outfit generated");
    assert_eq!(a, b);
}
