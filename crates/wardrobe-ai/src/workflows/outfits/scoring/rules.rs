use super::super::color::{
    color_distance, max_color_distance, Rgb, CHANNEL_MAX, DARK_RANGE, NEUTRAL_RANGE,
};
use super::super::domain::Category;

pub(crate) const MAX_SCORE: f64 = 100.0;

pub(crate) fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, MAX_SCORE)
}

/// Closeness to the neutral midpoint, as a percentage.
pub(crate) fn neutrality(rgb: Rgb) -> f64 {
    let target = NEUTRAL_RANGE.midpoint();
    (1.0 - color_distance(rgb, target) / max_color_distance()) * MAX_SCORE
}

/// How close the channels are to each other, as a percentage.
pub(crate) fn grayscale(rgb: Rgb) -> f64 {
    let mean = rgb.intensity();
    let deviation = rgb
        .channels()
        .iter()
        .map(|channel| (channel - mean).abs())
        .sum::<f64>()
        / 3.0;
    (1.0 - deviation / CHANNEL_MAX) * MAX_SCORE
}

pub(crate) fn casual_score(rgb: Rgb) -> f64 {
    clamp_score((neutrality(rgb) + grayscale(rgb)) / 2.0)
}

pub(crate) fn streetwear_score(category: Category, rgb: Rgb, dark_boost: f64) -> f64 {
    let intensity = rgb.intensity();
    match category {
        Category::Top => clamp_score(intensity / CHANNEL_MAX * MAX_SCORE),
        Category::Bottom | Category::Shoes => {
            let darkness = (1.0 - intensity / CHANNEL_MAX) * MAX_SCORE;
            if intensity <= DARK_RANGE.max.intensity() {
                clamp_score(darkness * dark_boost)
            } else {
                clamp_score(darkness)
            }
        }
    }
}

/// Top/shoe match from a raw (0-255 space) distance.
pub(crate) fn sandwich_match_score(raw_distance: f64) -> f64 {
    let normalized = raw_distance / CHANNEL_MAX;
    clamp_score((1.0 - normalized / max_color_distance()) * MAX_SCORE)
}

/// Contrast of a bottom against a matched top/shoe pair.
pub(crate) fn sandwich_contrast_score(bottom: Rgb, top: Rgb, shoes: Rgb, weight: f64) -> f64 {
    let spread = color_distance(bottom, top) + color_distance(bottom, shoes);
    clamp_score(spread / (2.0 * max_color_distance()) * MAX_SCORE * weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_grey_is_a_perfect_casual_match() {
        let score = casual_score(Rgb::new(150.0, 150.0, 150.0));
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_colors_score_lower_for_casual() {
        let red = casual_score(Rgb::new(255.0, 0.0, 0.0));
        let charcoal = casual_score(Rgb::new(10.0, 10.0, 10.0));
        assert!(red < charcoal);
        assert!(charcoal < 100.0);
    }

    #[test]
    fn streetwear_rewards_bright_tops_and_dark_bottoms() {
        let white_top = streetwear_score(Category::Top, Rgb::new(255.0, 255.0, 255.0), 1.5);
        let black_bottom = streetwear_score(Category::Bottom, Rgb::new(0.0, 0.0, 0.0), 1.5);
        assert!((white_top - 100.0).abs() < 1e-9);
        assert!((black_bottom - 100.0).abs() < 1e-9);
    }

    #[test]
    fn streetwear_boost_only_applies_inside_dark_range() {
        let dark = streetwear_score(Category::Shoes, Rgb::new(90.0, 90.0, 90.0), 1.5);
        let light = streetwear_score(Category::Shoes, Rgb::new(110.0, 110.0, 110.0), 1.5);
        let expected_dark: f64 = (1.0 - 90.0 / 255.0) * 100.0 * 1.5;
        let expected_light = (1.0 - 110.0 / 255.0) * 100.0;
        assert!((dark - expected_dark.min(100.0)).abs() < 1e-9);
        assert!((light - expected_light).abs() < 1e-9);
    }

    #[test]
    fn identical_pair_matches_fully_and_light_bottom_contrasts() {
        let charcoal = Rgb::new(10.0, 10.0, 10.0);
        assert!((sandwich_match_score(0.0) - 100.0).abs() < 1e-9);

        let contrast =
            sandwich_contrast_score(Rgb::new(245.0, 245.0, 245.0), charcoal, charcoal, 1.0);
        assert!(contrast > 90.0);
        assert!(contrast <= 100.0);
    }

    #[test]
    fn scores_stay_within_bounds() {
        let samples = [
            Rgb::new(0.0, 0.0, 0.0),
            Rgb::new(255.0, 255.0, 255.0),
            Rgb::new(255.0, 0.0, 255.0),
            Rgb::new(12.5, 240.25, 99.0),
        ];
        for rgb in samples {
            for category in Category::ordered() {
                let street = streetwear_score(category, rgb, 1.5);
                assert!((0.0..=100.0).contains(&street));
            }
            let casual = casual_score(rgb);
            assert!((0.0..=100.0).contains(&casual));
            for other in samples {
                let contrast = sandwich_contrast_score(rgb, other, other, 1.0);
                assert!((0.0..=100.0).contains(&contrast));
            }
        }
    }
}
