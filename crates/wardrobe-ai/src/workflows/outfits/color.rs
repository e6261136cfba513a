//! RGB primitives shared by every style scorer.
//!
//! Channels are stored as `f64` because item colors are averages taken over a
//! segmented photo and rarely land on whole numbers.

use serde::{Deserialize, Serialize};

/// Per-channel tolerance used for bright color detection and sandwich validation.
pub const BRIGHT_COLOR_THRESHOLD: f64 = 30.0;

/// Largest channel value.
pub const CHANNEL_MAX: f64 = 255.0;

/// Average RGB color of a wardrobe item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    pub fn channels(self) -> [f64; 3] {
        [self.red, self.green, self.blue]
    }

    /// Mean of the three channels (brightness).
    pub fn intensity(self) -> f64 {
        (self.red + self.green + self.blue) / 3.0
    }

    pub fn normalized(self) -> Self {
        Self::new(
            self.red / CHANNEL_MAX,
            self.green / CHANNEL_MAX,
            self.blue / CHANNEL_MAX,
        )
    }

    pub fn midpoint(self, other: Rgb) -> Self {
        Self::new(
            (self.red + other.red) / 2.0,
            (self.green + other.green) / 2.0,
            (self.blue + other.blue) / 2.0,
        )
    }
}

/// Inclusive per-channel bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbRange {
    pub min: Rgb,
    pub max: Rgb,
}

impl RgbRange {
    pub fn contains(&self, rgb: Rgb) -> bool {
        is_within_range(rgb, self.min, self.max)
    }

    pub fn midpoint(&self) -> Rgb {
        self.min.midpoint(self.max)
    }
}

/// Grey to light grey; the Casual palette.
pub const NEUTRAL_RANGE: RgbRange = RgbRange {
    min: Rgb::new(100.0, 100.0, 100.0),
    max: Rgb::new(200.0, 200.0, 200.0),
};

/// Black to dark grey; Streetwear bottoms and shoes.
pub const DARK_RANGE: RgbRange = RgbRange {
    min: Rgb::new(0.0, 0.0, 0.0),
    max: Rgb::new(100.0, 100.0, 100.0),
};

/// Canonical saturated colors a Streetwear top should resemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrightColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

impl BrightColor {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Red,
            Self::Green,
            Self::Blue,
            Self::Yellow,
            Self::Cyan,
            Self::Magenta,
        ]
    }

    pub const fn rgb(self) -> Rgb {
        match self {
            Self::Red => Rgb::new(255.0, 0.0, 0.0),
            Self::Green => Rgb::new(0.0, 255.0, 0.0),
            Self::Blue => Rgb::new(0.0, 0.0, 255.0),
            Self::Yellow => Rgb::new(255.0, 255.0, 0.0),
            Self::Cyan => Rgb::new(0.0, 255.0, 255.0),
            Self::Magenta => Rgb::new(255.0, 0.0, 255.0),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::Cyan => "Cyan",
            Self::Magenta => "Magenta",
        }
    }
}

pub fn is_within_range(rgb: Rgb, min: Rgb, max: Rgb) -> bool {
    rgb.channels()
        .iter()
        .zip(min.channels().iter().zip(max.channels().iter()))
        .all(|(value, (low, high))| value >= low && value <= high)
}

pub fn are_similar_colors(first: Rgb, second: Rgb, threshold: f64) -> bool {
    first
        .channels()
        .iter()
        .zip(second.channels().iter())
        .all(|(a, b)| (a - b).abs() <= threshold)
}

pub fn is_bright_color(rgb: Rgb) -> bool {
    matched_bright_color(rgb).is_some()
}

/// First canonical bright color (in [`BrightColor::ordered`] order) the color is close to.
pub fn matched_bright_color(rgb: Rgb) -> Option<BrightColor> {
    BrightColor::ordered()
        .into_iter()
        .find(|candidate| are_similar_colors(rgb, candidate.rgb(), BRIGHT_COLOR_THRESHOLD))
}

/// Euclidean distance in normalized channel space, in `[0, sqrt(3)]`.
pub fn color_distance(first: Rgb, second: Rgb) -> f64 {
    raw_distance(first.normalized(), second.normalized())
}

/// Euclidean distance in raw 0-255 channel space, in `[0, 255 * sqrt(3)]`.
pub fn raw_distance(first: Rgb, second: Rgb) -> f64 {
    first
        .channels()
        .iter()
        .zip(second.channels().iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

/// Upper bound of [`color_distance`].
pub fn max_color_distance() -> f64 {
    3.0_f64.sqrt()
}
