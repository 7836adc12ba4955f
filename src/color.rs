/*
 * Color Module
 *
 * RGB colors for herbivores and food, conversions to and from hex strings,
 * the Euclidean color distance used by foraging, and the palette that hands
 * out food colors.
 */

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, SimulationError};

/// An 8-bit RGB triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(*self))
    }
}

impl TryFrom<String> for Color {
    type Error = SimulationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        to_rgb(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        to_hex(color)
    }
}

/// Parse `#rrggbb`, `#rgb` or the same without the leading `#`.
pub fn to_rgb(hex: &str) -> Result<Color, SimulationError> {
    let invalid = || SimulationError::InvalidColor(hex.to_string());
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let expanded = match digits.len() {
        6 => digits.to_string(),
        // Shorthand: each digit is doubled
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => return Err(invalid()),
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Lowercase `#rrggbb`.
pub fn to_hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

/// Euclidean distance between two colors in RGB space.
pub fn color_distance(a: Color, b: Color) -> f32 {
    a.channels()
        .iter()
        .zip(b.channels().iter())
        .map(|(&x, &y)| {
            let d = x as f32 - y as f32;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Perturb each channel by uniform jitter in `[-variance, variance]`,
/// clamped to `[0, 255]` and rounded.
pub fn jitter_color<R: Rng + ?Sized>(color: Color, variance: f32, rng: &mut R) -> Color {
    let mut channels = color.channels();
    for channel in &mut channels {
        let offset = if variance > 0.0 {
            rng.gen_range(-variance..=variance)
        } else {
            0.0
        };
        *channel = (*channel as f32 + offset).clamp(0.0, 255.0).round() as u8;
    }
    Color::from_channels(channels)
}

/// What the palette does once every candidate has been handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// Fail with a configuration error.
    #[default]
    Exhaust,
    /// Reshuffle the candidates and start over.
    Cycle,
}

/// Hands out food colors from a shuffled list of candidates.
#[derive(Debug, Clone)]
pub struct Palette {
    candidates: Vec<Color>,
    available: Vec<Color>,
    mode: PaletteMode,
    allocated: usize,
}

impl Palette {
    pub fn new<R: Rng + ?Sized>(candidates: Vec<Color>, mode: PaletteMode, rng: &mut R) -> Self {
        let mut available = candidates.clone();
        available.shuffle(rng);

        Self {
            candidates,
            available,
            mode,
            allocated: 0,
        }
    }

    /// Colors left before the palette runs dry (or reshuffles).
    pub fn remaining(&self) -> usize {
        self.available.len()
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Color, ConfigurationError> {
        if self.available.is_empty() && self.mode == PaletteMode::Cycle {
            self.available = self.candidates.clone();
            self.available.shuffle(rng);
        }

        let color = self.available.pop().ok_or(ConfigurationError::PaletteExhausted {
            allocated: self.allocated,
        })?;
        self.allocated += 1;
        Ok(color)
    }
}
