//! RGB triple value type.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of distinct RGB triples (2^24).
pub const COLOR_SPACE_SIZE: usize = 1 << 24;

/// A color as three independent 8-bit channels.
///
/// Serialized as `{"r": .., "g": .., "b": ..}`. Deserialization rejects
/// channels outside `0..=255`, non-integer values and missing channels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ColorTriple {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ColorTriple {
    /// Builds a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Draws a color with each channel sampled uniformly from `0..=255`.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random(), rng.random(), rng.random())
    }

    /// Enumerates the whole color space, blue varying fastest.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).flat_map(|r| {
            (0..=u8::MAX).flat_map(move |g| (0..=u8::MAX).map(move |b| Self::new(r, g, b)))
        })
    }
}

impl fmt::Display for ColorTriple {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
