//! Per-batch substitution with rejection sampling.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::debug;

use crate::ENGINE_TARGET;
use crate::color::{COLOR_SPACE_SIZE, ColorTriple};

/// Rejected candidates tolerated per distinct color before the engine
/// enumerates the remaining valid colors instead of sampling blindly.
pub const MAX_REJECTED_DRAWS: usize = 64;

/// Replaces every distinct color of `batch` using the thread-local generator.
///
/// The result has the same length as `batch`, and position `i` holds the
/// replacement for `batch[i]`. See the crate documentation for the guarantees.
#[must_use]
pub fn substitute(batch: &[ColorTriple]) -> Vec<ColorTriple> {
    substitute_with(batch, &mut rand::rng())
}

/// Replaces every distinct color of `batch`, drawing from `rng`.
#[must_use]
pub fn substitute_with<R: Rng + ?Sized>(batch: &[ColorTriple], rng: &mut R) -> Vec<ColorTriple> {
    let mut substitution = Substitution::default();
    for original in batch {
        substitution.assign(*original, rng);
    }
    substitution.apply(batch)
}

/// Bookkeeping for one batch. The key set of `replacements` doubles as the
/// set of originals seen so far.
#[derive(Debug, Default)]
struct Substitution {
    replacements: HashMap<ColorTriple, ColorTriple>,
    assigned: HashSet<ColorTriple>,
}

impl Substitution {
    fn assign<R: Rng + ?Sized>(&mut self, original: ColorTriple, rng: &mut R) {
        if self.replacements.contains_key(&original) {
            return;
        }

        let candidate = self
            .sample(original, rng)
            .or_else(|| self.draw_unused(original, rng));
        match candidate {
            Some(replacement) => {
                self.assigned.insert(replacement);
                self.replacements.insert(original, replacement);
            }
            None => self.swap_into(original),
        }
    }

    fn is_valid(&self, original: ColorTriple, candidate: ColorTriple) -> bool {
        candidate != original && !self.assigned.contains(&candidate)
    }

    fn sample<R: Rng + ?Sized>(&self, original: ColorTriple, rng: &mut R) -> Option<ColorTriple> {
        (0..MAX_REJECTED_DRAWS)
            .map(|_| ColorTriple::random(rng))
            .find(|candidate| self.is_valid(original, *candidate))
    }

    /// Picks uniformly among the colors that are neither `original` nor
    /// already assigned. Returns `None` when no such color exists.
    fn draw_unused<R: Rng + ?Sized>(
        &self,
        original: ColorTriple,
        rng: &mut R,
    ) -> Option<ColorTriple> {
        let excluded = self.assigned.len() + usize::from(!self.assigned.contains(&original));
        let available = COLOR_SPACE_SIZE
            .checked_sub(excluded)
            .filter(|count| *count > 0)?;
        debug!(
            target: ENGINE_TARGET,
            original = %original,
            available,
            "rejection sampling exhausted; enumerating unused colors"
        );
        let pick = rng.random_range(0..available);
        ColorTriple::all()
            .filter(|candidate| self.is_valid(original, *candidate))
            .nth(pick)
    }

    /// Handles the one layout with no unused color left: every color except
    /// `original` is assigned. An earlier original hands its replacement to
    /// `original` and takes `original` in exchange. Neither party ends up
    /// mapped to itself and the assigned set stays collision free.
    fn swap_into(&mut self, original: ColorTriple) {
        let Some((&earlier, &replacement)) = self.replacements.iter().next() else {
            return;
        };
        debug!(
            target: ENGINE_TARGET,
            original = %original,
            earlier = %earlier,
            "color space exhausted; swapping with an earlier assignment"
        );
        self.replacements.insert(earlier, original);
        self.replacements.insert(original, replacement);
        self.assigned.insert(original);
    }

    /// Maps every position of `batch` to its replacement.
    ///
    /// Only valid once [`Self::assign`] has run for every color of `batch`;
    /// `substitute_with` guarantees that. An unassigned color is a logic
    /// error and trips a debug assertion rather than being echoed back.
    fn apply(&self, batch: &[ColorTriple]) -> Vec<ColorTriple> {
        batch
            .iter()
            .map(|original| {
                let replacement = self.replacements.get(original).copied();
                debug_assert!(replacement.is_some(), "{original} was never assigned");
                replacement.unwrap_or(*original)
            })
            .collect()
    }
}
