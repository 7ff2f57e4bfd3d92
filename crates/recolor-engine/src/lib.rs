//! Batch color substitution.
//!
//! [`substitute`] maps an ordered batch of RGB triples to a batch of the same
//! length in which every distinct input color is replaced by a randomly drawn
//! color. Within one batch:
//!
//! - no color is ever replaced by itself;
//! - two different input colors never share a replacement;
//! - repeated occurrences of one input color share a single replacement.
//!
//! All bookkeeping is scoped to a single call, so nothing leaks from one batch
//! into the next. Candidates are drawn uniformly per channel and rejected
//! until one satisfies both uniqueness rules; after [`MAX_REJECTED_DRAWS`]
//! rejections the engine picks uniformly among the remaining valid colors
//! instead, which bounds the work per color even for very large batches.
//!
//! ```
//! use recolor_engine::{ColorTriple, substitute};
//!
//! let batch = [
//!     ColorTriple::new(1, 1, 1),
//!     ColorTriple::new(1, 1, 1),
//!     ColorTriple::new(2, 2, 2),
//! ];
//! let replaced = substitute(&batch);
//!
//! assert_eq!(replaced.len(), 3);
//! assert_eq!(replaced.first(), replaced.get(1));
//! assert_ne!(replaced.first(), replaced.get(2));
//! ```

mod color;
mod substitution;

pub use color::{COLOR_SPACE_SIZE, ColorTriple};
pub use substitution::{MAX_REJECTED_DRAWS, substitute, substitute_with};

const ENGINE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::substitution");
