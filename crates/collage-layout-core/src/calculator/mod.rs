use crate::error::Result;
use crate::layout::ImageLayout;

pub mod random;
pub mod tile;

pub use random::RandomCalculator;
pub use tile::TileInOrderCalculator;

/// A position calculator finds a place on a canvas for every image in a
/// layout.
///
/// On success the returned layout has every image positioned, a canvas size
/// set, and no pair of padded rectangles overlapping. `Ok(None)` means the
/// search space was exhausted without finding a placement; the caller
/// decides whether to retry with different parameters.
pub trait PositionCalculator {
    fn calculate_positions(&self, layout: &ImageLayout) -> Result<Option<ImageLayout>>;
}
