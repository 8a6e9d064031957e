//! Whitespace balancing: an iterative post-process that recenters each
//! positioned image within the slack bounded by its neighbors, worst
//! imbalance first, alternating axes.

use tracing::{debug, instrument};

use crate::error::{CollageError, Result};
use crate::geometry::Axis;
use crate::layout::{overlap, ImageId, ImageLayout};

#[derive(Debug, Clone, Copy, Default)]
struct Imbalance {
    /// Signed distance from the image to the midpoint of its slack.
    shift: f64,
    min_bound: f64,
    max_bound: f64,
    min_witness: Option<ImageId>,
    max_witness: Option<ImageId>,
}

/// The slack available to `subject` along `axis`: bounded by the canvas and
/// by every image that overlaps it across the axis but not along it.
fn measure(layout: &ImageLayout, subject: ImageId, axis: Axis) -> Imbalance {
    let position = layout.position_of(subject).unwrap_or_default().dim(axis);
    let mut imb = Imbalance {
        min_bound: 0.0,
        max_bound: layout.canvas_size().dim(axis) - layout.dimensions_of(subject).dim(axis),
        ..Default::default()
    };
    for &other in layout.images() {
        if other == subject {
            continue;
        }
        let other_position = layout.position_of(other).unwrap_or_default().dim(axis);
        let ov = overlap(layout, subject, other);
        let along = ov.dim(axis);
        let across = ov.dim(axis.flip());
        if across >= 0.0 && along <= 0.0 {
            if position >= other_position && position + along > imb.min_bound {
                imb.min_witness = Some(other);
                imb.min_bound = position + along;
            } else if position <= other_position && position - along < imb.max_bound {
                imb.max_witness = Some(other);
                imb.max_bound = position - along;
            }
        }
    }
    imb.shift = imb.min_bound + (imb.max_bound - imb.min_bound) / 2.0 - position;
    imb
}

/// Recenters every image within the blank space around it. Alternates axes
/// for twice the configured iteration count, moving the worst-imbalanced
/// image each step and recomputing only that image and its two bound
/// witnesses. Stops early once a full pass makes no move.
///
/// Precondition: every image is positioned and no padded pair overlaps.
/// A move can never introduce a collision; one doing so is reported as
/// [`CollageError::InternalCollision`].
#[instrument(skip_all)]
pub fn balance(layout: &mut ImageLayout) -> Result<()> {
    if layout.image_count() == 0 {
        return Ok(());
    }
    let max_iterations = layout.config().balancer.max_iterations;
    let tolerance = layout.config().balancer.tolerance;
    let mut table: Vec<Imbalance> = vec![Imbalance::default(); layout.image_count()];
    let mut order: Vec<ImageId> = layout.images().to_vec();
    let mut axis = Axis::X;

    for _pass in 0..2 * max_iterations {
        let mut moves = 0usize;
        let mut last_moved: Option<ImageId> = None;
        loop {
            match last_moved {
                None => {
                    for &img in layout.images() {
                        table[img.0] = measure(layout, img, axis);
                    }
                }
                Some(moved) => {
                    table[moved.0] = measure(layout, moved, axis);
                    if let Some(witness) = table[moved.0].min_witness {
                        table[witness.0] = measure(layout, witness, axis);
                    }
                    if let Some(witness) = table[moved.0].max_witness {
                        table[witness.0] = measure(layout, witness, axis);
                    }
                }
            }
            order.sort_by(|a, b| table[b.0].shift.abs().total_cmp(&table[a.0].shift.abs()));
            let worst = order[0];
            let imb = table[worst.0];
            let gap = imb.max_bound - imb.min_bound;
            if imb.shift.abs() <= tolerance * gap {
                break;
            }
            let mut position = layout.position_of(worst).unwrap_or_default();
            position.set_dim(axis, position.dim(axis) + imb.shift);
            if layout.set_position(worst, position).is_some() {
                return Err(CollageError::InternalCollision {
                    id: worst,
                    path: layout.info_of(worst).path.clone(),
                    position,
                });
            }
            moves += 1;
            last_moved = Some(worst);
        }
        debug!(?axis, moves, "balance pass");
        axis = axis.flip();
        if moves == 0 {
            break;
        }
    }
    Ok(())
}
