use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use super::PositionCalculator;
use crate::balance::balance;
use crate::error::{CollageError, Result};
use crate::geometry::Dims;
use crate::layout::{ImageId, ImageLayout};

/// Places images largest-first by rejection sampling inside a candidate
/// canvas, then bisects the canvas width to find the smallest size that
/// still admits a full placement.
pub struct RandomCalculator;

impl PositionCalculator for RandomCalculator {
    #[instrument(skip_all)]
    fn calculate_positions(&self, layout: &ImageLayout) -> Result<Option<ImageLayout>> {
        if layout.image_count() == 0 {
            return Err(CollageError::Empty);
        }
        let cfg = layout.config().random.clone();
        let seed = if cfg.seed < 0 {
            time_based_seed()
        } else {
            cfg.seed as u64
        };
        info!(seed, "seed for random number generator");
        let mut rng = StdRng::seed_from_u64(seed);

        let (min_dim, max_dim) = layout.dimension_extremes();
        let count = layout.image_count() as f64;
        let target_width = max_dim.max(count.sqrt() * min_dim);
        let max_width_pref = 2.0 * count.sqrt() * max_dim;
        let aspect = layout.auto_aspect_ratio();

        let min_canvas = layout.config().min_canvas_size;
        let max_canvas = layout.config().max_canvas_size;
        let mut min_x = if min_canvas != Dims::ZERO {
            min_canvas.x.max(min_canvas.y / aspect)
        } else {
            target_width
        };
        let mut max_x = if max_canvas == Dims::ZERO {
            max_width_pref
        } else if max_canvas.x == 0.0 {
            max_canvas.y / aspect
        } else if max_canvas.y == 0.0 {
            max_canvas.x
        } else {
            max_canvas.x.min(max_canvas.y / aspect)
        };

        let mut best = match try_canvas(layout, Dims::new(min_x, min_x / aspect), &cfg, &mut rng) {
            Some(found) => found,
            None => {
                let Some(at_max) =
                    try_canvas(layout, Dims::new(max_x, max_x / aspect), &cfg, &mut rng)
                else {
                    debug!("no canvas size admitted a placement");
                    return Ok(None);
                };
                let mut best = at_max;
                loop {
                    let midpoint = (min_x + (max_x - min_x) / 2.0).round();
                    if midpoint == min_x
                        || midpoint == max_x
                        || (max_x - min_x) / target_width < cfg.size_tolerance
                    {
                        break;
                    }
                    match try_canvas(
                        layout,
                        Dims::new(midpoint, midpoint / aspect),
                        &cfg,
                        &mut rng,
                    ) {
                        Some(found) => {
                            best = found;
                            max_x = midpoint;
                        }
                        None => min_x = midpoint,
                    }
                }
                best
            }
        };

        debug!(canvas = %best.canvas_size(), "final bounding box");
        if layout.config().balancer.max_iterations > 0 {
            balance(&mut best)?;
        }
        Ok(Some(best))
    }
}

/// Tries to place every image on a canvas of the given size, retrying the
/// whole canvas up to `max_layout_tries` times.
fn try_canvas(
    base: &ImageLayout,
    canvas: Dims,
    cfg: &crate::config::RandomConfig,
    rng: &mut StdRng,
) -> Option<ImageLayout> {
    let mut layout = base.duplicate();
    layout.set_canvas_size(canvas);

    let mut order: Vec<ImageId> = layout.images().to_vec();
    order.sort_by(|a, b| {
        layout
            .dimensions_of(*b)
            .area()
            .total_cmp(&layout.dimensions_of(*a).area())
    });

    for attempt in 0..cfg.max_layout_tries {
        if place_all(&mut layout, &order, canvas, cfg.max_image_tries, rng) {
            debug!(%canvas, attempt, "placement found");
            return Some(layout);
        }
        layout.clear_positions();
    }
    debug!(%canvas, "placement failed");
    None
}

fn place_all(
    layout: &mut ImageLayout,
    order: &[ImageId],
    canvas: Dims,
    max_image_tries: u32,
    rng: &mut StdRng,
) -> bool {
    for &img in order {
        let mut placed = false;
        for _ in 0..max_image_tries {
            let position = sample_position(layout, img, canvas, rng);
            if layout.set_position(img, position).is_none() {
                placed = true;
                break;
            }
        }
        if !placed {
            return false;
        }
    }
    true
}

/// Draws an integer position uniformly from the admissible interior
/// `[padding, canvas - dim - padding]` per axis.
fn sample_position(layout: &ImageLayout, img: ImageId, canvas: Dims, rng: &mut StdRng) -> Dims {
    let dims = layout.dimensions_of(img);
    let pad = layout.padding_of(img);
    Dims::new(
        sample_axis(canvas.x, dims.x, pad.x, rng),
        sample_axis(canvas.y, dims.y, pad.y, rng),
    )
}

fn sample_axis(canvas: f64, dim: f64, pad: f64, rng: &mut StdRng) -> f64 {
    let span = (canvas - dim - 2.0 * pad).max(1.0) as u64;
    pad + rng.gen_range(0..span) as f64
}

fn time_based_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
