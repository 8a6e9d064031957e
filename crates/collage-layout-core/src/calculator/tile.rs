use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::PositionCalculator;
use crate::error::{CollageError, Result};
use crate::geometry::{Axis, Dims, Geometry, Unit};
use crate::layout::{ImageId, ImageLayout};

/// Flows images into parallel lines (rows, or columns when configured),
/// rescaling every image on a line to the line's thickness, and searches
/// over the fixed canvas dimension for the least-bad tiling.
pub struct TileInOrderCalculator;

impl PositionCalculator for TileInOrderCalculator {
    #[instrument(skip_all)]
    fn calculate_positions(&self, layout: &ImageLayout) -> Result<Option<ImageLayout>> {
        if layout.image_count() == 0 {
            return Err(CollageError::Empty);
        }
        let base = normalize_padding(layout);
        let cfg = base.config();
        let fixed = if cfg.tile.columns { Axis::Y } else { Axis::X };

        for &img in base.images() {
            let cropping = base.cropping_of(img);
            if cropping.has_size() || cropping.has_offset() {
                return Err(CollageError::UnsupportedCropping {
                    id: img,
                    path: base.info_of(img).path.clone(),
                });
            }
        }

        let (min_sizes, _, sums) = base.size_range(true);
        let mut min_dim = cfg.min_canvas_size;
        let mut max_dim = cfg.max_canvas_size;
        if min_dim.x == 0.0 {
            min_dim.x = min_sizes.x / 2.0;
        }
        if min_dim.y == 0.0 {
            min_dim.y = min_sizes.y / 2.0;
        }
        if max_dim.x == 0.0 {
            max_dim.x = sums.x;
        }
        if max_dim.y == 0.0 {
            max_dim.y = sums.y;
        }

        let (configured_aspect, strict) = cfg.aspect_target();
        let has_aspect = configured_aspect != 0.0;
        let target_aspect = if has_aspect {
            configured_aspect
        } else {
            sums.x / sums.y
        };
        let rank = BadnessRank {
            prioritize_aspect: has_aspect && strict,
        };

        let order = tiling_order(&base, fixed);
        let mut search = Search {
            layout: &base,
            order: &order,
            min_dim,
            max_dim,
            fixed,
            target_aspect,
            rank,
            best: None,
            best_badness: Badness::worst(),
        };
        if has_aspect {
            search.binary_search_on_skew();
        } else {
            search.refine_by_bisection();
        }

        if search.best_badness.empty_space.is_infinite() {
            return Err(CollageError::NoUsableCanvas);
        }
        debug!(badness = ?search.best_badness, "tiling selected");
        Ok(search.best)
    }
}

/// Sized absolute padding must preserve aspect so per-axis pads derive from
/// the pad value itself; hand back a copy with an adjusted configuration
/// when the caller's padding does not.
fn normalize_padding(layout: &ImageLayout) -> ImageLayout {
    let mut copy = layout.duplicate();
    let padding = &layout.config().padding;
    if padding.has_size() && padding.unit() != Unit::Percent && !padding.preserve_aspect {
        let mut adjusted = layout.config().clone();
        adjusted.padding.preserve_aspect = true;
        copy.replace_config(Arc::new(adjusted));
    }
    copy
}

/// Caller-provided order, or ascending by the extent that varies within a
/// line.
fn tiling_order(layout: &ImageLayout, fixed: Axis) -> Vec<ImageId> {
    let mut order: Vec<ImageId> = layout.images().to_vec();
    if !layout.config().tile.exact_order {
        order.sort_by(|a, b| {
            layout
                .dimensions_of(*a)
                .dim(fixed)
                .total_cmp(&layout.dimensions_of(*b).dim(fixed))
        });
    }
    order
}

/// Scores one candidate canvas; lower is better under either comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Badness {
    /// Fixed-axis slack left by the final, possibly underfull, line.
    empty_space: f64,
    /// Total relative shrinkage applied across all lines.
    scaledown_sum: f64,
    /// `log2(canvas.x / canvas.y) - log2(target)`.
    aspect_skew: f64,
}

impl Badness {
    fn worst() -> Self {
        Self {
            empty_space: f64::INFINITY,
            scaledown_sum: f64::INFINITY,
            aspect_skew: f64::INFINITY,
        }
    }
}

/// Lexicographic comparator over badness triples. A strict aspect-ratio
/// demand puts `|aspect_skew|` first; otherwise empty space leads.
#[derive(Debug, Clone, Copy)]
struct BadnessRank {
    prioritize_aspect: bool,
}

impl BadnessRank {
    fn is_better(&self, a: &Badness, b: &Badness) -> bool {
        if self.prioritize_aspect {
            if a.aspect_skew.abs() != b.aspect_skew.abs() {
                a.aspect_skew.abs() < b.aspect_skew.abs()
            } else if a.empty_space != b.empty_space {
                a.empty_space < b.empty_space
            } else {
                a.scaledown_sum < b.scaledown_sum
            }
        } else if a.empty_space != b.empty_space {
            a.empty_space < b.empty_space
        } else if a.aspect_skew.abs() != b.aspect_skew.abs() {
            a.aspect_skew.abs() < b.aspect_skew.abs()
        } else {
            a.scaledown_sum < b.scaledown_sum
        }
    }
}

/// One line of the tiling: a run of the ordered images sharing a thickness
/// along the variable axis, starting at a fixed-axis offset (nonzero only
/// for the centered residual line).
struct Line {
    members: Range<usize>,
    thickness: f64,
    starts_at: f64,
}

struct Search<'a> {
    layout: &'a ImageLayout,
    order: &'a [ImageId],
    min_dim: Dims,
    max_dim: Dims,
    fixed: Axis,
    target_aspect: f64,
    rank: BadnessRank,
    best: Option<ImageLayout>,
    best_badness: Badness,
}

impl Search<'_> {
    /// Tiles at one fixed-axis budget; records the result when it lands
    /// inside the canvas bounds and beats the best so far under `rank`.
    fn evaluate(&mut self, width: f64, rank: BadnessRank) -> (Badness, bool) {
        let (candidate, badness) =
            run_one_tiling(self.layout, self.order, self.fixed, width, self.target_aspect);
        let canvas = candidate.canvas_size();
        let in_bounds = canvas.x >= self.min_dim.x
            && canvas.x <= self.max_dim.x
            && canvas.y >= self.min_dim.y
            && canvas.y <= self.max_dim.y;
        let mut improved = false;
        if in_bounds && rank.is_better(&badness, &self.best_badness) {
            self.best_badness = badness;
            self.best = Some(candidate);
            improved = true;
        }
        debug!(width, ?badness, in_bounds, "tiling candidate");
        (badness, improved)
    }

    /// Width search without an aspect-ratio target: scan a coarse grid of
    /// widths, then repeatedly halve the step around the most promising
    /// candidates until steps drop below one pixel.
    fn refine_by_bisection(&mut self) {
        let lo = self.min_dim.dim(self.fixed);
        let hi = self.max_dim.dim(self.fixed);
        let exponent = (hi - lo).log2().floor() - 5.0;
        if exponent < 1.0 {
            let mut width = lo;
            let mut last = f64::NEG_INFINITY;
            while width <= hi {
                self.evaluate(width, self.rank);
                last = width;
                width += 1.0;
            }
            if last < hi {
                self.evaluate(hi, self.rank);
            }
            return;
        }

        let delta = exponent.exp2();
        let mut fringe: Vec<FringeEntry> = Vec::new();
        let mut width = lo + delta;
        let mut last = lo;
        while width <= hi {
            let (badness, _) = self.evaluate(width, self.rank);
            insert_sorted(
                &mut fringe,
                FringeEntry {
                    width,
                    delta,
                    badness,
                },
                self.rank,
            );
            last = width;
            width += delta;
        }
        // the stepped grid rarely lands on the upper bound; the full-sum
        // canvas must stay reachable
        if last < hi {
            self.evaluate(hi, self.rank);
        }

        let stall_limit = 2 * self.max_dim.dim(self.fixed) as i64 / self.order.len() as i64;
        let mut last_improved: i64 = 0;
        let mut iteration: i64 = 1;
        while !fringe.is_empty() {
            let mut entry = fringe.remove(0);
            entry.delta /= 2.0;
            if entry.delta >= 1.0 {
                let probe_width = entry.width - entry.delta;
                let (badness, improved) = self.evaluate(probe_width, self.rank);
                if improved {
                    last_improved = iteration;
                } else if self.best_badness.empty_space == 0.0
                    && (iteration - last_improved) > stall_limit
                {
                    break;
                }
                if badness.empty_space < entry.badness.empty_space {
                    insert_sorted(
                        &mut fringe,
                        FringeEntry {
                            width: probe_width,
                            delta: entry.delta,
                            badness,
                        },
                        self.rank,
                    );
                    insert_sorted(&mut fringe, entry, self.rank);
                }
            }
            iteration += 1;
        }
    }

    /// Width search with an aspect-ratio target: binary-search on the sign
    /// of the skew, then (when the ratio is only a preference) sweep
    /// outward from the found width hunting for zero empty space.
    fn binary_search_on_skew(&mut self) {
        let mut lo = self.min_dim.dim(self.fixed);
        let mut hi = self.max_dim.dim(self.fixed);
        let aspect_rank = BadnessRank {
            prioritize_aspect: true,
        };
        while hi - lo > 1.0 {
            let midpoint = ((lo + hi) / 2.0).round();
            let (badness, _) = self.evaluate(midpoint, aspect_rank);
            if badness.aspect_skew > 0.0 {
                hi = midpoint;
            } else {
                lo = midpoint;
            }
        }
        if !self.rank.prioritize_aspect {
            let Some(best) = &self.best else {
                return;
            };
            let start = best.canvas_size().dim(self.fixed);
            let lo = self.min_dim.dim(self.fixed);
            let hi = self.max_dim.dim(self.fixed);
            let mut j = 0.0;
            while start - j > lo && start + j < hi && self.best_badness.empty_space > 0.0 {
                self.evaluate(start - j, self.rank);
                self.evaluate(start + j, self.rank);
                j += 1.0;
            }
        }
    }
}

/// Tiles the images, in order, into lines against a fixed-axis budget and
/// finalizes scaling, positions and canvas size on a fresh duplicate.
fn run_one_tiling(
    base: &ImageLayout,
    order: &[ImageId],
    fixed: Axis,
    budget: f64,
    target_aspect: f64,
) -> (ImageLayout, Badness) {
    let var = fixed.flip();
    let mut layout = base.duplicate();
    let relative_padding = layout.padding_is_relative();

    let mut badness = Badness {
        empty_space: -1.0,
        scaledown_sum: 0.0,
        aspect_skew: 0.0,
    };
    let mut lines: Vec<Line> = Vec::new();
    let mut line_start = 0usize;
    let mut min_var = 0.0f64;
    let mut images_aspect = 0.0f64;
    let mut relative_padding_aspect = 0.0f64;
    let mut absolute_padding = 0.0f64;

    for (i, &img) in order.iter().enumerate() {
        let dims = layout.dimensions_of(img);
        let pad = layout.padding_of(img);
        if min_var == 0.0 || dims.dim(var) < min_var {
            min_var = dims.dim(var);
        }
        images_aspect += dims.dim(fixed) / dims.dim(var);
        if relative_padding {
            relative_padding_aspect += 2.0 * pad.dim(fixed) / dims.dim(var);
        } else {
            absolute_padding += 2.0 * pad.dim(fixed);
        }
        // extrapolated width if every member shrank to the smallest
        // variable-axis extent seen on this line
        let line_width = (images_aspect + relative_padding_aspect) * min_var + absolute_padding;
        if line_width >= budget {
            // the thickness that exactly fills the budget
            let thickness =
                (budget - absolute_padding) / (images_aspect + relative_padding_aspect);
            let line = Line {
                members: line_start..i + 1,
                thickness,
                starts_at: 0.0,
            };
            for &member in &order[line.members.clone()] {
                badness.scaledown_sum += layout.dimensions_of(member).dim(var) / thickness - 1.0;
            }
            lines.push(line);
            min_var = 0.0;
            line_start = i + 1;
            images_aspect = 0.0;
            relative_padding_aspect = 0.0;
            absolute_padding = 0.0;
        }
    }
    if line_start != order.len() {
        // residual images form a final line, centered in the leftover slack
        let line_width = (images_aspect + relative_padding_aspect) * min_var + absolute_padding;
        badness.empty_space = budget - line_width;
        let line = Line {
            members: line_start..order.len(),
            thickness: min_var,
            starts_at: (budget - line_width) / 2.0,
        };
        for &member in &order[line.members.clone()] {
            badness.scaledown_sum += layout.dimensions_of(member).dim(var) / line.thickness - 1.0;
        }
        lines.push(line);
    } else {
        badness.empty_space = 0.0;
    }

    let line_cursor = finalize_tiling(&mut layout, order, &lines, fixed, var);
    let mut canvas = Dims::ZERO;
    canvas.set_dim(fixed, budget);
    canvas.set_dim(var, line_cursor);
    layout.set_canvas_size(canvas);
    badness.aspect_skew = (canvas.x / canvas.y).log2() - target_aspect.log2();
    (layout, badness)
}

/// Rescales and positions every line member; returns the final line cursor
/// along the variable axis, which becomes the canvas extent there.
fn finalize_tiling(
    layout: &mut ImageLayout,
    order: &[ImageId],
    lines: &[Line],
    fixed: Axis,
    var: Axis,
) -> f64 {
    let mut line_cursor = 0.0;
    for line in lines {
        let mut image_cursor = line.starts_at;
        for &img in &order[line.members.clone()] {
            let dims = layout.dimensions_of(img);
            let mut scaled = Dims::ZERO;
            scaled.set_dim(fixed, dims.dim(fixed) * line.thickness / dims.dim(var));
            scaled.set_dim(var, line.thickness);
            let _ = layout.set_scaling(img, Geometry::exact(scaled.x, scaled.y));
            let pad = layout.padding_of(img);
            let mut position = Dims::ZERO;
            position.set_dim(fixed, image_cursor + pad.dim(fixed));
            position.set_dim(var, line_cursor + pad.dim(var));
            let _ = layout.set_position(img, position);
            image_cursor += scaled.dim(fixed) + 2.0 * pad.dim(fixed);
        }
        let first = order[line.members.start];
        line_cursor += line.thickness + 2.0 * layout.padding_of(first).dim(var);
    }
    line_cursor
}

#[derive(Debug, Clone, PartialEq)]
struct FringeEntry {
    width: f64,
    delta: f64,
    badness: Badness,
}

fn entry_lt(a: &FringeEntry, b: &FringeEntry, rank: BadnessRank) -> bool {
    if rank.is_better(&a.badness, &b.badness) {
        true
    } else if rank.is_better(&b.badness, &a.badness) {
        false
    } else {
        a.delta < b.delta
    }
}

/// Insertion point after any exactly-equal member, first-greater otherwise.
fn first_greater_than(fringe: &[FringeEntry], entry: &FringeEntry, rank: BadnessRank) -> usize {
    let mut lo: i64 = 0;
    let mut hi: i64 = fringe.len() as i64 - 1;
    while lo <= hi {
        let mid = ((lo + hi) / 2) as usize;
        if fringe[mid] == *entry {
            return mid + 1;
        }
        if entry_lt(&fringe[mid], entry, rank) {
            lo = mid as i64 + 1;
        } else {
            hi = mid as i64 - 1;
        }
    }
    lo as usize
}

fn insert_sorted(fringe: &mut Vec<FringeEntry>, entry: FringeEntry, rank: BadnessRank) {
    let index = first_greater_than(fringe, &entry, rank);
    fringe.insert(index, entry);
}
