use std::path::PathBuf;
use std::sync::Arc;

use collage_layout_core::prelude::*;

fn layout_with(sizes: &[(f64, f64)], config: LayoutConfig) -> ImageLayout {
    let sources = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| (PathBuf::from(format!("img{i}.png")), Dims::new(w, h)))
        .collect();
    ImageLayout::new(Arc::new(config), sources)
}

fn assert_no_overlaps(layout: &ImageLayout) {
    for &img in layout.images() {
        assert!(layout.position_of(img).is_some(), "{img} not positioned");
        assert_eq!(layout.test_collision(img), None, "{img} collides");
    }
}

fn assert_within_canvas(layout: &ImageLayout) {
    let canvas = layout.canvas_size();
    for &img in layout.images() {
        let pos = layout.position_of(img).expect("positioned");
        let dims = layout.dimensions_of(img);
        assert!(pos.x >= 0.0 && pos.y >= 0.0, "{img} at {pos}");
        assert!(
            pos.x + dims.x <= canvas.x + 1e-6 && pos.y + dims.y <= canvas.y + 1e-6,
            "{img} at {pos} leaves the canvas {canvas}"
        );
    }
}

#[test]
fn single_image_fills_the_canvas_exactly() {
    let config = LayoutConfig::builder().seed(1).build();
    let layout = layout_with(&[(100.0, 50.0)], config);
    let packed = RandomCalculator
        .calculate_positions(&layout)
        .expect("calculate")
        .expect("placement");
    assert_eq!(packed.canvas_size(), Dims::new(100.0, 50.0));
    assert_eq!(packed.position_of(ImageId(0)), Some(Dims::ZERO));
}

#[test]
fn placements_hold_the_no_overlap_invariant() {
    let config = LayoutConfig::builder().seed(7).build();
    let layout = layout_with(&[(20.0, 20.0), (20.0, 20.0), (20.0, 20.0)], config);
    let packed = RandomCalculator
        .calculate_positions(&layout)
        .expect("calculate")
        .expect("placement");
    assert_eq!(packed.positioned_count(), 3);
    assert_no_overlaps(&packed);
    assert_within_canvas(&packed);
}

#[test]
fn same_seed_reproduces_the_same_layout() {
    let sizes = [(60.0, 40.0), (40.0, 40.0), (30.0, 20.0)];
    let run = |seed| {
        let layout = layout_with(&sizes, LayoutConfig::builder().seed(seed).build());
        RandomCalculator
            .calculate_positions(&layout)
            .expect("calculate")
            .expect("placement")
    };
    let first = run(7);
    let second = run(7);
    assert_eq!(first.canvas_size(), second.canvas_size());
    for &img in first.images() {
        assert_eq!(first.position_of(img), second.position_of(img), "{img}");
    }
}

#[test]
fn exhausted_retries_are_a_value_not_an_error() {
    // two 25x25 squares cannot share a 30x30 canvas
    let config = LayoutConfig::builder()
        .min_canvas_size(Dims::new(30.0, 30.0))
        .max_canvas_size(Dims::new(30.0, 30.0))
        .seed(1)
        .build();
    let layout = layout_with(&[(25.0, 25.0), (25.0, 25.0)], config);
    let outcome = RandomCalculator
        .calculate_positions(&layout)
        .expect("calculate");
    assert!(outcome.is_none());
}

#[test]
fn empty_layout_is_rejected() {
    let layout = layout_with(&[], LayoutConfig::default());
    assert!(matches!(
        RandomCalculator.calculate_positions(&layout),
        Err(CollageError::Empty)
    ));
}
