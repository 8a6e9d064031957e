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

#[test]
fn three_squares_stack_into_one_column() {
    let config = LayoutConfig::builder().columns(true).build();
    let layout = layout_with(
        &[(100.0, 100.0), (100.0, 100.0), (100.0, 100.0)],
        config,
    );
    let tiled = TileInOrderCalculator
        .calculate_positions(&layout)
        .expect("calculate")
        .expect("tiling");

    assert_eq!(tiled.canvas_size(), Dims::new(100.0, 300.0));
    assert_eq!(tiled.position_of(ImageId(0)), Some(Dims::ZERO));
    assert_eq!(tiled.position_of(ImageId(1)), Some(Dims::new(0.0, 100.0)));
    assert_eq!(tiled.position_of(ImageId(2)), Some(Dims::new(0.0, 200.0)));
    for &img in tiled.images() {
        assert_eq!(tiled.dimensions_of(img), Dims::new(100.0, 100.0));
    }
}

#[test]
fn column_members_share_width_and_descend() {
    let config = LayoutConfig::builder().columns(true).exact_order(true).build();
    let layout = layout_with(
        &[(80.0, 120.0), (100.0, 100.0), (90.0, 60.0), (40.0, 80.0)],
        config,
    );
    let tiled = TileInOrderCalculator
        .calculate_positions(&layout)
        .expect("calculate")
        .expect("tiling");

    let mut columns: Vec<(f64, Vec<ImageId>)> = Vec::new();
    for &img in tiled.images() {
        let pos = tiled.position_of(img).expect("positioned");
        match columns.iter().position(|(x, _)| (*x - pos.x).abs() < 1e-9) {
            Some(column) => columns[column].1.push(img),
            None => columns.push((pos.x, vec![img])),
        }
    }
    columns.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (_, members) in &columns {
        let width = tiled.dimensions_of(members[0]).x;
        let mut cursor = f64::NEG_INFINITY;
        for &img in members {
            assert!((tiled.dimensions_of(img).x - width).abs() < 1e-9);
            let y = tiled.position_of(img).expect("positioned").y;
            assert!(y > cursor);
            cursor = y;
        }
    }
}
