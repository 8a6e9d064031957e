use collage_layout_core::prelude::*;

#[test]
fn defaults_match_the_documented_knobs() {
    let cfg = LayoutConfig::default();
    assert_eq!(cfg.min_canvas_size, Dims::ZERO);
    assert_eq!(cfg.max_canvas_size, Dims::ZERO);
    assert!(!cfg.aspect_ratio.has_size());
    assert!(!cfg.padding.has_size());
    assert_eq!(cfg.random.seed, -1);
    assert_eq!(cfg.random.max_layout_tries, 25);
    assert_eq!(cfg.random.max_image_tries, 100);
    assert_eq!(cfg.random.size_tolerance, 0.1);
    assert_eq!(cfg.balancer.max_iterations, 4);
    assert_eq!(cfg.balancer.tolerance, 0.01);
    assert!(!cfg.tile.exact_order);
    assert!(!cfg.tile.columns);
    assert!(cfg.uniform.scale_to_min.is_none());
}

#[test]
fn builder_sets_every_surface() {
    let cfg = LayoutConfig::builder()
        .min_canvas_size("200x100".parse().expect("dims"))
        .max_canvas_size("800".parse().expect("dims"))
        .aspect_ratio("16x9".parse().expect("geometry"))
        .padding("2%".parse().expect("geometry"))
        .seed(42)
        .max_layout_tries(10)
        .max_image_tries(50)
        .size_tolerance(0.2)
        .balance_iterations(2)
        .balance_tolerance(0.05)
        .exact_order(true)
        .columns(true)
        .uniform_scaling("50%".parse().expect("geometry"))
        .scale_to_min(true, false)
        .build();

    assert_eq!(cfg.min_canvas_size, Dims::new(200.0, 100.0));
    assert_eq!(cfg.max_canvas_size, Dims::new(800.0, 800.0));
    let (ratio, strict) = cfg.aspect_target();
    assert!((ratio - 16.0 / 9.0).abs() < 1e-12);
    assert!(!strict);
    assert_eq!(cfg.random.seed, 42);
    assert_eq!(cfg.random.max_layout_tries, 10);
    assert!(cfg.tile.exact_order && cfg.tile.columns);
    assert!(cfg.uniform.scaling.has_width());
    let to_min = cfg.uniform.scale_to_min.expect("scale_to_min");
    assert!(to_min.x && !to_min.y);
}

#[test]
fn strict_aspect_requires_the_bang_flag() {
    let cfg = LayoutConfig::builder()
        .aspect_ratio("1x1!".parse().expect("geometry"))
        .build();
    let (ratio, strict) = cfg.aspect_target();
    assert_eq!(ratio, 1.0);
    assert!(strict);
}

#[test]
fn unset_aspect_has_zero_ratio() {
    let cfg = LayoutConfig::default();
    assert_eq!(cfg.aspect_target().0, 0.0);
    // width alone does not define a ratio either
    let cfg = LayoutConfig::builder()
        .aspect_ratio("4".parse().expect("geometry"))
        .build();
    assert_eq!(cfg.aspect_target().0, 0.0);
}

#[test]
fn config_round_trips_through_json() {
    let cfg = LayoutConfig::builder()
        .padding("3%".parse().expect("geometry"))
        .seed(9)
        .columns(true)
        .build();
    let text = serde_json::to_string(&cfg).expect("serialize");
    let back: LayoutConfig = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back.padding, cfg.padding);
    assert_eq!(back.random.seed, 9);
    assert!(back.tile.columns);
    assert_eq!(back.balancer.max_iterations, cfg.balancer.max_iterations);
}

#[test]
fn missing_fields_deserialize_to_defaults() {
    let cfg: LayoutConfig = serde_json::from_str("{}").expect("deserialize");
    assert_eq!(cfg.random.max_layout_tries, 25);
    assert_eq!(cfg.balancer.tolerance, 0.01);
    assert!(!cfg.padding.has_size());
}
