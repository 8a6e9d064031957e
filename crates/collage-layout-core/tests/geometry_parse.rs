use collage_layout_core::prelude::*;

#[test]
fn parses_full_geometry() {
    let g: Geometry = "200x100+10+20!>".parse().expect("geometry");
    assert_eq!(g.width, Some(Measure::px(200.0)));
    assert_eq!(g.height, Some(Measure::px(100.0)));
    assert_eq!(g.x, Some(Measure::px(10.0)));
    assert_eq!(g.y, Some(Measure::px(20.0)));
    assert!(!g.preserve_aspect);
    assert_eq!(g.scaling, ScalingMode::DownOnly);
}

#[test]
fn parses_partial_geometries() {
    let g: Geometry = "50%".parse().expect("geometry");
    assert_eq!(g.width, Some(Measure::percent(50.0)));
    assert_eq!(g.height, None);
    assert!(g.preserve_aspect);
    assert_eq!(g.scaling, ScalingMode::Always);

    let g: Geometry = "x30<".parse().expect("geometry");
    assert_eq!(g.width, None);
    assert_eq!(g.height, Some(Measure::px(30.0)));
    assert_eq!(g.scaling, ScalingMode::UpOnly);

    let g: Geometry = "-10-20".parse().expect("geometry");
    assert_eq!(g.x, Some(Measure::px(-10.0)));
    assert_eq!(g.y, Some(Measure::px(-20.0)));
    assert!(!g.has_size());
}

#[test]
fn bare_sign_marks_absent_offset() {
    // "x50++20" carries a y offset but no x offset
    let g: Geometry = "x50++20".parse().expect("geometry");
    assert_eq!(g.height, Some(Measure::px(50.0)));
    assert_eq!(g.x, None);
    assert_eq!(g.y, Some(Measure::px(20.0)));
}

#[test]
fn percent_applies_to_offsets_too() {
    let g: Geometry = "10x20+5+5%".parse().expect("geometry");
    assert_eq!(g.width, Some(Measure::percent(10.0)));
    assert_eq!(g.x, Some(Measure::percent(5.0)));
    assert_eq!(g.y, Some(Measure::percent(5.0)));
}

#[test]
fn rejects_malformed_geometry() {
    for bad in ["", "abc", "12.", "10x20x30", "5 ", "10xx", "%%"] {
        let r: Result<Geometry> = bad.parse::<Geometry>();
        assert!(
            matches!(r, Err(CollageError::MalformedGeometry(_))),
            "{bad:?} should not parse"
        );
    }
}

#[test]
fn geometry_round_trips_through_display() {
    for text in [
        "200x100+10+20!>",
        "50%",
        "x30<",
        "10x20%!",
        "x50++20",
        "100",
        "+5-10",
        "-10-20",
        "33.25x66.5",
        "25x25%",
    ] {
        let g: Geometry = text.parse().expect("geometry");
        let reparsed: Geometry = g.to_string().parse().expect("reparse");
        assert_eq!(g, reparsed, "round trip failed for {text:?}");
    }
}

#[test]
fn parses_dims() {
    assert_eq!("5".parse::<Dims>().expect("dims"), Dims::new(5.0, 5.0));
    assert_eq!("5x3".parse::<Dims>().expect("dims"), Dims::new(5.0, 3.0));
    assert_eq!("5,3".parse::<Dims>().expect("dims"), Dims::new(5.0, 3.0));
    assert_eq!("5x".parse::<Dims>().expect("dims"), Dims::new(5.0, 0.0));
    assert_eq!("x3".parse::<Dims>().expect("dims"), Dims::new(0.0, 3.0));
    assert_eq!(",3".parse::<Dims>().expect("dims"), Dims::new(0.0, 3.0));
}

#[test]
fn rejects_malformed_dims() {
    for bad in ["", "5x3x", "(5)", "-5", "a,b", "1.5"] {
        assert!(
            matches!(bad.parse::<Dims>(), Err(CollageError::MalformedDims(_))),
            "{bad:?} should not parse"
        );
    }
}
