use super::*;

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    let r = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    assert_eq!(r.frame_count(), 1);
    assert_eq!(r.span(), 0);
}

#[test]
fn frame_range_clamp_and_slots() {
    let r = FrameRange::new(FrameIndex(1), FrameIndex(99)).unwrap();
    assert_eq!(r.frame_count(), 99);
    assert_eq!(r.clamp(FrameIndex(0)), FrameIndex(1));
    assert_eq!(r.clamp(FrameIndex(150)), FrameIndex(99));
    assert_eq!(r.clamp(FrameIndex(42)), FrameIndex(42));

    assert_eq!(r.slot_of(FrameIndex(1)), Some(0));
    assert_eq!(r.slot_of(FrameIndex(99)), Some(98));
    assert_eq!(r.slot_of(FrameIndex(0)), None);
    assert_eq!(r.slot_of(FrameIndex(100)), None);
}

#[test]
fn frame_range_iterates_inclusive() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    let frames: Vec<u32> = r.iter().map(|f| f.0).collect();
    assert_eq!(frames, vec![2, 3, 4, 5]);
}

#[test]
fn surface_size_is_empty_when_either_side_is_zero() {
    assert!(SurfaceSize::default().is_empty());
    assert!(SurfaceSize::new(10, 0).is_empty());
    assert!(!SurfaceSize::new(640, 360).is_empty());
}

#[test]
fn premul_matches_rounding() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(
        Rgba8Premul::from_straight_rgba(10, 20, 30, 255).to_array(),
        [10, 20, 30, 255]
    );
}
