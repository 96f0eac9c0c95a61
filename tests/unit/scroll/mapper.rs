use super::*;

fn range(first: u32, last: u32) -> FrameRange {
    FrameRange::new(FrameIndex(first), FrameIndex(last)).unwrap()
}

fn cfg(total: u32, smoothness: f64, speed: f64) -> SequenceConfig {
    SequenceConfig {
        total_frames: total,
        start_frame: 1,
        smoothness,
        speed,
        ..SequenceConfig::default()
    }
}

#[test]
fn progress_follows_container_offset() {
    let g = ViewportGeometry::scrolled(0.0, 5000.0, 1000.0);
    assert_eq!(g.progress(), 0.0);
    let g = ViewportGeometry::scrolled(2000.0, 5000.0, 1000.0);
    assert_eq!(g.progress(), 0.5);
    let g = ViewportGeometry::scrolled(4000.0, 5000.0, 1000.0);
    assert_eq!(g.progress(), 1.0);

    // Container still below the viewport top, and scrolled past its end.
    assert_eq!(ViewportGeometry::scrolled(-300.0, 5000.0, 1000.0).progress(), 0.0);
    assert_eq!(ViewportGeometry::scrolled(9000.0, 5000.0, 1000.0).progress(), 1.0);
}

#[test]
fn degenerate_geometry_reads_as_zero() {
    assert_eq!(ViewportGeometry::default().progress(), 0.0);
    assert_eq!(ViewportGeometry::scrolled(50.0, 800.0, 1000.0).progress(), 0.0);
    assert_eq!(ViewportGeometry::scrolled(50.0, 1000.0, 1000.0).progress(), 0.0);
    assert_eq!(ViewportGeometry::scrolled(f64::NAN, 5000.0, 1000.0).progress(), 0.0);
    assert_eq!(ViewportGeometry::scrolled(10.0, f64::INFINITY, 1000.0).progress(), 0.0);
}

#[test]
fn target_hits_both_ends() {
    let r = range(1, 99);
    assert_eq!(target_frame(r, 0.0, 1.0), FrameIndex(1));
    assert_eq!(target_frame(r, 1.0, 1.0), FrameIndex(99));

    let single = range(4, 4);
    assert_eq!(target_frame(single, 0.0, 1.0), FrameIndex(4));
    assert_eq!(target_frame(single, 1.0, 1.0), FrameIndex(4));
}

#[test]
fn target_uses_ceiling() {
    let r = range(1, 10);
    assert_eq!(target_frame(r, 0.01, 1.0), FrameIndex(2));
    assert_eq!(target_frame(r, 0.5, 1.0), FrameIndex(6));
}

#[test]
fn target_is_monotonic_and_in_range() {
    for (first, last) in [(1, 99), (1, 10), (5, 7), (0, 3)] {
        let r = range(first, last);
        let mut prev = r.first;
        for i in 0..=1000 {
            let p = f64::from(i) / 1000.0;
            let t = target_frame(r, p, 1.0);
            assert!(r.contains(t), "{t:?} outside {r:?}");
            assert!(t >= prev, "target went backwards at p={p}");
            prev = t;
        }
    }
}

#[test]
fn speed_scales_and_saturates() {
    let r = range(1, 11);
    assert_eq!(target_frame(r, 0.25, 2.0), target_frame(r, 0.5, 1.0));
    assert_eq!(target_frame(r, 0.75, 2.0), FrameIndex(11));
    assert_eq!(target_frame(r, 1.0, 0.5), target_frame(r, 0.5, 1.0));
    assert_eq!(target_frame(r, f64::NAN, 1.0), FrameIndex(1));
}

#[test]
fn smooth_step_halves_the_gap_with_unit_smoothness() {
    let mut f = FrameIndex(1);
    let mut seen = vec![];
    while f != FrameIndex(10) {
        f = smooth_step(f, FrameIndex(10), 1.0);
        seen.push(f.0);
    }
    assert_eq!(seen, vec![6, 8, 9, 10]);
}

#[test]
fn smooth_step_converges_downward() {
    let mut f = FrameIndex(10);
    let mut ticks = 0;
    while f != FrameIndex(1) {
        f = smooth_step(f, FrameIndex(1), 1.0);
        ticks += 1;
        assert!(ticks <= 9);
    }
}

#[test]
fn smooth_step_never_overshoots() {
    for smoothness in [0.1, 0.5, 1.0, 3.0, 25.0] {
        for (from, to) in [(1u32, 99u32), (99, 1), (40, 41), (41, 40)] {
            let (lo, hi) = (from.min(to), from.max(to));
            let mut f = FrameIndex(from);
            let mut ticks = 0;
            while f != FrameIndex(to) {
                f = smooth_step(f, FrameIndex(to), smoothness);
                assert!((lo..=hi).contains(&f.0));
                ticks += 1;
                assert!(ticks <= hi - lo, "no convergence for s={smoothness}");
            }
        }
    }
}

#[test]
fn larger_smoothness_converges_slower() {
    fn ticks(s: f64) -> u32 {
        let mut f = FrameIndex(1);
        let mut n = 0;
        while f != FrameIndex(99) {
            f = smooth_step(f, FrameIndex(99), s);
            n += 1;
        }
        n
    }
    assert!(ticks(1.0) < ticks(4.0));
    assert!(ticks(4.0) < ticks(16.0));
}

#[test]
fn mapper_starts_on_start_frame() {
    let m = ScrollMapper::new(&cfg(10, 1.0, 1.0)).unwrap();
    assert_eq!(m.current(), FrameIndex(1));
    assert!(m.is_settled());
    assert_eq!(m.state().progress, 0.0);
}

#[test]
fn mapper_jump_to_end_settles_on_last_frame() {
    let mut m = ScrollMapper::new(&cfg(10, 1.0, 1.0)).unwrap();
    let end = ViewportGeometry::scrolled(4000.0, 5000.0, 1000.0);
    assert_eq!(m.update(end), Some(FrameIndex(6)));
    assert_eq!(m.state().target, FrameIndex(10));
    for _ in 0..20 {
        m.update(end);
    }
    assert_eq!(m.current(), FrameIndex(10));
    assert!(m.is_settled());
}

#[test]
fn mapper_idle_update_reports_no_change() {
    let mut m = ScrollMapper::new(&cfg(10, 1.0, 1.0)).unwrap();
    let g = ViewportGeometry::scrolled(2000.0, 5000.0, 1000.0);
    while m.update(g).is_some() {}
    assert_eq!(m.update(g), None);
    assert_eq!(m.tick(), None);
}

#[test]
fn mapper_tick_eases_without_new_measurement() {
    let mut m = ScrollMapper::new(&cfg(10, 2.0, 1.0)).unwrap();
    m.update(ViewportGeometry::scrolled(4000.0, 5000.0, 1000.0));
    let mut n = 0;
    while m.tick().is_some() {
        n += 1;
    }
    assert!(n > 0);
    assert_eq!(m.current(), FrameIndex(10));
}

#[test]
fn mapper_records_speed_scaled_progress() {
    let mut m = ScrollMapper::new(&cfg(10, 1.0, 3.0)).unwrap();
    m.update(ViewportGeometry::scrolled(1000.0, 5000.0, 1000.0));
    assert_eq!(m.state().progress, 0.75);
}
