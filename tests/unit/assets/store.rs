use std::sync::Arc;

use super::*;
use crate::assets::loader::ManualLoader;

fn cfg(total: u32) -> SequenceConfig {
    SequenceConfig {
        total_frames: total,
        start_frame: 1,
        base_url: "/seq".to_string(),
        frame_extension: ".png".to_string(),
        ..SequenceConfig::default()
    }
}

fn frame(w: u32, h: u32) -> DecodedFrame {
    DecodedFrame {
        width: w,
        height: h,
        rgba8_premul: Arc::new(vec![255; (w * h * 4) as usize]),
    }
}

fn ok(generation: u64, index: u32) -> LoadEvent {
    LoadEvent {
        generation,
        index: FrameIndex(index),
        result: Ok(frame(2, 2)),
    }
}

#[test]
fn request_all_issues_one_request_per_frame_once() {
    let mut store = FrameStore::new(&cfg(4), 1).unwrap();
    let mut loader = ManualLoader::new();
    assert!(matches!(store.slot(FrameIndex(1)), Some(FrameSlot::Idle)));

    store.request_all(&mut loader);
    store.request_all(&mut loader);

    let paths: Vec<&str> = loader.requests().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/seq/frame-1.png",
            "/seq/frame-2.png",
            "/seq/frame-3.png",
            "/seq/frame-4.png"
        ]
    );
    assert!(loader.requests().iter().all(|r| r.generation == 1));
    assert!(matches!(store.slot(FrameIndex(1)), Some(FrameSlot::Pending)));
    assert_eq!(store.path(FrameIndex(3)), Some("/seq/frame-3.png"));
}

#[test]
fn completions_arrive_out_of_order() {
    let mut store = FrameStore::new(&cfg(3), 1).unwrap();
    store.request_all(&mut ManualLoader::new());

    assert_eq!(store.apply(ok(1, 3)), Some(FrameIndex(3)));
    assert!(store.is_ready(FrameIndex(3)));
    assert!(!store.is_ready(FrameIndex(1)));
    assert!(store.frame(FrameIndex(1)).is_none());
    assert_eq!(store.frame(FrameIndex(3)).unwrap().width, 2);
}

#[test]
fn failed_frames_never_become_ready() {
    let mut store = FrameStore::new(&cfg(2), 1).unwrap();
    store.request_all(&mut ManualLoader::new());

    let failed = LoadEvent {
        generation: 1,
        index: FrameIndex(2),
        result: Err("404".to_string()),
    };
    assert_eq!(store.apply(failed), Some(FrameIndex(2)));
    assert_eq!(store.apply(ok(1, 2)), None);
    assert!(!store.is_ready(FrameIndex(2)));
    assert!(matches!(store.slot(FrameIndex(2)), Some(FrameSlot::Failed(r)) if r == "404"));
    assert_eq!(store.failed_count(), 1);

    store.apply(ok(1, 1));
    assert!(store.is_settled());
    assert!(!store.is_fully_loaded());
}

#[test]
fn stale_and_out_of_range_events_are_ignored() {
    let mut store = FrameStore::new(&cfg(2), 5).unwrap();
    store.request_all(&mut ManualLoader::new());

    assert_eq!(store.apply(ok(4, 1)), None);
    assert_eq!(store.apply(ok(5, 9)), None);
    assert_eq!(store.ready_count(), 0);
}

#[test]
fn events_before_request_are_ignored() {
    let mut store = FrameStore::new(&cfg(2), 1).unwrap();
    assert_eq!(store.apply(ok(1, 1)), None);
}

#[test]
fn loaded_percent_rounds_down() {
    let mut store = FrameStore::new(&cfg(3), 1).unwrap();
    store.request_all(&mut ManualLoader::new());
    assert_eq!(store.loaded_percent(), 0);
    store.apply(ok(1, 1));
    assert_eq!(store.loaded_percent(), 33);
    store.apply(ok(1, 2));
    assert_eq!(store.loaded_percent(), 66);
    store.apply(ok(1, 3));
    assert_eq!(store.loaded_percent(), 100);
    assert!(store.is_fully_loaded());
}

#[test]
fn new_rejects_invalid_config() {
    let bad = SequenceConfig {
        total_frames: 1,
        start_frame: 2,
        ..SequenceConfig::default()
    };
    assert!(FrameStore::new(&bad, 1).is_err());
}

#[test]
fn undrawable_frames_settle_as_failed() {
    let mut store = FrameStore::new(&cfg(2), 1).unwrap();
    store.request_all(&mut ManualLoader::new());

    let huge = LoadEvent {
        generation: 1,
        index: FrameIndex(1),
        result: Ok(DecodedFrame {
            width: 70_000,
            height: 1,
            rgba8_premul: Arc::new(vec![255; 70_000 * 4]),
        }),
    };
    assert_eq!(store.apply(huge), Some(FrameIndex(1)));
    assert!(store.is_failed(FrameIndex(1)));
    assert!(!store.is_ready(FrameIndex(1)));
    assert_eq!(store.failed_count(), 1);

    assert_eq!(store.apply(ok(1, 2)), Some(FrameIndex(2)));
    assert!(store.is_settled());
    assert_eq!(store.loaded_percent(), 50);
}
