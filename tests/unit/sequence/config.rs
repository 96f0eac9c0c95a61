use super::*;

#[test]
fn defaults_match_recognized_options() {
    let cfg = SequenceConfig::default();
    assert_eq!(cfg.total_frames, 99);
    assert_eq!(cfg.start_frame, 1);
    assert_eq!(cfg.scroll_height, 500.0);
    assert_eq!(cfg.base_url, "/sequence");
    assert_eq!(cfg.frame_prefix, "frame-");
    assert_eq!(cfg.frame_extension, ".jpg");
    assert_eq!(cfg.frame_number_padding, 1);
    assert_eq!(cfg.smoothness, 1.0);
    assert_eq!(cfg.speed, 1.0);
    cfg.validate().unwrap();
}

#[test]
fn frame_path_applies_padding() {
    let mut cfg = SequenceConfig::default();
    assert_eq!(cfg.frame_path(FrameIndex(5)), "/sequence/frame-5.jpg");
    assert_eq!(cfg.frame_path(FrameIndex(123)), "/sequence/frame-123.jpg");

    cfg.frame_number_padding = 3;
    assert_eq!(cfg.frame_path(FrameIndex(5)), "/sequence/frame-005.jpg");
    assert_eq!(cfg.frame_path(FrameIndex(1234)), "/sequence/frame-1234.jpg");

    cfg.base_url = "assets/hero".to_string();
    cfg.frame_prefix = String::new();
    cfg.frame_extension = ".webp".to_string();
    assert_eq!(cfg.frame_path(FrameIndex(7)), "assets/hero/007.webp");
}

#[test]
fn json_fields_are_camel_case_and_optional() {
    let cfg = SequenceConfig::from_json_str(
        r#"{ "totalFrames": 10, "frameNumberPadding": 4, "baseUrl": "/seq" }"#,
    )
    .unwrap();
    assert_eq!(cfg.total_frames, 10);
    assert_eq!(cfg.start_frame, 1);
    assert_eq!(cfg.frame_path(FrameIndex(9)), "/seq/frame-0009.jpg");
}

#[test]
fn json_rejects_unknown_fields() {
    let err = SequenceConfig::from_json_str(r#"{ "totalFrame": 10 }"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn validate_rejects_inverted_range() {
    let cfg = SequenceConfig {
        total_frames: 3,
        start_frame: 4,
        ..SequenceConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("startFrame"));
    assert!(cfg.frame_range().is_err());
}

#[test]
fn validate_rejects_bad_factors() {
    for cfg in [
        SequenceConfig {
            total_frames: 0,
            start_frame: 0,
            ..SequenceConfig::default()
        },
        SequenceConfig {
            smoothness: 0.0,
            ..SequenceConfig::default()
        },
        SequenceConfig {
            speed: -1.0,
            ..SequenceConfig::default()
        },
        SequenceConfig {
            scroll_height: f64::INFINITY,
            ..SequenceConfig::default()
        },
        SequenceConfig {
            frame_extension: String::new(),
            ..SequenceConfig::default()
        },
    ] {
        assert!(cfg.validate().is_err(), "{cfg:?} should be rejected");
    }
}

#[test]
fn validate_bounds_frame_count_and_padding() {
    let at_limit = SequenceConfig {
        total_frames: MAX_TOTAL_FRAMES,
        frame_number_padding: MAX_FRAME_NUMBER_PADDING,
        ..SequenceConfig::default()
    };
    assert!(at_limit.validate().is_ok());

    let too_many = SequenceConfig {
        total_frames: 4_000_000_000,
        ..SequenceConfig::default()
    };
    assert!(matches!(
        too_many.validate(),
        Err(ScrollSeqError::Validation(_))
    ));

    let err = SequenceConfig::from_json_str(r#"{"frameNumberPadding": 1000000000000}"#)
        .unwrap_err();
    assert!(matches!(err, ScrollSeqError::Validation(_)), "{err}");
}

#[test]
fn container_height_scales_with_viewport() {
    let cfg = SequenceConfig::default();
    assert_eq!(cfg.container_height_for(800.0), 4000.0);
}
