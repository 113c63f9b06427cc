//! End-to-end recognition: bytes in, FEN out.

mod common;

use std::sync::Arc;

use board2fen::classifier::PLACEHOLDER_CONFIDENCE;
use board2fen::{
    EmptyBoardClassifier, PieceLabel, RecognitionError, RecognizeOptions, Recognizer,
    RecognizerConfig, Side, recognize,
};
use common::*;

/// Dark board on a light photo with one bright piece in the a8 cell
fn board_with_piece_on_a8() -> image::RgbImage {
    let mut img = rect_board(480, 480, 40, 40, 400, 400);
    imageproc::drawing::draw_filled_rect_mut(
        &mut img,
        imageproc::rect::Rect::at(50, 50).of_size(30, 30),
        BRIGHT,
    );
    img
}

#[test]
fn test_plain_gray_image_gives_empty_board() -> anyhow::Result<()> {
    let bytes = encode_png(&solid_image(512, 512, LIGHT));
    let result = recognize(&bytes, Arc::new(EmptyBoardClassifier), Side::White)?;

    assert_eq!(result.fen, "8/8/8/8/8/8/8/8 w - - 0 1");
    assert_eq!(result.confidence, PLACEHOLDER_CONFIDENCE);
    Ok(())
}

#[test]
fn test_undecodable_bytes() {
    let result = recognize(b"not an image", Arc::new(EmptyBoardClassifier), Side::White);
    match result {
        Err(e @ RecognitionError::DecodeError(_)) => assert!(e.is_client_error()),
        other => panic!("expected DecodeError, got {other:?}"),
    }
}

#[test]
fn test_side_to_move_is_passed_through() -> anyhow::Result<()> {
    let bytes = encode_png(&solid_image(256, 256, LIGHT));
    let result = recognize(&bytes, Arc::new(EmptyBoardClassifier), Side::Black)?;
    assert_eq!(result.fen, "8/8/8/8/8/8/8/8 b - - 0 1");
    Ok(())
}

#[test]
fn test_detected_board_places_piece() -> anyhow::Result<()> {
    let bytes = encode_png(&board_with_piece_on_a8());
    let recognizer = Recognizer::new(Arc::new(BrightnessClassifier { probability: None }));
    let result = recognizer.recognize(&bytes, RecognizeOptions::new(Side::White))?;

    assert_eq!(result.fen, "K7/8/8/8/8/8/8/8 w - - 0 1");
    Ok(())
}

#[test]
fn test_black_at_bottom_orientation() -> anyhow::Result<()> {
    let bytes = encode_png(&board_with_piece_on_a8());
    let recognizer = Recognizer::new(Arc::new(BrightnessClassifier { probability: None }));
    let options =
        RecognizeOptions::new(Side::White).with_orientation(board2fen::Orientation::BlackAtBottom);
    let result = recognizer.recognize(&bytes, options)?;

    assert_eq!(result.fen, "8/8/8/8/8/8/8/7K w - - 0 1");
    Ok(())
}

#[test]
fn test_recognition_is_deterministic() -> anyhow::Result<()> {
    let bytes = encode_png(&board_with_piece_on_a8());
    let recognizer = Recognizer::new(Arc::new(BrightnessClassifier { probability: None }));

    let first = recognizer.recognize(&bytes, RecognizeOptions::default())?;
    for _ in 0..3 {
        let again = recognizer.recognize(&bytes, RecognizeOptions::default())?;
        assert_eq!(again, first);
    }
    Ok(())
}

#[test]
fn test_confidence_from_probabilities() -> anyhow::Result<()> {
    let bytes = encode_png(&solid_image(128, 128, LIGHT));
    let recognizer = Recognizer::new(Arc::new(BrightnessClassifier {
        probability: Some(0.5),
    }));
    let result = recognizer.recognize(&bytes, RecognizeOptions::default())?;

    assert!((result.confidence - 0.5).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_non_finite_probability_uses_placeholder() -> anyhow::Result<()> {
    let bytes = encode_png(&solid_image(128, 128, LIGHT));
    let recognizer = Recognizer::new(Arc::new(BrightnessClassifier {
        probability: Some(f32::NAN),
    }));
    let result = recognizer.recognize(&bytes, RecognizeOptions::default())?;

    assert_eq!(result.confidence, PLACEHOLDER_CONFIDENCE);
    assert!(serde_json::to_string(&result)?.contains("0.85"));
    Ok(())
}

#[test]
fn test_short_classifier_output_is_contract_error() {
    let bytes = encode_png(&solid_image(128, 128, LIGHT));
    let recognizer = Recognizer::new(Arc::new(StubClassifier::all(PieceLabel::Empty, 63)));

    match recognizer.recognize(&bytes, RecognizeOptions::default()) {
        Err(e @ RecognitionError::ClassifierContractError { expected: 64, actual: 63 }) => {
            assert!(!e.is_client_error());
        }
        other => panic!("expected ClassifierContractError, got {other:?}"),
    }
}

#[test]
fn test_classifier_failure_is_internal_error() {
    let bytes = encode_png(&solid_image(128, 128, LIGHT));
    let recognizer = Recognizer::new(Arc::new(FailingClassifier));

    match recognizer.recognize(&bytes, RecognizeOptions::default()) {
        Err(e @ RecognitionError::ClassifierFailed(_)) => {
            assert!(e.to_string().contains("model exploded"));
            assert!(!e.is_client_error());
        }
        other => panic!("expected ClassifierFailed, got {other:?}"),
    }
}

#[test]
fn test_stub_labels_reach_fen() -> anyhow::Result<()> {
    let bytes = encode_png(&solid_image(200, 100, LIGHT));
    let labels = labels_with(&[(0, PieceLabel::WhiteKing), (63, PieceLabel::BlackKing)]);
    let recognizer = Recognizer::new(Arc::new(StubClassifier { labels }));
    let result = recognizer.recognize(&bytes, RecognizeOptions::default())?;

    assert_eq!(result.fen, "K7/8/8/8/8/8/8/7k w - - 0 1");
    Ok(())
}

#[test]
fn test_custom_board_size() -> anyhow::Result<()> {
    let config = RecognizerConfig {
        board_size: 256,
        ..RecognizerConfig::default()
    };
    let recognizer = Recognizer::new(Arc::new(EmptyBoardClassifier)).with_config(config);
    let (position, result) = recognizer.recognize_position(
        solid_image(300, 300, LIGHT),
        RecognizeOptions::default(),
    )?;

    assert_eq!(position.piece_count(), 0);
    assert_eq!(result.fen, "8/8/8/8/8/8/8/8 w - - 0 1");
    Ok(())
}

#[test]
fn test_debug_output_is_written() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let out = dir.path().join("debug");
    let recognizer = Recognizer::new(Arc::new(EmptyBoardClassifier)).with_debug(out.clone())?;
    recognizer.recognize_image(board_with_piece_on_a8(), RecognizeOptions::default())?;

    for name in [
        "00_input.png",
        "01_edges.png",
        "02_dilated.png",
        "03_rectified.png",
        "04_cells/01.png",
        "04_cells/64.png",
    ] {
        assert!(out.join(name).is_file(), "missing {name}");
    }
    let rectified = image::open(out.join("03_rectified.png"))?;
    assert_eq!((rectified.width(), rectified.height()), (512, 512));
    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;
    let result =
        Recognizer::new(Arc::new(EmptyBoardClassifier)).with_debug(dir.path().to_path_buf());
    assert!(result.is_err());
    Ok(())
}
