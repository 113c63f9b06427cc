use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, RgbImage};
use tracing::{debug, error, info};

use crate::classifier::{PieceClassifier, overall_confidence};
use crate::config::RecognizerConfig;
use crate::detection::{BoardLocator, rectify, slice_board};
use crate::error::{RecognitionError, Result};
use crate::models::{Cell, Orientation, PieceLabel, RecognitionResult, Side};
use crate::position::{Position, SQUARE_COUNT};

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Per-request inputs besides the image itself
#[derive(Debug, Clone, Copy, Default)]
pub struct RecognizeOptions {
    pub side_to_move: Side,
    pub orientation: Orientation,
}

impl RecognizeOptions {
    pub fn new(side_to_move: Side) -> Self {
        Self {
            side_to_move,
            ..Default::default()
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Photo-to-FEN pipeline: locate, rectify, slice, classify, assemble.
///
/// Holds no per-request state; one instance can serve many threads.
pub struct Recognizer {
    classifier: Arc<dyn PieceClassifier>,
    config: RecognizerConfig,
    locator: BoardLocator,
    debug: Option<DebugConfig>,
}

impl Recognizer {
    pub fn new(classifier: Arc<dyn PieceClassifier>) -> Self {
        let config = RecognizerConfig::default();
        Self {
            classifier,
            locator: BoardLocator::new(config.locator.clone()),
            config,
            debug: None,
        }
    }

    pub fn with_config(mut self, config: RecognizerConfig) -> Self {
        self.locator = BoardLocator::new(config.locator.clone());
        self.config = config;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Decode `bytes` and recognise the board in it
    pub fn recognize(&self, bytes: &[u8], options: RecognizeOptions) -> Result<RecognitionResult> {
        let image = decode_image(bytes)?;
        self.recognize_image(image, options)
    }

    pub fn recognize_image(
        &self,
        image: RgbImage,
        options: RecognizeOptions,
    ) -> Result<RecognitionResult> {
        let (_, result) = self.recognize_position(image, options)?;
        Ok(result)
    }

    /// Like `recognize_image`, also returning the assembled position
    pub fn recognize_position(
        &self,
        image: RgbImage,
        options: RecognizeOptions,
    ) -> Result<(Position, RecognitionResult)> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RecognitionError::DecodeError(
                "image has no pixels".to_string(),
            ));
        }
        debug!("Recognizing {}x{} image", image.width(), image.height());
        self.save_debug("00_input.png", |p| image.save(p))?;

        let location = self.locator.locate_detailed(&image);
        if location.fell_back {
            info!("Board outline not found, treating the whole image as the board");
        }
        debug!(quad = ?location.quad, "Board located");
        self.save_debug("01_edges.png", |p| location.edges.save(p))?;
        self.save_debug("02_dilated.png", |p| location.dilated.save(p))?;

        let board = rectify(image, &location.quad, self.config.board_size);
        self.save_debug("03_rectified.png", |p| board.save(p))?;

        let cells = slice_board(&board, self.config.cell_margin_divisor);
        self.save_debug_cells(&cells)?;

        let classifications = self.classifier.classify(&cells).map_err(|e| {
            error!("Classifier {} failed: {:#}", self.classifier.name(), e);
            RecognitionError::ClassifierFailed(format!("{:#}", e))
        })?;
        if classifications.len() != SQUARE_COUNT {
            error!(
                "Classifier {} returned {} labels for {} cells",
                self.classifier.name(),
                classifications.len(),
                cells.len()
            );
            return Err(RecognitionError::ClassifierContractError {
                expected: SQUARE_COUNT,
                actual: classifications.len(),
            });
        }

        let labels: Vec<PieceLabel> = classifications.iter().map(|c| c.label).collect();
        let position = Position::from_labels(&labels, options.side_to_move, options.orientation)?;
        let result = RecognitionResult {
            fen: position.to_fen(),
            confidence: overall_confidence(&classifications),
        };
        debug!(fen = %result.fen, confidence = result.confidence, "Recognition complete");

        Ok((position, result))
    }

    fn save_debug<F>(&self, name: &str, save: F) -> Result<()>
    where
        F: FnOnce(&Path) -> image::ImageResult<()>,
    {
        let Some(debug) = &self.debug else {
            return Ok(());
        };
        let path = debug.output_dir.join(name);
        save(&path).map_err(|e| RecognitionError::DebugOutput(format!("{}: {}", path.display(), e)))
    }

    fn save_debug_cells(&self, cells: &[Cell]) -> Result<()> {
        if self.debug.is_none() {
            return Ok(());
        }
        for cell in cells {
            let name = format!("04_cells/{:02}.png", cell.index + 1);
            self.save_debug(&name, |path| {
                if let Some(dir) = path.parent() {
                    std::fs::create_dir_all(dir)?;
                }
                cell.image.save(path)
            })?;
        }
        debug!("Debug: saved {} cells", cells.len());
        Ok(())
    }
}

/// Decode raw image bytes into a 3-channel image
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    image::load_from_memory(bytes)
        .map(|img: DynamicImage| img.to_rgb8())
        .map_err(|e| RecognitionError::DecodeError(e.to_string()))
}

/// One-shot recognition with default configuration
pub fn recognize(
    bytes: &[u8],
    classifier: Arc<dyn PieceClassifier>,
    side_to_move: Side,
) -> Result<RecognitionResult> {
    Recognizer::new(classifier).recognize(bytes, RecognizeOptions::new(side_to_move))
}
