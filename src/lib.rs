pub mod classifier;
pub mod config;
pub mod detection;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod position;

pub use classifier::{Classification, EmptyBoardClassifier, PieceClassifier};
pub use config::{LocatorConfig, RecognizerConfig};
pub use detection::{BoardLocation, BoardLocator};
pub use error::{RecognitionError, Result};
pub use models::{Cell, Orientation, PieceLabel, Point2D, Quadrilateral, RecognitionResult, Side};
pub use pipeline::{RecognizeOptions, Recognizer, decode_image, recognize};
pub use position::{Position, Square, assemble};

#[cfg(feature = "server")]
pub mod server;
