#[cfg(feature = "model")]
pub mod model;

use crate::models::{Cell, PieceLabel};

/// Confidence reported when the classifier gives no per-cell probabilities
pub const PLACEHOLDER_CONFIDENCE: f32 = 0.85;

/// Label for one cell, with the classifier's probability when it has one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: PieceLabel,
    pub probability: Option<f32>,
}

impl Classification {
    pub fn new(label: PieceLabel) -> Self {
        Self {
            label,
            probability: None,
        }
    }
}

/// Maps cell images to piece labels.
///
/// Implementations are shared across concurrent requests and must return
/// one classification per input cell, in input order.
pub trait PieceClassifier: Send + Sync {
    fn classify(&self, cells: &[Cell]) -> anyhow::Result<Vec<Classification>>;

    /// Human-readable name for logs
    fn name(&self) -> &str;
}

/// Labels every cell as empty. Used when no model weights are available.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBoardClassifier;

impl PieceClassifier for EmptyBoardClassifier {
    fn classify(&self, cells: &[Cell]) -> anyhow::Result<Vec<Classification>> {
        Ok(cells
            .iter()
            .map(|_| Classification::new(PieceLabel::Empty))
            .collect())
    }

    fn name(&self) -> &str {
        "Empty Board"
    }
}

/// Mean per-cell probability, or the placeholder when any cell lacks a
/// finite one
pub fn overall_confidence(classifications: &[Classification]) -> f32 {
    if classifications.is_empty() {
        return PLACEHOLDER_CONFIDENCE;
    }
    let probabilities: Option<Vec<f32>> = classifications
        .iter()
        .map(|c| c.probability.filter(|p| p.is_finite()))
        .collect();
    match probabilities {
        Some(p) => p.iter().sum::<f32>() / p.len() as f32,
        None => PLACEHOLDER_CONFIDENCE,
    }
}
