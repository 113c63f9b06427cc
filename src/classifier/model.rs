use std::path::Path;

use anyhow::Context;
use image::imageops::{self, FilterType};
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use tracing::debug;

use super::{Classification, PieceClassifier};
use crate::models::{Cell, PieceLabel};

/// Side length cells are resized to before inference
pub const MODEL_INPUT_SIZE: u32 = 64;

const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// 13-class piece classifier backed by an `.rten` model.
///
/// Expects NCHW float input normalised with ImageNet statistics and
/// returns `[batch, 13]` logits in `PieceLabel::ALL` order.
pub struct ModelClassifier {
    model: Model,
}

impl ModelClassifier {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let model = Model::load_file(path)
            .with_context(|| format!("Failed to load model weights from {}", path.display()))?;
        Ok(Self { model })
    }

    fn to_input(cells: &[Cell]) -> NdTensor<f32, 4> {
        let size = MODEL_INPUT_SIZE as usize;
        let mut input = NdTensor::zeros([cells.len(), 3, size, size]);
        for (i, cell) in cells.iter().enumerate() {
            let resized = imageops::resize(
                &cell.image,
                MODEL_INPUT_SIZE,
                MODEL_INPUT_SIZE,
                FilterType::Triangle,
            );
            for (x, y, pixel) in resized.enumerate_pixels() {
                for c in 0..3 {
                    let value = pixel[c] as f32 / 255.0;
                    input[[i, c, y as usize, x as usize]] = (value - MEAN[c]) / STD[c];
                }
            }
        }
        input
    }
}

impl PieceClassifier for ModelClassifier {
    fn classify(&self, cells: &[Cell]) -> anyhow::Result<Vec<Classification>> {
        if cells.is_empty() {
            return Ok(Vec::new());
        }

        let input = Self::to_input(cells);
        let logits: NdTensor<f32, 2> = self
            .model
            .run_one(input.view().into(), None)
            .context("Piece model inference failed")?
            .try_into()?;

        let [batch, classes] = logits.shape();
        debug!("Model returned {}x{} logits", batch, classes);
        if classes != PieceLabel::ALL.len() {
            anyhow::bail!(
                "Model outputs {} classes, expected {}",
                classes,
                PieceLabel::ALL.len()
            );
        }

        let mut out = Vec::with_capacity(batch);
        for i in 0..batch {
            let row: Vec<f32> = (0..classes).map(|c| logits[[i, c]]).collect();
            let (class, probability) = softmax_argmax(&row);
            let label = PieceLabel::from_class_index(class).unwrap_or(PieceLabel::Empty);
            out.push(Classification { label, probability });
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "Piece Model"
    }
}

/// Index of the largest logit and its softmax probability.
/// The probability is `None` when the logits are not finite.
fn softmax_argmax(logits: &[f32]) -> (usize, Option<f32>) {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let denom: f32 = logits.iter().map(|l| (l - max).exp()).sum();
    let (index, _) = logits
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap_or((PieceLabel::Empty.class_index(), &0.0));
    if !denom.is_finite() || denom <= 0.0 {
        return (index, None);
    }
    // exp(max - max) = 1
    (index, Some(1.0 / denom))
}
