use image::RgbImage;
use image::imageops;

use crate::models::Cell;

pub const GRID_SIZE: u32 = 8;

/// Pixels trimmed from every side of a `block`-sized cell
pub fn cell_margin(block: u32, divisor: u32) -> u32 {
    (block / divisor.max(1)).max(1)
}

/// Split a square board image into 64 cells in row-major order, trimming a
/// margin from each block so grid lines shared with neighbours are dropped.
pub fn slice_board(board: &RgbImage, margin_divisor: u32) -> Vec<Cell> {
    let block_w = board.width() / GRID_SIZE;
    let block_h = board.height() / GRID_SIZE;
    let margin_x = cell_margin(block_w, margin_divisor);
    let margin_y = cell_margin(block_h, margin_divisor);
    let content_w = block_w.saturating_sub(2 * margin_x);
    let content_h = block_h.saturating_sub(2 * margin_y);

    let mut cells = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let x = col * block_w + margin_x;
            let y = row * block_h + margin_y;
            let image = imageops::crop_imm(board, x, y, content_w, content_h).to_image();
            cells.push(Cell {
                index: (row * GRID_SIZE + col) as usize,
                row,
                col,
                x,
                y,
                image,
            });
        }
    }
    cells
}
