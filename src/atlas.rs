//! Texture atlas packing.
//!
//! The atlas is textured onto the inside of a cylinder and viewed from
//! within. Layers are filled four to a row from the farthest plane upwards,
//! so the farthest plane sits bottom-left and the nearest four share the top
//! row, and every cell is mirrored horizontally.

use crate::error::{MciError, MciResult};
use ndarray::{s, Array3, ArrayView3};
use serde::Serialize;

pub const ATLAS_ROWS: usize = 8;
pub const ATLAS_COLS: usize = 4;

/// Where a layer lands in the atlas grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasCell {
	pub row: usize,
	pub col: usize,
	pub mirror: bool,
}

/// Grid placement of nearest-first `layer`.
///
/// Cells are filled in far-to-near order, `cols` to a row, starting from the
/// bottom row of the atlas.
pub fn atlas_cell(layer: usize, rows: usize, cols: usize) -> AtlasCell {
	debug_assert!(layer < rows * cols);
	let far_index = rows * cols - 1 - layer;
	AtlasCell {
		row: (rows - 1) - far_index / cols,
		col: far_index % cols,
		mirror: true,
	}
}

/// Orientation facts a renderer needs to sample the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AtlasLayout {
	pub rows: usize,
	pub cols: usize,
	/// Nearest planes occupy the top row, the farthest plane the bottom-left cell.
	pub nearest_at_top: bool,
	pub mirrored: bool,
}

impl Default for AtlasLayout {
	fn default() -> Self {
		Self {
			rows: ATLAS_ROWS,
			cols: ATLAS_COLS,
			nearest_at_top: true,
			mirrored: true,
		}
	}
}

/// Pack `(H, W, C)` layers into one `(rows * H, cols * W, C)` image.
pub fn build_atlas(layers: &[Array3<u8>], rows: usize, cols: usize) -> MciResult<Array3<u8>> {
	if layers.is_empty() || layers.len() != rows * cols {
		return Err(MciError::Shape {
			expected: format!("{} layers for a {}x{} atlas", rows * cols, rows, cols),
			actual: format!("{} layers", layers.len()),
		});
	}

	let (height, width, channels) = layers[0].dim();
	let mut atlas = Array3::<u8>::zeros((height * rows, width * cols, channels));

	for (n, layer) in layers.iter().enumerate() {
		if layer.dim() != (height, width, channels) {
			return Err(MciError::Shape {
				expected: format!("{:?}", (height, width, channels)),
				actual: format!("layer {}: {:?}", n, layer.dim()),
			});
		}

		let cell = atlas_cell(n, rows, cols);
		let mut dest = atlas.slice_mut(s![
			height * cell.row..height * (cell.row + 1),
			width * cell.col..width * (cell.col + 1),
			..
		]);

		if cell.mirror {
			dest.assign(&layer.slice(s![.., ..;-1, ..]));
		} else {
			dest.assign(layer);
		}
	}

	Ok(atlas)
}

/// Recover layer `n` from an atlas with `rows` x `cols` cells, undoing the
/// mirroring applied by [`build_atlas`].
pub fn extract_layer(atlas: ArrayView3<u8>, n: usize, rows: usize, cols: usize) -> Array3<u8> {
	let (atlas_height, atlas_width, _) = atlas.dim();
	let (height, width) = (atlas_height / rows, atlas_width / cols);

	let cell = atlas_cell(n, rows, cols);
	let tile = atlas.slice(s![
		height * cell.row..height * (cell.row + 1),
		width * cell.col..width * (cell.col + 1),
		..
	]);

	if cell.mirror {
		tile.slice(s![.., ..;-1, ..]).to_owned()
	} else {
		tile.to_owned()
	}
}
