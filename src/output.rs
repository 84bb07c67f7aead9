use crate::atlas::{build_atlas, AtlasLayout};
use crate::depth::DepthTable;
use crate::error::{MciError, MciResult};
use crate::layers::{composite_layer, gray8, rgb_to_bgr8};
use image::{GrayImage, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, ArrayView4, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const INPUT_FILE: &str = "input.png";
pub const DISPARITY_FILE: &str = "disparity_map.png";
pub const ATLAS_FILE: &str = "atlas.png";
pub const LAYERS_DIR: &str = "layers";
pub const MANIFEST_FILE: &str = "mci.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
	/// All layers packed into one texture atlas.
	#[default]
	Atlas,
	/// One PNG per layer under `layers/`.
	Layers,
}

impl OutputMode {
	pub fn name(&self) -> &'static str {
		match self {
			OutputMode::Atlas => "atlas",
			OutputMode::Layers => "layers",
		}
	}
}

pub fn layer_file_name(n: usize) -> String {
	format!("layer_{}.png", n)
}

/// Written next to the images so renderers know where each layer sits.
#[derive(Debug, Serialize)]
struct Manifest<'a> {
	width: usize,
	height: usize,
	num_layers: usize,
	depths: &'a DepthTable,
	mode: OutputMode,
	#[serde(skip_serializing_if = "Option::is_none")]
	atlas: Option<AtlasLayout>,
}

/// Write every artifact for one image into `dir`.
///
/// `input_rgb` is the resized `(H, W, 3)` input, `layers` the unpadded
/// `(L, H, W, 4)` stack, `disparity` the `(H, W)` disparity map.
pub fn write_outputs(
	dir: &Path,
	input_rgb: ArrayView3<f32>,
	layers: ArrayView4<f32>,
	disparity: ArrayView2<f32>,
	depths: &DepthTable,
	mode: OutputMode,
) -> MciResult<()> {
	std::fs::create_dir_all(dir).map_err(|e| MciError::io(dir, e))?;

	write_bgr_png(&dir.join(INPUT_FILE), &rgb_to_bgr8(input_rgb))?;
	write_gray_png(&dir.join(DISPARITY_FILE), &gray8(disparity))?;

	let composited: Vec<Array3<u8>> = layers
		.axis_iter(Axis(0))
		.map(composite_layer)
		.collect();

	let atlas_layout = match mode {
		OutputMode::Layers => {
			save_layers(&dir.join(LAYERS_DIR), &composited)?;
			None
		}
		OutputMode::Atlas => {
			let layout = AtlasLayout::default();
			let atlas = build_atlas(&composited, layout.rows, layout.cols)?;
			write_bgra_png(&dir.join(ATLAS_FILE), &atlas)?;
			Some(layout)
		}
	};

	let (height, width, _) = input_rgb.dim();
	let manifest = Manifest {
		width,
		height,
		num_layers: composited.len(),
		depths,
		mode,
		atlas: atlas_layout,
	};
	write_manifest(&dir.join(MANIFEST_FILE), &manifest)
}

fn save_layers(layers_dir: &Path, composited: &[Array3<u8>]) -> MciResult<()> {
	std::fs::create_dir_all(layers_dir).map_err(|e| MciError::io(layers_dir, e))?;

	for (n, layer) in composited.iter().enumerate() {
		write_bgra_png(&layers_dir.join(layer_file_name(n)), layer)?;
	}

	Ok(())
}

fn write_manifest(path: &Path, manifest: &Manifest<'_>) -> MciResult<()> {
	let file = std::fs::File::create(path).map_err(|e| MciError::io(path, e))?;
	serde_json::to_writer_pretty(std::io::BufWriter::new(file), manifest).map_err(|source| {
		MciError::Manifest {
			path: path.to_path_buf(),
			source,
		}
	})
}

/// Save an `(H, W, 3)` BGR buffer as PNG.
pub fn write_bgr_png(path: &Path, bgr: &Array3<u8>) -> MciResult<()> {
	let (height, width, _) = bgr.dim();
	let img: RgbImage = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
		let (x, y) = (x as usize, y as usize);
		Rgb([bgr[[y, x, 2]], bgr[[y, x, 1]], bgr[[y, x, 0]]])
	});
	save_image(&img, path)
}

/// Save an `(H, W, 4)` BGRA buffer as PNG.
pub fn write_bgra_png(path: &Path, bgra: &Array3<u8>) -> MciResult<()> {
	let (height, width, _) = bgra.dim();
	let img: RgbaImage = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
		let (x, y) = (x as usize, y as usize);
		Rgba([bgra[[y, x, 2]], bgra[[y, x, 1]], bgra[[y, x, 0]], bgra[[y, x, 3]]])
	});
	save_image(&img, path)
}

/// Save an `(H, W)` 8-bit buffer as grayscale PNG.
pub fn write_gray_png(path: &Path, gray: &Array2<u8>) -> MciResult<()> {
	let (height, width) = gray.dim();
	let img = GrayImage::from_fn(width as u32, height as u32, |x, y| {
		image::Luma([gray[[y as usize, x as usize]]])
	});
	save_image(&img, path)
}

fn save_image<P>(img: &ImageBuffer<P, Vec<u8>>, path: &Path) -> MciResult<()>
where
	P: image::PixelWithColorType<Subpixel = u8>,
{
	img.save_with_format(path, image::ImageFormat::Png)
		.map_err(|source| MciError::Encode {
			path: path.to_path_buf(),
			source,
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bgr_buffer_round_trips_through_png() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bgr.png");
		let bgr = Array3::from_shape_fn((2, 3, 3), |(_, _, c)| [10u8, 20, 30][c]);

		write_bgr_png(&path, &bgr).unwrap();

		let img = image::open(&path).unwrap().to_rgb8();
		assert_eq!(img.dimensions(), (3, 2));
		assert_eq!(img.get_pixel(1, 1).0, [30, 20, 10]);
	}

	#[test]
	fn bgra_buffer_keeps_alpha() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bgra.png");
		let bgra = Array3::from_shape_fn((1, 2, 4), |(_, _, c)| [1u8, 2, 3, 128][c]);

		write_bgra_png(&path, &bgra).unwrap();

		let img = image::open(&path).unwrap().to_rgba8();
		assert_eq!(img.get_pixel(0, 0).0, [3, 2, 1, 128]);
	}

	#[test]
	fn unwritable_path_is_encode_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing").join("gray.png");
		let err = write_gray_png(&path, &Array2::zeros((2, 2))).unwrap_err();
		assert!(matches!(err, MciError::Encode { .. }));
	}

	#[test]
	fn layer_files_are_numbered() {
		assert_eq!(layer_file_name(0), "layer_0.png");
		assert_eq!(layer_file_name(31), "layer_31.png");
	}

	#[test]
	fn mode_serializes_lowercase() {
		assert_eq!(serde_json::to_string(&OutputMode::Atlas).unwrap(), "\"atlas\"");
		assert_eq!(OutputMode::default(), OutputMode::Atlas);
		assert_eq!(OutputMode::Layers.name(), "layers");
	}
}
