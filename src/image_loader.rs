use crate::error::{MciError, MciResult};
use image::DynamicImage;
use ndarray::{Array3, ArrayView3, Axis};
use std::path::Path;

/// Load an image as an `(H, W, 3)` float tensor in `[0, 1]`, resized to
/// `width` x `height` with area averaging.
pub fn load_image(path: impl AsRef<Path>, width: u32, height: u32) -> MciResult<Array3<f32>> {
	let path = path.as_ref();

	let bytes = std::fs::read(path).map_err(|e| MciError::io(path, e))?;
	let img = image::load_from_memory(&bytes).map_err(|source| MciError::Decode {
		path: path.to_path_buf(),
		source,
	})?;

	tracing::debug!(
		"Decoded {:?}: {}x{} -> {}x{}",
		path,
		img.width(),
		img.height(),
		width,
		height
	);

	let rgb = image_to_tensor(&img);
	Ok(resize_area(rgb.view(), height as usize, width as usize))
}

fn image_to_tensor(img: &DynamicImage) -> Array3<f32> {
	let rgb = img.to_rgb32f();
	let (width, height) = rgb.dimensions();
	Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
		rgb.get_pixel(x as u32, y as u32)[c]
	})
}

/// Area-averaging resize of an `(H, W, C)` tensor.
///
/// Every output pixel is the mean of the source region it covers, with
/// partially covered source pixels weighted by their overlap.
pub fn resize_area(src: ArrayView3<f32>, out_height: usize, out_width: usize) -> Array3<f32> {
	let (in_height, in_width, channels) = src.dim();

	let x_weights = area_weights(in_width, out_width);
	let mut horizontal = Array3::<f32>::zeros((in_height, out_width, channels));
	for (x, taps) in x_weights.iter().enumerate() {
		let mut column = horizontal.index_axis_mut(Axis(1), x);
		for &(sx, w) in taps {
			column.scaled_add(w, &src.index_axis(Axis(1), sx));
		}
	}

	let y_weights = area_weights(in_height, out_height);
	let mut out = Array3::<f32>::zeros((out_height, out_width, channels));
	for (y, taps) in y_weights.iter().enumerate() {
		let mut row = out.index_axis_mut(Axis(0), y);
		for &(sy, w) in taps {
			row.scaled_add(w, &horizontal.index_axis(Axis(0), sy));
		}
	}

	out
}

/// Source taps and normalised weights for each output position along one axis.
fn area_weights(in_len: usize, out_len: usize) -> Vec<Vec<(usize, f32)>> {
	if in_len == 0 {
		return vec![Vec::new(); out_len];
	}

	let scale = in_len as f64 / out_len as f64;
	(0..out_len)
		.map(|o| {
			let start = o as f64 * scale;
			let end = (o + 1) as f64 * scale;
			let first = start.floor() as usize;
			let last = (end.ceil() as usize).min(in_len);

			(first..last)
				.filter_map(|i| {
					let overlap = end.min((i + 1) as f64) - start.max(i as f64);
					(overlap > 0.0).then(|| (i, (overlap / scale) as f32))
				})
				.collect()
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identity_resize_is_exact() {
		let src = Array3::from_shape_fn((3, 5, 3), |(y, x, c)| (y * 15 + x * 3 + c) as f32 / 45.0);
		let out = resize_area(src.view(), 3, 5);
		assert_eq!(out, src);
	}

	#[test]
	fn halving_averages_blocks() {
		let mut src = Array3::<f32>::zeros((2, 4, 1));
		src[[0, 0, 0]] = 1.0;
		src[[1, 1, 0]] = 1.0;
		src[[0, 2, 0]] = 0.5;

		let out = resize_area(src.view(), 1, 2);
		assert_eq!(out.dim(), (1, 2, 1));
		assert!((out[[0, 0, 0]] - 0.5).abs() < 1e-6);
		assert!((out[[0, 1, 0]] - 0.125).abs() < 1e-6);
	}

	#[test]
	fn fractional_overlap_is_weighted() {
		let src = Array3::from_shape_vec((1, 3, 1), vec![0.0, 1.0, 0.0]).unwrap();
		let out = resize_area(src.view(), 1, 2);
		// Each output covers 1.5 source pixels: one full, one half.
		assert!((out[[0, 0, 0]] - 1.0 / 3.0).abs() < 1e-6);
		assert!((out[[0, 1, 0]] - 1.0 / 3.0).abs() < 1e-6);
	}

	#[test]
	fn missing_file_is_io_error() {
		let err = load_image("/nonexistent/panorama.png", 8, 4).unwrap_err();
		assert!(matches!(err, MciError::Io { .. }));
	}

	#[test]
	fn garbage_file_is_decode_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("broken.png");
		std::fs::write(&path, b"definitely not a png").unwrap();

		let err = load_image(&path, 8, 4).unwrap_err();
		assert!(matches!(err, MciError::Decode { .. }));
	}

	#[test]
	fn loads_and_resizes_png() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("pano.png");
		image::RgbImage::from_pixel(16, 8, image::Rgb([255, 0, 51]))
			.save(&path)
			.unwrap();

		let tensor = load_image(&path, 8, 4).unwrap();
		assert_eq!(tensor.dim(), (4, 8, 3));
		assert!(tensor.index_axis(Axis(2), 0).iter().all(|&v| (v - 1.0).abs() < 1e-6));
		assert!(tensor.index_axis(Axis(2), 1).iter().all(|&v| v.abs() < 1e-6));
		assert!(tensor.index_axis(Axis(2), 2).iter().all(|&v| (v - 0.2).abs() < 1e-6));
	}
}
