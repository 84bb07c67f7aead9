//! Cylindrical wrap padding around the network call.
//!
//! The network has no notion of a 360 degree panorama, so a quarter of the
//! image width is wrapped from each edge onto the opposite side before
//! inference and cropped off the layers afterwards.

use ndarray::{s, Array3, Array4, ArrayView3, ArrayView4, Axis};

/// Number of columns wrapped onto each side of an image `width` wide.
pub fn wrap_padding(width: usize) -> usize {
	width / 4
}

/// Pad an `(H, W, C)` image to `(H, W + 2 * padding, C)` as
/// `[right strip, image, left strip]`. Returns the padded image and the padding.
pub fn pad(image: ArrayView3<f32>) -> (Array3<f32>, usize) {
	let (height, width, channels) = image.dim();
	let padding = wrap_padding(width);

	let mut padded = Array3::<f32>::zeros((height, width + 2 * padding, channels));
	padded
		.slice_mut(s![.., 0..padding, ..])
		.assign(&image.slice(s![.., width - padding..width, ..]));
	padded
		.slice_mut(s![.., padding..padding + width, ..])
		.assign(&image);
	padded
		.slice_mut(s![.., padding + width.., ..])
		.assign(&image.slice(s![.., 0..padding, ..]));

	(padded, padding)
}

/// Crop `padding` columns off both sides of a padded layer stack `(L, H, Wp, C)`.
pub fn unpad(layers: ArrayView4<f32>, padding: usize) -> Array4<f32> {
	let padded_width = layers.len_of(Axis(2));
	let width = padded_width.saturating_sub(2 * padding);
	layers
		.slice(s![.., .., padding..padding + width, ..])
		.to_owned()
}
