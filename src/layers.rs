use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

/// Scale a `[0, 1]` sample to 8 bits, truncating.
#[inline]
pub fn to_u8(value: f32) -> u8 {
	(value * 255.0) as u8
}

/// Turn one RGBA layer `(H, W, 4)` into an output-ready BGRA buffer.
///
/// Colour is premultiplied by alpha in float precision before the 8-bit
/// conversion; doing it after truncation loses precision.
pub fn composite_layer(layer: ArrayView3<f32>) -> Array3<u8> {
	let (height, width, _) = layer.dim();

	let mut out = Array3::<u8>::zeros((height, width, 4));
	for ((y, x, c), value) in out.indexed_iter_mut() {
		let alpha = layer[[y, x, 3]];
		*value = match c {
			0 => to_u8(layer[[y, x, 2]] * alpha),
			1 => to_u8(layer[[y, x, 1]] * alpha),
			2 => to_u8(layer[[y, x, 0]] * alpha),
			_ => to_u8(alpha),
		};
	}

	out
}

/// `(H, W, 3)` RGB floats to 8-bit BGR.
pub fn rgb_to_bgr8(image: ArrayView3<f32>) -> Array3<u8> {
	let (height, width, _) = image.dim();
	Array3::from_shape_fn((height, width, 3), |(y, x, c)| to_u8(image[[y, x, 2 - c]]))
}

/// Single-channel floats to 8-bit gray.
pub fn gray8(map: ArrayView2<f32>) -> Array2<u8> {
	map.mapv(to_u8)
}
