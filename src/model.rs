use crate::error::{MciError, MciResult};
use ndarray::{Array4, ArrayView4, Axis};
use std::path::PathBuf;

/// Default file name of the exported single-view MPI network.
pub const DEFAULT_WEIGHTS: &str = "single_view_mpi.onnx";

/// An image-to-MPI network.
///
/// `infer` receives one padded RGB image with a leading batch axis,
/// `(1, H, W, 3)`, and returns the layer stack `(L, H, W, 4)` ordered from the
/// nearest plane to the farthest.
pub trait MpiInference {
	fn infer(&mut self, padded_rgb: ArrayView4<f32>) -> MciResult<Array4<f32>>;
}

impl<T: MpiInference + ?Sized> MpiInference for Box<T> {
	fn infer(&mut self, padded_rgb: ArrayView4<f32>) -> MciResult<Array4<f32>> {
		(**self).infer(padded_rgb)
	}
}

/// Turn a raw network output into a nearest-first layer stack.
///
/// `dims` is the output tensor shape, either `(1, L, H, W, C)` or
/// `(L, H, W, C)`, with `data` in row-major order. The network emits planes
/// back to front, so the plane axis is reversed.
pub fn planes_from_output(dims: &[usize], data: &[f32]) -> MciResult<Array4<f32>> {
	let planes = match dims {
		[1, l, h, w, c] | [l, h, w, c] => (*l, *h, *w, *c),
		_ => {
			return Err(MciError::Shape {
				expected: "(1, L, H, W, 4)".to_string(),
				actual: format!("{:?}", dims),
			})
		}
	};

	let mut layers = Array4::from_shape_vec(planes, data.to_vec()).map_err(|e| MciError::Shape {
		expected: format!("{:?}", planes),
		actual: e.to_string(),
	})?;
	layers.invert_axis(Axis(0));

	Ok(layers)
}

/// Locate `name` among the places weights are installed.
///
/// `$MCI_MAKER_WEIGHTS` wins when set; after it come the crate's own
/// `weights/` directory, `~/.mci-maker/weights`, the platform data directory
/// and finally `./weights`. The error lists every path tried.
pub fn find_weights(name: &str) -> MciResult<PathBuf> {
	let mut search_paths = Vec::new();

	if let Ok(env_dir) = std::env::var("MCI_MAKER_WEIGHTS") {
		search_paths.push(PathBuf::from(env_dir).join(name));
	}

	search_paths.extend([
		PathBuf::from(env!("CARGO_MANIFEST_DIR"))
			.join("weights")
			.join(name),
		dirs::home_dir()
			.unwrap_or_default()
			.join(".mci-maker")
			.join("weights")
			.join(name),
		dirs::data_dir()
			.unwrap_or_default()
			.join("mci-maker")
			.join("weights")
			.join(name),
		PathBuf::from("weights").join(name),
	]);

	if let Some(found) = search_paths.iter().find(|p| p.is_file()) {
		return Ok(found.clone());
	}

	Err(MciError::WeightsNotFound {
		name: name.to_string(),
		searched: search_paths
			.iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n"),
	})
}
