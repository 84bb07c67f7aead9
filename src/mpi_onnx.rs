use crate::error::{MciError, MciResult};
use crate::model::{planes_from_output, MpiInference};
use ndarray::{Array4, ArrayView4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::path::Path;

/// Single-view MPI network exported to ONNX.
///
/// The exported graph takes an NHWC float image in `[0, 1]` and emits
/// `(1, L, H, W, 4)` RGBA planes ordered back to front; planes are flipped to
/// nearest-first before they leave this adapter.
pub struct OnnxMpiModel {
	session: Session,
}

impl OnnxMpiModel {
	pub fn new(model_path: impl AsRef<Path>) -> MciResult<Self> {
		let model_path = model_path.as_ref();
		if !model_path.is_file() {
			return Err(MciError::io(
				model_path,
				std::io::Error::new(std::io::ErrorKind::NotFound, "model weights not found"),
			));
		}

		let session = Session::builder()
			.map_err(|e| MciError::Inference(format!("Failed to create session: {}", e)))?
			.with_optimization_level(GraphOptimizationLevel::Level3)
			.map_err(|e| MciError::Inference(format!("Failed to set opt level: {}", e)))?
			.commit_from_file(model_path)
			.map_err(|e| {
				MciError::Inference(format!("Failed to load ONNX model {:?}: {}", model_path, e))
			})?;

		tracing::info!("Loaded MPI model: {:?}", model_path);

		Ok(Self { session })
	}
}

impl MpiInference for OnnxMpiModel {
	fn infer(&mut self, padded_rgb: ArrayView4<f32>) -> MciResult<Array4<f32>> {
		let (batch, height, width, channels) = padded_rgb.dim();
		let input_data: Vec<f32> = padded_rgb.iter().copied().collect();

		let input_value =
			ort::value::Value::from_array(([batch, height, width, channels], input_data))
				.map_err(|e| MciError::Inference(format!("Failed to create input: {}", e)))?;

		let outputs = self
			.session
			.run(ort::inputs![input_value])
			.map_err(|e| MciError::Inference(format!("Inference failed: {}", e)))?;

		let (shape, data) = outputs[0]
			.try_extract_tensor::<f32>()
			.map_err(|e| MciError::Inference(format!("Failed to extract output: {}", e)))?;

		let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
		planes_from_output(&dims, data)
	}
}
