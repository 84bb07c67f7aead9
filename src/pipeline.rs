use crate::cylinder;
use crate::depth::{disparity_from_layers, DepthTable};
use crate::error::{MciError, MciResult};
use crate::image_loader::load_image;
use crate::model::MpiInference;
use crate::output::write_outputs;
use crate::MciConfig;
use ndarray::{Array4, ArrayView3, Axis};
use std::path::Path;

/// Everything shared across the images of one run: the loaded network, the
/// depth table and the output settings.
pub struct MciContext<M> {
	model: M,
	depths: DepthTable,
	config: MciConfig,
}

impl<M: MpiInference> MciContext<M> {
	pub fn new(model: M, config: MciConfig) -> MciResult<Self> {
		config.validate()?;
		Ok(Self {
			model,
			depths: DepthTable::standard(),
			config,
		})
	}

	pub fn model(&self) -> &M {
		&self.model
	}

	pub fn config(&self) -> &MciConfig {
		&self.config
	}

	pub fn depths(&self) -> &DepthTable {
		&self.depths
	}

	/// Run one image through the network and write its artifacts into `out_dir`.
	pub fn process_image(&mut self, input: &Path, out_dir: &Path) -> MciResult<()> {
		let input_rgb = load_image(input, self.config.width, self.config.height)?;
		let layers = self.infer_layers(input_rgb.view())?;
		let disparity = disparity_from_layers(layers.view(), &self.depths);

		write_outputs(
			out_dir,
			input_rgb.view(),
			layers.view(),
			disparity.view(),
			&self.depths,
			self.config.mode,
		)
	}

	/// Pad, infer and unpad: `(H, W, 3)` in, `(L, H, W, 4)` out.
	pub fn infer_layers(&mut self, input_rgb: ArrayView3<f32>) -> MciResult<Array4<f32>> {
		let (height, width, _) = input_rgb.dim();
		let (padded, padding) = cylinder::pad(input_rgb);
		let padded_width = padded.len_of(Axis(1));
		tracing::debug!("Cylindrical padding {} -> width {}", padding, padded_width);

		let layers_padded = self.model.infer(padded.view().insert_axis(Axis(0)))?;

		let expected = (self.depths.len(), height, padded_width, 4);
		if layers_padded.dim() != expected {
			return Err(MciError::Shape {
				expected: format!("{:?}", expected),
				actual: format!("{:?}", layers_padded.dim()),
			});
		}

		let layers = cylinder::unpad(layers_padded.view(), padding);
		debug_assert_eq!(layers.len_of(Axis(2)), width);
		Ok(layers)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::OutputMode;
	use ndarray::{s, Array3, ArrayView4};

	/// Returns `layers` copies of the padded input with an opaque alpha.
	struct Replicate {
		layers: usize,
	}

	impl MpiInference for Replicate {
		fn infer(&mut self, padded_rgb: ArrayView4<f32>) -> MciResult<Array4<f32>> {
			let (_, h, w, _) = padded_rgb.dim();
			Ok(Array4::from_shape_fn((self.layers, h, w, 4), |(_, y, x, c)| {
				if c == 3 {
					1.0
				} else {
					padded_rgb[[0, y, x, c]]
				}
			}))
		}
	}

	fn config() -> MciConfig {
		MciConfig {
			width: 8,
			height: 2,
			mode: OutputMode::Atlas,
		}
	}

	#[test]
	fn layers_come_back_unpadded() {
		let mut ctx = MciContext::new(Replicate { layers: 32 }, config()).unwrap();
		let input = Array3::from_shape_fn((2, 8, 3), |(y, x, c)| (y * 8 + x) as f32 / 16.0 + c as f32);

		assert_eq!(ctx.depths().len(), 32);
		assert_eq!(ctx.config().width, 8);

		let layers = ctx.infer_layers(input.view()).unwrap();
		assert_eq!(layers.dim(), (32, 2, 8, 4));
		assert_eq!(layers.slice(s![5, .., .., 0..3]), input.view());
	}

	#[test]
	fn wrong_layer_count_is_shape_error() {
		let mut ctx = MciContext::new(Replicate { layers: 16 }, config()).unwrap();
		let input = Array3::<f32>::zeros((2, 8, 3));

		let err = ctx.infer_layers(input.view()).unwrap_err();
		assert!(matches!(err, MciError::Shape { .. }));
	}

	#[test]
	fn invalid_config_is_rejected() {
		let bad = MciConfig {
			width: 0,
			..config()
		};
		assert!(matches!(
			MciContext::new(Replicate { layers: 32 }, bad),
			Err(MciError::Config(_))
		));
	}
}
