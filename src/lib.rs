//! Turn a single panorama into a multi-cylinder image (MCI): a stack of
//! premultiplied RGBA layers at increasing depth, written either as one PNG
//! per layer or as a packed texture atlas.
//!
//! The image-to-layers network sits behind [`MpiInference`]; everything around
//! it (resizing, cylindrical padding, disparity, compositing and packing) is
//! deterministic.

pub mod atlas;
pub mod batch;
pub mod cylinder;
pub mod depth;
pub mod error;
pub mod image_loader;
pub mod layers;
pub mod model;
pub mod output;
pub mod pipeline;

#[cfg(feature = "onnx")]
pub mod mpi_onnx;

pub use batch::generate;
pub use depth::DepthTable;
pub use error::{MciError, MciResult};
pub use model::MpiInference;
pub use output::OutputMode;
pub use pipeline::MciContext;

#[cfg(feature = "onnx")]
pub use mpi_onnx::OnnxMpiModel;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MciConfig {
	/// Output width in pixels; inputs are resized to this.
	pub width: u32,
	/// Output height in pixels.
	pub height: u32,
	#[serde(default)]
	pub mode: OutputMode,
}

impl MciConfig {
	pub fn validate(&self) -> MciResult<()> {
		if self.width == 0 || self.height == 0 {
			return Err(MciError::Config(format!(
				"output size must be positive, got {}x{}",
				self.width, self.height
			)));
		}
		Ok(())
	}
}
