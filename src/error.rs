use std::path::PathBuf;
use thiserror::Error;

pub type MciResult<T> = Result<T, MciError>;

#[derive(Error, Debug)]
pub enum MciError {
	#[error("I/O error on {path:?}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Model weights '{name}' not found.\nSearched locations:\n{searched}")]
	WeightsNotFound { name: String, searched: String },

	#[error("Failed to decode image {path:?}: {source}")]
	Decode {
		path: PathBuf,
		#[source]
		source: image::ImageError,
	},

	#[error("Failed to encode image {path:?}: {source}")]
	Encode {
		path: PathBuf,
		#[source]
		source: image::ImageError,
	},

	#[error("Layer stack shape mismatch: expected {expected}, got {actual}")]
	Shape { expected: String, actual: String },

	#[error("Inference error: {0}")]
	Inference(String),

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Failed to write manifest {path:?}: {source}")]
	Manifest {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to process {path:?}")]
	Pipeline {
		path: PathBuf,
		#[source]
		source: Box<MciError>,
	},
}

impl MciError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		MciError::Io {
			path: path.into(),
			source,
		}
	}
}
