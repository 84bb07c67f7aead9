use crate::error::{MciError, MciResult};
use crate::model::MpiInference;
use crate::pipeline::MciContext;
use std::path::{Path, PathBuf};

/// Input images for a run: `input` itself if it is a file, otherwise every
/// `*.png` directly inside it, sorted by path.
pub fn collect_inputs(input: &Path) -> MciResult<Vec<PathBuf>> {
	let metadata = std::fs::metadata(input).map_err(|e| MciError::io(input, e))?;
	if !metadata.is_dir() {
		return Ok(vec![input.to_path_buf()]);
	}

	let mut paths = Vec::new();
	for entry in std::fs::read_dir(input).map_err(|e| MciError::io(input, e))? {
		let path = entry.map_err(|e| MciError::io(input, e))?.path();
		if is_png(&path) && path.is_file() {
			paths.push(path);
		}
	}
	paths.sort();

	if paths.is_empty() {
		tracing::warn!("No *.png files found in {:?}", input);
	}

	Ok(paths)
}

fn is_png(path: &Path) -> bool {
	let hidden = path
		.file_name()
		.and_then(|n| n.to_str())
		.map_or(true, |n| n.starts_with('.'));
	!hidden && path.extension().and_then(|e| e.to_str()) == Some("png")
}

/// Name of the per-image output directory: the file name up to its first dot.
pub fn output_dir_name(path: &Path) -> String {
	let file_name = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();

	match file_name.split('.').next() {
		Some(stem) if !stem.is_empty() => stem.to_string(),
		_ => path
			.file_stem()
			.map(|s| s.to_string_lossy().into_owned())
			.unwrap_or_else(|| "output".to_string()),
	}
}

/// Process every input image in order. The first failure aborts the run.
///
/// Returns the per-image output directories that were written.
pub fn generate<M: MpiInference>(
	ctx: &mut MciContext<M>,
	input: &Path,
	output: &Path,
) -> MciResult<Vec<PathBuf>> {
	std::fs::create_dir_all(output).map_err(|e| MciError::io(output, e))?;

	let paths = collect_inputs(input)?;
	let mut written = Vec::with_capacity(paths.len());

	for path in paths {
		tracing::info!("Processing {:?}", path);

		let out_dir = output.join(output_dir_name(&path));
		tracing::debug!("Output directory {:?}", out_dir);

		ctx.process_image(&path, &out_dir)
			.map_err(|e| MciError::Pipeline {
				path: path.clone(),
				source: Box::new(e),
			})?;

		written.push(out_dir);
	}

	Ok(written)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_dir_strips_from_first_dot() {
		assert_eq!(output_dir_name(Path::new("/data/room.png")), "room");
		assert_eq!(output_dir_name(Path::new("pano.v2.png")), "pano");
		assert_eq!(output_dir_name(Path::new("noext")), "noext");
		assert_eq!(output_dir_name(Path::new("/x/.hidden.png")), ".hidden");
	}

	#[test]
	fn directory_inputs_are_sorted_pngs() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["b.png", "a.png", "c.jpg", "d.PNG", ".e.png"] {
			std::fs::write(dir.path().join(name), b"").unwrap();
		}
		std::fs::create_dir(dir.path().join("sub.png")).unwrap();

		let paths = collect_inputs(dir.path()).unwrap();
		let names: Vec<_> = paths
			.iter()
			.map(|p| p.file_name().unwrap().to_str().unwrap())
			.collect();
		assert_eq!(names, ["a.png", "b.png"]);
	}

	#[test]
	fn single_file_is_taken_as_is() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("scene.jpg");
		std::fs::write(&path, b"").unwrap();

		assert_eq!(collect_inputs(&path).unwrap(), vec![path]);
	}

	#[test]
	fn missing_input_is_io_error() {
		let err = collect_inputs(Path::new("/nonexistent/inputs")).unwrap_err();
		assert!(matches!(err, MciError::Io { .. }));
	}
}
