use anyhow::{Context, Result};
use clap::Parser;
use mci_maker::{generate, MciConfig, MciContext, OutputMode};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mci-maker")]
#[command(about = "Generate a multi-cylinder image from an input panorama")]
#[command(version)]
struct Cli {
	/// Input image or directory of PNG images
	#[arg(long)]
	input: PathBuf,

	/// Output image width (input is resized)
	#[arg(long)]
	width: u32,

	/// Output image height (input is resized)
	#[arg(long)]
	height: u32,

	/// Output directory
	#[arg(short, long)]
	output: PathBuf,

	/// Pack all layers into one texture atlas (default)
	#[arg(long, overrides_with = "no_atlas")]
	atlas: bool,

	/// Write one PNG per layer instead of an atlas
	#[arg(long, overrides_with = "atlas")]
	no_atlas: bool,

	/// Path to the ONNX model weights (searched for when omitted)
	#[arg(long)]
	model: Option<PathBuf>,

	/// Enable debug logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	let log_level = if cli.verbose { "debug" } else { "info" };
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| format!("mci_maker={log_level}").into()),
		)
		.with(tracing_subscriber::fmt::layer().with_target(false))
		.init();

	if let Err(err) = run(&cli) {
		tracing::error!("{err:#}");
		return ExitCode::FAILURE;
	}

	ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
	let config = MciConfig {
		width: cli.width,
		height: cli.height,
		mode: if cli.no_atlas && !cli.atlas {
			OutputMode::Layers
		} else {
			OutputMode::Atlas
		},
	};

	tracing::info!(
		"Output {}x{}, mode: {}",
		config.width,
		config.height,
		config.mode.name()
	);

	let model = load_model(cli.model.as_ref())?;
	let mut ctx = MciContext::new(model, config).context("Invalid configuration")?;

	let written = generate(&mut ctx, &cli.input, &cli.output)?;

	tracing::info!("✓ Wrote {} image(s) to {:?}", written.len(), cli.output);
	Ok(())
}

#[cfg(feature = "onnx")]
fn load_model(path: Option<&PathBuf>) -> Result<mci_maker::OnnxMpiModel> {
	let path = match path {
		Some(p) => p.clone(),
		None => mci_maker::model::find_weights(mci_maker::model::DEFAULT_WEIGHTS)?,
	};
	mci_maker::OnnxMpiModel::new(&path)
		.with_context(|| format!("Failed to load model weights {:?}", path))
}

#[cfg(not(feature = "onnx"))]
fn load_model(_path: Option<&PathBuf>) -> Result<Box<dyn mci_maker::MpiInference>> {
	anyhow::bail!("mci-maker was built without an inference backend; rebuild with --features onnx")
}
