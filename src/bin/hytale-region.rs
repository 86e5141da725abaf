use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use hytale_region::iterator::{ChunkResult, IterMode, RegionIterator};
use hytale_region::serialize::{chunk_to_json_with_blocks, summary_to_json};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[command(name = "hytale-region", about = "Decode Hytale region files to JSON")]
struct Args {
	/// A single `.region.bin` file, or a directory to walk for them.
	path: PathBuf,

	#[arg(short, long)]
	output: Option<PathBuf>,

	#[arg(long)]
	stdout: bool,

	#[arg(long)]
	compact: bool,

	#[arg(short, long)]
	quiet: bool,

	#[arg(short = 's', long = "summary-only")]
	summary_only: bool,

	#[arg(long = "no-blocks")]
	no_blocks: bool,
}

fn main() {
	let args = Args::parse();

	if !args.quiet {
		tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
	}

	let inputs = collect_inputs(&args.path);
	let mut had_fatal_error = false;

	for input in inputs {
		if let Err(error) = process_file(&input, &args) {
			tracing::error!(file = %input.display(), %error, "failed to decode region file");
			had_fatal_error = true;
		}
	}

	std::process::exit(if had_fatal_error { 1 } else { 0 });
}

fn collect_inputs(path: &Path) -> Vec<PathBuf> {
	if path.is_dir() {
		WalkDir::new(path)
			.into_iter()
			.filter_map(|entry| entry.ok())
			.map(|entry| entry.into_path())
			.filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(".region.bin")))
			.collect()
	} else {
		vec![path.to_path_buf()]
	}
}

fn process_file(path: &Path, args: &Args) -> hytale_region::Result<()> {
	if !args.quiet {
		tracing::info!(file = %path.display(), "decoding region file");
	}

	let mut iterator = RegionIterator::open(path, IterMode::Lenient)?;

	let value = if args.summary_only {
		summary_to_json(&iterator.summary()?)
	} else {
		let mut chunks = Vec::new();
		while let Some(result) = iterator.next() {
			match result? {
				ChunkResult::Ok(chunk) => {
					chunks.push(chunk_to_json_with_blocks(&chunk, !args.no_blocks))
				}
				ChunkResult::Failed(failed) => {
					if !args.quiet {
						tracing::warn!(
							file = %path.display(),
							slot = failed.slot_index,
							error = %failed.error,
							"skipping chunk"
						);
					}
				}
			}
		}
		serde_json::json!({
			"summary": summary_to_json(&iterator.summary()?),
			"chunks": chunks,
		})
	};

	let rendered = if args.compact {
		serde_json::to_string(&value)
	} else {
		serde_json::to_string_pretty(&value)
	}
	.expect("Value serialization never fails");

	if args.stdout {
		println!("{rendered}");
	} else {
		let output_path = args.output.clone().unwrap_or_else(|| path.with_extension("json"));
		fs::write(&output_path, rendered).map_err(|e| {
			hytale_region::Error::at_path(hytale_region::ErrorKind::Io(e), output_path.clone())
		})?;
	}

	Ok(())
}
