use clap::{Parser, Subcommand};
use media_variants::generate::VariantGenerator;
use media_variants::imaging::probe;
use media_variants::records::JsonRecordFile;
use media_variants::regenerate::{self, RegenerateOptions};
use media_variants::store::{FsStore, ObjectStore};
use media_variants::{cleanup, config, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "media-variants")]
#[command(about = "Generate and publish resized image variants")]
#[command(long_about = "\
Generate and publish resized image variants

Every upload is decoded once and re-encoded in its own format at each size
of the catalog:

  thumbnail        400 x auto   preserve aspect
  thumbnail_small  200 x auto   preserve aspect
  webcomic_page    800 x auto   preserve aspect
  webcomic_mobile  400 x auto   preserve aspect
  cover_image      600 x 800    crop to fill
  social_preview  1200 x 630    crop to fill
  avatar           200 x 200    crop to fill

Variants land in the object store as {basename}-{variant}.{ext}. A variant
that fails is logged and left out; the rest are still published.

Set RUST_LOG (e.g. RUST_LOG=debug) to change log verbosity.
Run 'media-variants gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when absent)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Object store directory (overrides store.root)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store an image and generate its variants
    Generate {
        /// Image file to process
        file: PathBuf,
        /// Declared mimetype (advisory; guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Print the metadata map as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Regenerate variants for every record in a JSON records file
    Regenerate {
        /// JSON array of media records
        #[arg(long)]
        records: PathBuf,
        /// Also regenerate records that already have variants
        #[arg(long)]
        force: bool,
    },
    /// Delete a media record and all its stored variants
    Delete {
        /// JSON array of media records
        #[arg(long)]
        records: PathBuf,
        /// Record id
        id: String,
    },
    /// Report which codec backends are available
    Probe,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        command => run(command, &cli.config, cli.store.as_deref())?,
    }

    Ok(())
}

fn run(
    command: Command,
    config_path: &Path,
    store_override: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline_config = config::load_config(config_path)?;
    init_thread_pool(&pipeline_config.processing);
    let store_root = store_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&pipeline_config.store.root));

    match command {
        Command::Generate { file, mime, json } => {
            let codec = probe::select(pipeline_config.images.backend)?;
            let store = FsStore::open(&store_root)?;
            let bytes = std::fs::read(&file)?;
            let filename = file
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .ok_or("input path has no file name")?;
            let mime = mime.unwrap_or_else(|| guess_mime(&file).to_string());

            // The original is kept regardless of how variant generation goes
            store.put(&filename, &bytes, &mime)?;

            let generator = VariantGenerator::from_config(codec, &store, &pipeline_config);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if !json {
                        output::print_generate_event(&event);
                    }
                }
            });
            let result = generator.generate_with_events(&bytes, &filename, &mime, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;

            let sizes = result?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sizes)?);
            } else {
                output::print_metadata_map(&sizes);
            }
        }
        Command::Regenerate { records, force } => {
            let codec = probe::select(pipeline_config.images.backend)?;
            let store = FsStore::open(&store_root)?;
            let repo = JsonRecordFile::open(&records)?;
            let generator = VariantGenerator::from_config(codec, &store, &pipeline_config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_regenerate_event(&event);
                }
            });
            let result = regenerate::regenerate_all(
                &repo,
                &store,
                &generator,
                RegenerateOptions { force },
                Some(tx),
            );
            printer.join().map_err(|_| "output thread panicked")?;

            let summary = result?;
            output::print_summary(&summary);
            if summary.has_errors() {
                eprintln!("Some images failed to regenerate; see above for details.");
                std::process::exit(1);
            }
        }
        Command::Delete { records, id } => {
            let store = FsStore::open(&store_root)?;
            let repo = JsonRecordFile::open(&records)?;
            let report = cleanup::delete_record(&repo, &store, &id)?;
            output::print_cleanup_report(&id, &report);
        }
        Command::Probe => {
            let caps = probe::capabilities();
            let selected = match probe::select(pipeline_config.images.backend) {
                Ok(codec) => codec.name().to_string(),
                Err(e) => format!("none ({e})"),
            };
            output::print_capabilities(caps, &selected);
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for listings and `--json`.
///
/// Defaults to `info`; `RUST_LOG` overrides.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Declared mimetype from the file extension. Only advisory: the pipeline
/// sniffs the real format from the bytes.
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
