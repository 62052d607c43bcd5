use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use texprep::config::{self, Settings};
use texprep::imaging::OutputFormat;
use texprep::output;
use texprep::process::{self, BatchOptions, BatchSummary, CancelToken};
use texprep::scan::{ScannedFile, Scanner};
use texprep::source::InputItem;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "texprep")]
#[command(about = "Resize images to texture-friendly dimensions (multiples of 4)")]
#[command(long_about = "\
Resize images to texture-friendly dimensions (multiples of 4)

Every output side is rounded to the nearest multiple of 4, never moving more
than 4 pixels, and optionally capped first. Files are renamed to a safe ASCII
form with a suffix:

  art/Ảnh đẹp quá.png  (1023x767)  ->  output/Anh_dep_qua_u.png  (1024x768)

Directories given as inputs are scanned recursively for png, jpg, jpeg, psd,
pdf and ai files (configurable). Settings are read from ./texprep.toml when
present; command-line flags override them.

Run 'texprep gen-config' to generate a documented texprep.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Settings file (default: ./texprep.toml when it exists)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize and rename images into the output directory
    Process(ProcessArgs),
    /// List the files a process run would pick up from these directories
    Scan {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },
    /// Print a stock texprep.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ProcessArgs {
    /// Image files or directories to scan
    #[arg(required_unless_present = "stdin_name")]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Suffix appended to each output stem
    #[arg(long)]
    suffix: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Cap the output width before rounding
    #[arg(long)]
    max_width: Option<u32>,

    /// Cap the output height before rounding
    #[arg(long)]
    max_height: Option<u32>,

    /// Preserve the aspect ratio when capping and after rounding
    #[arg(long, conflicts_with = "stretch")]
    keep_aspect: bool,

    /// Round each side independently
    #[arg(long)]
    stretch: bool,

    /// Keep up to N decoded images in memory (0 = off)
    #[arg(long, value_name = "N")]
    cache: Option<usize>,

    /// Also read one image from stdin, named NAME (e.g. drop.png)
    #[arg(long, value_name = "NAME")]
    stdin_name: Option<String>,

    /// Write the full batch report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

impl ProcessArgs {
    /// Apply command-line overrides on top of file settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(output) = &self.output {
            settings.output_dir = output.clone();
        }
        if let Some(suffix) = &self.suffix {
            settings.suffix = suffix.clone();
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(quality) = self.quality {
            settings.quality = quality;
        }
        if let Some(max_width) = self.max_width {
            settings.resize.max_width = Some(max_width);
        }
        if let Some(max_height) = self.max_height {
            settings.resize.max_height = Some(max_height);
        }
        if self.keep_aspect {
            settings.resize.preserve_aspect_ratio = Some(true);
        }
        if self.stretch {
            settings.resize.preserve_aspect_ratio = Some(false);
        }
        if let Some(cache) = self.cache {
            settings.cache.capacity = cache;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config_file = cli.config.as_deref();

    match cli.command {
        Command::Process(args) => {
            let mut settings = config::load_config(config_file, &cwd)?;
            args.apply(&mut settings);
            settings.validate()?;

            let mut items = collect_inputs(&args.inputs, &settings);
            if let Some(name) = &args.stdin_name {
                let mut bytes = Vec::new();
                std::io::stdin().read_to_end(&mut bytes)?;
                items.push(InputItem::buffer(name.clone(), bytes));
            }

            let options = BatchOptions::from_settings(&settings);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process(
                &items,
                &options,
                settings.cache.capacity,
                &CancelToken::new(),
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let report = match result {
                Ok(report) => report,
                Err(err) => {
                    if let Some(path) = &args.report {
                        let summary = BatchSummary::aborted(items.len());
                        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
                    }
                    return Err(err.into());
                }
            };

            output::print_summary(&report);
            if let Some(path) = &args.report {
                std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
            }
            if report.has_failures() || report.cancelled {
                std::process::exit(1);
            }
        }
        Command::Scan { dirs } => {
            let settings = config::load_config(config_file, &cwd)?;
            for dir in &dirs {
                let scanner = scanner_for(dir, &settings);
                let files: Vec<ScannedFile> = scanner.readable_files().collect();
                output::print_scan_output(dir, &files);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn scanner_for(dir: &Path, settings: &Settings) -> Scanner {
    Scanner::new(dir)
        .with_extensions(settings.scan.extensions.as_slice())
        .excluding(&settings.output_dir)
}

/// Expand directories into the files they contain; files pass through.
fn collect_inputs(inputs: &[PathBuf], settings: &Settings) -> Vec<InputItem> {
    let mut items = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            items.push(InputItem::path(input));
            continue;
        }
        items.extend(
            scanner_for(input, settings)
                .readable_files()
                .map(ScannedFile::into_input),
        );
    }
    items
}
