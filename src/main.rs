use clap::{Parser, Subcommand};
use squeezepic::{config, output, process};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "squeezepic")]
#[command(about = "Squeeze profile pictures into WebP files that fit a size budget")]
#[command(long_about = "\
Squeeze profile pictures into WebP files that fit a size budget

Each JPEG or PNG is resized to a fixed width and re-encoded as WebP,
starting at quality 0.60 and stepping down by 0.05 until the file fits
the budget (50 KB by default). If nothing fits before the quality floor,
the last attempt is kept and reported as over budget.

Directories are searched recursively for images. Files given explicitly
are always attempted, so unsupported formats are reported, not skipped.

Run 'squeezepic gen-config' to generate a documented squeezepic.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress images into WebP files under the size budget
    Compress {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(long, short, default_value = "compressed")]
        output: PathBuf,

        /// Directory for intermediate attempts (removed afterwards)
        #[arg(long, default_value = ".squeezepic-temp")]
        temp_dir: PathBuf,

        /// Override the size budget, in KB
        #[arg(long)]
        budget_kb: Option<u64>,

        /// Override the output width, in pixels
        #[arg(long)]
        width: Option<u32>,
    },
    /// Report which inputs are accepted, without encoding anything
    Check {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock squeezepic.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Compress {
            inputs,
            output: output_dir,
            temp_dir,
            budget_kb,
            width,
        } => {
            let overrides = config::Overrides {
                target_width: width,
                size_budget_kb: budget_kb,
            };
            let settings = config::load_config_with_overrides(&cli.config, &overrides)?;
            init_thread_pool(&settings.processing);
            let compress_config = settings.compression.to_compress_config();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = process::process(
                &inputs,
                &output_dir,
                &temp_dir,
                &compress_config,
                Some(tx),
            );
            // The sender is gone either way, so the printer drains and exits.
            printer.join().ok();
            let report = report?;

            let report_path = process::write_report(&report, &output_dir)?;
            output::print_summary(&report.summary(), report.budget);
            println!("Report: {}", report_path.display());
            if let Some(e) = &report.cleanup_error {
                eprintln!("Warning: could not remove {}: {}", temp_dir.display(), e);
            }
        }
        Command::Check { inputs } => {
            let checked = process::check_inputs(&inputs)?;
            output::print_check_output(&checked);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
