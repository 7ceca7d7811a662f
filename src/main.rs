use answer_quality_stats::settings::{DEFAULT_INTERVALS_PER_DECADE, DEFAULT_MAX_QUALITY};
use answer_quality_stats::{run, AnalysisSettings, RunOptions};
use argh::FromArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Analyzes how answer scores distribute across self-assessed quality levels
#[derive(FromArgs, Debug)]
pub struct Args {
    /// comma-separated file holding answer engagement data
    #[argh(option, short = 'a')]
    answers: PathBuf,

    /// whitespace-separated file holding answer quality ratings
    #[argh(option, short = 'q')]
    quality: PathBuf,

    /// directory for the report and charts (default: plots)
    #[argh(option, short = 'o', default = "PathBuf::from(\"plots\")")]
    output: PathBuf,

    /// highest quality level (default: 5)
    #[argh(option, default = "DEFAULT_MAX_QUALITY")]
    max_quality: u32,

    /// logarithmic bins per power of ten (default: 4)
    #[argh(option, default = "DEFAULT_INTERVALS_PER_DECADE")]
    intervals_per_decade: u32,

    /// chart width in pixels (default: 1200)
    #[argh(option)]
    width: Option<u32>,

    /// chart height in pixels (default: 800)
    #[argh(option)]
    height: Option<u32>,

    /// skip chart rendering
    #[argh(switch)]
    no_plots: bool,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,
}

/// Filter used when `RUST_LOG` is unset. Covers both the library and this
/// binary, which logs fatal errors under its own crate name.
fn default_filter_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!(
        "answer_quality_stats={level},{bin}={level}",
        bin = env!("CARGO_CRATE_NAME")
    )
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let mut settings = AnalysisSettings::new();
    settings.max_quality = args.max_quality;
    settings.intervals_per_decade = args.intervals_per_decade;
    if let Some(width) = args.width {
        settings.plot.width = width;
    }
    if let Some(height) = args.height {
        settings.plot.height = height;
    }

    let options = RunOptions {
        answers: args.answers,
        quality: args.quality,
        output_dir: args.output,
        render_plots: !args.no_plots,
        settings,
    };

    match run(&options) {
        Ok(results) => {
            for stats in &results.qualities {
                match stats.statistics.summary() {
                    Some(summary) => println!(
                        "Quality {}: {} answers, mean {:.2}, quartiles {:.2} / {:.2} / {:.2}",
                        stats.level,
                        stats.sample_count,
                        summary.mean,
                        summary.q1,
                        summary.median,
                        summary.q3
                    ),
                    None => println!("Quality {}: no data", stats.level),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
