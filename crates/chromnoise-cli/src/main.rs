mod data_file;

use std::path::PathBuf;

use chromnoise::{NoiseEstimator, WindowSpec, DEFAULT_WINDOW_COUNT};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_file::{read_signal, save_data, SaveOptions};

#[derive(Parser, Debug)]
#[command(
    name = "chromnoise",
    about = "Estimate the baseline noise of an intensity trace"
)]
struct Args {
    /// Signal file: one intensity column, or time (seconds) and intensity columns.
    input: PathBuf,

    /// Window width as a point count ("256") or a duration ("5s", "1.5m", "500ms").
    #[arg(short, long, default_value = "256")]
    window: WindowSpec,

    /// Number of random window draws.
    #[arg(short = 'n', long, default_value_t = DEFAULT_WINDOW_COUNT)]
    windows: usize,

    /// Seed for reproducible window placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Also save the estimate to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Digits after the decimal point in printed and saved values.
    #[arg(long, default_value_t = 6)]
    precision: usize,

    /// Text written at the start of each saved line.
    #[arg(long, default_value = "")]
    prepend: String,

    /// Separator between saved values.
    #[arg(long, default_value = " ")]
    sep: String,

    /// Gzip the saved file.
    #[arg(long)]
    gzip: bool,

    /// Log every improvement of the estimate.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let signal = read_signal(&args.input)?;
    let mut builder = NoiseEstimator::builder()
        .window(args.window)
        .window_count(args.windows);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let report = builder.build().estimate(&signal)?;

    info!(
        points = signal.len(),
        window = %args.window,
        window_points = report.window_points,
        draws = report.draws,
        windows_scored = report.windows_scored,
        best_offset = ?report.best_offset,
        exhausted = report.exhausted,
        "noise level {:.*}",
        args.precision,
        report.level
    );
    println!("{:.*}", args.precision, report.level);

    if let Some(path) = &args.output {
        let opts = SaveOptions {
            precision: args.precision,
            prepend: args.prepend.clone(),
            sep: args.sep.clone(),
            compressed: args.gzip,
        };
        let row = vec![
            report.level,
            report.window_points as f64,
            report.windows_scored as f64,
            report.draws as f64,
        ];
        let written = save_data(path, &[row], &opts)?;
        info!(path = %written.display(), "saved noise estimate");
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
