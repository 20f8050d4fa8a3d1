//! Transpoly Command Line Interface
//!
//! Usage:
//!   transpoly --row <a1,...,an,b>... --upper-bound <U> [OPTIONS]
//!   transpoly --help
//!
//! Examples:
//!   transpoly --row 1,1,2 -u 3                     # y0 + y1 = 2, print summary
//!   transpoly --row 1,1,2 -u 3 --point 2,0 -v      # embed a point
//!   transpoly --row 3,-1,2 -u 6 --emit all         # dump every stage

use clap::{Parser, ValueEnum};
use transpoly::prelude::*;
use anyhow::{Context, Result};
use log::{debug, error, info};

/// Transpoly - transportation polytope representations of integer programs
#[derive(Parser, Debug)]
#[command(name = "transpoly")]
#[command(author = "Transpoly Contributors")]
#[command(version)]
#[command(about = "Reduce {y >= 0 : Ay = b} to a slim line-sum transportation polytope", long_about = None)]
struct Cli {
    /// One row of the augmented matrix (A|b), comma-separated
    #[arg(short, long = "row", value_name = "A1,..,AN,B", required = true, allow_hyphen_values = true)]
    rows: Vec<String>,

    /// Upper bound on every variable
    #[arg(short, long, value_name = "U")]
    upper_bound: i64,

    /// Feasible point to embed (comma-separated)
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    point: Option<Vec<i64>>,

    /// Preprocessing policy
    #[arg(long, default_value = "auto")]
    preprocess: PreprocessArg,

    /// What to print
    #[arg(long, default_value = "summary")]
    emit: EmitKind,

    /// Re-check embedded points against every margin
    #[arg(long)]
    verify: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PreprocessArg {
    /// Expand only when some |a| > 2
    Auto,
    /// Always expand
    Always,
    /// Never expand
    Never,
}

impl From<PreprocessArg> for PreprocessMode {
    fn from(arg: PreprocessArg) -> Self {
        match arg {
            PreprocessArg::Auto => PreprocessMode::Auto,
            PreprocessArg::Always => PreprocessMode::Always,
            PreprocessArg::Never => PreprocessMode::Never,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Dimensions of every stage
    Summary,
    /// The plane-sum polytope
    PlaneSum,
    /// The slim line-sum polytope
    Slim,
    /// All stages
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("Transpoly v{}", transpoly::VERSION);

    let rows = parse_rows(&cli.rows)?;
    let system = StandardSystem::from_augmented_rows(&rows).context("Invalid system")?;
    debug!("Input system:\n{}", system);

    let config = ReductionConfig::new(cli.upper_bound)
        .with_preprocess(cli.preprocess.into())
        .with_verify(cli.verify);
    debug!("Reduction config: {:?}", config);

    let reduction = Reduction::build(&system, &config).context("Failed to build the reduction")?;
    print_stages(&reduction, cli.emit);

    if let Some(ref point) = cli.point {
        info!("Embedding point {:?}", point);
        match reduction.embed(point) {
            Ok(embedding) => {
                println!("real coordinates: {:?}", embedding.real_coordinates);
                println!("projected point:  {:?}", embedding.projected_point);
            }
            Err(e) => {
                error!("Embedding failed: {}", e);
                return Err(e).context("Failed to embed point");
            }
        }
    }

    Ok(())
}

/// Parse each `--row` value into integers.
fn parse_rows(values: &[String]) -> Result<Vec<Vec<i64>>> {
    values
        .iter()
        .map(|row| {
            row.split(',')
                .map(|v| {
                    v.trim()
                        .parse::<i64>()
                        .with_context(|| format!("Invalid coefficient {:?} in row {:?}", v, row))
                })
                .collect()
        })
        .collect()
}

fn print_stages(reduction: &Reduction, emit: EmitKind) {
    let plane_sum = reduction.plane_sum();
    let slim = reduction.slim_line_sum();

    if matches!(emit, EmitKind::Summary | EmitKind::All) {
        let pre = reduction.preprocessed().system();
        let [l, m, n] = plane_sum.shape();
        let [rows, cols, planes] = slim.shape();
        println!("preprocessed system: {} x {}", pre.nrows(), pre.ncols());
        println!(
            "plane-sum polytope:  {} x {} x {}, {} enabled cells",
            l,
            m,
            n,
            plane_sum.enabled().len()
        );
        println!("slim line-sum:       {} x {} x {}", rows, cols, planes);
    }
    if matches!(emit, EmitKind::PlaneSum | EmitKind::All) {
        println!("{}", plane_sum);
    }
    if matches!(emit, EmitKind::Slim | EmitKind::All) {
        println!("{}", slim);
    }
}
