
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};

#[derive(Clone, Parser)]
#[clap(author, version, about)]
pub struct Settings {
    /// Input CSV mapping node ids to contig names, one "id,name" row per contig.
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "id_path")]
    #[clap(value_name = "CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub id_path: PathBuf,

    /// Input contact map in CSV format (name_a,name_b,weight).
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "graph_path")]
    #[clap(value_name = "CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub graph_path: PathBuf,

    /// Directory for output artifacts, created if absent.
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output_dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_dir: PathBuf,

    /// Number of iterations to use for each shallow convergence in the
    /// sampling process; the final phasing round uses 3*core_iterations.
    #[clap(short = 'c')]
    #[clap(long = "core_iterations")]
    #[clap(value_name = "N")]
    #[clap(default_value = "200")]
    #[clap(help_heading = Some("Sampling"))]
    pub core_iterations: usize,

    /// How many shallowly converged phase states to sample from. This is also
    /// the maximum usable concurrency for this stage of the pipeline.
    #[clap(short = 's')]
    #[clap(long = "sample_size")]
    #[clap(value_name = "N")]
    #[clap(default_value = "30")]
    #[clap(help_heading = Some("Sampling"))]
    pub sample_size: usize,

    /// How many rounds to sample and merge.
    #[clap(short = 'r')]
    #[clap(long = "n_rounds")]
    #[clap(value_name = "N")]
    #[clap(default_value = "2")]
    #[clap(help_heading = Some("Sampling"))]
    pub n_rounds: usize,

    /// Maximum number of threads to use.
    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
fn check_required_filename(filename: &Path, label: &str) {
    if !filename.exists() {
        error!("{} does not exist: \"{}\"", label, filename.display());
        std::process::exit(exitcode::NOINPUT);
    } else {
        info!("{}: \"{}\"", label, filename.display());
    }
}

pub fn get_raw_settings() -> Settings {
    Settings::parse()
}

/// Do some additional checks here, we may increase these as we go.
/// Also can modify settings if needed since we're passing it around.
/// # Arguments
/// * `settings` - the raw settings, nothing has been checked other than what clap does for us.
pub fn check_settings(mut settings: Settings) -> Settings {
    check_required_filename(&settings.id_path, "Id file");
    check_required_filename(&settings.graph_path, "Contact map file");

    // 0 doesn't make sense for any of the budgets, error proof them up to 1
    if settings.core_iterations == 0 {
        settings.core_iterations = 1;
    }
    if settings.sample_size == 0 {
        settings.sample_size = 1;
    }
    if settings.n_rounds == 0 {
        settings.n_rounds = 1;
    }
    if settings.threads == 0 {
        settings.threads = 1;
    }
    if settings.threads > settings.sample_size {
        info!(
            "Requested {} threads but only {} samples per round; extra threads will idle",
            settings.threads, settings.sample_size
        );
    }

    info!("Output directory: \"{}\"", settings.output_dir.display());
    info!("Core iterations per sample: {}", settings.core_iterations);
    info!("Samples per round: {}", settings.sample_size);
    info!("Sampling rounds: {}", settings.n_rounds);
    info!("Processing threads: {}", settings.threads);

    settings
}
