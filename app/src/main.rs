use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use common::{
    config::Config,
    plot::{Plot, required_files},
    series::collect_series,
};
use eyre::{Result, bail, eyre};
use indexing_windows::IndexingWindows;
use plot_common::OutputFormat;
use tracing::{debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::report::SummaryFormat;

mod report;

const MODULES: &[&str] = &["timing_plot", "common", "plot_common", "indexing_windows"];

#[derive(Parser)]
#[command(version, about = "Plot search runtime per spectrum against mass window")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Configuration file, toml or yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the `<window>.<name>.time` files
    #[arg(short, long, default_value = ".", global = true)]
    data_dir: PathBuf,
    #[arg(short, long, global = true)]
    log: Vec<String>,
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Fail on timing files without a real time
    #[arg(long, default_value_t = false, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot the timings (default)
    Plot {
        /// Directory the figures are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print the normalized timings
    Summary {
        #[arg(short, long, value_enum, default_value_t = SummaryFormat::Table)]
        format: SummaryFormat,
    },
    /// List the timing files and check that they exist
    Check,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let _guard = init_tracing(&args)?;

    if let Err(err) = run(args) {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}

fn init_tracing(args: &Cli) -> Result<Option<WorkerGuard>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let mut env_filter = EnvFilter::new("");
    for log in &args.log {
        env_filter = env_filter.add_directive(log.parse()?);
    }
    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    let (file_layer, guard) = match &args.log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| eyre!("Invalid log file {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let (non_blocking, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            (
                Some(layer().with_writer(non_blocking).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_writer(std::io::stderr)
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(file_layer)
        .init();
    Ok(guard)
}

fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if args.strict {
        config.settings.strict = true;
    }
    debug!("Using config {}", config.name);

    let command = args.command.unwrap_or(Commands::Plot {
        out_dir: PathBuf::from("."),
    });
    match command {
        Commands::Plot { out_dir } => plot(&args.data_dir, &out_dir, &config),
        Commands::Summary { format } => {
            let series = collect_series(&args.data_dir, &config)?;
            report::write_summary(&series, format, std::io::stdout().lock())
        }
        Commands::Check => check(&args.data_dir, &config),
    }
}

fn plots() -> Vec<Box<dyn Plot>> {
    vec![Box::new(IndexingWindows)]
}

fn plot(data_dir: &Path, out_dir: &Path, config: &Config) -> Result<()> {
    for path in common::plot::plot(&plots(), data_dir, out_dir, config)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn check(data_dir: &Path, config: &Config) -> Result<()> {
    let mut missing = 0;
    for file in required_files(&plots(), config) {
        let path = data_dir.join(&file);
        if path.is_file() {
            println!("ok      {}", path.display());
        } else {
            println!("missing {}", path.display());
            missing += 1;
        }
    }

    let unsupported = config
        .settings
        .outputs
        .iter()
        .filter(|output| OutputFormat::from_path(Path::new(output)).is_err())
        .collect::<Vec<_>>();
    if !unsupported.is_empty() {
        bail!("Unsupported output formats: {unsupported:?}");
    }
    if missing > 0 {
        bail!("{missing} timing files missing in {}", data_dir.display());
    }
    Ok(())
}
