use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use retrain_policy::{config::load_settings, tasks::TaskKind};
use shared_utils::env::get_env_var_opt;
use system_manager::{logging, runner::TaskRunner, scheduler};
use tracing::info;

#[derive(Parser)]
#[command(version, about = "Keeps the forecasting model service's data and model fresh")]
struct Cli {
    /// Path to the settings file (TOML). Falls back to $RETRAIN_CONFIG, then defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the scheduler and run until Ctrl-C
    Run,

    /// Run a single task now and print its report
    Once {
        #[arg(value_enum)]
        task: TaskArg,

        /// Read and decide, but do not issue write calls
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective settings after file and environment overrides
    ShowConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum TaskArg {
    Ingest,
    Backfill,
    TrainDaily,
    TrainDrift,
}

impl From<TaskArg> for TaskKind {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Ingest => TaskKind::Ingest,
            TaskArg::Backfill => TaskKind::BackfillOnStartup,
            TaskArg::TrainDaily => TaskKind::TrainDaily,
            TaskArg::TrainDrift => TaskKind::TrainDrift,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();
    logging::init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| get_env_var_opt("RETRAIN_CONFIG").map(PathBuf::from));
    let settings = load_settings(config_path.as_deref())?;

    match cli.command {
        Commands::ShowConfig => {
            let rendered = toml::to_string_pretty(&settings).context("render settings")?;
            println!("{rendered}");
        }
        Commands::Once { task, dry_run } => {
            let runner = TaskRunner::new(settings).context("create model service client")?;
            let report = runner.run_once(task.into(), dry_run).await;
            match &report.result {
                Ok(outcome) => println!(
                    "{}: {outcome}{} in {:.1}s",
                    report.task,
                    if report.dry_run { " (dry run)" } else { "" },
                    report.elapsed.as_secs_f64()
                ),
                Err(e) => bail!("{} failed: {e}", report.task),
            }
        }
        Commands::Run => {
            let runner = TaskRunner::new(settings).context("create model service client")?;
            info!("starting retrain manager");
            scheduler::run(Arc::new(runner)).await?;
        }
    }
    Ok(())
}
