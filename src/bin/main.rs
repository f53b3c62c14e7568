use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use gridq::{
    Config, JsonFileStorage, Result, Settings, TrainParams, Trainer, trainer::log_progress,
};

/// Train a Q-learning agent to cross a grid, or replay its greedy path.
#[derive(Parser, Debug)]
#[command(name = "gridq")]
struct Cli {
    /// TOML config file.
    #[arg(long, default_value = "gridq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run training episodes and save the Q-table.
    Train {
        /// Decay epsilon linearly over the configured window.
        #[arg(long)]
        decay_epsilon: bool,

        /// Number of episodes. Defaults to `training.rounds`.
        #[arg(long)]
        rounds: Option<usize>,
    },
    /// Replay one greedy episode with the stored Q-table.
    BestStates,
}

fn run(cli: Cli) -> Result<String> {
    let config = Config::from_file(&cli.config)?.with_env_overrides();
    let storage = JsonFileStorage::new(config.q_table_path()?);
    let settings = Settings::from_config(&config)?;
    let mut trainer = Trainer::from_storage(settings, storage)?
        .with_observer(log_progress(config.training.log_every));

    let output = match cli.command {
        Command::Train {
            decay_epsilon,
            rounds,
        } => serde_json::to_string(&trainer.train(TrainParams {
            decay_epsilon,
            rounds,
        })?)?,
        Command::BestStates => serde_json::to_string(&trainer.best_states())?,
    };
    Ok(output)
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("gridq: {e}");
            ExitCode::FAILURE
        }
    }
}
