use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{crate_version, App, Arg};
use env_logger::Env;
use log::info;
use network::LocalNetwork;
use staker::clock::{SystemClock, ThreadSleeper};
use staker::{static_config, Config, PipelineExecutor};

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("stake-pipeline")
        .version(crate_version!())
        .about("Bonds reward balances into validators on a daily schedule")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("PATH")
                .takes_value(true)
                .default_value(static_config::DEFAULT_CONFIG_PATH)
                .help("YAML configuration file"),
        )
        .get_matches();

    let config_path = matches
        .value_of("config")
        .unwrap_or(static_config::DEFAULT_CONFIG_PATH);
    let config = Config::load_from_file(config_path)
        .with_context(|| format!("loading config {}", config_path))?;
    info!(
        "loaded {} pipeline(s) from {}",
        config.pipeline.len(),
        config_path
    );

    let network = LocalNetwork::new(config.options.grpc_server.as_str());
    let mut executor = PipelineExecutor::create(
        &config,
        &network,
        &network,
        Box::new(SystemClock),
        Rc::new(ThreadSleeper),
    )
    .context("setting up pipelines")?;

    executor.run().context("pipeline executor stopped")
}
