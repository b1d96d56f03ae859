use clap::Parser;
use swagger_axios_gen::cli::{run_cli, Cli};
use swagger_axios_gen::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config = log_config.verbose();
    }
    init_logging_with_config(&log_config)?;

    run_cli(cli)
}
