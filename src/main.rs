use clap::Parser;
use yaschat::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();
    yaschat::utils::RUNTIME.block_on(yaschat::app::run(cli))
}
