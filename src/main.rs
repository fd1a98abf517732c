use anyhow::Result;
use clap::Parser;
use retromix::cli::Cli;
use retromix::commands::run;
use retromix::config::load_dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Arguments first: a bad invocation must fail before anything touches the disk.
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    load_dotenv();

    run::execute(&cli.run_options())?;
    Ok(())
}
