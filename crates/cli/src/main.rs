use clap::Parser;
use mockdeck::{
    app::{App, Sources, init},
    cli::{Cli, Command},
};
use std::io::{self, Write};
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity.tracing_level_filter())
        .with_writer(io::stderr)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    debug!(config = ?cli);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Command::Init { path, force } = &cli.command {
        return init(path, *force, &mut out);
    }

    let sources = Sources::from_cli(&cli);
    let config = sources.load_config()?;
    debug!(?config.persistence, endpoints = config.endpoints.len(), "loaded config");

    let store = App::open_store(&sources, &config);
    let app = App::start(config, store).await?;

    match cli.command {
        Command::Watch => app.watch(&sources, &mut out).await?,
        command => app.run(command, &mut out).await?,
    }
    out.flush()?;
    Ok(())
}
