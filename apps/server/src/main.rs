use anyhow::Context;
use atlas::domain::config::ApiConfig;
use atlas::kernel::config::load_config;
use atlas_logger::{Logger, LoggerBuilder, parse_level};
use atlas_server::Server;

/// Usage: `atlas-server [CONFIG_FILE]`. Without an argument `server.*` in the
/// working directory is used when present.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let cfg: ApiConfig = load_config(path.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg)?;

    Server::builder().config(cfg).build()?.run().await
}

fn init_logger(cfg: &ApiConfig) -> anyhow::Result<Logger> {
    let settings = &cfg.logging;
    let builder = Logger::builder(env!("CARGO_PKG_NAME"))
        .level(parse_level(&settings.level)?)
        .console(settings.console);
    let builder: LoggerBuilder = match &settings.filter {
        Some(directives) => builder.filter(directives),
        None => builder,
    };

    let logger = match &settings.dir {
        Some(dir) => builder.file(dir).max_files(settings.max_files).json(settings.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}
