use anyhow::Context;

use canned_origin::config::{OriginConfig, Settings};
use canned_origin::{logger, server, OriginServer};

/// Optional launcher settings file (any format the `config` crate reads)
const SETTINGS_FILE: &str = "origin";

/// Usage: `canned-origin [process] [config.json]`
fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let settings = Settings::load_from(SETTINGS_FILE, args.next(), args.next())
        .context("failed to load settings")?;

    logger::init(&settings.logging.level);

    let config = OriginConfig::load(&settings.config_path, &settings.process, &settings.host)
        .with_context(|| format!("failed to load '{}'", settings.config_path))?;

    // One reactor thread: chunk pacing is timer driven, nothing blocks
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(settings, config))
}

async fn async_main(settings: Settings, config: OriginConfig) -> anyhow::Result<()> {
    let routes: usize = config.actions.values().map(std::collections::BTreeMap::len).sum();
    let origin = OriginServer::bind(&config, settings.logging)?;

    logger::log_server_start(&origin.local_addr()?, &settings.process, routes);
    origin.run(server::shutdown_signal()).await;
    Ok(())
}
