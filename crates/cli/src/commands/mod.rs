//! CLI commands.

use std::error::Error;
use std::path::PathBuf;

use kom::klarna::{KlarnaClient, ReqwestTransport, TracingLog};
use kom::{KomConfig, MemorySettings};

pub mod inspect;
pub mod trigger;

/// YAML files the commands read and write.
pub struct Files {
    pub orders: PathBuf,
    pub settings: PathBuf,
}

/// Build a client over the settings file with the production transport.
fn client(
    files: &Files,
    config: &KomConfig,
) -> Result<KlarnaClient<MemorySettings, ReqwestTransport, TracingLog>, Box<dyn Error>> {
    let settings = MemorySettings::load_file(&files.settings)?;
    let transport = ReqwestTransport::new(config.http_timeout)?;
    Ok(KlarnaClient::new(settings, transport)
        .with_log(TracingLog)
        .with_user_agent(config.user_agent.clone()))
}
