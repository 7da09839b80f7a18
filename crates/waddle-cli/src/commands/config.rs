//! Configuration commands.

use clap::Subcommand;
use waddle_core::storage::config::RemoteConfig;
use waddle_core::Config;

use super::common::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Point the app at a remote table API
    SetRemote {
        /// Base URL of the table API, without trailing slash
        base_url: String,
        /// API key for the endpoint
        api_key: String,
    },
    /// Remove the remote endpoint (back to guest/offline mode)
    ClearRemote,
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            match &config.remote {
                Some(remote) => {
                    println!("remote.base_url = {}", remote.base_url);
                    println!("remote.api_key = (set, {} chars)", remote.api_key.len());
                }
                None => println!("remote = (none; guest/offline mode)"),
            }
        }
        ConfigAction::SetRemote { base_url, api_key } => {
            let mut config = Config::load()?;
            config.remote = Some(RemoteConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
            });
            config.save()?;
            println!("Remote endpoint saved");
        }
        ConfigAction::ClearRemote => {
            let mut config = Config::load()?;
            config.remote = None;
            config.save()?;
            println!("Remote endpoint cleared");
        }
    }
    Ok(())
}
