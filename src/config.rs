use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";

#[derive(Debug, Parser)]
#[command(version, about = "Native client for a Hack-or-Snooze story server", long_about = None)]
pub struct Opts {
    /// Root URL of the story API
    #[arg(long, env = "HOS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Where the credential database lives (defaults to ~/.hack_or_snooze)
    #[arg(long, env = "HOS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout; unset leaves it to the transport
    #[arg(long, env = "HOS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Resolved client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub data_dir: PathBuf,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn from_opts(opts: Opts) -> Result<Self> {
        let base_url = Url::parse(&opts.base_url)
            .with_context(|| format!("Invalid base url: {}", opts.base_url))?;

        let data_dir = match opts.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        Ok(Self {
            base_url,
            data_dir,
            timeout: opts.timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("client.db")
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs_next::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    Ok(home_dir.join(".hack_or_snooze"))
}
