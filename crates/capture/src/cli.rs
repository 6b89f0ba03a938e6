//! Command-line flags. Each flag, when given, overrides every other layer.

use std::path::PathBuf;

use capture::config::CaptureConfig;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "capture")]
#[command(about = "Campaign entry capture service", version)]
pub struct Args {
    /// TOML or JSON configuration file.
    #[arg(long, env = "CAPTURE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,

    /// Capture endpoint path, e.g. `campaign`.
    #[arg(long)]
    pub path: Option<String>,

    /// Store URL: `sqlite:<file>`, `sqlite::memory:` or `memory:`.
    #[arg(long)]
    pub db_url: Option<String>,

    /// Table receiving entries.
    #[arg(long)]
    pub db_table: Option<String>,

    /// Basic auth username.
    #[arg(long)]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long)]
    pub password: Option<String>,

    /// Log filter, e.g. `debug` or `capture_store=debug,info`.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    /// Writes every given flag into `config`.
    pub fn apply(&self, config: &mut CaptureConfig) {
        fn set<T: Clone>(target: &mut T, flag: Option<&T>) {
            if let Some(value) = flag {
                target.clone_from(value);
            }
        }

        set(&mut config.server.host, self.host.as_ref());
        set(&mut config.server.port, self.port.as_ref());
        set(&mut config.server.path, self.path.as_ref());
        set(&mut config.store.url, self.db_url.as_ref());
        set(&mut config.store.table, self.db_table.as_ref());
        set(&mut config.auth.username, self.username.as_ref());
        set(&mut config.auth.password, self.password.as_ref());
        set(&mut config.logging.level, self.log_level.as_ref());
    }
}
