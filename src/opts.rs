use clap::Parser;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Checks whether your public IP address changed, and updates a GoDaddy A record if it did.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, name = "godaddy-dyndns")]
pub struct Opts {
    /// The path to the configuration file.
    ///
    /// Defaults to `configs.json` in the current directory.
    #[clap(long)]
    pub config: Option<String>,
    /// Give up on a request after this many seconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
    /// Print the request URL and response bodies.
    #[clap(action, short, long)]
    pub verbose: bool,
}

impl Opts {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            config: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            verbose: false,
        }
    }
}
