use crate::config::Config;
use crate::godaddy::{api_client, update_dns, GoDaddyAPI, RECORD_TYPE};
use crate::ip_source::{ip_source::IPSource, ipinfo::IPSourceIpinfo};
use clap::Parser;
use config::ConfigError;
use opts::Opts;
use reqwest::header::InvalidHeaderValue;
use reqwest::{ClientBuilder, StatusCode};
use std::process::ExitCode;
use thiserror::Error;
use tracing::Level;
mod config;
mod godaddy;
mod ip_source;
mod opts;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("Could not connect to the IP lookup service: {0}")]
    IpServiceUnreachable(#[source] reqwest::Error),
    #[error("Weird body returned from the IP lookup service: {0}")]
    IpServiceBadResponse(#[source] reqwest::Error),
    #[error("Could not connect to the registrar: {0}")]
    RegistrarUnreachable(#[source] reqwest::Error),
    #[error("Weird body returned from the registrar: {0}")]
    RegistrarBadResponse(#[source] reqwest::Error),
    #[error("Could not connect to the registrar: the key and secret can't be sent as a header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("Error while accessing the GoDaddy API: {0}")]
    Api(#[from] ApiError),
    #[error("Interrupted, nothing was updated")]
    Interrupted,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API returned 401 - Unauthorized. Provided key or secret is possibly incorrect")]
    Unauthorized(),
    #[error("API returned 403 - Forbidden. Message: {message:?}")]
    Forbidden { message: String },
    #[error("API returned 404 - Not Found. Check that the domain belongs to this account")]
    NotFound(),
    #[error("API returned {0} - {1}")]
    Unknown(StatusCode, String),
}

/// Exact string comparison against the recorded IP; `current` is trimmed first.
pub fn has_ip_changed(current: &str, conf: &Config) -> bool {
    current.trim() != conf.myip
}

/// Returns true if the record was updated.
async fn run(ip_source: &dyn IPSource, conf: &Config, opts: &Opts) -> Result<bool, ClientError> {
    println!("Finding out the IP address...");
    let ip = ip_source.get_ipv4().await?;
    println!("Found: {}", ip);

    if !has_ip_changed(&ip, conf) {
        println!("Nothing to update");
        return Ok(false);
    }

    let fqdn = conf.fqdn();
    println!(
        "IP address changed from {:?}, updating {} record for {}",
        conf.myip, RECORD_TYPE, fqdn
    );
    let client = api_client(&conf.godaddy.key, &conf.godaddy.secret, opts.timeout())?;
    let api = GoDaddyAPI {
        base_url: &conf.godaddy.url,
        domain: &conf.domain,
        host: &conf.host,
        record_type: RECORD_TYPE,
    };
    update_dns(&client, &api, &ip, conf.ttl).await?;

    println!("Updated {} record for {} to {}", RECORD_TYPE, fqdn, ip);
    // The configuration file is never rewritten.
    println!(
        "myip in the configuration file still says {:?}, set it to {:?} or the next run will update again",
        conf.myip, ip
    );
    Ok(true)
}

async fn start(opts: &Opts) -> Result<bool, ClientError> {
    let conf = config::load_config(&config::config_path(opts))?;
    let client = ClientBuilder::new()
        .timeout(opts.timeout())
        .build()
        .map_err(ClientError::IpServiceUnreachable)?;
    let ip_source = IPSourceIpinfo::new(client, &conf.ipinfo);
    run(&ip_source, &conf, opts).await
}

fn init_logging(opts: &Opts) {
    let level = if opts.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let opts = opts::Opts::parse();
    init_logging(&opts);

    let result = tokio::select! {
        result = start(&opts) => result,
        _ = tokio::signal::ctrl_c() => Err(ClientError::Interrupted),
    };
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}
