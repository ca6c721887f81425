use std::ffi::OsString;

use clap::{ArgAction, Parser, error::ErrorKind};
use tracing::debug;

use crate::auth::Credentials;
use crate::config::Config;
use crate::server::GrpcConnector;
use crate::session;
use crate::util::{logging, shutdown::SHUTDOWN};

/// Help and version are long-only so a password such as `-h` or `-V` is taken as is.
#[derive(Parser, Debug)]
#[command(name = "toit-devices")]
#[command(version, about = "Log in to the toit API and list your registered devices", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Account username
    #[arg(allow_hyphen_values = true)]
    pub username: String,

    /// Account password
    #[arg(allow_hyphen_values = true)]
    pub password: String,

    /// gRPC endpoint of the API
    #[arg(long, env = "TOIT_API_URL")]
    pub api_url: Option<String>,

    /// Give up on a call after this many seconds (default: wait indefinitely)
    #[arg(long, env = "TOIT_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "TOIT_LOG", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    pub fn resolve_config(&self, base: Config) -> Config {
        base.with_overrides(self.api_url.clone(), self.timeout, self.log_level.clone())
    }
}

/// `--help` and `--version` are not usage errors; clap prints them and exits.
fn is_usage_error(err: &clap::Error) -> bool {
    !matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

pub async fn cli() -> anyhow::Result<()> {
    run_with_args(std::env::args_os()).await
}

/// A usage error is reported on stderr and ends the run without touching the API.
/// It is not a failure: the exit status stays zero.
pub async fn run_with_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if is_usage_error(&err) => {
            err.print()?;
            return Ok(());
        }
        Err(err) => err.exit(),
    };

    let config = cli.resolve_config(Config::load()?);
    logging::init_tracing(&config.log_level);
    debug!(api_url = %config.api_url, timeout = ?config.timeout(), "Using configuration");

    let connector = GrpcConnector::new(&config.api_url, config.timeout())?;
    let credentials = Credentials::new(cli.username, cli.password);

    let mut stdout = std::io::stdout();
    let count = session::run_until_cancelled(&connector, credentials, &mut stdout, &SHUTDOWN)
        .await?;

    debug!(count, "Printed devices");
    Ok(())
}
