//! `epductl`: switch Eaton ePDU outlets from the command line.
//!
//! ```bash
//! epductl --ip 192.168.1.10 --user admin --password admin --info --on 3 --off 4
//! ```
//!
//! Set `RUST_LOG` or pass `-v` for protocol logs.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser, ValueEnum};
use log::{error, warn};

use epductl::error::{ConnectError, SessionError};
use epductl::{Error, HostKeyVerification, ObjectStore, OutletAction, Pdu, PduBuilder};

/// Control an Eaton ePDU over SSH.
#[derive(Parser, Debug)]
#[command(name = "epductl", version, about)]
#[command(group(ArgGroup::new("credential").required(true).args(["password", "key"])))]
struct Args {
    /// Address of the PDU
    #[arg(long, value_name = "ADDR")]
    ip: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// Login name
    #[arg(long, value_name = "NAME")]
    user: String,

    /// Login password
    #[arg(long, env = "EPDU_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Private key file
    #[arg(long, value_name = "PATH")]
    key: Option<PathBuf>,

    /// Passphrase for an encrypted private key
    #[arg(long, requires = "key")]
    passphrase: Option<String>,

    /// Switch an outlet on (repeatable)
    #[arg(long = "on", value_name = "N", allow_negative_numbers = true)]
    on: Vec<i64>,

    /// Switch an outlet off (repeatable)
    #[arg(long = "off", value_name = "N", allow_negative_numbers = true)]
    off: Vec<i64>,

    /// Print the device identity
    #[arg(long)]
    info: bool,

    /// Print the identity as JSON
    #[arg(long, requires = "info")]
    json: bool,

    /// Connect timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Per-command timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    command_timeout: u64,

    /// Host key checking mode
    #[arg(long, value_enum, default_value_t = HostKeyChecking::AcceptNew)]
    host_key_checking: HostKeyChecking,

    /// known_hosts file (default: ~/.ssh/known_hosts)
    #[arg(long, value_name = "PATH")]
    known_hosts: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HostKeyChecking {
    Strict,
    AcceptNew,
    Off,
}

impl From<HostKeyChecking> for HostKeyVerification {
    fn from(mode: HostKeyChecking) -> Self {
        match mode {
            HostKeyChecking::Strict => HostKeyVerification::Strict,
            HostKeyChecking::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyChecking::Off => HostKeyVerification::Disabled,
        }
    }
}

impl Args {
    fn has_work(&self) -> bool {
        self.info || !self.on.is_empty() || !self.off.is_empty()
    }

    fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        }
    }

    fn builder(&self) -> PduBuilder {
        let builder = PduBuilder::new(&self.ip)
            .port(self.port)
            .username(&self.user)
            .timeout(Duration::from_secs(self.timeout))
            .command_timeout(Duration::from_secs(self.command_timeout))
            .host_key_verification(self.host_key_checking.into());

        let builder = match &self.known_hosts {
            Some(path) => builder.known_hosts(path),
            None => builder,
        };

        match (&self.password, &self.key, &self.passphrase) {
            (_, Some(key), Some(passphrase)) => {
                builder.private_key_with_passphrase(key, passphrase)
            }
            (_, Some(key), None) => builder.private_key(key),
            (Some(password), None, _) => builder.password(password),
            // clap's credential group guarantees one of the two
            (None, None, _) => builder,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    if !args.has_work() {
        return ExitCode::SUCCESS;
    }

    let mut pdu = match args.builder().connect().await {
        Ok(pdu) => pdu,
        Err(e) => return fail(&e),
    };

    let outcome = run(&mut pdu, &args).await;

    if let Err(e) = pdu.close().await {
        warn!("logout failed: {}", e);
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Print the identity, then apply all `--on`, then all `--off`.
async fn run(pdu: &mut Pdu, args: &Args) -> epductl::Result<()> {
    if args.info {
        if args.json {
            match serde_json::to_string_pretty(pdu.identity()) {
                Ok(json) => println!("{}", json),
                Err(e) => error!("identity serialization failed: {}", e),
            }
        } else {
            println!("{}", pdu.identity());
        }
    }

    for (action, outlets) in [(OutletAction::On, &args.on), (OutletAction::Off, &args.off)] {
        switch_outlets(pdu, action, outlets, |n| eprintln!("No such outlet: {}", n)).await?;
    }

    Ok(())
}

/// Apply `action` to each requested index in order.
///
/// Indices that are not outlets of this device (including negative ones) go
/// to `missing` and the rest of the list is still processed.
async fn switch_outlets<S, F>(
    pdu: &mut Pdu<S>,
    action: OutletAction,
    requested: &[i64],
    mut missing: F,
) -> epductl::Result<()>
where
    S: ObjectStore,
    F: FnMut(i64),
{
    for &n in requested {
        let applied = match u32::try_from(n) {
            Ok(outlet) => pdu
                .apply(action, &[outlet])
                .await?
                .iter()
                .all(|outcome| outcome.is_applied()),
            Err(_) => false,
        };
        if !applied {
            missing(n);
        }
    }
    Ok(())
}

fn fail(e: &Error) -> ExitCode {
    eprintln!("epductl: {}", e);
    ExitCode::from(exit_code(e))
}

fn exit_code(e: &Error) -> u8 {
    match e {
        Error::Connect(_) => 1,
        // The shell never came up, so login did not complete
        Error::Session(SessionError::PromptTimeout(_) | SessionError::NoPrompt) => 1,
        // 2 is taken by clap usage errors
        Error::Validation(_) => 4,
        Error::Session(_) | Error::Config(_) => 3,
    }
}
