//! signurl - generate and verify signed URLs from the command line.
//!
//! # Usage
//!
//! ```text
//! SIGNED_URL_SECRET=s3cr3t signurl sign confirm --path '/confirm/{id}' --param id=42 --expires '+1 hour'
//! SIGNED_URL_SECRET=s3cr3t signurl verify 'http://localhost/confirm/42?_expires=...&_hash=...'
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIGNED_URL_SECRET` | *(required)* | HMAC secret |
//! | `SIGNED_URL_BASE_URL` | `http://localhost` | Scheme and host of absolute URLs |
//! | `SIGNED_URL_ROUTES` | *(empty)* | Routes as `name=/path/{param},other=/other` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use signurl_core::{Parameters, ReferenceType, SignedUrlConfig, SingleUseToken, UrlGenerator};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "signurl", version, about = "Generate and verify signed URLs")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a signed URL for a route
    Sign(SignArgs),
    /// Verify a signed URL
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct SignArgs {
    /// Route name
    route: String,

    /// Route parameter as KEY=VALUE (repeatable)
    #[arg(long = "param", short = 'p', value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Path template for the route, e.g. /users/{id}
    #[arg(long)]
    path: Option<String>,

    /// Expiration: unix timestamp with '@', seconds from now, a date or a phrase like "+1 hour"
    #[arg(long)]
    expires: Option<String>,

    /// Single-use token the URL is bound to
    #[arg(long)]
    single_use: Option<String>,

    /// Form of the generated URL
    #[arg(long, value_enum, default_value_t = Reference::Absolute)]
    reference: Reference,

    /// Print the signed URL with its metadata as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// URL to verify
    url: String,

    /// Current single-use token, if the URL is expected to be single-use
    #[arg(long)]
    single_use: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Reference {
    /// https://host/path
    Absolute,
    /// /path
    Path,
    /// //host/path
    Network,
    /// path
    Relative,
}

impl From<Reference> for ReferenceType {
    fn from(reference: Reference) -> Self {
        match reference {
            Reference::Absolute => Self::AbsoluteUrl,
            Reference::Path => Self::AbsolutePath,
            Reference::Network => Self::NetworkPath,
            Reference::Relative => Self::RelativePath,
        }
    }
}

/// Parse a `KEY=VALUE` route parameter.
fn parse_param(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{input}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{input}`"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
/// Logs go to stderr so stdout only carries command output.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn sign(config: &SignedUrlConfig, args: SignArgs) -> Result<ExitCode> {
    let mut router = config.router().context("failed to build router")?;
    if let Some(path) = args.path {
        router.add_route(args.route.clone(), path);
    }

    let signer = config
        .signer_with(router)
        .context("failed to create signer")?;
    let generator = UrlGenerator::new(signer);

    let mut builder = generator
        .build(&args.route)
        .parameters(args.params.into_iter().collect::<Parameters>())
        .reference_type(args.reference.into());
    if let Some(expires) = args.expires {
        builder = builder.expires(expires)?;
    }
    if let Some(token) = args.single_use {
        builder = builder.single_use(token);
    }

    let url = builder
        .create()
        .with_context(|| format!("failed to sign route {}", args.route))?;

    info!(
        route = %args.route,
        temporary = url.is_temporary(),
        single_use = url.is_single_use(),
        "generated signed URL"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&url)?);
    } else {
        println!("{url}");
    }

    Ok(ExitCode::SUCCESS)
}

fn verify(config: &SignedUrlConfig, args: &VerifyArgs) -> Result<ExitCode> {
    let (_, verifier) = config.build().context("invalid configuration")?;
    let token = args.single_use.as_deref().map(SingleUseToken::from);

    let result = verifier.verify(args.url.as_str(), token.as_ref());
    debug!(url = %args.url, valid = result.is_ok(), "verified URL");

    if args.json {
        let output = match &result {
            Ok(()) => serde_json::json!({ "valid": true }),
            Err(e) => serde_json::json!({
                "valid": false,
                "messageKey": e.message_key(),
                "reason": e.to_string(),
                "expiredAt": e.expired_at(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &result {
            Ok(()) => println!("valid"),
            Err(e) => eprintln!("{} {e}", e.message_key()),
        }
    }

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = SignedUrlConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    if config.secret.is_empty() {
        return Err(anyhow!("SIGNED_URL_SECRET must be set"));
    }

    match cli.cmd {
        Command::Sign(args) => sign(&config, args),
        Command::Verify(args) => verify(&config, &args),
    }
}
