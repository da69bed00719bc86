//! Kingsley Style storefront - interactive terminal storefront.
//!
//! # Architecture
//!
//! - Catalog loaded from JSON (built in, or `KINGSLEY_CATALOG_PATH`)
//! - View and cart state published through `tokio::sync::watch`
//! - AI stylist backed by the Gemini `generateContent` API
//! - Line-oriented shell on stdin/stdout; logs go to stderr
//!
//! Nothing is persisted: the cart and the conversation live only as long as
//! the process.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use kingsley_storefront::catalog::Catalog;
use kingsley_storefront::config::{LogFormat, StorefrontConfig};
use kingsley_storefront::error::Result;
use kingsley_storefront::gemini::GeminiClient;
use kingsley_storefront::shell::Shell;
use kingsley_storefront::state::Storefront;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
///
/// Logs are written to stderr so they never interleave with the shell's
/// output. Defaults to info level for our crates if `RUST_LOG` is not set.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kingsley_storefront=info,kingsley_core=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::default());
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Storefront exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StorefrontConfig) -> Result<()> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    tracing::info!(products = catalog.len(), "Catalog loaded");

    let gemini = GeminiClient::new(&config.stylist)?;
    if config.stylist.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; the stylist will reply with a fallback message");
    }
    tracing::info!(model = gemini.model(), "Stylist ready");

    let storefront = Storefront::new(catalog);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    Shell::new(storefront, gemini, std::io::stdout())
        .run(stdin)
        .await
}
