//! Web-Larek storefront, headless.
//!
//! Loads configuration, fetches the catalog and drives the dispatcher with
//! regions that write every render to the log.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::rc::Rc;

use larek_storefront::config::StorefrontConfig;
use larek_storefront::dispatcher::Dispatcher;
use larek_storefront::error::Result;
use larek_storefront::events::StoreBus;
use larek_storefront::services::LarekClient;
use larek_storefront::state::AppState;
use larek_storefront::views::Regions;
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env()?;

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "larek_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let client = LarekClient::new(&config.api)?;
    let state = AppState::new(StoreBus::new(), config.currency());
    let dispatcher = Dispatcher::install(state, Regions::logging(), Rc::new(client));

    tracing::info!(api = %config.api.api_base(), "Fetching catalog");

    // Order submission is spawned locally; everything runs on one thread.
    let local = tokio::task::LocalSet::new();
    let loaded = local.run_until(dispatcher.refresh_catalog()).await;
    local.await;

    Ok(match loaded {
        Ok(()) => {
            tracing::info!(cards = dispatcher.state().cards().len(), "Catalog rendered");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Catalog unavailable");
            ExitCode::FAILURE
        }
    })
}
