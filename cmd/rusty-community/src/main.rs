//! # rusty-community
//!
//! Assembles the content store from settings and serves it through an
//! interactive shell on stdin/stdout.

mod shell;

use anyhow::Context;
use auth_adapters::SessionIdentityProvider;
use configs::{LogSettings, Settings};
use services::ContentService;
use storage_adapters::{InMemoryContentRepository, SeedData};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::shell::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log)?;

    // 1. Seed data
    let seed = match &settings.store.seed_file {
        Some(path) => SeedData::load(path)?,
        None if settings.store.seed => SeedData::mock(),
        None => SeedData::empty(),
    };
    let directory = seed.users.clone();

    // 2. Store
    let repo = InMemoryContentRepository::seeded(seed);
    let service = ContentService::new(repo).with_latency(settings.simulated_latency());

    // 3. Identity
    let identity = SessionIdentityProvider::new(directory);
    if let Some(username) = &settings.identity.default_user {
        identity
            .sign_in(username)
            .await
            .with_context(|| format!("signing in default user '{username}'"))?;
    }
    if settings.identity.publishable_key.is_some() {
        info!("identity provider key configured");
    }

    info!(
        latency_ms = settings.store.simulated_latency_ms,
        "rusty-community ready, type 'help' for commands"
    );

    let console = Shell::new(&service, &identity);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    shell::run(&console, stdin, &mut stdout).await
}

/// `RUST_LOG` wins over `log.level`. Logs go to stderr so they don't mix with
/// shell output.
fn init_tracing(log: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .context("invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if log.json {
        builder.json().try_init()
    } else {
        builder.with_file(true).with_line_number(true).try_init()
    };
    result.map_err(anyhow::Error::msg)
}
