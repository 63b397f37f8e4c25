use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use civitas_catalog::{CatalogClient, SandboxCatalog};
use civitas_core::AppConfig;
use civitas_geocode::{Resolver, ResolverConfig};

#[derive(Debug, Parser)]
#[command(name = "civitas-cli")]
#[command(about = "Civitas address resolution command line interface")]
struct Cli {
    /// Use the deterministic sandbox providers instead of live services.
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a free-text address or postal code to coordinates.
    Geocode { address: String },
    /// Resolve coordinates back to the nearest address.
    Reverse { latitude: f64, longitude: f64 },
    /// Check availability and latency of the geocoding providers.
    Status,
    /// Run the syntactic address validator; no network calls.
    Validate { address: String },
    /// List colonias from the municipal address catalog.
    Colonias {
        /// Filter by case-insensitive name fragment.
        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = civitas_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let cli = Cli::parse();
    let sandbox = cli.sandbox || config.sandbox;

    match cli.command {
        Commands::Geocode { address } => geocode(&config, sandbox, &address).await,
        Commands::Reverse {
            latitude,
            longitude,
        } => reverse(&config, sandbox, latitude, longitude).await,
        Commands::Status => status(&config, sandbox).await,
        Commands::Validate { address } => validate(&address),
        Commands::Colonias { query } => colonias(&config, sandbox, query.as_deref()).await,
    }
}

fn resolver_config(config: &AppConfig) -> ResolverConfig {
    let mut resolver = ResolverConfig::new(
        &config.primary_geocoder_url,
        &config.fallback_geocoder_url,
    );
    resolver.user_agent = config.geocoder_user_agent.clone();
    resolver.accept_invalid_certs = config.primary_accept_invalid_certs;
    resolver.residential_timeout = Duration::from_secs(config.residential_timeout_secs);
    resolver.primary_timeout = Duration::from_secs(config.primary_timeout_secs);
    resolver.fallback_timeout = Duration::from_secs(config.fallback_timeout_secs);
    resolver.status_timeout = Duration::from_secs(config.status_timeout_secs);
    resolver.overall_budget = Duration::from_secs(config.overall_budget_secs);
    resolver
}

fn build_resolver(config: &AppConfig, sandbox: bool) -> anyhow::Result<Resolver> {
    let resolver_config = resolver_config(config);
    let resolver = if sandbox {
        Resolver::with_sandbox(resolver_config)
    } else {
        Resolver::new(resolver_config)
    };
    resolver.context("failed to construct the resolver")
}

async fn geocode(config: &AppConfig, sandbox: bool, address: &str) -> anyhow::Result<()> {
    let resolver = build_resolver(config, sandbox)?;
    match resolver.geocode(address).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.is_none() {
                tracing::warn!(address, "address could not be resolved by any source");
            }
            Ok(())
        }
        Err(err) => bail!("{err}"),
    }
}

async fn reverse(
    config: &AppConfig,
    sandbox: bool,
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<()> {
    let resolver = build_resolver(config, sandbox)?;
    let result = resolver.reverse_geocode(latitude, longitude).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn status(config: &AppConfig, sandbox: bool) -> anyhow::Result<()> {
    let resolver = build_resolver(config, sandbox)?;
    let status = resolver.service_status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn validate(address: &str) -> anyhow::Result<()> {
    match civitas_geocode::validate::validate_address(address) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(err) => bail!("{err}"),
    }
}

async fn colonias(
    config: &AppConfig,
    sandbox: bool,
    query: Option<&str>,
) -> anyhow::Result<()> {
    if sandbox {
        let catalog = SandboxCatalog::new();
        let colonias = match query {
            Some(fragment) => catalog.search_colonia(fragment),
            None => catalog.get_colonias(),
        };
        println!("{}", serde_json::to_string_pretty(&colonias)?);
        return Ok(());
    }

    let catalog_url = config
        .catalog_url
        .as_deref()
        .context("CIVITAS_CATALOG_URL is not configured")?;

    let mut client = match (&config.catalog_user, &config.catalog_password) {
        (Some(user), Some(password)) => CatalogClient::with_credentials(
            catalog_url,
            config.catalog_timeout_secs,
            &config.geocoder_user_agent,
            user,
            password,
        )?,
        _ => CatalogClient::new(
            catalog_url,
            config.catalog_timeout_secs,
            &config.geocoder_user_agent,
        )?,
    };
    client.authenticate(None, None).await?;

    let colonias = match query {
        Some(fragment) => client.search_colonia(fragment).await?,
        None => client.get_colonias().await?,
    };
    println!("{}", serde_json::to_string_pretty(&colonias)?);
    Ok(())
}
