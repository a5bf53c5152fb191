//! Drover - fetches and installs the browser driver matching a local browser
//!
//! Main entry point. The CLI supplies what the core pipeline cannot
//! derive on its own (the detected browser version and the platform),
//! runs the pipeline, and prints manual-installation guidance when any
//! step fails. A failed install must never abort the surrounding
//! bootstrap, so `install` still exits successfully in that case.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use drover_core::catalog::{install_dir, Catalog, Installer, DEFAULT_BINARY_NAME, DEFAULT_CATALOG_URL};
use drover_core::{provision, DriverError, Platform, VersionTriple};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "drover",
    about = "Resolves and installs the browser-automation driver matching your browser",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download and install the best-matching driver version
    Install {
        /// Detected local browser version (e.g. 120.0.6099.109)
        #[clap(long)]
        browser_version: String,

        /// Catalog platform identifier (defaults to the current machine)
        #[clap(long)]
        platform: Option<String>,

        /// Install into ~/.local/bin instead of the system bin directory
        #[clap(long)]
        local_bin: bool,

        /// Install into an explicit directory (overrides --local-bin)
        #[clap(long)]
        dest: Option<PathBuf>,

        /// Catalog endpoint to query
        #[clap(long, default_value = DEFAULT_CATALOG_URL)]
        catalog_url: String,

        /// Reinstall even if the driver binary already exists
        #[clap(long)]
        force: bool,
    },

    /// Resolve the driver version and download URL without installing
    Resolve {
        /// Detected local browser version (e.g. 120.0.6099.109)
        #[clap(long)]
        browser_version: String,

        /// Catalog platform identifier (defaults to the current machine)
        #[clap(long)]
        platform: Option<String>,

        /// Catalog endpoint to query
        #[clap(long, default_value = DEFAULT_CATALOG_URL)]
        catalog_url: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Initialize the tracing subscriber
///
/// Logs go to stderr so stdout stays clean for command output.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    match cli.command {
        Command::Install {
            browser_version,
            platform,
            local_bin,
            dest,
            catalog_url,
            force,
        } => {
            execute_install(
                &browser_version,
                platform.as_deref(),
                local_bin,
                dest,
                &catalog_url,
                force,
            )
            .await
        }
        Command::Resolve {
            browser_version,
            platform,
            catalog_url,
            json,
        } => execute_resolve(&browser_version, platform.as_deref(), &catalog_url, json).await,
    }
}

/// Parse the platform flag, or fall back to the current machine.
fn select_platform(flag: Option<&str>) -> Result<Platform> {
    match flag {
        Some(s) => s.parse::<Platform>().map_err(Into::into),
        None => Platform::current().context(
            "Could not map this machine to a catalog platform.\n\
             Pass one explicitly with --platform (linux64, mac-arm64, mac-x64, win32, win64)",
        ),
    }
}

async fn execute_install(
    browser_version: &str,
    platform_flag: Option<&str>,
    local_bin: bool,
    dest: Option<PathBuf>,
    catalog_url: &str,
    force: bool,
) -> Result<()> {
    let target: VersionTriple = browser_version
        .parse()
        .with_context(|| format!("Invalid --browser-version '{browser_version}'"))?;
    let platform = select_platform(platform_flag)?;

    let dest_dir = match dest {
        Some(dir) => dir,
        None => install_dir(local_bin)?,
    };

    let installer = Installer::new();
    if !force && installer.is_installed(&dest_dir) {
        println!(
            "{} already installed at {} (use --force to reinstall)",
            DEFAULT_BINARY_NAME,
            dest_dir.join(DEFAULT_BINARY_NAME).display()
        );
        return Ok(());
    }

    println!("Fetching driver catalog...");

    match provision(catalog_url, target, platform, &dest_dir, DEFAULT_BINARY_NAME).await {
        Ok(provisioned) => {
            if provisioned.version != target {
                println!(
                    "\nResolved browser {} -> driver v{}",
                    target, provisioned.version_string
                );
            }
            println!(
                "\nInstalled {} v{}",
                DEFAULT_BINARY_NAME, provisioned.version_string
            );
            println!("Location: {}", provisioned.path.display());
        }
        Err(err) => {
            tracing::warn!(kind = err.kind(), "Driver install failed; falling back to manual instructions");
            print_manual_instructions(browser_version, platform, catalog_url, &err);
        }
    }

    // The surrounding bootstrap continues either way.
    Ok(())
}

async fn execute_resolve(
    browser_version: &str,
    platform_flag: Option<&str>,
    catalog_url: &str,
    json: bool,
) -> Result<()> {
    let target: VersionTriple = browser_version
        .parse()
        .with_context(|| format!("Invalid --browser-version '{browser_version}'"))?;
    let platform = select_platform(platform_flag)?;

    if !json {
        println!("Fetching driver catalog...");
    }

    let catalog = Catalog::fetch(catalog_url).await?;

    let entry = catalog
        .resolve_version(target)
        .ok_or(DriverError::NoCandidateVersion {
            major: target.major,
        })?;
    let version: VersionTriple = entry.version.parse()?;

    let url = catalog
        .resolve_download_url(version, platform)
        .ok_or_else(|| DriverError::NoPlatformUrl {
            version: entry.version.clone(),
            platform,
        })?;

    if json {
        let output = serde_json::json!({
            "browser_version": target.to_string(),
            "driver_version": entry.version,
            "platform": platform.as_str(),
            "url": url,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        println!("Browser:  {target}");
        println!("Driver:   v{}", entry.version);
        println!("Platform: {platform}");
        println!("URL:      {url}");
    }

    Ok(())
}

/// Actionable fallback when automatic installation cannot complete.
fn print_manual_instructions(
    browser_version: &str,
    platform: Platform,
    catalog_url: &str,
    err: &DriverError,
) {
    println!("\nAutomatic driver install failed: {err}");

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        println!("  caused by: {cause}");
        source = cause.source();
    }

    println!("\nTo install the driver manually:");
    println!("  1. Open {catalog_url}");
    println!("  2. Find the entry closest to your browser version ({browser_version}) with the same major version");
    println!("  3. Download the '{platform}' driver archive and unzip it");
    println!("  4. Make the '{DEFAULT_BINARY_NAME}' binary executable (chmod +x) and move it to ~/.local/bin or /usr/local/bin");
    println!("  5. On macOS, clear the quarantine flag: xattr -d com.apple.quarantine <binary>");
    println!("\nThe rest of the setup can proceed without it.");
}
