use anyhow::{Context, Result};
use clap::Parser;
use platform_update::hash::{HashAlgorithm, calculate_file_hash};
use platform_update::{ManifestFormat, ProxyConfig, Update, UpdateManager, Version};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::path::PathBuf;

/// platform-update - check a remote manifest for application updates
///
/// The manifest lists releases per platform, optionally with a pre-release
/// channel, in JSON or XML.
///
/// Examples:
///   platform-update --url https://example.com/updates.json --platform win32 check
#[derive(Parser, Debug)]
#[command(author, version = env!("PLATFORM_UPDATE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Manifest URL (also via UPDATE_URL)
    #[arg(long, env = "UPDATE_URL", value_name = "URL", global = true)]
    url: Option<String>,

    /// Platform identifier to resolve, e.g. win32 (also via UPDATE_PLATFORM)
    #[arg(long, env = "UPDATE_PLATFORM", value_name = "NAME", global = true)]
    platform: Option<String>,

    /// Manifest format: json or xml
    #[arg(long, default_value = "json", global = true)]
    format: ManifestFormat,

    /// HTTP proxy URL (also via UPDATE_PROXY)
    #[arg(long, env = "UPDATE_PROXY", value_name = "URL", global = true)]
    proxy: Option<String>,

    /// Proxy user name (also via UPDATE_PROXY_USER)
    #[arg(
        long,
        env = "UPDATE_PROXY_USER",
        value_name = "USER",
        global = true,
        requires = "proxy"
    )]
    proxy_user: Option<String>,

    /// Proxy password (also via UPDATE_PROXY_PASSWORD)
    #[arg(
        long,
        env = "UPDATE_PROXY_PASSWORD",
        value_name = "PASSWORD",
        global = true,
        hide_env_values = true,
        requires = "proxy_user"
    )]
    proxy_password: Option<String>,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE", global = true)]
    headers: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Resolve the latest update for the platform
    Check(CheckArgs),

    /// List every platform entry in the manifest
    List,

    /// Print the digest of a local file
    Hash(HashArgs),
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    /// Consider pre-releases
    #[arg(long)]
    pre_release: bool,

    /// Version of the running application, as major.minor.build.revision
    #[arg(long, value_name = "VERSION")]
    current_version: Option<Version>,
}

#[derive(clap::Args, Debug)]
struct HashArgs {
    /// File to hash
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Digest algorithm
    #[arg(long, short = 'a', default_value = "sha256")]
    algorithm: HashAlgorithm,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check(args) => check(&cli, args).await?,
        Commands::List => list(&cli).await?,
        Commands::Hash(args) => {
            let digest = calculate_file_hash(&args.file, args.algorithm)
                .with_context(|| format!("Failed to hash {:?}", args.file))?;
            println!("{}  {}", digest, args.file.display());
        }
    }
    Ok(())
}

fn build_manager(cli: &Cli) -> Result<UpdateManager> {
    let mut manager = UpdateManager::new(
        cli.url.clone().unwrap_or_default(),
        cli.platform.clone().unwrap_or_default(),
    )
    .with_format(cli.format)
    .with_headers(parse_headers(&cli.headers)?);

    if let Some(url) = &cli.proxy {
        let mut proxy = ProxyConfig::new(url);
        if let Some(user) = &cli.proxy_user {
            proxy = proxy.with_credentials(user, cli.proxy_password.clone().unwrap_or_default());
        }
        manager = manager.with_proxy(proxy);
    }
    Ok(manager)
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .with_context(|| format!("Invalid header '{}'. Expected NAME:VALUE.", entry))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("Invalid header name in '{}'", entry))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("Invalid header value in '{}'", entry))?;
        headers.append(name, value);
    }
    Ok(headers)
}

async fn check(cli: &Cli, args: &CheckArgs) -> Result<()> {
    let manager = build_manager(cli)?;
    let update = manager
        .get_latest_version(args.pre_release)
        .await
        .context("Failed to check for updates")?;

    let Some(update) = update else {
        println!(
            "No update information for platform {}",
            manager.current_platform
        );
        return Ok(());
    };

    print_update(&update);
    if let Some(current) = &args.current_version {
        if update.update_available(current) {
            println!("Update available: {} -> {}", current, update.version_string());
        } else {
            println!("Up to date: {}", current);
        }
    }
    Ok(())
}

async fn list(cli: &Cli) -> Result<()> {
    let manager = build_manager(cli)?;
    let updates = manager
        .get_latest_versions()
        .await
        .context("Failed to fetch manifest")?;

    for entry in &updates.platform_update_list {
        match &entry.pre_release {
            Some(pre) => println!(
                "{}\t{}\t(pre-release {})",
                entry.platform_name,
                entry.update.version_string(),
                pre.version_string()
            ),
            None => println!(
                "{}\t{}",
                entry.platform_name,
                entry.update.version_string()
            ),
        }
    }
    Ok(())
}

fn print_update(update: &Update) {
    println!("Latest version: {}", update.version_string());
    if !update.update_url.is_empty() {
        println!("Download: {}", update.update_url);
    }
    if !update.info_url.is_empty() {
        println!("Info: {}", update.info_url);
    }
    if !update.update_info.is_empty() {
        println!("{}", update.update_info);
    }
    for hash in &update.hash_list {
        println!("{}: {}", hash.hash_type, hash.hash);
    }
}
