use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Deployment environment name; anything other than `production`
    /// exposes diagnostic detail in error responses.
    pub environment: String,
    /// Object store backend: `s3` or `memory`.
    pub store: String,
    pub bucket: String,
    pub region: String,
    /// Custom S3 endpoint for S3-compatible stores (MinIO, LocalStack).
    pub endpoint_url: Option<String>,
    /// Use path-style addressing instead of virtual-hosted-style.
    pub force_path_style: bool,
    /// Key prefix under which gallery images live. Always ends with `/`.
    pub image_prefix: String,
    /// Default number of images per listing page.
    pub page_size: usize,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Maximum raw page fetches per listing enumeration.
    pub list_max_calls: usize,
    /// Wall-clock bound on one listing enumeration, in seconds.
    pub list_timeout_secs: u64,
    /// CORS origin allowed to call the API; permissive when unset.
    pub allowed_origin: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Cloud image gallery gateway")]
pub struct Args {
    /// Host to bind to (overrides GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Deployment environment (overrides GALLERY_ENV)
    #[arg(long)]
    pub environment: Option<String>,

    /// Object store backend, `s3` or `memory` (overrides GALLERY_STORE)
    #[arg(long)]
    pub store: Option<String>,

    /// Bucket holding the gallery (overrides GALLERY_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region (overrides GALLERY_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3 endpoint URL (overrides GALLERY_S3_ENDPOINT)
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Use path-style S3 addressing (or set GALLERY_S3_PATH_STYLE=1)
    #[arg(long)]
    pub force_path_style: bool,

    /// Key prefix for gallery images (overrides GALLERY_IMAGE_PREFIX)
    #[arg(long)]
    pub image_prefix: Option<String>,

    /// Default listing page size (overrides GALLERY_PAGE_SIZE)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Maximum upload size in bytes (overrides GALLERY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Page-fetch budget per listing (overrides GALLERY_LIST_MAX_CALLS)
    #[arg(long)]
    pub list_max_calls: Option<usize>,

    /// Listing timeout in seconds (overrides GALLERY_LIST_TIMEOUT_SECS)
    #[arg(long)]
    pub list_timeout_secs: Option<u64>,

    /// Allowed CORS origin (overrides GALLERY_ALLOWED_ORIGIN)
    #[arg(long)]
    pub allowed_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
            environment: "development".into(),
            store: "s3".into(),
            bucket: "image-gallery".into(),
            region: "us-east-1".into(),
            endpoint_url: None,
            force_path_style: false,
            image_prefix: "images/".into(),
            page_size: 12,
            max_upload_bytes: 10 * 1024 * 1024,
            list_max_calls: 1000,
            list_timeout_secs: 30,
            allowed_origin: None,
        }
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into an AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        let defaults = Self::default();

        // --- Environment fallback ---
        let env_host = env::var("GALLERY_HOST").ok();
        let env_port = parse_env("GALLERY_PORT")?;
        let env_environment = env::var("GALLERY_ENV").ok();
        let env_store = env::var("GALLERY_STORE").ok();
        let env_bucket = env::var("GALLERY_BUCKET").ok();
        let env_region = env::var("GALLERY_REGION").ok();
        let env_endpoint = env::var("GALLERY_S3_ENDPOINT").ok();
        let env_path_style = env::var("GALLERY_S3_PATH_STYLE")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let env_prefix = env::var("GALLERY_IMAGE_PREFIX").ok();
        let env_page_size = parse_env("GALLERY_PAGE_SIZE")?;
        let env_max_upload = parse_env("GALLERY_MAX_UPLOAD_BYTES")?;
        let env_list_calls = parse_env("GALLERY_LIST_MAX_CALLS")?;
        let env_list_timeout = parse_env("GALLERY_LIST_TIMEOUT_SECS")?;
        let env_origin = env::var("GALLERY_ALLOWED_ORIGIN").ok();

        // --- Merge ---
        let cfg = Self {
            host: args.host.or(env_host).unwrap_or(defaults.host),
            port: args.port.or(env_port).unwrap_or(defaults.port),
            environment: args
                .environment
                .or(env_environment)
                .unwrap_or(defaults.environment),
            store: args.store.or(env_store).unwrap_or(defaults.store),
            bucket: args.bucket.or(env_bucket).unwrap_or(defaults.bucket),
            region: args.region.or(env_region).unwrap_or(defaults.region),
            endpoint_url: args.endpoint_url.or(env_endpoint),
            force_path_style: args.force_path_style || env_path_style,
            image_prefix: normalize_prefix(
                args.image_prefix.or(env_prefix).unwrap_or(defaults.image_prefix),
            ),
            page_size: args.page_size.or(env_page_size).unwrap_or(defaults.page_size),
            max_upload_bytes: args
                .max_upload_bytes
                .or(env_max_upload)
                .unwrap_or(defaults.max_upload_bytes),
            list_max_calls: args
                .list_max_calls
                .or(env_list_calls)
                .unwrap_or(defaults.list_max_calls),
            list_timeout_secs: args
                .list_timeout_secs
                .or(env_list_timeout)
                .unwrap_or(defaults.list_timeout_secs),
            allowed_origin: args.allowed_origin.or(env_origin),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Error responses carry diagnostic detail outside production.
    pub fn expose_error_details(&self) -> bool {
        self.environment != "production"
    }
}

/// Read and parse an env var, keeping the variable name in any error.
fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

/// Listings key off the exact prefix, so it must end with the delimiter.
fn normalize_prefix(prefix: String) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix
    } else {
        format!("{}/", prefix)
    }
}
