//! Configuration module
//!
//! This module provides the configuration for the uploading service: server,
//! database, media bucket and the outbound HTTP settings used when ingesting
//! product media.

use std::env;

use crate::constants::{DEFAULT_PRESIGNED_EXPIRES_SECS, MAX_PRESIGNED_EXPIRES_SECS};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const HTTP_FETCH_TIMEOUT_SECS: u64 = 60;
const MAX_MEDIA_DOWNLOAD_MB: usize = 10;
const DEFAULT_S3_REGION: &str = "us-east-1";
const LOCAL_STORAGE_PATH: &str = "./media";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:8000/media";

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Uploading plugin configuration
#[derive(Clone, Debug)]
pub struct UploadingConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Media bucket. When unset, signed upload grants are refused and product
    // images are written to local storage.
    pub media_bucket_name: Option<String>,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_access_key_id: Option<String>,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub presigned_default_expires_secs: i64,
    // Outbound media requests
    pub http_fetch_timeout_secs: u64,
    pub max_media_download_bytes: usize,
    // If set, only URLs from these domains are accepted as media URLs
    pub url_upload_allowlist: Option<Vec<String>>,
    pub allow_private_media_urls: bool,
    /// Extra oEmbed providers as (url pattern, endpoint) pairs.
    pub oembed_extra_providers: Vec<(String, String)>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadingConfig>);

impl Config {
    fn inner(&self) -> &UploadingConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadingConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn media_bucket_name(&self) -> Option<&str> {
        self.inner().media_bucket_name.as_deref()
    }

    pub fn s3_region(&self) -> &str {
        &self.inner().s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_access_key_id(&self) -> Option<&str> {
        self.inner().aws_access_key_id.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_storage_base_url(&self) -> &str {
        &self.inner().local_storage_base_url
    }

    pub fn presigned_default_expires_secs(&self) -> i64 {
        self.inner().presigned_default_expires_secs
    }

    pub fn http_fetch_timeout_secs(&self) -> u64 {
        self.inner().http_fetch_timeout_secs
    }

    pub fn max_media_download_bytes(&self) -> usize {
        self.inner().max_media_download_bytes
    }

    pub fn url_upload_allowlist(&self) -> Option<&[String]> {
        self.inner().url_upload_allowlist.as_deref()
    }

    pub fn allow_private_media_urls(&self) -> bool {
        self.inner().allow_private_media_urls
    }

    pub fn oembed_extra_providers(&self) -> &[(String, String)] {
        &self.inner().oembed_extra_providers
    }

    /// Storage backend used for product images: S3 when a media bucket is set.
    pub fn storage_backend(&self) -> StorageBackend {
        if self.inner().media_bucket_name.is_some() {
            StorageBackend::S3
        } else {
            StorageBackend::Local
        }
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn megabytes_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_MEDIA_DOWNLOAD_MB is too large: {}", mb))
}

/// Read an environment variable, treating empty values as unset.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Parse `pattern|endpoint;pattern|endpoint` pairs.
fn parse_provider_pairs(raw: &str) -> Result<Vec<(String, String)>, anyhow::Error> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (pattern, endpoint) = pair.split_once('|').ok_or_else(|| {
                anyhow::anyhow!(
                    "OEMBED_PROVIDERS_EXTRA entry '{}' must be 'pattern|endpoint'",
                    pair
                )
            })?;
            Ok((pattern.trim().to_string(), endpoint.trim().to_string()))
        })
        .collect()
}

impl UploadingConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: var("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let max_media_download_mb = var("MAX_MEDIA_DOWNLOAD_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_MEDIA_DOWNLOAD_MB);

        let url_upload_allowlist = var("URL_UPLOAD_ALLOWLIST").map(|s| {
            s.split(',')
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect::<Vec<_>>()
        });

        let oembed_extra_providers = match var("OEMBED_PROVIDERS_EXTRA") {
            Some(raw) => parse_provider_pairs(&raw)?,
            None => Vec::new(),
        };

        let config = UploadingConfig {
            base,
            database_url: var("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            media_bucket_name: var("AWS_MEDIA_BUCKET_NAME"),
            s3_region: var("AWS_S3_REGION_NAME")
                .or_else(|| var("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            s3_endpoint: var("AWS_S3_ENDPOINT_URL"),
            aws_access_key_id: var("AWS_ACCESS_KEY_ID"),
            local_storage_path: var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| LOCAL_STORAGE_BASE_URL.to_string()),
            presigned_default_expires_secs: var("PRESIGNED_URL_DEFAULT_EXPIRES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PRESIGNED_EXPIRES_SECS),
            http_fetch_timeout_secs: var("HTTP_FETCH_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_FETCH_TIMEOUT_SECS),
            max_media_download_bytes: megabytes_to_bytes(max_media_download_mb)?,
            url_upload_allowlist,
            allow_private_media_urls: var("ALLOW_PRIVATE_MEDIA_URLS")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            oembed_extra_providers,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !(1..=MAX_PRESIGNED_EXPIRES_SECS).contains(&self.presigned_default_expires_secs) {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_DEFAULT_EXPIRES must be between 1 and {} seconds",
                MAX_PRESIGNED_EXPIRES_SECS
            ));
        }

        if self.http_fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "HTTP_FETCH_TIMEOUT_SECONDS must be greater than zero"
            ));
        }

        if self.max_media_download_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_MEDIA_DOWNLOAD_MB must be greater than zero"));
        }

        if let Some(ref bucket) = self.media_bucket_name {
            if bucket.contains('/') {
                return Err(anyhow::anyhow!(
                    "AWS_MEDIA_BUCKET_NAME must be a bucket name, not a path"
                ));
            }
        }

        Ok(())
    }
}
