//! Configuration management for the extraction server

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::drawing::pipeline::{
    PipelineConfig, DEFAULT_CLASSIFY_DPI, DEFAULT_CORRELATION_RADIUS_PX, DEFAULT_ISOLATION_PX,
    DEFAULT_OCR_ATTEMPTS, DEFAULT_OCR_CONFIDENCE_DERATE, DEFAULT_OCR_DPI,
    DEFAULT_OCR_TIMEOUT_SECS, DEFAULT_RASTER_TIMEOUT_SECS, DEFAULT_VECTOR_STD_DEV_THRESHOLD,
};
use crate::ocr::TesseractConfig;

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}'")]
    Parse { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub ocr: TesseractConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            upload: UploadConfig {
                max_bytes: 50 * BYTES_PER_MB,
            },
            ocr: TesseractConfig::default(),
            pipeline: PipelineConfig {
                ocr_language: Some("eng".to_string()),
                ..PipelineConfig::default()
            },
        }
    }
}

/// Read `key`, falling back to `default` when unset
fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse { key, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables, then validate it
    pub fn from_env() -> Result<Self, ConfigError> {
        let language = env::var("OCR_LANGUAGE").unwrap_or_else(|_| "eng".to_string());

        let config = Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("SERVER_PORT", 3000)?,
            },
            upload: UploadConfig {
                max_bytes: env_or("MAX_UPLOAD_MB", 50usize)? * BYTES_PER_MB,
            },
            ocr: TesseractConfig {
                tesseract_path: env::var("TESSERACT_PATH")
                    .unwrap_or_else(|_| "tesseract".to_string()),
                default_language: language.clone(),
                ..TesseractConfig::default()
            },
            pipeline: PipelineConfig {
                isolation_px: env_or("ISOLATION_PX", DEFAULT_ISOLATION_PX)?,
                correlation_radius_px: env_or(
                    "CORRELATION_RADIUS_PX",
                    DEFAULT_CORRELATION_RADIUS_PX,
                )?,
                skip_balloon_source: env_or("SKIP_BALLOON_SOURCE", true)?,
                ocr_confidence_derate: env_or(
                    "OCR_CONFIDENCE_DERATE",
                    DEFAULT_OCR_CONFIDENCE_DERATE,
                )?,
                vector_std_dev_threshold: env_or(
                    "VECTOR_STDDEV_THRESHOLD",
                    DEFAULT_VECTOR_STD_DEV_THRESHOLD,
                )?,
                vector_when_above: env_or("VECTOR_WHEN_ABOVE", true)?,
                classify_dpi: env_or("CLASSIFY_DPI", DEFAULT_CLASSIFY_DPI)?,
                ocr_dpi: env_or("OCR_DPI", DEFAULT_OCR_DPI)?,
                raster_timeout: Duration::from_secs(env_or(
                    "RASTER_TIMEOUT_SECS",
                    DEFAULT_RASTER_TIMEOUT_SECS,
                )?),
                ocr_timeout: Duration::from_secs(env_or(
                    "OCR_TIMEOUT_SECS",
                    DEFAULT_OCR_TIMEOUT_SECS,
                )?),
                ocr_attempts: env_or("OCR_ATTEMPTS", DEFAULT_OCR_ATTEMPTS)?,
                ocr_language: Some(language),
                min_word_confidence: env_or("MIN_WORD_CONFIDENCE", 0.0)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("SERVER_PORT must be non-zero".into()));
        }
        if self.upload.max_bytes < BYTES_PER_MB {
            return Err(ConfigError::Invalid("MAX_UPLOAD_MB must be at least 1".into()));
        }
        if !(p.isolation_px > 0.0) {
            return Err(ConfigError::Invalid("ISOLATION_PX must be positive".into()));
        }
        if !(p.correlation_radius_px > 0.0) {
            return Err(ConfigError::Invalid(
                "CORRELATION_RADIUS_PX must be positive".into(),
            ));
        }
        if !(p.ocr_confidence_derate > 0.0 && p.ocr_confidence_derate <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "OCR_CONFIDENCE_DERATE must be in (0, 1], got {}",
                p.ocr_confidence_derate
            )));
        }
        if !(0.0..=255.0).contains(&p.vector_std_dev_threshold) {
            return Err(ConfigError::Invalid(
                "VECTOR_STDDEV_THRESHOLD must be between 0 and 255".into(),
            ));
        }
        for (key, dpi) in [("CLASSIFY_DPI", p.classify_dpi), ("OCR_DPI", p.ocr_dpi)] {
            if !(72..=1200).contains(&dpi) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 72 and 1200, got {}",
                    key, dpi
                )));
            }
        }
        if p.raster_timeout.is_zero() || p.ocr_timeout.is_zero() {
            return Err(ConfigError::Invalid("Timeouts must be non-zero".into()));
        }
        if p.ocr_attempts == 0 {
            return Err(ConfigError::Invalid("OCR_ATTEMPTS must be at least 1".into()));
        }
        if !(0.0..=100.0).contains(&p.min_word_confidence) {
            return Err(ConfigError::Invalid(
                "MIN_WORD_CONFIDENCE must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}
