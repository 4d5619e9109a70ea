//! OCR Providers
//!
//! Defines the provider trait and the Tesseract implementation.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{OcrError, OcrResult, OcrWord, PixelRect};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Provider identifier reported in response metadata
    fn provider_name(&self) -> &str;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Perform OCR on an image, returning word-level boxes
    async fn recognize(&self, image_data: &[u8], language: Option<&str>) -> Result<OcrResult, OcrError>;
}

/// Configuration for the Tesseract provider
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Path to tesseract executable (default: "tesseract" - uses PATH)
    pub tesseract_path: String,
    /// Default language (default: "eng")
    pub default_language: String,
    /// Page segmentation mode; 11 finds sparse text in no particular order
    pub page_segmentation_mode: u8,
    /// Temporary directory for input images (default: system temp)
    pub temp_dir: Option<PathBuf>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            default_language: "eng".to_string(),
            page_segmentation_mode: 11,
            temp_dir: None,
        }
    }
}

/// Tesseract OCR provider (CLI, TSV output)
pub struct TesseractProvider {
    config: TesseractConfig,
}

impl TesseractProvider {
    pub fn new(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Validate language code to prevent argument injection
    fn validate_language(lang: &str) -> Result<(), OcrError> {
        // e.g. "eng", "eng+deu", "chi_sim"
        if lang.is_empty() || lang.len() > 20 {
            return Err(OcrError::ProcessingError(
                "Invalid language code length".to_string(),
            ));
        }
        if let Some(c) = lang
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '+' && *c != '_')
        {
            return Err(OcrError::ProcessingError(format!(
                "Invalid character in language code: {}",
                c
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl OcrProviderTrait for TesseractProvider {
    fn provider_name(&self) -> &str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        let result = Command::new(&self.config.tesseract_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        matches!(result, Ok(status) if status.success())
    }

    async fn recognize(&self, image_data: &[u8], language: Option<&str>) -> Result<OcrResult, OcrError> {
        let lang = language.unwrap_or(&self.config.default_language);
        Self::validate_language(lang)?;

        let temp_dir = self.config.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        let input_path = temp_dir.join(format!("ocr_input_{}.png", uuid::Uuid::new_v4()));

        tokio::fs::write(&input_path, image_data)
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new(&self.config.tesseract_path)
            .arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string())
            .arg("tsv")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        // Clean up input file regardless of outcome
        let _ = tokio::fs::remove_file(&input_path).await;

        let output = output.map_err(|e| {
            OcrError::ProviderNotAvailable(format!("Failed to run tesseract: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let words = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!("Tesseract recognized {} words", words.len());

        Ok(OcrResult::from_words(self.provider_name(), words))
    }
}

/// Tesseract TSV row level for individual words
const TSV_WORD_LEVEL: &str = "5";
const TSV_COLUMNS: usize = 12;

/// Parse tesseract TSV output into words. Non-word rows, rows with negative
/// confidence and blank words are skipped.
pub fn parse_tsv(tsv: &str) -> Result<Vec<OcrWord>, OcrError> {
    let mut words = Vec::new();

    for (line_no, line) in tsv.lines().enumerate() {
        if line.is_empty() || line.starts_with("level") {
            continue;
        }

        let cols: Vec<&str> = line.splitn(TSV_COLUMNS, '\t').collect();
        if cols[0] != TSV_WORD_LEVEL {
            continue;
        }
        if cols.len() < TSV_COLUMNS {
            // Word row with an empty text column
            continue;
        }

        let num = |idx: usize| -> Result<f64, OcrError> {
            cols[idx].trim().parse::<f64>().map_err(|e| {
                OcrError::OutputParseError(format!(
                    "line {}, column {}: {}",
                    line_no + 1,
                    idx + 1,
                    e
                ))
            })
        };

        let confidence = num(10)?;
        let text = cols[11].trim();
        if confidence < 0.0 || text.is_empty() {
            continue;
        }

        words.push(OcrWord {
            text: text.to_string(),
            confidence,
            bounds: PixelRect {
                x: num(6)?,
                y: num(7)?,
                width: num(8)?,
                height: num(9)?,
            },
        });
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t2550\t3300\t-1\t
2\t1\t1\t0\t0\t0\t410\t220\t60\t40\t-1\t
5\t1\t1\t1\t1\t1\t410\t220\t24\t30\t91.5\t12
5\t1\t2\t1\t1\t1\t480\t260\t80\t28\t88\t25mm
5\t1\t3\t1\t1\t1\t900\t900\t20\t20\t-1\t
5\t1\t4\t1\t1\t1\t950\t950\t20\t20\t45\t
";

    #[test]
    fn test_parse_tsv_words() {
        let words = parse_tsv(SAMPLE_TSV).unwrap();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "12");
        assert_eq!(words[0].confidence, 91.5);
        assert_eq!(
            words[0].bounds,
            PixelRect {
                x: 410.0,
                y: 220.0,
                width: 24.0,
                height: 30.0
            }
        );
        assert_eq!(words[1].text, "25mm");
    }

    #[test]
    fn test_parse_tsv_rejects_garbage_numbers() {
        let tsv = "5\t1\t1\t1\t1\t1\tabc\t0\t1\t1\t90\tR5\n";
        assert!(matches!(parse_tsv(tsv), Err(OcrError::OutputParseError(_))));
    }

    #[test]
    fn test_parse_tsv_empty() {
        assert!(parse_tsv("").unwrap().is_empty());
    }

    #[test]
    fn test_validate_language() {
        assert!(TesseractProvider::validate_language("eng").is_ok());
        assert!(TesseractProvider::validate_language("eng+deu").is_ok());
        assert!(TesseractProvider::validate_language("chi_sim").is_ok());
        assert!(TesseractProvider::validate_language("").is_err());
        assert!(TesseractProvider::validate_language("eng; rm -rf /").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let temp = tempfile::tempdir().unwrap();
        let provider = TesseractProvider::new(TesseractConfig {
            tesseract_path: "/nonexistent/tesseract".to_string(),
            temp_dir: Some(temp.path().to_path_buf()),
            ..TesseractConfig::default()
        });

        assert!(!provider.is_available().await);

        let result = provider.recognize(b"png bytes", None).await;
        assert!(matches!(result, Err(OcrError::ProviderNotAvailable(_))));

        // Temp input is removed even on failure
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
