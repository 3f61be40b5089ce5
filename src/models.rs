use std::path::Path;

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
    Engine as _,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use crate::{
    error::{MockupError, Result, ResultExt},
    prompt::effective_prompt,
    scenarios::ScenarioEntry,
};

/// Inline product image sent with every generation request.
#[derive(Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for ProductImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ProductImage {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read an image from disk, guessing the MIME type from the extension.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let bytes = fs::read(path_ref)
            .await
            .with_context(format!("reading product image {}", path_ref.display()))?;
        let mime = mime_guess::from_path(path_ref)
            .first_or_octet_stream()
            .to_string();
        let image = Self::new(bytes, mime);
        image.validate()?;
        Ok(image)
    }

    /// Parse a `data:<mime>;base64,<payload>` URI, as produced by a browser file reader.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (mime_type, bytes) = parse_data_uri(uri)?;
        let image = Self::new(bytes, mime_type);
        image.validate()?;
        Ok(image)
    }

    /// Ensure the payload is non-empty and declares an image MIME type.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(MockupError::input("Please upload a product image first."));
        }
        if !self.mime_type.starts_with("image/") {
            return Err(MockupError::input(format!(
                "unsupported MIME type '{}', expected image/*",
                self.mime_type
            )));
        }
        Ok(())
    }

    /// Base64 encoding of the image bytes for inline transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

fn parse_data_uri(uri: &str) -> Result<(&str, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| MockupError::input("data URI must start with 'data:'"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MockupError::input("data URI is missing its payload"))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| MockupError::input("only base64 data URIs are supported"))?;

    let bytes = decode_base64(payload)
        .map_err(|e| MockupError::input(format!("invalid base64 payload: {e}")))?;
    Ok((mime_type, bytes))
}

/// Decode base64 in either alphabet, with or without padding, ignoring line breaks.
fn decode_base64(data: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    STANDARD_NO_PAD.decode(normalized.trim_end_matches('='))
}

/// Request for one scenario: the product image plus the effective prompt.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub image: &'a ProductImage,
    pub prompt: String,
}

impl<'a> GenerationRequest<'a> {
    pub fn new(image: &'a ProductImage, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
        }
    }

    /// Merge the scenario template with the optional slogan clause.
    pub fn for_scenario(
        image: &'a ProductImage,
        entry: &ScenarioEntry,
        slogan: Option<&str>,
    ) -> Self {
        Self::new(image, effective_prompt(&entry.prompt_template, slogan))
    }
}

/// A generated advertisement image.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl GeneratedImage {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Decode an inline base64 payload returned by the provider.
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> Result<Self> {
        let bytes = decode_base64(data)?;
        Ok(Self::new(bytes, mime_type))
    }

    /// Self-contained `data:<mime>;base64,<payload>` representation.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// File extension matching the MIME type, falling back to `bin`.
    pub fn extension(&self) -> &'static str {
        mime_guess::get_mime_extensions_str(&self.mime_type)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin")
    }
}

/// Emitted once per successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// The generated image as a data URI.
    pub data_uri: String,
    /// The original scenario template, without any slogan clause.
    pub scenario_text: String,
    /// Number of successes before this one (0-based).
    pub success_index: usize,
    /// Catalog position of the scenario that produced this image.
    pub scenario_index: usize,
    /// Success count the batch is aiming for.
    pub target: usize,
}

impl BatchProgress {
    /// 1-based position for "N of total" displays.
    pub fn position(&self) -> usize {
        self.success_index + 1
    }

    /// Decode the data URI back into raw image bytes, e.g. for saving to disk.
    pub fn image(&self) -> Result<GeneratedImage> {
        let (mime_type, bytes) = parse_data_uri(&self.data_uri)?;
        Ok(GeneratedImage::new(bytes, mime_type))
    }
}

/// A scenario that was skipped after exhausting its retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFailure {
    pub scenario_index: usize,
    pub scenario_text: String,
    pub attempts: usize,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Summary of a completed batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub target: usize,
    /// Scenarios attempted, successful or not.
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<ScenarioFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchReport {
    pub fn new(target: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, failure: ScenarioFailure) {
        self.attempted += 1;
        self.failures.push(failure);
    }

    /// True when the batch finished with fewer images than requested.
    ///
    /// This is a degraded outcome, not an error: every image produced was
    /// already delivered to the caller.
    pub fn is_under_target(&self) -> bool {
        self.succeeded < self.target
    }

    /// How many images short of the target the batch ended.
    pub fn shortfall(&self) -> usize {
        self.target.saturating_sub(self.succeeded)
    }
}

/// Items yielded by the streaming form of a batch run.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// A scenario produced an image.
    Generated(BatchProgress),
    /// A scenario failed every attempt and was skipped.
    Skipped(ScenarioFailure),
    /// The batch is over. Always the last event.
    Finished(BatchReport),
}
