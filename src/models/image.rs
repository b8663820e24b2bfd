use std::fmt;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output dimensions accepted by the image endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1024x1792")]
    Portrait,
    #[serde(rename = "1792x1024")]
    Landscape,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Square, ImageSize::Portrait, ImageSize::Landscape];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Portrait => "1024x1792",
            ImageSize::Landscape => "1792x1024",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageSize::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| format!("unknown image size '{}'", s))
    }
}

/// Number of images per request. The model only serves one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageCount(u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountError {
    NotANumber,
    Unsupported(i64),
}

impl ImageCount {
    pub const MAX: u8 = 1;

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn new(n: i64) -> Result<Self, CountError> {
        if (1..=Self::MAX as i64).contains(&n) {
            Ok(ImageCount(n as u8))
        } else {
            Err(CountError::Unsupported(n))
        }
    }
}

impl Default for ImageCount {
    fn default() -> Self {
        ImageCount(1)
    }
}

impl fmt::Display for ImageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ImageCount {
    type Err = CountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // integers too large for i64 are still integers, just unsupported ones
        let n: i64 = s.trim().parse().map_err(|e: ParseIntError| match e.kind() {
            IntErrorKind::PosOverflow => CountError::Unsupported(i64::MAX),
            IntErrorKind::NegOverflow => CountError::Unsupported(i64::MIN),
            _ => CountError::NotANumber,
        })?;
        ImageCount::new(n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub size: ImageSize,
    pub count: ImageCount,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, size: ImageSize, count: ImageCount) -> Self {
        Self {
            prompt: prompt.into(),
            size,
            count,
        }
    }
}

/// Body of `POST /images/generations`.
#[derive(Debug, Serialize)]
pub struct ImagesRequestBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: ImageCount,
    pub size: ImageSize,
    pub quality: Quality,
    pub response_format: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
pub struct ImageDatum {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

impl ImagesResponse {
    /// Payloads in response order, skipping items without image data.
    pub fn into_payloads(self) -> Vec<String> {
        self.data
            .into_iter()
            .filter_map(|datum| datum.b64_json)
            .filter(|b64| !b64.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
