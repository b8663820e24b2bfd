use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Local, TimeZone};

use crate::error::Result;

pub const BATCH_PREFIX: &str = "image";
const BATCH_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes decoded image batches into one output directory.
///
/// Files from the same batch share `image_<YYYYMMDD_HHMMSS>` and differ by a
/// 1-based index. Two batches persisted within the same second reuse the same
/// prefix and overwrite each other.
#[derive(Debug, Clone)]
pub struct ImageStore {
    output_dir: PathBuf,
}

impl ImageStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn persist(&self, payloads: &[String]) -> Result<Vec<PathBuf>> {
        self.persist_at(payloads, Local::now())
    }

    /// Decodes and writes every payload in order. Stops at the first failure;
    /// files already written are left in place.
    pub fn persist_at<Tz>(&self, payloads: &[String], at: DateTime<Tz>) -> Result<Vec<PathBuf>>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        fs::create_dir_all(&self.output_dir)?;

        let batch = batch_name(&at);
        let mut saved = Vec::with_capacity(payloads.len());
        for (i, payload) in payloads.iter().enumerate() {
            let bytes = STANDARD.decode(payload.trim())?;
            let path = self.output_dir.join(format!("{}_{}.png", batch, i + 1));
            fs::write(&path, &bytes)?;
            log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
            saved.push(path);
        }
        Ok(saved)
    }
}

pub fn batch_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}", BATCH_PREFIX, at.format(BATCH_TIME_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageGenError;
    use base64::Engine as _;
    use chrono::Utc;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
    }

    #[test]
    fn test_batch_name_format() {
        assert_eq!(batch_name(&fixed_time()), "image_20240307_090502");
    }

    #[test]
    fn test_persist_writes_indexed_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let originals: Vec<Vec<u8>> = vec![
            b"\x89PNG\r\n\x1a\nfirst".to_vec(),
            b"\x89PNG\r\n\x1a\nsecond".to_vec(),
            vec![0u8, 255, 17, 42],
        ];
        let payloads: Vec<String> = originals.iter().map(|b| STANDARD.encode(b)).collect();

        let saved = store.persist_at(&payloads, fixed_time()).unwrap();

        assert_eq!(saved.len(), 3);
        for (i, path) in saved.iter().enumerate() {
            assert_eq!(
                path.file_name().unwrap().to_str().unwrap(),
                format!("image_20240307_090502_{}.png", i + 1)
            );
            assert_eq!(fs::read(path).unwrap(), originals[i]);
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_persist_creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("generated_images");
        let store = ImageStore::new(&nested);

        let saved = store
            .persist_at(&[STANDARD.encode("png")], fixed_time())
            .unwrap();

        assert!(nested.is_dir());
        assert_eq!(saved, vec![nested.join("image_20240307_090502_1.png")]);

        // idempotent on an existing directory
        assert!(store.persist_at(&[], fixed_time()).unwrap().is_empty());
    }

    #[test]
    fn test_bad_payload_fails_batch_and_keeps_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let payloads = vec![STANDARD.encode("ok"), "not base64!!".to_string()];

        let err = store.persist_at(&payloads, fixed_time()).unwrap_err();

        assert!(matches!(err, ImageGenError::Decode(_)));
        assert!(dir.path().join("image_20240307_090502_1.png").exists());
        assert!(!dir.path().join("image_20240307_090502_2.png").exists());
    }

    #[test]
    fn test_unwritable_output_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"file, not a dir").unwrap();
        let store = ImageStore::new(&blocker);

        let err = store
            .persist_at(&[STANDARD.encode("png")], fixed_time())
            .unwrap_err();
        assert!(matches!(err, ImageGenError::Io(_)));
    }
}
