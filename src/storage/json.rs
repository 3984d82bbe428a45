use std::path::{Path, PathBuf};
use serde::Serialize;
use tokio::fs::File as TokioFile;
use tokio::io::{AsyncWriteExt, BufWriter as TokioBufWriter};
use tracing::info;
use crate::error::Result;
use crate::models::Report;

/// Pretty JSON document for `--format json`.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes serialized reports under one output directory.
pub struct JsonWriter {
    output_dir: PathBuf,
}

impl JsonWriter {
    pub async fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&output_dir).await?;
        Ok(Self { output_dir })
    }

    pub async fn write_report(&self, filename: &str, report: &Report) -> Result<PathBuf> {
        let path = self.output_dir.join(filename);
        let file = TokioFile::create(&path).await?;
        let mut writer = TokioBufWriter::new(file);

        let json = serde_json::to_vec_pretty(report)?;
        writer.write_all(&json).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        info!(
            path = %path.display(),
            groups = report.grouped_count,
            "Report JSON written"
        );
        Ok(path)
    }
}
