//! Training-sample files.
//!
//! A sample file is a plain concatenation of fixed-size
//! [`TrainingSample`] records, appended match by match.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
#[cfg(test)]
use games_photosynthesis::SAMPLE_BYTES;
use games_photosynthesis::TrainingSample;
use tracing::debug;

/// Appends encoded samples to a file.
pub struct SampleWriter {
    path: PathBuf,
    out: BufWriter<File>,
    written: u64,
}

impl SampleWriter {
    /// Open `path` for appending, creating it and its parent directory.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open sample file {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_all(&mut self, samples: &[TrainingSample]) -> Result<()> {
        for sample in samples {
            self.out
                .write_all(&sample.encode())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }
        self.written += samples.len() as u64;
        Ok(())
    }

    /// Samples written through this writer.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> Result<u64> {
        self.out
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        debug!(samples = self.written, path = %self.path.display(), "Sample file flushed");
        Ok(self.written)
    }
}

/// Read every record of a sample file.
#[cfg(test)]
pub fn read_samples(path: &Path) -> Result<Vec<TrainingSample>> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read sample file {}", path.display()))?;

    let mut samples = Vec::with_capacity(bytes.len() / SAMPLE_BYTES);
    for (index, chunk) in bytes.chunks(SAMPLE_BYTES).enumerate() {
        let sample = TrainingSample::decode(chunk)
            .with_context(|| format!("Bad record {} in {}", index, path.display()))?;
        samples.push(sample);
    }
    Ok(samples)
}
