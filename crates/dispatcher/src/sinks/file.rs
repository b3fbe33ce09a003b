//! FileSink - records updates as JSON lines, optionally with PNG snapshots

use contracts::{ContractError, DataSink, DisplayImage, DuelUpdate};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory
    pub base_path: PathBuf,

    /// Save every n-th display image as PNG (0 disables snapshots)
    pub snapshot_every: u64,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> std::io::Result<Self> {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        let snapshot_every = match params.get("snapshot_every") {
            Some(raw) => raw.parse().map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("snapshot_every '{raw}': {e}"),
                )
            })?,
            None => 0,
        };

        Ok(Self {
            base_path,
            snapshot_every,
        })
    }
}

/// Sink that appends every update to a session file
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    session_path: PathBuf,
    writer: BufWriter<File>,
    snapshots: u64,
}

impl FileSink {
    /// Create the output directory and open a new session file
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let session_path = config.base_path.join(format!("duel_{stamp}.jsonl"));
        let writer = BufWriter::new(File::create(&session_path)?);
        debug!(path = %session_path.display(), "session file created");

        Ok(Self {
            name: name.into(),
            config,
            session_path,
            writer,
            snapshots: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params)?)
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    fn append(&mut self, update: &DuelUpdate) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, update)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")?;

        if let Some(image) = &update.image {
            if self.config.snapshot_every > 0
                && update.update_id.is_multiple_of(self.config.snapshot_every)
            {
                self.save_snapshot(update.update_id, image)?;
            }
        }
        Ok(())
    }

    fn save_snapshot(&mut self, update_id: u64, image: &DisplayImage) -> std::io::Result<()> {
        if image.pixels.is_empty() {
            return Ok(());
        }

        let dir = self.config.base_path.join("snapshots");
        fs::create_dir_all(&dir)?;

        // BGR32 -> RGBA, padding byte becomes opaque alpha
        let mut rgba = image.pixels.to_vec();
        for pixel in rgba.chunks_exact_mut(4) {
            pixel.swap(0, 2);
            pixel[3] = u8::MAX;
        }

        image::save_buffer(
            dir.join(format!("{update_id:06}.png")),
            &rgba,
            image.format.width,
            image.format.height,
            image::ColorType::Rgba8,
        )
        .map_err(std::io::Error::other)?;

        self.snapshots += 1;
        Ok(())
    }

    fn sink_error(&self, e: std::io::Error) -> ContractError {
        ContractError::sink_write(&self.name, e.to_string())
    }
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, update),
        fields(sink = %self.name, update_id = update.update_id)
    )]
    async fn write(&mut self, update: &DuelUpdate) -> Result<(), ContractError> {
        self.append(update).map_err(|e| self.sink_error(e))
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush().map_err(|e| self.sink_error(e))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.writer.flush().map_err(|e| self.sink_error(e))?;
        debug!(
            sink = %self.name,
            path = %self.session_path.display(),
            snapshots = self.snapshots,
            "FileSink closed"
        );
        Ok(())
    }
}
