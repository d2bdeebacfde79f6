//! File rotation management for the logger

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Zoned;
use jiff::civil::Date;

use crate::logger::config::{RotationConfig, RotationStrategy};
use crate::logger::error::LoggerError;

/// Decides when the active file rotates and prunes old rotations
pub struct RotationManager {
    config: RotationConfig,
    /// Local calendar day the active file was opened on
    current_day: Date,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            current_day: Zoned::now().date(),
        }
    }

    /// Check if rotation should occur before the next write
    pub fn should_rotate(&self, current_file_size: u64) -> bool {
        match self.config.strategy {
            RotationStrategy::Size => current_file_size >= self.config.max_size,
            RotationStrategy::Daily => {
                current_file_size > 0 && Zoned::now().date() != self.current_day
            }
        }
    }

    /// Rename the active file aside and prune old rotations
    pub fn rotate(&mut self, current_path: &Path) -> Result<PathBuf, LoggerError> {
        let rotated_path = self.generate_rotated_path(current_path);

        if current_path.exists() {
            fs::rename(current_path, &rotated_path)?;
        }

        self.current_day = Zoned::now().date();
        self.cleanup_old_files(current_path)?;

        Ok(rotated_path)
    }

    /// `app.log` becomes `app.20261016_093000.log`; a numeric suffix keeps
    /// rotations within the same second apart.
    fn generate_rotated_path(&self, base_path: &Path) -> PathBuf {
        let timestamp = Zoned::now().strftime("%Y%m%d_%H%M%S").to_string();
        let stem = base_path.file_stem().unwrap_or_default().to_string_lossy();
        let ext = base_path.extension().unwrap_or_default().to_string_lossy();

        let name_for = |suffix: usize| {
            let stamp = if suffix == 0 {
                timestamp.clone()
            } else {
                format!("{}-{}", timestamp, suffix)
            };
            if ext.is_empty() {
                format!("{}.{}", stem, stamp)
            } else {
                format!("{}.{}.{}", stem, stamp, ext)
            }
        };

        let mut suffix = 0;
        let mut candidate = base_path.with_file_name(name_for(suffix));
        while candidate.exists() {
            suffix += 1;
            candidate = base_path.with_file_name(name_for(suffix));
        }
        candidate
    }

    /// Keep at most `max_files` rotated files, removing the oldest first
    fn cleanup_old_files(&self, base_path: &Path) -> Result<(), LoggerError> {
        let parent = match base_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let stem = base_path.file_stem().unwrap_or_default().to_string_lossy();
        let prefix = format!("{}.", stem);
        let active_name = base_path.file_name().unwrap_or_default();

        let mut rotated_files: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                let name = path.file_name().unwrap_or_default();
                name != active_name && name.to_string_lossy().starts_with(&prefix)
            })
            .collect();

        if rotated_files.len() <= self.config.max_files {
            return Ok(());
        }

        rotated_files.sort_by(|a, b| {
            let a_time = fs::metadata(a).and_then(|m| m.modified()).ok();
            let b_time = fs::metadata(b).and_then(|m| m.modified()).ok();
            a_time.cmp(&b_time).then_with(|| a.cmp(b))
        });

        let excess = rotated_files.len() - self.config.max_files;
        for path in rotated_files.into_iter().take(excess) {
            fs::remove_file(&path)?;
        }

        Ok(())
    }
}
