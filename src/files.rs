use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::ImageFormat;

use crate::error::CatalogError;

/// Whether the image library can decode this file, judged by its name.
pub fn is_supported_image(path: &Path) -> bool {
    ImageFormat::from_path(path)
        .map(|fmt| fmt.reading_enabled())
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Catalog: the sorted image list of one directory
// ---------------------------------------------------------------------------

pub struct Catalog {
    dir: PathBuf,
    names: Vec<String>,
}

impl Catalog {
    /// Scan `dir` (not recursively) for decodable images.
    pub fn scan(dir: &Path) -> Result<Self, CatalogError> {
        let start_time = Instant::now();
        log::info!("Opening directory: {}", dir.display());

        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Unreadable {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let p = entry.path();
            if !p.is_file() || !is_supported_image(&p) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("Skipping non UTF-8 file name {:?}", raw),
            }
        }
        names.sort();

        log::info!(
            "Scan complete in {:.2}s. Found {} images.",
            start_time.elapsed().as_secs_f64(),
            names.len()
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    pub fn path(&self, idx: usize) -> Option<PathBuf> {
        self.names.get(idx).map(|n| self.dir.join(n))
    }
}
