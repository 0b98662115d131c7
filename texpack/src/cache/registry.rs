//! Pack scanning and the hash-keyed texture index.
//!
//! The registry is built once per pack. Files are enumerated depth-first,
//! siblings in file-name order, and registered in that order so collisions
//! resolve the same way on every run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::PackConfig;
use crate::texture::{parse_texture_filename, FileFormat, HexHash, TextureDescriptor};

/// Maximum directory nesting followed below the load root.
pub const MAX_SCAN_DEPTH: usize = 64;

/// Counts gathered while scanning a pack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Files seen during enumeration.
    pub files: usize,
    /// Descriptors added to the index.
    pub registered: usize,
    /// Files with no resolvable hash or an unknown extension.
    pub skipped: usize,
    /// Files dropped because their hash was already registered.
    pub collisions: usize,
    /// A legacy pack contained a compressed container; nothing was registered.
    pub aborted: bool,
}

/// Owning collection of descriptors plus the hash index.
///
/// Read-only after [`TextureRegistry::scan`] returns.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    textures: Vec<Arc<TextureDescriptor>>,
    index: HashMap<u64, usize>,
}

impl TextureRegistry {
    /// Scan `root` and build the index.
    ///
    /// A missing root yields an empty registry.
    pub fn scan(root: &Path, config: &PackConfig) -> (Self, ScanReport) {
        let mut report = ScanReport::default();
        let mut registry = Self::default();

        let mut files = Vec::new();
        collect_files_recursive(root, 0, &mut files);
        report.files = files.len();

        let legacy = config.options().legacy_pack();
        let mut candidates = Vec::with_capacity(files.len());

        for path in files {
            let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
                report.skipped += 1;
                continue;
            };

            // Explicit bindings win over the canonical name; only the hash is
            // taken from them, dimensions come from the decoded file.
            let (hash, width, height) = match config.hash_for(filename) {
                Some(hash) => (hash, 0, 0),
                None => match parse_texture_filename(filename) {
                    Ok(name) => (name.hash, name.width, name.height),
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Skipping non-texture file");
                        report.skipped += 1;
                        continue;
                    }
                },
            };

            let Some(file_format) = FileFormat::from_path(&path) else {
                warn!(path = %path.display(), "Unknown file extension, skipping");
                report.skipped += 1;
                continue;
            };

            if file_format.is_compressed() && legacy {
                error!(
                    path = %path.display(),
                    format = %file_format,
                    "Legacy pack is attempting to use compressed textures, aborting scan"
                );
                report.aborted = true;
                return (Self::default(), report);
            }

            candidates.push(TextureDescriptor::new(hash, file_format, path, width, height));
        }

        for descriptor in candidates {
            if let Some(&existing) = registry.index.get(&descriptor.hash()) {
                error!(
                    hash = %HexHash(descriptor.hash()),
                    kept = %registry.textures[existing].path().display(),
                    ignored = %descriptor.path().display(),
                    "Textures conflict, ignoring"
                );
                report.collisions += 1;
                continue;
            }

            registry
                .index
                .insert(descriptor.hash(), registry.textures.len());
            registry.textures.push(Arc::new(descriptor));
        }
        report.registered = registry.textures.len();

        info!(
            root = %root.display(),
            registered = report.registered,
            skipped = report.skipped,
            collisions = report.collisions,
            "Custom texture scan complete"
        );

        (registry, report)
    }

    /// Descriptor registered for `hash`.
    pub fn get(&self, hash: u64) -> Option<&Arc<TextureDescriptor>> {
        self.index.get(&hash).map(|&i| &self.textures[i])
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TextureDescriptor>> {
        self.textures.iter()
    }

    /// All descriptors in registration order.
    pub fn textures(&self) -> &[Arc<TextureDescriptor>] {
        &self.textures
    }
}

/// Collect regular files below `dir`, siblings sorted by name.
fn collect_files_recursive(dir: &Path, depth: usize, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && depth == 0 => {
            debug!(path = %dir.display(), "Pack directory does not exist");
            return;
        }
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Unable to read directory, skipping");
            return;
        }
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if depth + 1 < MAX_SCAN_DEPTH {
                collect_files_recursive(&path, depth + 1, files);
            } else {
                warn!(path = %path.display(), "Maximum scan depth reached, not descending");
            }
        } else if path.is_file() {
            files.push(path);
        }
    }
}
