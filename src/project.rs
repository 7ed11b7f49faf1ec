use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::PaintConfig;
use crate::document::Document;
use crate::error::{PaintError, PaintResult};

/// One entry of `layers_metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
}

/// The JSON descriptor written next to the layer images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub layers: Vec<LayerMetadata>,
}

impl ProjectMetadata {
    /// Describe every layer of `document`, bottom to top
    pub fn describe(document: &Document) -> Self {
        Self {
            layers: document
                .layers()
                .iter()
                .map(|layer| LayerMetadata {
                    name: layer.name.clone(),
                    visible: layer.is_visible(),
                    opacity: layer.opacity(),
                })
                .collect(),
        }
    }
}

/// What a save wrote
#[derive(Debug, Clone)]
pub struct SavedProject {
    pub layer_files: Vec<PathBuf>,
    pub metadata_file: PathBuf,
    pub archive_file: PathBuf,
}

impl SavedProject {
    /// Every file bundled into the archive, in archive order
    pub fn archived_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.layer_files.iter().chain(std::iter::once(&self.metadata_file))
    }
}

/// Writes a project: one PNG per layer, the metadata JSON, and a zip of both.
/// Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct ProjectExporter {
    dir: PathBuf,
    metadata_file: String,
    archive_file: String,
    width: u32,
    height: u32,
}

impl ProjectExporter {
    pub fn new(config: &PaintConfig) -> Self {
        Self {
            dir: config.save_dir.clone(),
            metadata_file: config.metadata_file.clone(),
            archive_file: config.archive_file.clone(),
            width: config.canvas_width,
            height: config.canvas_height,
        }
    }

    pub fn save(&self, document: &Document) -> PaintResult<SavedProject> {
        if self.width == 0 || self.height == 0 {
            return Err(PaintError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        fs::create_dir_all(&self.dir)?;

        let mut layer_files = Vec::with_capacity(document.layer_count());
        for (index, layer) in document.layers().iter().enumerate() {
            let path = self.dir.join(format!("layer_{}.png", index));
            layer.export_to_image(&path, self.width, self.height)?;
            layer_files.push(path);
        }

        let metadata = ProjectMetadata::describe(document);
        let metadata_file = self.dir.join(&self.metadata_file);
        fs::write(&metadata_file, serde_json::to_string(&metadata)?)?;

        let saved = SavedProject {
            layer_files,
            metadata_file,
            archive_file: self.dir.join(&self.archive_file),
        };
        write_archive(&saved.archive_file, saved.archived_files())?;

        log::info!(
            "Saved {} layers to {}",
            saved.layer_files.len(),
            saved.archive_file.display()
        );
        Ok(saved)
    }
}

/// Zip `files` under their bare file names
fn write_archive<'a>(archive: &Path, files: impl Iterator<Item = &'a PathBuf>) -> PaintResult<()> {
    let mut zip = ZipWriter::new(File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let Some(name) = path.file_name() else {
            continue;
        };
        zip.start_file(name.to_string_lossy().into_owned(), options)?;
        zip.write_all(&fs::read(path)?)?;
    }

    zip.finish()?;
    Ok(())
}
