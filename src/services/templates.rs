use crate::models::Template;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use thiserror::Error;

/// File extensions accepted as template images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template image not found: {0}")]
    NotFound(Utf8PathBuf),

    #[error("failed to decode template image {path}: {source}")]
    Decode {
        path: Utf8PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("template image {0} has no pixels")]
    Empty(Utf8PathBuf),

    #[error("failed to read images directory {path}: {source}")]
    ReadDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no template images to scan for")]
    NoTemplates,
}

/// Ordered set of decoded templates keyed by path (no duplicates).
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: IndexMap<Utf8PathBuf, Template>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless a template with the same path is already present.
    /// Returns whether it was added.
    pub fn insert(&mut self, template: Template) -> bool {
        if self.templates.contains_key(&template.path) {
            return false;
        }
        self.templates.insert(template.path.clone(), template);
        true
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }
}

impl FromIterator<Template> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = Template>>(iter: I) -> Self {
        let mut set = TemplateSet::new();
        for template in iter {
            set.insert(template);
        }
        set
    }
}

pub fn is_image_file(path: &Utf8Path) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Decode one template as grayscale.
pub fn load_template(path: &Utf8Path) -> Result<Template, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::NotFound(path.to_path_buf()));
    }

    let image = image::open(path)
        .map_err(|source| TemplateError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .into_luma8();

    if image.width() == 0 || image.height() == 0 {
        return Err(TemplateError::Empty(path.to_path_buf()));
    }

    let resolved = path.canonicalize_utf8().unwrap_or_else(|_| path.to_path_buf());
    let name = path.file_name().unwrap_or(path.as_str()).to_string();

    tracing::debug!(
        "Loaded template {} ({}x{})",
        resolved,
        image.width(),
        image.height()
    );

    Ok(Template::new(name, resolved, image))
}

/// Load the primary template and, optionally, every image in `images_dir`.
///
/// The primary image must exist and decode. Directory entries are scanned
/// non-recursively in file-name order; ones that fail to decode are skipped
/// with a warning.
pub fn load_templates(
    primary: &Utf8Path,
    images_dir: Option<&Utf8Path>,
) -> Result<TemplateSet, TemplateError> {
    let mut set = TemplateSet::new();
    set.insert(load_template(primary)?);

    if let Some(dir) = images_dir {
        if dir.is_dir() {
            for path in image_files_in(dir)? {
                match load_template(&path) {
                    Ok(template) => {
                        set.insert(template);
                    }
                    Err(e) => tracing::warn!("Skipping template: {}", e),
                }
            }
        } else {
            tracing::warn!("Images directory {} does not exist, ignoring", dir);
        }
    }

    if set.is_empty() {
        return Err(TemplateError::NoTemplates);
    }

    Ok(set)
}

fn image_files_in(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, TemplateError> {
    let read_dir = |source: std::io::Error| TemplateError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in dir.read_dir_utf8().map_err(read_dir)? {
        let entry = entry.map_err(read_dir)?;
        let path = entry.path().to_path_buf();
        if path.is_file() && is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}
