use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::downloader::FetchRequest;

pub const DEFAULT_BASE_DIR: &str = "public/images";

const SEED_SERVICE: &str = "https://picsum.photos/seed";

const DETAIL_PROJECTS: [&str; 2] = ["e-commerce-platform", "data-visualization-dashboard"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render manifest: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid manifest: {message}")]
    Invalid { message: String },
}

/// Top-level manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Root that every group directory is resolved against.
    pub base_dir: PathBuf,
    /// Fetches in flight at once. 1 keeps the run strictly sequential.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Overall per-request timeout; unset leaves the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Printed once the batch is done.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, rename = "group")]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub title: String,
    /// Relative to `base_dir` unless absolute. Unset means `base_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    #[serde(default, rename = "image")]
    pub images: Vec<ImageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ImageEntry {
    pub fn new(url: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: Some(filename.into()),
        }
    }
}

fn default_jobs() -> usize {
    1
}

/// URL of the deterministic placeholder image for `seed`.
pub fn seed_url(seed: &str, width: u32, height: u32) -> String {
    format!("{SEED_SERVICE}/{seed}/{width}/{height}")
}

impl Manifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = Self::from_toml_str(&data)?;
        tracing::debug!(path = %path.display(), groups = manifest.groups.len(), "loaded manifest");
        Ok(manifest)
    }

    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let manifest: Manifest = toml::from_str(data)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The portfolio image set: project thumbnails and detail shots under
    /// `projects/`, and the profile, hero and wood textures in the base dir.
    pub fn portfolio(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();

        let thumbnails = (1..=6)
            .map(|i| {
                ImageEntry::new(
                    seed_url(&format!("project{i}"), 600, 400),
                    format!("project{i}.jpg"),
                )
            })
            .collect();

        let details = iproduct!(DETAIL_PROJECTS, 1..=3)
            .map(|(project, i)| {
                ImageEntry::new(
                    seed_url(&format!("{project}-detail{i}"), 800, 600),
                    format!("{project}-detail{i}.jpg"),
                )
            })
            .collect();

        let others = vec![
            ImageEntry::new(seed_url("profile", 500, 600), "profile.jpg"),
            ImageEntry::new(seed_url("hero", 1920, 1080), "hero-bg.jpg"),
            ImageEntry::new(seed_url("wood-dark", 1000, 100), "wood-texture-dark.png"),
            ImageEntry::new(seed_url("wood-light", 1000, 100), "wood-texture-light.png"),
        ];

        let notes = vec![
            format!(
                "For the logo, please create your own at {}",
                base_dir.join("logo.png").display()
            ),
            "You can use tools like Canva or Figma to create a simple logo".to_string(),
        ];

        Manifest {
            base_dir,
            jobs: default_jobs(),
            timeout_secs: None,
            notes,
            groups: vec![
                Group {
                    title: "project thumbnails".to_string(),
                    directory: Some(PathBuf::from("projects")),
                    images: thumbnails,
                },
                Group {
                    title: "project detail images".to_string(),
                    directory: Some(PathBuf::from("projects")),
                    images: details,
                },
                Group {
                    title: "other required images".to_string(),
                    directory: None,
                    images: others,
                },
            ],
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::Invalid {
                message: "jobs must be at least 1".to_string(),
            });
        }

        for group in &self.groups {
            for image in &group.images {
                if image.url.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        message: format!("empty url in group '{}'", group.title),
                    });
                }

                // The HTTP layer has the final say; this only flags likely typos early.
                if let Err(e) = url::Url::parse(&image.url) {
                    tracing::warn!(url = %image.url, error = %e, "url does not parse");
                }
            }
        }

        Ok(())
    }

    pub fn group_directory(&self, group: &Group) -> PathBuf {
        match &group.directory {
            Some(directory) => self.base_dir.join(directory),
            None => self.base_dir.clone(),
        }
    }

    /// Every group title with its fetch requests, in manifest order.
    pub fn requests_by_group(&self) -> Vec<(String, Vec<FetchRequest>)> {
        self.groups
            .iter()
            .map(|group| {
                let directory = self.group_directory(group);
                let requests = group
                    .images
                    .iter()
                    .map(|image| FetchRequest {
                        source_url: image.url.clone(),
                        destination_directory: directory.clone(),
                        filename: image.filename.clone(),
                    })
                    .collect();

                (group.title.clone(), requests)
            })
            .collect()
    }

    /// Every directory a run may write into, base dir first.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut directories = vec![self.base_dir.clone()];

        for group in &self.groups {
            let directory = self.group_directory(group);
            if !directories.contains(&directory) {
                directories.push(directory);
            }
        }

        directories
    }
}
