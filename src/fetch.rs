//! Test bundle acquisition
//!
//! Group sources that download the course test bundles (when not already
//! sitting next to the project), extract them into scratch, and discover
//! their case groups.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::Config;
use crate::discovery;
use crate::error::{Error, Result};
use crate::scratch::Scratch;
use crate::suite::{CaseGroup, GroupSource};

/// The `projectN-exampleIO.zip` bundle: one flat group with `in`/`out`
/// prefixed case files.
pub struct ExampleIoSource {
    project: u32,
    config: Config,
}

impl ExampleIoSource {
    pub fn new(project: u32, config: Config) -> Self {
        Self { project, config }
    }
}

#[async_trait]
impl GroupSource for ExampleIoSource {
    async fn produce(&self, scratch: &Scratch) -> Result<Vec<CaseGroup>> {
        let bundle_name = format!("project{}-exampleIO.zip", self.project);
        let bundle = ensure_bundle(&self.config, &bundle_name).await?;

        let dir = scratch.subdir("exampleio")?;
        extract_zip(&bundle, &dir)?;

        Ok(vec![CaseGroup {
            name: "example IO".to_string(),
            cases: discovery::discover(&dir, "in", "out")?,
        }])
    }
}

/// The `LabNPassOffCases.zip` bundle: one subdirectory per percentage
/// tier, each a group with `input`/`answer` prefixed case files.
pub struct PassOffSource {
    project: u32,
    config: Config,
}

impl PassOffSource {
    pub fn new(project: u32, config: Config) -> Self {
        Self { project, config }
    }
}

#[async_trait]
impl GroupSource for PassOffSource {
    async fn produce(&self, scratch: &Scratch) -> Result<Vec<CaseGroup>> {
        let bundle_name = format!("Lab{}PassOffCases.zip", self.project);
        let bundle = ensure_bundle(&self.config, &bundle_name).await?;

        let dir = scratch.subdir("passoff")?;
        extract_zip(&bundle, &dir)?;

        let mut tier_dirs: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        tier_dirs.sort_by_key(|path| {
            let dir_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tier_sort_key(&dir_name)
        });

        let mut groups = Vec::with_capacity(tier_dirs.len());
        for tier_dir in tier_dirs {
            let dir_name = tier_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            groups.push(CaseGroup {
                name: format!("{}% pass-off", tier_label(&dir_name)),
                cases: discovery::discover(&tier_dir, "input", "answer")?,
            });
        }
        Ok(groups)
    }
}

/// Tier directories are named `<lab>-<percent>`; fall back to the whole
/// directory name when the convention doesn't hold.
fn tier_label(dir_name: &str) -> &str {
    dir_name.split('-').nth(1).unwrap_or(dir_name)
}

/// Order tiers by ascending percent, as operators read them; names
/// without a numeric tier sort last, lexicographically.
fn tier_sort_key(dir_name: &str) -> (u32, String) {
    let percent = tier_label(dir_name).parse().unwrap_or(u32::MAX);
    (percent, dir_name.to_string())
}

/// Locate a bundle next to the project, downloading it first if absent.
/// The download lands beside the project so later runs skip it.
async fn ensure_bundle(config: &Config, file_name: &str) -> Result<PathBuf> {
    let path = config.project_dir.join(file_name);
    if path.exists() {
        tracing::debug!(bundle = file_name, "bundle already present");
        return Ok(path);
    }

    let url = config.bundle_url(file_name);
    println!();
    println!("{file_name} not found, downloading...");
    println!();
    tracing::info!(%url, "downloading test bundle");

    let bytes = reqwest::get(&url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| Error::Download {
            url: url.clone(),
            source: e,
        })?
        .bytes()
        .await
        .map_err(|e| Error::Download {
            url: url.clone(),
            source: e,
        })?;
    // Stage next to the final path and rename so an interrupted write
    // never leaves a truncated zip that later runs mistake for a bundle
    let staged = tempfile::NamedTempFile::new_in(&config.project_dir)?;
    tokio::fs::write(staged.path(), &bytes).await?;
    staged.persist(&path).map_err(|e| Error::Io(e.error))?;
    Ok(path)
}

/// Extract a zip bundle into `dest`.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::Archive {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    archive.extract(dest).map_err(|e| Error::Archive {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(
        archive = %archive_path.display(),
        dest = %dest.display(),
        "extracted bundle"
    );
    Ok(())
}
