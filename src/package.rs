//! Source packaging and share-link export
//!
//! Consumes the suite verdict's success: packages the top-level sources
//! into `projectN.zip` and, when the course filesystem is detected,
//! publishes a temporary download link under the user's `public_html`.

use std::io;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use uuid::Uuid;
use zip::write::SimpleFileOptions;

use crate::config::Config;
use crate::error::{Error, Result};

const LINKS_DIR_NAME: &str = "labtest-passoffs";

/// Zip the project's top-level `.h` and `.cpp` files into
/// `projectN.zip`, returning the archive path.
pub fn package_sources(project_dir: &Path, project: u32) -> Result<PathBuf> {
    let zip_path = project_dir.join(format!("project{project}.zip"));

    let mut sources: Vec<PathBuf> = std::fs::read_dir(project_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "h" || ext == "cpp")
        })
        .collect();
    sources.sort();

    let file = std::fs::File::create(&zip_path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for source in &sources {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer
            .start_file(&name, options)
            .map_err(|e| Error::Archive {
                path: zip_path.clone(),
                source: e,
            })?;
        io::copy(&mut std::fs::File::open(source)?, &mut writer)?;
    }
    writer.finish().map_err(|e| Error::Archive {
        path: zip_path.clone(),
        source: e,
    })?;

    tracing::info!(
        archive = %zip_path.display(),
        files = sources.len(),
        "packaged submission"
    );
    Ok(zip_path)
}

/// Capability probe for the share-link export path.
///
/// The course network filesystem mounts home directories from a known
/// host, which `df .` names as the source device.
pub async fn export_available(marker: &str) -> bool {
    let output = Command::new("df").args([".", "--output=source"]).output().await;
    match output {
        Ok(out) if out.status.success() => {
            String::from_utf8_lossy(&out.stdout).contains(marker)
        }
        _ => false,
    }
}

/// A published submission link and where it lives on disk.
pub struct ShareLink {
    pub url: String,
    pub links_dir: PathBuf,
}

/// Copy the submission zip under `~/public_html` with an unguessable
/// name and return the resulting URL.
pub fn publish_share_link(config: &Config, zip_path: &Path) -> Result<ShareLink> {
    let public_html = home_dir()?.join("public_html");
    if !public_html.exists() {
        println!("~/public_html not found, creating...");
        std::fs::create_dir(&public_html)?;
        set_world_accessible(&public_html)?;
    }

    let links_dir = public_html.join(LINKS_DIR_NAME);
    std::fs::create_dir_all(&links_dir)?;

    let file_name = format!("{}.zip", Uuid::new_v4());
    let link_path = links_dir.join(&file_name);
    std::fs::copy(zip_path, &link_path)?;
    set_world_accessible(&link_path)?;

    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    let url = format!(
        "{}/~{}/{}/{}",
        config.share_base_url.trim_end_matches('/'),
        user,
        LINKS_DIR_NAME,
        file_name
    );
    tracing::info!(%url, "published share link");
    Ok(ShareLink { url, links_dir })
}

/// Remove the published-links directory, including anything a previous
/// interrupted run left behind.
///
/// Only removes when `interactive` (stdin is a terminal): a scripted
/// caller never gets a chance to download the zip before exit, so the
/// link must outlive the process for the printed URL to be usable.
pub fn remove_share_links(interactive: bool) -> Result<()> {
    let links_dir = home_dir()?.join("public_html").join(LINKS_DIR_NAME);
    remove_links_dir(&links_dir, interactive)
}

fn remove_links_dir(links_dir: &Path, interactive: bool) -> Result<()> {
    if !links_dir.exists() {
        return Ok(());
    }
    if !interactive {
        tracing::debug!(path = %links_dir.display(), "stdin is not a terminal; leaving share links in place");
        return Ok(());
    }
    std::fs::remove_dir_all(links_dir)?;
    tracing::debug!(path = %links_dir.display(), "removed share links");
    Ok(())
}

fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidConfig("HOME is not set".to_string()))
}

#[cfg(unix)]
fn set_world_accessible(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_world_accessible(_path: &Path) -> Result<()> {
    Ok(())
}
