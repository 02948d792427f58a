//! Build strategy selection and compilation
//!
//! The project is compiled by the first applicable strategy from a
//! ranked list: a CLion-style CMake build when its configuration is
//! present, otherwise a baseline g++ invocation over the top-level
//! sources. Detection is a heuristic over project files, not part of
//! the test engine.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::config::Config;
use crate::error::{Error, Result};

/// One way of turning the project sources into the executable artifact.
#[async_trait]
pub trait BuildStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the project looks buildable with this strategy.
    fn applicable(&self, project_dir: &Path) -> bool;

    async fn build(&self, config: &Config, artifact: &Path) -> Result<()>;
}

/// Compile the project into `artifact`.
///
/// `force_gcc` skips detection entirely; otherwise the first applicable
/// strategy wins and g++ is the fallback when none apply.
pub async fn build_artifact(config: &Config, artifact: &Path, force_gcc: bool) -> Result<()> {
    let cmake = CmakeBuild;
    let gxx = GxxBuild;

    let strategy: &dyn BuildStrategy = if force_gcc {
        println!("Using g++ compiler (forced by argument)...");
        &gxx
    } else if cmake.applicable(&config.project_dir) {
        &cmake
    } else {
        println!("Using g++ compiler (couldn't find CMake configuration)...");
        &gxx
    };

    tracing::info!(strategy = strategy.name(), "building project");
    strategy.build(config, artifact).await
}

/// Builds through an existing CLion-generated CMake cache.
pub struct CmakeBuild;

impl CmakeBuild {
    /// First `cmake-build-*` directory that carries a CMake cache.
    fn cache_dir(project_dir: &Path) -> Option<PathBuf> {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(project_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_dir()
                    && path
                        .file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with("cmake-build-"))
                    && path.join("CMakeCache.txt").is_file()
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

#[async_trait]
impl BuildStrategy for CmakeBuild {
    fn name(&self) -> &'static str {
        "cmake"
    }

    fn applicable(&self, project_dir: &Path) -> bool {
        project_dir.join("CMakeLists.txt").is_file() && Self::cache_dir(project_dir).is_some()
    }

    async fn build(&self, config: &Config, artifact: &Path) -> Result<()> {
        let build_dir = Self::cache_dir(&config.project_dir).ok_or_else(|| {
            Error::BuildSetup("no cmake-build-* directory with a CMakeCache.txt".to_string())
        })?;

        let cache = std::fs::read_to_string(build_dir.join("CMakeCache.txt"))?;
        let cmake_path = parse_cmake_command(&cache).ok_or_else(|| {
            Error::BuildSetup(format!(
                "couldn't find path to cmake in {}/CMakeCache.txt",
                build_dir.display()
            ))
        })?;

        let lists = std::fs::read_to_string(config.project_dir.join("CMakeLists.txt"))?;
        let project = parse_project_name(&lists).ok_or_else(|| {
            Error::BuildSetup("couldn't find project name in CMakeLists.txt".to_string())
        })?;

        println!("Detected CMake configuration for project {project}");
        println!("Specify -g flag to skip detection and use g++ by default");
        println!();

        let build_dir = std::path::absolute(&build_dir)?;
        let status = Command::new(&cmake_path)
            .arg("--build")
            .arg(&build_dir)
            .arg("--target")
            .arg(&project)
            .arg("--")
            .arg("-j")
            .arg(config.build_jobs.to_string())
            .status()
            .await?;
        if !status.success() {
            return Err(Error::CompileFailed);
        }

        std::fs::copy(build_dir.join(&project), artifact)?;
        Ok(())
    }
}

/// Baseline strategy: `g++ -Wall -Werror -std=c++17 -g` over the
/// top-level `.cpp` files.
pub struct GxxBuild;

#[async_trait]
impl BuildStrategy for GxxBuild {
    fn name(&self) -> &'static str {
        "g++"
    }

    fn applicable(&self, _project_dir: &Path) -> bool {
        true
    }

    async fn build(&self, config: &Config, artifact: &Path) -> Result<()> {
        let mut sources: Vec<PathBuf> = std::fs::read_dir(&config.project_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "cpp")
            })
            .collect();
        sources.sort();
        if sources.is_empty() {
            return Err(Error::BuildSetup(format!(
                "no .cpp sources found in {}",
                config.project_dir.display()
            )));
        }

        let status = Command::new("g++")
            .args(["-Wall", "-Werror", "-std=c++17", "-g"])
            .args(&sources)
            .arg("-o")
            .arg(artifact)
            .status()
            .await?;
        if !status.success() {
            return Err(Error::CompileFailed);
        }
        Ok(())
    }
}

/// Pull the cmake binary path out of a CMakeCache.txt.
fn parse_cmake_command(cache: &str) -> Option<String> {
    cache
        .lines()
        .find(|line| line.starts_with("CMAKE_COMMAND:INTERNAL="))
        .and_then(|line| line.trim().split('=').nth(1))
        .map(|path| path.to_string())
}

/// Pull the project name out of a CMakeLists.txt `project(...)` line.
fn parse_project_name(lists: &str) -> Option<String> {
    let project_re = Regex::new(r"^project\((.*)\)").unwrap();
    lists
        .lines()
        .map(str::trim)
        .find_map(|line| project_re.captures(line))
        .map(|caps| caps[1].to_string())
}
