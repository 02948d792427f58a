//! Local build-and-test harness for compiled course projects.
//!
//! Compiles the project in the current directory, runs the downloaded
//! example-IO and pass-off case bundles against the built executable,
//! rolls the per-case results up into a single suite verdict against a
//! wall-clock budget, and on success packages the sources into a
//! submittable zip.

pub mod build;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod package;
pub mod runner;
pub mod scratch;
pub mod suite;
pub mod verdict;
