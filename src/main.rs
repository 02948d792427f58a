//! labtest - build a course project, run its pass-off cases against the
//! downloaded test bundles, and package a submission on success.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use labtest::build;
use labtest::config::Config;
use labtest::fetch::{ExampleIoSource, PassOffSource};
use labtest::package;
use labtest::runner::CaseRunner;
use labtest::scratch::Scratch;
use labtest::suite::{GroupSource, SuiteAggregator};

#[derive(Parser)]
#[command(
    name = "labtest",
    about = "Build a course project, run its pass-off cases, and package a submission"
)]
struct Cli {
    /// Number of the target project
    project: u32,

    /// Skip CMake detection and always build with g++
    #[arg(short, long)]
    gcc: bool,

    /// Override the test suite time limit in seconds (useful when the
    /// development machine is slower or faster than the grading one)
    #[arg(short, long)]
    time_limit: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("labtest=warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Dropping the in-flight future on Ctrl+C tears the scratch
    // directory down before the process exits.
    let result = tokio::select! {
        result = run(&cli) => result,
        _ = tokio::signal::ctrl_c() => {
            println!();
            tracing::warn!("interrupted; cleaning up");
            package::remove_share_links(std::io::stdin().is_terminal()).ok();
            anyhow::bail!("interrupted")
        }
    };

    if let Err(e) = &result {
        println!();
        println!("{}", format!("{e:#}").red().bold());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(limit) = cli.time_limit {
        config.time_limit_secs = limit;
    }

    // Links from a previous interrupted run must not accumulate; a
    // scripted run keeps them since it may still be consuming the URL
    package::remove_share_links(std::io::stdin().is_terminal()).ok();

    let scratch = Scratch::new()?;

    println!();
    println!("Building and testing project {}", cli.project);

    println!();
    println!("--- Compiling ---");
    println!();
    let artifact = scratch.path().join("project.out");
    if let Err(e) = build::build_artifact(&config, &artifact, cli.gcc).await {
        println!();
        println!("{}", "ERROR: Project failed to compile".red().bold());
        return Err(e.into());
    }

    println!();
    println!("--- Running tests ---");
    println!();
    let limit_kind = if cli.time_limit.is_some() {
        "user-specified"
    } else {
        "default"
    };
    println!(
        "Using {limit_kind} test suite time limit of {} seconds",
        config.time_limit_secs
    );

    let runner = CaseRunner::new(&artifact);
    runner.verify_artifact()?;
    let aggregator = SuiteAggregator::new(&runner, Duration::from_secs_f64(config.slow_case_secs));
    let sources: Vec<Box<dyn GroupSource>> = vec![
        Box::new(ExampleIoSource::new(cli.project, config.clone())),
        Box::new(PassOffSource::new(cli.project, config.clone())),
    ];
    let verdict = aggregator
        .run_suite(
            &sources,
            &scratch,
            Duration::from_secs_f64(config.time_limit_secs),
        )
        .await?;

    println!();
    println!("{}", verdict.status_line());
    println!();

    if !verdict.outcome.is_success() {
        println!(
            "{}",
            "Skipping export due to test errors or warnings".yellow()
        );
        anyhow::bail!("tests failed or exceeded the time limit");
    }

    println!("--- Exporting ---");
    println!();
    let zip_path = package::package_sources(&config.project_dir, cli.project)?;
    let zip_abspath = std::path::absolute(&zip_path)?;
    println!("Writing zip to {}...", zip_abspath.display());
    println!();

    if package::export_available(&config.export_marker).await {
        println!("Detected course network filesystem");
        println!();
        export(&config, &zip_abspath).await?;
    }

    Ok(())
}

/// Publish a temporary download link for the submission zip and hold it
/// open until the operator acknowledges.
async fn export(config: &Config, zip_abspath: &std::path::Path) -> Result<()> {
    println!("Creating temporary link for pass-off zip...");
    let link = package::publish_share_link(config, zip_abspath)?;

    println!();
    println!("{}", link.url.green().bold());
    println!();
    println!("Or copy to your machine with:");
    let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
    println!(
        "scp \"{}@{}:{}\" .",
        user,
        config.export_host,
        zip_abspath.display()
    );
    println!();

    if std::io::stdin().is_terminal() {
        println!("Press enter to continue and delete temporary link... ");
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).ok();
        })
        .await?;
        package::remove_share_links(true)?;
    } else {
        // Leave the link alive so a script can fetch the printed URL
        println!("Reading data from stdin, can't wait for user input");
    }

    Ok(())
}
