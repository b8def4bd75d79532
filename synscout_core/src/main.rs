/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Syn-Scout. Loads the Java download page,
    extracts the current release and folds it into the
    versioned `Java.json` archive.

  Security / Safety Notes:
    Operates within user privileges. Launches a headless
    browser or performs HTTPS GET requests only.

  Dependencies:
    clap for CLI parsing, chrono for timestamps, tokio runtime.

  Operational Scope:
    Invoked on a schedule by an external trigger, or manually
    when operators need to refresh the archive.

  Revision History:
    2025-10-28 COD  Authored Syn-Syu Core runtime.
    2025-11-12 COD  Repurposed as Syn-Scout release tracker.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod archive;
mod browser;
mod config;
mod error;
mod extract;
mod fetch;
mod http;
mod logger;
mod release;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use archive::{load_archive, merge_release, write_archive, LoadOutcome, MergeOptions, MergeOutcome};
use config::{validate_source_url, FetchBackend, SynscoutConfig};
use error::Result;
use extract::{Java8PageExtractor, ReleaseExtractor};
use fetch::{build_fetcher, fetch_page, PageFetcher};
use logger::{session_log_path, Logger};
use release::{Platform, ReleaseRecord};

/// Command-line arguments for Syn-Scout.
#[derive(Debug, Parser)]
#[command(
    name = "syn-scout",
    version,
    author = "Synavera Systems",
    about = "Java release tracker for the Synavera archive"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Directory receiving the archive document.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Update latest even when the version is unchanged.
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
    /// Override the download page URL.
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// Page loading backend.
    #[arg(long, value_enum, value_name = "BACKEND")]
    backend: Option<FetchBackend>,
    /// Extract from a saved HTML snapshot instead of fetching.
    #[arg(long, value_name = "PATH")]
    html_file: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Do not write the archive; emit summary only.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Syn-Scout] {}", err);
            err.exit_code()
        }
    }
}

/// Per-run inputs resolved from the CLI and configuration.
struct RunPlan {
    source_url: String,
    archive_path: PathBuf,
    product: String,
    force: bool,
    dry_run: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunResult {
    Unchanged,
    Written,
    DryRun,
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let started = Utc::now();

    let config = SynscoutConfig::load_from_optional_path(cli.config.as_deref())?;
    let source_url = match &cli.url {
        Some(url) => {
            validate_source_url(url)?;
            url.trim().to_string()
        }
        None => config.source.url.clone(),
    };
    let plan = RunPlan {
        source_url,
        archive_path: config.archive_path(cli.output_dir.as_deref()),
        product: config.source.product.clone(),
        force: cli.force,
        dry_run: cli.dry_run,
    };
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| session_log_path(&config.log_dir(), started));
    let logger = Logger::new(Some(log_path), cli.verbose)?;
    logger.info("INIT", "Syn-Scout awakening.");

    let backend = cli.backend.unwrap_or(config.fetcher.backend);
    let outcome = match build_fetcher(&config, backend, cli.html_file.clone()) {
        Ok(fetcher) => scout(fetcher.as_ref(), &plan, &logger).await,
        Err(err) => Err(err.into()),
    };
    if let Err(err) = &outcome {
        logger.error("ABORT", err.to_string());
    }
    logger.finalize()?;
    outcome.map(|_| ExitCode::SUCCESS)
}

async fn scout(fetcher: &dyn PageFetcher, plan: &RunPlan, logger: &Logger) -> Result<RunResult> {
    let html = fetch_page(fetcher, &plan.source_url, logger).await?;

    let release = Java8PageExtractor.extract(&html)?;
    log_release(&release, logger);

    let archive_path = plan.archive_path.as_path();
    let existing = match load_archive(archive_path) {
        LoadOutcome::Missing => {
            logger.info(
                "ARCHIVE",
                format!("No archive at {}; starting fresh", archive_path.display()),
            );
            None
        }
        LoadOutcome::Loaded(document) => Some(document),
        LoadOutcome::Corrupt(err) => {
            logger.warn("ARCHIVE", format!("{err}; starting a fresh document"));
            None
        }
    };

    let options = MergeOptions {
        product: plan.product.clone(),
        source_url: plan.source_url.clone(),
        force: plan.force,
    };
    let outcome = merge_release(existing, release, &options, Utc::now());

    if !outcome.changed {
        logger.info(
            "UNCHANGED",
            format!(
                "Latest already {}; nothing to write",
                outcome.document.latest_version().unwrap_or("-")
            ),
        );
        return Ok(RunResult::Unchanged);
    }
    if let Some(version) = &outcome.archived {
        logger.info("HISTORY", format!("Archived previous release {version}"));
    }

    let result = if plan.dry_run {
        print_summary(&outcome);
        RunResult::DryRun
    } else {
        write_archive(&outcome.document, archive_path)?;
        logger.info(
            "ARCHIVE",
            format!("Archive written to {}", archive_path.display()),
        );
        RunResult::Written
    };
    logger.info("COMPLETE", "Release archive synchronised.");
    Ok(result)
}

fn log_release(release: &ReleaseRecord, logger: &Logger) {
    logger.info(
        "RELEASE",
        format!(
            "version={} released={} downloads={}",
            release.version,
            release.release_date.as_deref().unwrap_or("unknown"),
            release.downloads.len()
        ),
    );
    let missing: Vec<&str> = Platform::ALL
        .iter()
        .filter(|platform| !release.downloads.contains_key(*platform))
        .map(|platform| platform.key())
        .collect();
    if !missing.is_empty() {
        logger.debug(
            "PLATFORMS",
            format!("No download found for: {}", missing.join(", ")),
        );
    }
}

fn print_summary(outcome: &MergeOutcome) {
    let document = &outcome.document;
    println!(
        "→ Archive dry-run. Latest={} History={} Archived={}",
        document.latest_version().unwrap_or("-"),
        document.versions.len(),
        outcome.archived.as_deref().unwrap_or("none")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveDocument;
    use crate::error::{ExtractionError, SynscoutError};
    use crate::fetch::FileFetcher;
    use std::path::Path;

    const URL: &str = "https://www.java.com/en/download/manual.jsp";

    fn fixture_fetcher() -> FileFetcher {
        FileFetcher::new(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/java_manual.html"
        )))
    }

    fn plan(dir: &Path, dry_run: bool) -> RunPlan {
        RunPlan {
            source_url: URL.to_string(),
            archive_path: dir.join("Java.json"),
            product: "Java".to_string(),
            force: false,
            dry_run,
        }
    }

    fn read_document(path: &Path) -> ArchiveDocument {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn corrupt_archive_is_replaced_by_fresh_document() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path(), false);
        std::fs::write(&plan.archive_path, "{\"product\": \"Java\", ").unwrap();

        let result = scout(&fixture_fetcher(), &plan, &Logger::quiet())
            .await
            .unwrap();
        assert_eq!(result, RunResult::Written);

        let document = read_document(&plan.archive_path);
        assert_eq!(document.latest_version(), Some("8u471"));
        assert_eq!(document.source_url, URL);
        assert!(document.versions.is_empty());
    }

    #[tokio::test]
    async fn unchanged_release_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path(), false);
        let logger = Logger::quiet();

        let first = scout(&fixture_fetcher(), &plan, &logger).await.unwrap();
        assert_eq!(first, RunResult::Written);
        let bytes = std::fs::read(&plan.archive_path).unwrap();
        let modified = std::fs::metadata(&plan.archive_path)
            .unwrap()
            .modified()
            .unwrap();

        let second = scout(&fixture_fetcher(), &plan, &logger).await.unwrap();
        assert_eq!(second, RunResult::Unchanged);
        assert_eq!(std::fs::read(&plan.archive_path).unwrap(), bytes);
        assert_eq!(
            std::fs::metadata(&plan.archive_path)
                .unwrap()
                .modified()
                .unwrap(),
            modified
        );
    }

    #[tokio::test]
    async fn dry_run_creates_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path(), true);

        let result = scout(&fixture_fetcher(), &plan, &Logger::quiet())
            .await
            .unwrap();
        assert_eq!(result, RunResult::DryRun);
        assert!(!plan.archive_path.exists());
    }

    #[tokio::test]
    async fn page_without_version_exits_with_extraction_code() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("page.html");
        let filler = "<p>Java downloads are temporarily unavailable.</p>".repeat(10);
        std::fs::write(&snapshot, format!("<html><body>{filler}</body></html>")).unwrap();
        let plan = plan(dir.path(), false);

        let err = scout(&FileFetcher::new(snapshot), &plan, &Logger::quiet())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SynscoutError::Extraction(ExtractionError::MissingVersion)
        ));
        assert_eq!(err.code(), 35);
        assert!(!plan.archive_path.exists());
    }
}
