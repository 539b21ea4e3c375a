use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::artifacts::store::{ArtifactStore, FsArtifactStore};
use crate::browser::session::BrowserSession;
use crate::cli::config::AppConfig;
use crate::error::ProbeError;
use crate::exec::model::TestRunRecord;
use crate::report::console::format_console_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::RunReport;
use crate::run::coordinator::{RunCoordinator, run_id};

// ============================================================================
// discover subcommand
// ============================================================================

/// Discover a page and emit its element list as JSON.
pub fn cmd_discover(
    config: &AppConfig,
    url: &str,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = BrowserSession::launch(&config.browser)?;
    let artifacts = FsArtifactStore::new(&config.artifacts.directory);
    let mut coordinator = RunCoordinator::new(session, config.engine.clone(), &artifacts);

    let discovery = coordinator.discover(url)?;
    coordinator.finish()?;

    let json = serde_json::to_string_pretty(&discovery).map_err(|source| {
        ProbeError::JsonSerialize {
            context: "discovery result".to_string(),
            source,
        }
    })?;
    write_or_print(output, &json)?;

    eprintln!(
        "Discovered {} elements on {}",
        discovery.elements.len(),
        discovery.url
    );
    Ok(())
}

// ============================================================================
// run subcommand
// ============================================================================

/// Run a record's tests and return whether all passed.
pub fn cmd_run(
    config: &AppConfig,
    record_path: &str,
    format: &str,
    output: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let record = load_record(record_path)?;

    if record.tests.is_empty() {
        eprintln!("No tests found in: {}", record_path);
        return Ok(true);
    }

    let artifacts = FsArtifactStore::new(&config.artifacts.directory);
    let session = BrowserSession::launch(&config.browser)?;
    let mut coordinator = RunCoordinator::new(session, config.engine.clone(), &artifacts);

    let id = run_id(&record.url);
    let start = Instant::now();
    let results = coordinator.execute_as(&record, &id);
    let duration = start.elapsed().as_millis();
    coordinator.finish()?;

    let report = RunReport::from_results(&record.url, results).with_duration(duration);
    let all_passed = report.all_passed();

    let document = serde_json::to_value(&report).map_err(|source| ProbeError::JsonSerialize {
        context: "run report".to_string(),
        source,
    })?;
    let stored = artifacts.put_document(&format!("{}/results", id), &document)?;
    info!(run_id = %id, document = %stored, "results stored");

    let output_content = match format {
        "junit" => generate_junit_xml(&report),
        "json" => serde_json::to_string_pretty(&document).map_err(|source| {
            ProbeError::JsonSerialize {
                context: "run report".to_string(),
                source,
            }
        })?,
        _ => format_console_report(&report),
    };
    write_or_print(output, &output_content)?;

    Ok(all_passed)
}

/// Load a run record. `.json` files are read as JSON, anything else as YAML.
pub fn load_record(path: &str) -> Result<TestRunRecord, ProbeError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ProbeError::Config(format!("cannot read run record '{}': {}", path, e)))?;
    parse_record(&content, Path::new(path))
}

pub fn parse_record(content: &str, path: &Path) -> Result<TestRunRecord, ProbeError> {
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(content).map_err(|source| ProbeError::JsonParse {
            context: path.display().to_string(),
            source,
        })
    } else {
        serde_yaml::from_str(content)
            .map_err(|e| ProbeError::Config(format!("{}: {}", path.display(), e)))
    }
}

fn write_or_print(output: Option<&str>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => print!("{}", content),
    }
    Ok(())
}
