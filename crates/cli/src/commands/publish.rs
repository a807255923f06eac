use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use tick_core::Validator;
use tick_eval::{publish_story, PublishError};
use tick_storage::{InMemoryStorage, StoryStorage, StoryVersionRecord};

use super::load_story;
use crate::config::TickConfig;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_publish(files: &[PathBuf], config: &TickConfig, output: OutputFormat, quiet: bool) {
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            report_error(&format!("error: failed to start runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };

    match runtime.block_on(publish_all(files, config)) {
        Ok(records) => {
            if !quiet {
                print_records(&records, output);
            }
        }
        Err(Failure::Inconsistent { file, messages }) => {
            match output {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("refusing to publish '{}'", file);
                        for msg in &messages {
                            eprintln!("  - {}", msg);
                        }
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "published": false,
                        "file": file,
                        "violations": messages,
                    });
                    eprintln!(
                        "{}",
                        serde_json::to_string_pretty(&json).unwrap_or_default()
                    );
                }
            }
            process::exit(1);
        }
        Err(Failure::Other(msg)) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

enum Failure {
    Inconsistent { file: String, messages: Vec<String> },
    Other(String),
}

/// Publish every file in order into one store and return the final
/// version history of each story touched.
async fn publish_all(
    files: &[PathBuf],
    config: &TickConfig,
) -> Result<Vec<StoryVersionRecord>, Failure> {
    let storage = InMemoryStorage::new();
    let mut validator = Validator::new(&config.handlers.names);
    if let Some(stories) = &config.stories {
        validator = validator.with_story_catalog(&stories.known);
    }

    let mut story_ids = Vec::new();
    for file in files {
        let declaration = load_story(file).map_err(Failure::Other)?;
        match publish_story(&storage, &validator, Arc::new(declaration)).await {
            Ok(record) => {
                if !story_ids.contains(&record.story_id) {
                    story_ids.push(record.story_id.clone());
                }
            }
            Err(PublishError::Inconsistent(violations)) => {
                return Err(Failure::Inconsistent {
                    file: file.display().to_string(),
                    messages: violations.messages().into_iter().collect(),
                });
            }
            Err(e) => return Err(Failure::Other(format!("error: {}", e))),
        }
    }

    let mut records = Vec::new();
    for story_id in &story_ids {
        let versions = storage
            .versions(story_id)
            .await
            .map_err(|e| Failure::Other(format!("error: {}", e)))?;
        records.extend(versions);
    }
    Ok(records)
}

fn print_records(records: &[StoryVersionRecord], output: OutputFormat) {
    match output {
        OutputFormat::Text => {
            for record in records {
                println!(
                    "{} v{} {} {}",
                    record.story_id, record.version, record.status, record.etag
                );
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = records
                .iter()
                .map(|record| {
                    serde_json::json!({
                        "storyId": record.story_id,
                        "version": record.version,
                        "status": record.status,
                        "etag": record.etag,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}
