use std::path::Path;
use std::process;

use tick_core::{StateMachine, Validator};

use super::{read_document, schema_errors};
use crate::config::TickConfig;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_validate(path: &Path, config: &TickConfig, output: OutputFormat, quiet: bool) {
    let document = match read_document(path) {
        Ok(document) => document,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let errors = match schema_errors(&document) {
        Ok(errors) => errors,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    if !errors.is_empty() {
        match output {
            OutputFormat::Text => {
                if !quiet {
                    eprintln!("invalid story document");
                    for err in &errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "valid": false,
                    "stage": "schema",
                    "errors": errors
                });
                eprintln!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                );
            }
        }
        process::exit(1);
    }

    let declaration: tick_core::Declaration = match serde_json::from_value(document) {
        Ok(declaration) => declaration,
        Err(e) => {
            let msg = format!("error decoding story '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let machine = StateMachine::new(declaration.state_machine.clone());
    let mut validator = Validator::new(&config.handlers.names);
    if let Some(stories) = &config.stories {
        validator = validator.with_story_catalog(&stories.known);
    }
    let violations = validator.validate(&declaration, &machine);

    if violations.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => println!("valid"),
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::json!({ "valid": true, "story": declaration.story_id })
                    );
                }
            }
        }
        return;
    }

    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("inconsistent story '{}'", declaration.story_id);
                for violation in &violations {
                    eprintln!("  - [{}] {}", violation.rule, violation.message);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "valid": false,
                "stage": "consistency",
                "violations": violations
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
    process::exit(1);
}
