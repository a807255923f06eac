use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Args;
use tick_eval::{FollowUp, HandlingStep, Runtime, TurnInput, TurnOutcome};
use tick_storage::{HandlingStepRecord, StepKind};

use super::load_story;
use crate::{report_error, OutputFormat};

#[derive(Debug, Args)]
pub(crate) struct StepArgs {
    /// Path to the story JSON document
    file: PathBuf,
    /// Current state id (default: the machine root)
    #[arg(long)]
    state: Option<String>,
    /// Key of the current handling step (an action name)
    #[arg(long = "step")]
    step_key: Option<String>,
    /// The current step is an unknown-answer step
    #[arg(long, requires = "step_key")]
    unknown: bool,
    /// Consecutive executions of the current step
    #[arg(long, default_value_t = 1, requires = "step_key")]
    repeated: u32,
    /// Recognized intent or trigger; omit when nothing was understood
    #[arg(long)]
    event: Option<String>,
    /// Recognized entity, as role=value
    #[arg(long = "entity", value_parser = parse_pair)]
    entities: Vec<(String, String)>,
    /// Known context value, as NAME=value
    #[arg(long = "context", value_parser = parse_pair)]
    contexts: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

pub(crate) fn cmd_step(args: &StepArgs, output: OutputFormat, quiet: bool) {
    match run(args) {
        Ok(outcome) => {
            if !quiet {
                print_outcome(&outcome, output);
            }
        }
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn run(args: &StepArgs) -> Result<TurnOutcome, String> {
    let declaration = Arc::new(load_story(&args.file)?);
    let runtime = Runtime::new(declaration.clone()).map_err(|e| error_in(&args.file, e))?;

    let current_step = match &args.step_key {
        Some(key) => {
            let record = HandlingStepRecord {
                kind: if args.unknown {
                    StepKind::Unknown
                } else {
                    StepKind::Action
                },
                key: key.clone(),
                repeated: args.repeated,
            };
            Some(HandlingStep::from_record(&record, &declaration).map_err(|e| error_in(&args.file, e))?)
        }
        None => None,
    };

    let mut input = TurnInput {
        current_step,
        current_state: args.state.clone(),
        event: args.event.clone(),
        ..Default::default()
    };
    for (role, value) in &args.entities {
        input.entities.insert(role.clone(), value.clone());
    }
    for (name, value) in &args.contexts {
        input.contexts.insert(name.clone(), value.clone());
    }

    runtime.step(&input).map_err(|e| error_in(&args.file, e))
}

fn error_in(path: &Path, e: impl std::fmt::Display) -> String {
    format!("error in '{}': {}", path.display(), e)
}

fn print_outcome(outcome: &TurnOutcome, output: OutputFormat) {
    match output {
        OutputFormat::Text => print_text(outcome),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome_json(outcome)).unwrap_or_default()
            );
        }
    }
}

fn print_text(outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::Advance(advance) => {
            println!(
                "advance -> {} ({} x{})",
                advance.next_state,
                advance.step.key(),
                advance.step.repeated()
            );
            if let Some(answer) = &advance.action.answer_id {
                println!("  answer: {}", answer);
            }
            if !advance.contexts_to_resolve.is_empty() {
                let names: Vec<_> = advance.contexts_to_resolve.iter().cloned().collect();
                println!("  contexts to resolve: {}", names.join(", "));
            }
            println!("  follow-up: {}", follow_up_label(&advance.follow_up()));
        }
        TurnOutcome::Unknown(fallback) => {
            println!(
                "unknown in {} ({} x{})",
                fallback.state,
                fallback.step.key(),
                fallback.step.repeated()
            );
            println!("  answer: {}", fallback.answer_id);
        }
        TurnOutcome::Overflow { redirect_story } => {
            println!("overflow -> redirect to {}", redirect_story);
        }
        TurnOutcome::Unhandled { state, .. } => {
            println!("unhandled in {}", state);
        }
    }
}

fn follow_up_label(follow_up: &FollowUp) -> String {
    match follow_up {
        FollowUp::Trigger(trigger) => format!("trigger {}", trigger),
        FollowUp::Handoff(story) => format!("hand off to {}", story),
        FollowUp::End => "end".to_string(),
        FollowUp::AwaitUser => "await user".to_string(),
    }
}

fn outcome_json(outcome: &TurnOutcome) -> serde_json::Value {
    match outcome {
        TurnOutcome::Advance(advance) => serde_json::json!({
            "outcome": "advance",
            "nextState": advance.next_state,
            "step": advance.step.to_record(),
            "answerId": advance.action.answer_id,
            "silent": advance.is_silent(),
            "contexts": advance.contexts,
            "contextsToResolve": advance.contexts_to_resolve,
            "followUp": follow_up_label(&advance.follow_up()),
        }),
        TurnOutcome::Unknown(fallback) => serde_json::json!({
            "outcome": "unknown",
            "state": fallback.state,
            "step": fallback.step.to_record(),
            "answerId": fallback.answer_id,
            "contexts": fallback.contexts,
        }),
        TurnOutcome::Overflow { redirect_story } => serde_json::json!({
            "outcome": "overflow",
            "redirectStory": redirect_story,
        }),
        TurnOutcome::Unhandled { state, contexts } => serde_json::json!({
            "outcome": "unhandled",
            "state": state,
            "contexts": contexts,
        }),
    }
}
