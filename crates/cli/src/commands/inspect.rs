use std::path::Path;
use std::process;

use tick_core::{State, StateMachine};

use super::load_story;
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_inspect(path: &Path, output: OutputFormat, quiet: bool) {
    let declaration = match load_story(path) {
        Ok(declaration) => declaration,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let machine = StateMachine::new(declaration.state_machine.clone());

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            println!("story: {}", declaration.story_id);
            println!("main intent: {}", declaration.main_intent);
            println!("states:");
            print_state(machine.root(), 1);
            println!("actions:");
            for action in &declaration.actions {
                let mut traits = Vec::new();
                if let Some(handler) = action.handler_name() {
                    traits.push(format!("handler {}", handler));
                }
                if let Some(trigger) = action.trigger_name() {
                    traits.push(format!("trigger {}", trigger));
                }
                if action.is_final {
                    traits.push("final".to_string());
                }
                match action.answer_id.as_deref() {
                    Some(answer) => traits.push(format!("answer {}", answer)),
                    None => traits.push("silent".to_string()),
                }
                println!("  {} ({})", action.name, traits.join(", "));
            }
        }
        OutputFormat::Json => {
            let transitions: Vec<_> = machine
                .states()
                .into_iter()
                .flat_map(|state| {
                    state.transitions().map(move |(event, target)| {
                        serde_json::json!({
                            "from": state.id,
                            "on": event,
                            "to": target,
                        })
                    })
                })
                .collect();
            let json = serde_json::json!({
                "story": declaration.story_id,
                "mainIntent": declaration.main_intent,
                "leafStates": machine.leaf_states(),
                "transitions": transitions,
                "actions": declaration.action_names(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

fn print_state(state: &State, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = if state.is_group() { "/" } else { "" };
    println!("{}{}{}", indent, state.id, marker);
    for (event, target) in state.transitions() {
        println!("{}  on {} -> {}", indent, event, target);
    }
    for child in state.children() {
        print_state(child, depth + 1);
    }
}
