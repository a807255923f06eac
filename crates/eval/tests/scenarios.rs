//! End-to-end conversations over the conformance stories.

use std::path::Path;
use std::sync::Arc;

use tick_core::load_declaration;
use tick_eval::{
    ContextStore, FollowUp, HandlerRepository, Processor, Runtime, TurnInput, TurnOutcome,
};

fn runtime(name: &str) -> Runtime {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../conformance/valid")
        .join(name);
    let declaration = load_declaration(&path).unwrap();
    Runtime::new(Arc::new(declaration)).unwrap()
}

fn weather_handlers() -> HandlerRepository {
    HandlerRepository::new().with("weather_lookup", |contexts: &ContextStore| {
        let city = contexts.value("CITY").unwrap_or("nowhere");
        ContextStore::new().with("FORECAST", format!("rain in {city}"))
    })
}

#[test]
fn greeting_ends_after_welcome() {
    let runtime = runtime("greeting.json");
    let handlers = HandlerRepository::new();

    let processed = Processor::new(&runtime, &handlers)
        .process(TurnInput::event("greet"))
        .unwrap();

    assert_eq!(processed.executed.len(), 1);
    assert_eq!(processed.executed[0].answer_id.as_deref(), Some("welcome_answer"));
    let TurnOutcome::Advance(advance) = processed.outcome else {
        panic!("expected advance");
    };
    assert_eq!(advance.follow_up(), FollowUp::End);
}

#[test]
fn greeting_repeated_past_limit_redirects() {
    let runtime = runtime("greeting.json");

    let first = runtime.step(&TurnInput::event("greet")).unwrap();
    let second = runtime
        .step(&TurnInput::after(&first, Some("greet".to_string())))
        .unwrap();
    let third = runtime
        .step(&TurnInput::after(&second, Some("greet".to_string())))
        .unwrap();

    let TurnOutcome::Advance(advance) = &second else {
        panic!("expected advance");
    };
    assert_eq!(advance.step.repeated(), 2);
    assert_eq!(
        third,
        TurnOutcome::Overflow {
            redirect_story: "fallback".to_string()
        }
    );
}

#[test]
fn weather_conversation() {
    let runtime = runtime("weather.json");
    let handlers = weather_handlers();
    let processor = Processor::new(&runtime, &handlers);

    let asked = processor.process(TurnInput::event("weather")).unwrap();
    let TurnOutcome::Advance(advance) = &asked.outcome else {
        panic!("expected advance");
    };
    assert_eq!(advance.next_state, "ASK_CITY");
    assert_eq!(advance.follow_up(), FollowUp::AwaitUser);

    let answered = processor
        .process(TurnInput::after(&asked.outcome, Some("city".to_string())).with_entity("city", "Lyon"))
        .unwrap();
    let actions: Vec<_> = answered
        .executed
        .iter()
        .map(|e| e.action.as_str())
        .collect();
    assert_eq!(actions, vec!["FETCH_WEATHER", "GIVE_WEATHER"]);
    let TurnOutcome::Advance(advance) = &answered.outcome else {
        panic!("expected advance");
    };
    assert_eq!(advance.contexts.value("CITY"), Some("Lyon"));
    assert_eq!(advance.contexts.value("FORECAST"), Some("rain in Lyon"));
    assert_eq!(advance.follow_up(), FollowUp::End);
}

#[test]
fn weather_not_understood_twice_then_redirected() {
    let runtime = runtime("weather.json");
    let asked = runtime.step(&TurnInput::event("weather")).unwrap();

    let first = runtime
        .step(&TurnInput::after(&asked, Some("unknown".to_string())))
        .unwrap();
    let TurnOutcome::Unknown(fallback) = &first else {
        panic!("expected unknown answer");
    };
    assert_eq!(fallback.answer_id, "which_city");
    assert_eq!(fallback.step.repeated(), 1);

    let second = runtime.step(&TurnInput::after(&first, None)).unwrap();
    let TurnOutcome::Unknown(fallback) = &second else {
        panic!("expected unknown answer");
    };
    assert_eq!(fallback.step.repeated(), 2);

    let third = runtime
        .step(&TurnInput::after(&second, Some("unknown".to_string())))
        .unwrap();
    assert!(matches!(third, TurnOutcome::Overflow { .. }));
}

#[test]
fn city_without_entity_is_not_understood() {
    let runtime = runtime("weather.json");
    let asked = runtime.step(&TurnInput::event("weather")).unwrap();

    let outcome = runtime
        .step(&TurnInput::after(&asked, Some("city".to_string())))
        .unwrap();
    let TurnOutcome::Unknown(fallback) = outcome else {
        panic!("expected unknown answer");
    };
    assert_eq!(fallback.state, "ASK_CITY");
    assert_eq!(fallback.answer_id, "which_city");
}

#[test]
fn story_default_answer_outside_configured_actions() {
    let runtime = runtime("weather.json");
    let input = TurnInput {
        current_state: Some("GIVE_WEATHER".to_string()),
        current_step: Some(tick_eval::HandlingStep::action("GIVE_WEATHER")),
        ..TurnInput::event("unknown")
    };

    let TurnOutcome::Unknown(fallback) = runtime.step(&input).unwrap() else {
        panic!("expected unknown answer");
    };
    assert_eq!(fallback.answer_id, "not_understood");
}
