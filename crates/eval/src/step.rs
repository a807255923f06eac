//! Handling steps: which action (or unknown answer) is active in a
//! conversation, and how many consecutive times it ran.
//!
//! Steps are values. [`HandlingStep::next`] returns a new step with the same
//! key and `repeated + 1`; a different key always starts a fresh step at 1.

use tick_core::{Declaration, UnknownAnswerConfig, UNKNOWN_INTENT};
use tick_storage::{HandlingStepRecord, StepKind};

use crate::error::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionStep {
    pub action_name: String,
    pub repeated: u32,
}

impl ActionStep {
    pub fn new(action_name: impl Into<String>) -> Self {
        ActionStep {
            action_name: action_name.into(),
            repeated: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStep {
    pub answer_config: UnknownAnswerConfig,
    pub repeated: u32,
}

impl UnknownStep {
    pub fn new(answer_config: UnknownAnswerConfig) -> Self {
        UnknownStep {
            answer_config,
            repeated: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlingStep {
    Action(ActionStep),
    Unknown(UnknownStep),
}

impl HandlingStep {
    pub fn action(action_name: impl Into<String>) -> Self {
        HandlingStep::Action(ActionStep::new(action_name))
    }

    pub fn unknown(answer_config: UnknownAnswerConfig) -> Self {
        HandlingStep::Unknown(UnknownStep::new(answer_config))
    }

    /// Action name, or unknown answer config key.
    pub fn key(&self) -> &str {
        match self {
            HandlingStep::Action(step) => &step.action_name,
            HandlingStep::Unknown(step) => step.answer_config.key(),
        }
    }

    pub fn repeated(&self) -> u32 {
        match self {
            HandlingStep::Action(step) => step.repeated,
            HandlingStep::Unknown(step) => step.repeated,
        }
    }

    /// The action the conversation is on: the executed action, or the one
    /// the user was not understood after.
    pub fn action_name(&self) -> &str {
        match self {
            HandlingStep::Action(step) => &step.action_name,
            HandlingStep::Unknown(step) => &step.answer_config.action,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, HandlingStep::Unknown(_))
    }

    pub fn next(&self) -> HandlingStep {
        match self {
            HandlingStep::Action(step) => HandlingStep::Action(ActionStep {
                action_name: step.action_name.clone(),
                repeated: step.repeated.saturating_add(1),
            }),
            HandlingStep::Unknown(step) => HandlingStep::Unknown(UnknownStep {
                answer_config: step.answer_config.clone(),
                repeated: step.repeated.saturating_add(1),
            }),
        }
    }

    pub fn to_record(&self) -> HandlingStepRecord {
        HandlingStepRecord {
            kind: match self {
                HandlingStep::Action(_) => StepKind::Action,
                HandlingStep::Unknown(_) => StepKind::Unknown,
            },
            key: self.key().to_string(),
            repeated: self.repeated(),
        }
    }

    /// Rebuild a persisted step against the declaration it was recorded on.
    pub fn from_record(
        record: &HandlingStepRecord,
        declaration: &Declaration,
    ) -> Result<HandlingStep, RuntimeError> {
        let repeated = record.repeated.max(1);
        match record.kind {
            StepKind::Action => {
                if declaration.action(&record.key).is_none() {
                    return Err(RuntimeError::ActionNotDeclared {
                        action: record.key.clone(),
                    });
                }
                Ok(HandlingStep::Action(ActionStep {
                    action_name: record.key.clone(),
                    repeated,
                }))
            }
            StepKind::Unknown => {
                let answer_config = unknown_answer_for(declaration, &record.key).ok_or_else(|| {
                    RuntimeError::UnknownAnswerNotFound {
                        action: record.key.clone(),
                    }
                })?;
                Ok(HandlingStep::Unknown(UnknownStep {
                    answer_config,
                    repeated,
                }))
            }
        }
    }
}

/// Unknown answer config applying while `action` is active: the one
/// attached to the action, else one built from the story default answer.
pub(crate) fn unknown_answer_for(
    declaration: &Declaration,
    action: &str,
) -> Option<UnknownAnswerConfig> {
    if let Some(config) = declaration.unknown_config_for(action) {
        return Some(config.clone());
    }
    let answer_id = declaration.settings.unknown_answer_id.as_ref()?;
    Some(UnknownAnswerConfig {
        intent: UNKNOWN_INTENT.to_string(),
        action: action.to_string(),
        answer_id: answer_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tick_core::{State, StorySettings, TickAction};

    fn declaration() -> Declaration {
        Declaration {
            state_machine: State::new("Global").with_child(State::new("ASK_CITY")),
            main_intent: "weather".to_string(),
            actions: vec![TickAction::new("ASK_CITY")],
            unknown_answer_configs: vec![UnknownAnswerConfig::new("ASK_CITY", "which_city")],
            ..Default::default()
        }
    }

    #[test]
    fn next_keeps_key_and_increments() {
        let step = HandlingStep::action("ASK_CITY");
        let next = step.next();
        assert_eq!(step.repeated(), 1);
        assert_eq!(next.repeated(), step.repeated() + 1);
        assert_eq!(next.key(), step.key());
        assert_eq!(next.next().repeated(), 3);

        let unknown = HandlingStep::unknown(UnknownAnswerConfig::new("ASK_CITY", "which_city"));
        assert_eq!(unknown.next().repeated(), 2);
        assert_eq!(unknown.next().key(), "ASK_CITY");
    }

    #[test]
    fn next_saturates_at_max_repetition() {
        let record = HandlingStepRecord {
            kind: StepKind::Action,
            key: "ASK_CITY".to_string(),
            repeated: u32::MAX,
        };
        let step = HandlingStep::from_record(&record, &declaration()).unwrap();
        assert_eq!(step.next().repeated(), u32::MAX);
    }

    #[test]
    fn action_name_of_unknown_step_is_the_active_action() {
        let step = HandlingStep::unknown(UnknownAnswerConfig::new("ASK_CITY", "which_city"));
        assert_eq!(step.action_name(), "ASK_CITY");
        assert!(step.is_unknown());
    }

    #[test]
    fn record_conversion() {
        let declaration = declaration();
        let step = HandlingStep::unknown(UnknownAnswerConfig::new("ASK_CITY", "which_city")).next();
        let record = step.to_record();
        assert_eq!(record.kind, StepKind::Unknown);
        assert_eq!(record.key, "ASK_CITY");
        assert_eq!(record.repeated, 2);
        assert_eq!(HandlingStep::from_record(&record, &declaration).unwrap(), step);
    }

    #[test]
    fn record_of_undeclared_action_is_rejected() {
        let record = HandlingStepRecord {
            kind: StepKind::Action,
            key: "GONE".to_string(),
            repeated: 1,
        };
        assert!(matches!(
            HandlingStep::from_record(&record, &declaration()),
            Err(RuntimeError::ActionNotDeclared { .. })
        ));
    }

    #[test]
    fn default_unknown_answer_from_settings() {
        let mut declaration = declaration();
        declaration.unknown_answer_configs.clear();
        assert!(unknown_answer_for(&declaration, "ASK_CITY").is_none());

        declaration.settings = StorySettings {
            unknown_answer_id: Some("not_understood".to_string()),
            ..Default::default()
        };
        let config = unknown_answer_for(&declaration, "ASK_CITY").unwrap();
        assert_eq!(config.answer_id, "not_understood");
        assert_eq!(config.key(), "ASK_CITY");
    }
}
