//! Serializable edit events
//!
//! An edit script is a JSON array of commands, for example:
//!
//! ```json
//! [
//!   {"op": "setField", "field": "name", "value": "RSI dip"},
//!   {"op": "updateConditionField", "rule": 0, "condition": 0, "field": "indicatorA", "value": "RSI"},
//!   {"op": "updateConditionParam", "rule": 0, "condition": 0, "side": "A", "key": "period", "value": 21},
//!   {"op": "addRule"}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::{ConditionField, DraftField, DraftStore, EditError, Rule, RuleField, StrategyDraft};
use crate::types::ParamSide;

/// One editing event, addressed by rule and condition position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditCommand {
    SetField {
        field: String,
        value: Value,
    },
    ReplaceRules {
        rules: Vec<Rule>,
    },
    AddRule,
    RemoveRule {
        rule: usize,
    },
    UpdateRuleField {
        rule: usize,
        field: String,
        value: Value,
    },
    AddCondition {
        rule: usize,
    },
    RemoveCondition {
        rule: usize,
        condition: usize,
    },
    UpdateConditionField {
        rule: usize,
        condition: usize,
        field: String,
        value: Value,
    },
    UpdateConditionParam {
        rule: usize,
        condition: usize,
        side: ParamSide,
        key: String,
        value: f64,
    },
}

/// Form inputs arrive as strings or numbers; both are read as text
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl EditCommand {
    /// Dispatch this event to the matching editor
    pub fn apply(&self, store: &mut DraftStore) -> Result<Arc<StrategyDraft>, EditError> {
        match self {
            EditCommand::SetField { field, value } => {
                Ok(store.set_field(DraftField::parse(field, value_text(value))?))
            }
            EditCommand::ReplaceRules { rules } => {
                Ok(store.replace_rules(rules.iter().cloned().map(Arc::new).collect()))
            }
            EditCommand::AddRule => Ok(store.add_rule()),
            EditCommand::RemoveRule { rule } => store.remove_rule(*rule),
            EditCommand::UpdateRuleField { rule, field, value } => {
                let field = RuleField::parse(field, &value_text(value))?;
                store.update_rule_field(*rule, field)
            }
            EditCommand::AddCondition { rule } => store.add_condition(*rule),
            EditCommand::RemoveCondition { rule, condition } => {
                store.remove_condition(*rule, *condition)
            }
            EditCommand::UpdateConditionField {
                rule,
                condition,
                field,
                value,
            } => {
                let field = ConditionField::parse(field, &value_text(value))?;
                store.update_condition_field(*rule, *condition, field)
            }
            EditCommand::UpdateConditionParam {
                rule,
                condition,
                side,
                key,
                value,
            } => store.update_condition_param(*rule, *condition, *side, key.as_str(), *value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::PERIOD;
    use crate::types::{Action, IndicatorKind};

    #[test]
    fn test_parse_script() {
        let script = r#"[
            {"op": "setField", "field": "name", "value": "RSI dip"},
            {"op": "updateRuleField", "rule": 0, "field": "actionAmountPercent", "value": 50},
            {"op": "updateConditionField", "rule": 0, "condition": 0, "field": "indicatorA", "value": "RSI"},
            {"op": "updateConditionParam", "rule": 0, "condition": 0, "side": "A", "key": "period", "value": 21},
            {"op": "addRule"},
            {"op": "updateRuleField", "rule": 1, "field": "action", "value": "SELL"}
        ]"#;
        let commands: Vec<EditCommand> = serde_json::from_str(script).unwrap();
        assert_eq!(commands.len(), 6);
        assert_eq!(commands[4], EditCommand::AddRule);

        let mut store = DraftStore::new();
        for command in &commands {
            command.apply(&mut store).unwrap();
        }

        let draft = store.draft();
        assert_eq!(draft.name, "RSI dip");
        assert_eq!(draft.rules.len(), 2);
        assert_eq!(draft.rules[0].amount_percent, 50.0);
        assert_eq!(draft.rules[1].action, Action::Sell);
        let cond = &draft.rules[0].conditions[0];
        assert_eq!(cond.indicator_a, IndicatorKind::Rsi);
        assert_eq!(cond.indicator_a_params[PERIOD], 21.0);
        assert_eq!(store.revision(), 6);
    }

    #[test]
    fn test_numeric_b_value_is_read_as_text() {
        let command: EditCommand = serde_json::from_str(
            r#"{"op":"updateConditionField","rule":0,"condition":0,"field":"indicatorBValue","value":30.5}"#,
        )
        .unwrap();
        let mut store = DraftStore::new();
        let draft = command.apply(&mut store).unwrap();
        assert_eq!(draft.rules[0].conditions[0].indicator_b_value, "30.5");
    }

    #[test]
    fn test_replace_rules_command() {
        let command = EditCommand::ReplaceRules { rules: vec![] };
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(json, r#"{"op":"replaceRules","rules":[]}"#);

        let mut store = DraftStore::new();
        let draft = command.apply(&mut store).unwrap();
        assert!(draft.rules.is_empty());
    }

    #[test]
    fn test_errors_surface_unchanged() {
        let mut store = DraftStore::new();
        let err = EditCommand::RemoveCondition { rule: 0, condition: 5 }
            .apply(&mut store)
            .unwrap_err();
        assert_eq!(err, EditError::ConditionOutOfRange { rule: 0, index: 5, len: 1 });

        let err = EditCommand::SetField {
            field: "owner".to_string(),
            value: Value::from("me"),
        }
        .apply(&mut store)
        .unwrap_err();
        assert_eq!(err, EditError::UnknownField("owner".to_string()));
    }
}
