//! Rule editor: the ordered rule sequence and rule-level fields

use std::sync::Arc;

use super::{DraftStore, EditError, Rule, StrategyDraft};
use crate::types::Action;

/// Rule-level field edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleField {
    Action(Action),
    AmountPercent(f64),
    Priority(i32),
}

impl RuleField {
    /// Build from a string-keyed form event
    pub fn parse(field: &str, value: &str) -> Result<Self, EditError> {
        let invalid = |reason: String| EditError::InvalidValue {
            field: field.to_string(),
            reason,
        };
        match field {
            "action" => Ok(RuleField::Action(value.parse()?)),
            "actionAmountPercent" | "amountPercent" => value
                .trim()
                .parse::<f64>()
                .map(RuleField::AmountPercent)
                .map_err(|e| invalid(e.to_string())),
            "priority" => value
                .trim()
                .parse::<i32>()
                .map(RuleField::Priority)
                .map_err(|e| invalid(e.to_string())),
            other => Err(EditError::UnknownField(other.to_string())),
        }
    }
}

impl Rule {
    /// Copy of this rule with one field replaced; conditions are shared
    pub fn with_field(&self, field: RuleField) -> Rule {
        let mut next = self.with_conditions(self.conditions.clone());
        match field {
            RuleField::Action(action) => next.action = action,
            RuleField::AmountPercent(amount) => next.amount_percent = amount,
            RuleField::Priority(priority) => next.priority = priority,
        }
        next
    }
}

impl DraftStore {
    /// Append a default rule (BUY, 100%, priority 1, one default condition)
    pub fn add_rule(&mut self) -> Arc<StrategyDraft> {
        let mut rules = self.draft().rules.clone();
        rules.push(Arc::new(Rule::default()));
        let next = self.draft().with_rules(rules);
        self.commit(next, "add_rule")
    }

    /// Remove the rule at `index`. The draft may end up with no rules.
    pub fn remove_rule(&mut self, index: usize) -> Result<Arc<StrategyDraft>, EditError> {
        let len = self.draft().rules.len();
        if index >= len {
            return Err(EditError::RuleOutOfRange { index, len });
        }
        let mut rules = self.draft().rules.clone();
        rules.remove(index);
        let next = self.draft().with_rules(rules);
        Ok(self.commit(next, "remove_rule"))
    }

    /// Replace one field of the rule at `index`
    pub fn update_rule_field(
        &mut self,
        index: usize,
        field: RuleField,
    ) -> Result<Arc<StrategyDraft>, EditError> {
        self.edit_rule(index, "update_rule_field", |rule| Ok(rule.with_field(field)))
    }
}
