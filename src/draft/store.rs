//! Draft store: the single owner of an authoring session's draft

use std::sync::Arc;
use tracing::debug;

use super::{Condition, EditError, Rule, StrategyDraft};
use crate::indicators::IndicatorRegistry;

/// Top-level scalar field of a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftField {
    Name(String),
    Description(String),
}

impl DraftField {
    /// Build from a string-keyed form event
    pub fn parse(field: &str, value: impl Into<String>) -> Result<Self, EditError> {
        match field {
            "name" => Ok(DraftField::Name(value.into())),
            "description" => Ok(DraftField::Description(value.into())),
            other => Err(EditError::UnknownField(other.to_string())),
        }
    }
}

impl StrategyDraft {
    /// Copy of this draft with one top-level field replaced
    pub fn with_field(&self, field: DraftField) -> StrategyDraft {
        let mut next = self.clone();
        match field {
            DraftField::Name(name) => next.name = name,
            DraftField::Description(description) => next.description = description,
        }
        next
    }
}

/// Owns the current draft of one authoring session.
///
/// Every successful edit swaps in a new `Arc<StrategyDraft>` and bumps the
/// revision; a failed edit leaves both untouched.
#[derive(Debug, Clone)]
pub struct DraftStore {
    draft: Arc<StrategyDraft>,
    revision: u64,
    registry: Arc<IndicatorRegistry>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore {
    /// Open a session on a fresh draft with one default rule
    pub fn new() -> Self {
        Self::with_registry(StrategyDraft::default(), IndicatorRegistry::shared())
    }

    /// Open a session on an existing draft
    pub fn from_draft(draft: StrategyDraft) -> Self {
        Self::with_registry(draft, IndicatorRegistry::shared())
    }

    /// Open a session that resolves parameters through a custom registry
    pub fn with_registry(draft: StrategyDraft, registry: Arc<IndicatorRegistry>) -> Self {
        Self {
            draft: Arc::new(draft),
            revision: 0,
            registry,
        }
    }

    pub fn draft(&self) -> &Arc<StrategyDraft> {
        &self.draft
    }

    /// Number of successful edits since the session opened
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn registry(&self) -> &Arc<IndicatorRegistry> {
        &self.registry
    }

    /// End the session, handing back the final draft
    pub fn into_draft(self) -> Arc<StrategyDraft> {
        self.draft
    }

    /// Replace `name` or `description`
    pub fn set_field(&mut self, field: DraftField) -> Arc<StrategyDraft> {
        let next = self.draft.with_field(field);
        self.commit(next, "set_field")
    }

    /// Replace the whole rule sequence in one step
    pub fn replace_rules(&mut self, rules: Vec<Arc<Rule>>) -> Arc<StrategyDraft> {
        let next = self.draft.with_rules(rules);
        self.commit(next, "replace_rules")
    }

    pub(crate) fn commit(&mut self, next: StrategyDraft, op: &'static str) -> Arc<StrategyDraft> {
        self.draft = Arc::new(next);
        self.revision += 1;
        debug!(
            op,
            revision = self.revision,
            rules = self.draft.rules.len(),
            conditions = self.draft.condition_count(),
            "Draft updated"
        );
        Arc::clone(&self.draft)
    }

    /// Rebuild the rule at `index` and the rule sequence around it
    pub(crate) fn edit_rule<F>(
        &mut self,
        index: usize,
        op: &'static str,
        edit: F,
    ) -> Result<Arc<StrategyDraft>, EditError>
    where
        F: FnOnce(&Rule) -> Result<Rule, EditError>,
    {
        let len = self.draft.rules.len();
        let current = self
            .draft
            .rules
            .get(index)
            .ok_or(EditError::RuleOutOfRange { index, len })?;
        let updated = edit(current)?;

        let mut rules = self.draft.rules.clone();
        rules[index] = Arc::new(updated);
        let next = self.draft.with_rules(rules);
        Ok(self.commit(next, op))
    }

    /// Rebuild one condition and every ancestor up to the draft
    pub(crate) fn edit_condition<F>(
        &mut self,
        rule_index: usize,
        cond_index: usize,
        op: &'static str,
        edit: F,
    ) -> Result<Arc<StrategyDraft>, EditError>
    where
        F: FnOnce(&Condition) -> Result<Condition, EditError>,
    {
        self.edit_rule(rule_index, op, |rule| {
            let len = rule.conditions.len();
            let current = rule
                .conditions
                .get(cond_index)
                .ok_or(EditError::ConditionOutOfRange {
                    rule: rule_index,
                    index: cond_index,
                    len,
                })?;
            let updated = edit(current)?;

            let mut conditions = rule.conditions.clone();
            conditions[cond_index] = Arc::new(updated);
            Ok(rule.with_conditions(conditions))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_field_yields_new_identity() {
        let mut store = DraftStore::new();
        let before = Arc::clone(store.draft());

        let after = store.set_field(DraftField::Name("Golden cross".to_string()));

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.name.is_empty());
        assert_eq!(after.name, "Golden cross");
        assert_eq!(store.revision(), 1);
        // Untouched rules are shared, not copied
        assert!(Arc::ptr_eq(&before.rules[0], &after.rules[0]));
    }

    #[test]
    fn test_set_same_value_still_changes_identity() {
        let mut store = DraftStore::new();
        let first = store.set_field(DraftField::Description("x".to_string()));
        let second = store.set_field(DraftField::Description("x".to_string()));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_replace_rules() {
        let mut store = DraftStore::new();
        let rules = vec![Arc::new(Rule::default()), Arc::new(Rule::default())];
        let draft = store.replace_rules(rules.clone());
        assert_eq!(draft.rules.len(), 2);
        assert!(Arc::ptr_eq(&draft.rules[1], &rules[1]));

        let empty = store.replace_rules(Vec::new());
        assert!(empty.rules.is_empty());
    }

    #[test]
    fn test_draft_field_parse() {
        assert_eq!(
            DraftField::parse("name", "A").unwrap(),
            DraftField::Name("A".to_string())
        );
        assert_eq!(
            DraftField::parse("rules", "x"),
            Err(EditError::UnknownField("rules".to_string()))
        );
    }

    #[test]
    fn test_failed_edit_leaves_draft_untouched() {
        let mut store = DraftStore::new();
        let before = Arc::clone(store.draft());

        let err = store
            .edit_rule(3, "noop", |rule| Ok(rule.clone()))
            .unwrap_err();

        assert_eq!(err, EditError::RuleOutOfRange { index: 3, len: 1 });
        assert!(Arc::ptr_eq(&before, store.draft()));
        assert_eq!(store.revision(), 0);
    }
}
