//! Submission payload
//!
//! [`clean_for_submission`] turns the live draft into the payload sent to the
//! strategy service. The live draft may still carry parameter bags left over
//! from earlier indicator selections; the cleaned copy never does.
//!
//! [`lint`] reports suspicious payload content. Its findings are advisory:
//! the service is the authority on what it accepts.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::draft::{Condition, OperandB, Rule, StrategyDraft};
use crate::indicators::{IndicatorRegistry, ParamBag, SchemaError};
use crate::types::{Action, IndicatorKind, OperandKind, ParamSide};

/// Strategy as sent to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedStrategy {
    pub name: String,
    pub description: String,
    pub rules: Vec<CleanedRule>,
}

/// Rule as sent to the service; owns its conditions outright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedRule {
    pub action: Action,
    #[serde(rename = "actionAmountPercent")]
    pub amount_percent: f64,
    pub priority: i32,
    pub conditions: Vec<Condition>,
}

/// Strip parameters that do not belong to the final indicator selection.
///
/// Applied in order:
/// 1. `indicatorA == PRICE` clears the A bag
/// 2. `indicatorBType == VALUE` clears the B bag
/// 3. otherwise, `indicatorBValue == "PRICE"` clears the B bag
/// 4. any other B bag is kept exactly as edited
pub fn clean_condition(condition: &Condition) -> Condition {
    let mut clean = condition.clone();
    if clean.indicator_a == IndicatorKind::Price {
        clean.indicator_a_params = ParamBag::new();
    }
    if clean.indicator_b_type == OperandKind::Value {
        clean.indicator_b_params = ParamBag::new();
    } else if clean.indicator_b_type == OperandKind::Indicator
        && clean.indicator_b_value == IndicatorKind::Price.as_str()
    {
        clean.indicator_b_params = ParamBag::new();
    }
    clean
}

fn clean_rule(rule: &Rule) -> CleanedRule {
    CleanedRule {
        action: rule.action,
        amount_percent: rule.amount_percent,
        priority: rule.priority,
        conditions: rule.conditions.iter().map(|c| clean_condition(c)).collect(),
    }
}

/// Deep, independent copy of `draft` with every condition cleaned.
/// The draft itself is never modified.
pub fn clean_for_submission(draft: &StrategyDraft) -> CleanedStrategy {
    CleanedStrategy {
        name: draft.name.clone(),
        description: draft.description.clone(),
        rules: draft.rules.iter().map(|r| clean_rule(r)).collect(),
    }
}

/// Where in the payload an issue was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueLocation {
    pub rule: Option<usize>,
    pub condition: Option<usize>,
}

impl fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rule, self.condition) {
            (Some(r), Some(c)) => write!(f, "rule #{} condition #{}", r + 1, c + 1),
            (Some(r), None) => write!(f, "rule #{}", r + 1),
            _ => f.write_str("strategy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IssueKind {
    #[error("name is empty")]
    EmptyName,

    #[error("no rules")]
    NoRules,

    #[error("no conditions")]
    NoConditions,

    #[error("amount {0}% is outside 0-100")]
    AmountOutOfRange(f64),

    #[error("'{0}' is not a number")]
    ValueNotNumeric(String),

    #[error("'{0}' is not a known indicator")]
    UnknownIndicator(String),

    #[error("indicator {side} parameters: {source}")]
    Params { side: ParamSide, source: SchemaError },
}

/// One advisory finding
#[derive(Debug, Clone, PartialEq)]
pub struct DraftIssue {
    pub location: IssueLocation,
    pub kind: IssueKind,
}

impl fmt::Display for DraftIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

/// One line summary of `issues`
pub fn summarize(issues: &[DraftIssue]) -> String {
    issues.iter().join("; ")
}

/// Check a cleaned payload against the resolver's schemas and the intended
/// value ranges
pub fn lint(strategy: &CleanedStrategy, registry: &IndicatorRegistry) -> Vec<DraftIssue> {
    let mut issues = Vec::new();
    let mut push = |rule: Option<usize>, condition: Option<usize>, kind: IssueKind| {
        issues.push(DraftIssue {
            location: IssueLocation { rule, condition },
            kind,
        })
    };

    if strategy.name.trim().is_empty() {
        push(None, None, IssueKind::EmptyName);
    }
    if strategy.rules.is_empty() {
        push(None, None, IssueKind::NoRules);
    }

    for (ri, rule) in strategy.rules.iter().enumerate() {
        if rule.conditions.is_empty() {
            push(Some(ri), None, IssueKind::NoConditions);
        }
        if !(0.0..=100.0).contains(&rule.amount_percent) {
            push(Some(ri), None, IssueKind::AmountOutOfRange(rule.amount_percent));
        }

        for (ci, cond) in rule.conditions.iter().enumerate() {
            let checked_a = registry.validate(cond.indicator_a.as_str(), &cond.indicator_a_params);
            if let Err(source) = checked_a {
                push(
                    Some(ri),
                    Some(ci),
                    IssueKind::Params {
                        side: ParamSide::A,
                        source,
                    },
                );
            }

            match (cond.indicator_b_type, cond.operand_b()) {
                (OperandKind::Value, OperandB::Unparsed(raw)) => {
                    push(Some(ri), Some(ci), IssueKind::ValueNotNumeric(raw.to_string()));
                }
                (OperandKind::Indicator, _) => {
                    let name = cond.indicator_b_value.as_str();
                    match registry.validate(name, &cond.indicator_b_params) {
                        Err(SchemaError::UnknownIndicator(_)) => {
                            push(Some(ri), Some(ci), IssueKind::UnknownIndicator(name.to_string()));
                        }
                        Err(source) => push(
                            Some(ri),
                            Some(ci),
                            IssueKind::Params {
                                side: ParamSide::B,
                                source,
                            },
                        ),
                        Ok(_) => {}
                    }
                }
                _ => {}
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{ConditionField, DraftField, DraftStore};
    use crate::indicators::PERIOD;
    use std::sync::Arc;

    fn period(value: f64) -> ParamBag {
        ParamBag::from([(PERIOD.to_string(), value)])
    }

    #[test]
    fn test_default_condition_is_stripped() {
        let cleaned = clean_condition(&Condition::default());
        assert!(cleaned.indicator_a_params.is_empty());
        assert!(cleaned.indicator_b_params.is_empty());
        assert_eq!(cleaned.indicator_b_value, "70");
    }

    #[test]
    fn test_indicator_b_params_kept() {
        let cond = Condition {
            indicator_a: IndicatorKind::Sma,
            indicator_a_params: period(10.0),
            indicator_b_type: OperandKind::Indicator,
            indicator_b_value: "EMA".to_string(),
            indicator_b_params: period(50.0),
            ..Condition::default()
        };
        let cleaned = clean_condition(&cond);
        assert_eq!(cleaned, cond);
    }

    #[test]
    fn test_stale_params_on_price_b_removed() {
        let cond = Condition {
            indicator_b_type: OperandKind::Indicator,
            indicator_b_value: "PRICE".to_string(),
            indicator_b_params: period(50.0),
            ..Condition::default()
        };
        assert!(clean_condition(&cond).indicator_b_params.is_empty());
    }

    #[test]
    fn test_unrecognized_b_name_keeps_params() {
        // Only PRICE is stripped on the B side; anything else is sent as edited
        let cond = Condition {
            indicator_b_type: OperandKind::Indicator,
            indicator_b_value: "70".to_string(),
            indicator_b_params: period(50.0),
            ..Condition::default()
        };
        assert_eq!(clean_condition(&cond).indicator_b_params, period(50.0));
    }

    #[test]
    fn test_clean_does_not_touch_draft() {
        let mut store = DraftStore::new();
        store.set_field(DraftField::Name("Breakout".to_string()));
        let draft = Arc::clone(store.draft());
        let snapshot = (*draft).clone();

        let cleaned = clean_for_submission(&draft);

        assert_eq!(*draft, snapshot);
        assert_eq!(cleaned.name, "Breakout");
        assert_eq!(cleaned.rules.len(), 1);
        assert_eq!(draft.rules[0].conditions[0].indicator_b_params, period(50.0));
        assert!(cleaned.rules[0].conditions[0].indicator_b_params.is_empty());
    }

    #[test]
    fn test_payload_json_shape() {
        let cleaned = clean_for_submission(&StrategyDraft::default());
        let json = serde_json::to_value(&cleaned).unwrap();
        assert_eq!(json["name"], "");
        assert_eq!(json["rules"][0]["actionAmountPercent"], 100.0);
        assert_eq!(json["rules"][0]["conditions"][0]["indicatorAParams"], serde_json::json!({}));
        assert_eq!(json["rules"][0]["conditions"][0]["indicatorBParams"], serde_json::json!({}));
    }

    #[test]
    fn test_lint_default_draft() {
        let registry = IndicatorRegistry::builtin();
        let issues = lint(&clean_for_submission(&StrategyDraft::default()), &registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::EmptyName);
    }

    #[test]
    fn test_lint_findings() {
        let registry = IndicatorRegistry::builtin();
        let mut store = DraftStore::new();
        store.set_field(DraftField::Name("x".to_string()));
        store.add_rule();
        store.remove_condition(1, 0).unwrap();
        store
            .update_condition_field(0, 0, ConditionField::IndicatorBType(OperandKind::Indicator))
            .unwrap();
        store
            .update_rule_field(0, crate::draft::RuleField::AmountPercent(120.0))
            .unwrap();

        let issues = lint(&clean_for_submission(store.draft()), &registry);
        let kinds: Vec<_> = issues.iter().map(|i| i.kind.clone()).collect();
        assert!(kinds.contains(&IssueKind::AmountOutOfRange(120.0)));
        assert!(kinds.contains(&IssueKind::UnknownIndicator("70".to_string())));
        assert!(kinds.contains(&IssueKind::NoConditions));

        let summary = summarize(&issues);
        assert!(summary.contains("rule #2: no conditions"));
        assert!(summary.contains("rule #1 condition #1: '70' is not a known indicator"));
    }

    #[test]
    fn test_lint_empty_strategy() {
        let registry = IndicatorRegistry::builtin();
        let draft = StrategyDraft {
            name: "Empty".to_string(),
            description: String::new(),
            rules: vec![],
        };
        let issues = lint(&clean_for_submission(&draft), &registry);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "strategy: no rules");
    }
}
