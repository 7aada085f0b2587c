//! Strategy drafts and their editors
//!
//! A [`StrategyDraft`] is an immutable tree: rules and conditions sit behind
//! `Arc`s, and every edit performed through [`DraftStore`] builds a new node
//! for each ancestor of the edited value while re-using untouched siblings.
//! Consumers detect change with `Arc::ptr_eq` on the draft, a rule, or a
//! single condition.
//!
//! The editors are split by depth:
//! - [`store`]: top-level fields and whole-sequence replacement
//! - [`rule`]: the rule sequence and rule-level fields
//! - [`condition`]: conditions and the parameter reset rules
//! - [`command`]: serializable edit events dispatched to the above

pub mod command;
pub mod condition;
pub mod rule;
pub mod store;

pub use command::EditCommand;
pub use condition::ConditionField;
pub use rule::RuleField;
pub use store::{DraftField, DraftStore};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::indicators::{serialize_bag, ParamBag, PERIOD};
use crate::types::{Action, IndicatorKind, OperandKind, Operator, ParseError};

/// Lookback pre-filled on the right-hand side of a fresh condition
pub const DEFAULT_B_PERIOD: f64 = 50.0;

/// Literal pre-filled on the right-hand side of a fresh condition
pub const DEFAULT_B_VALUE: &str = "70";

/// Errors raised by draft edits
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("rule {index} out of range ({len} rules)")]
    RuleOutOfRange { index: usize, len: usize },

    #[error("condition {index} out of range for rule {rule} ({len} conditions)")]
    ConditionOutOfRange { rule: usize, index: usize, len: usize },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<ParseError> for EditError {
    fn from(err: ParseError) -> Self {
        EditError::InvalidValue {
            field: err.kind.to_string(),
            reason: err.to_string(),
        }
    }
}

/// One comparison inside a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub indicator_a: IndicatorKind,
    #[serde(default, serialize_with = "serialize_bag")]
    pub indicator_a_params: ParamBag,
    pub operator: Operator,
    pub indicator_b_type: OperandKind,
    /// Numeric literal under `VALUE`, indicator name under `INDICATOR`
    pub indicator_b_value: String,
    #[serde(default, serialize_with = "serialize_bag")]
    pub indicator_b_params: ParamBag,
}

impl Default for Condition {
    /// `PRICE > 70`, with the period bags an editing surface pre-fills.
    /// Both bags are irrelevant to the initial selection and are stripped
    /// on submission.
    fn default() -> Self {
        Self {
            indicator_a: IndicatorKind::Price,
            indicator_a_params: ParamBag::from([(
                PERIOD.to_string(),
                f64::from(crate::indicators::DEFAULT_PERIOD),
            )]),
            operator: Operator::GreaterThan,
            indicator_b_type: OperandKind::Value,
            indicator_b_value: DEFAULT_B_VALUE.to_string(),
            indicator_b_params: ParamBag::from([(PERIOD.to_string(), DEFAULT_B_PERIOD)]),
        }
    }
}

/// Typed reading of `indicatorBValue`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperandB<'a> {
    Value(f64),
    Indicator(IndicatorKind),
    /// Text that does not fit the current `indicatorBType`
    Unparsed(&'a str),
}

impl Condition {
    pub fn operand_b(&self) -> OperandB<'_> {
        let raw = self.indicator_b_value.as_str();
        match self.indicator_b_type {
            OperandKind::Value => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map_or(OperandB::Unparsed(raw), OperandB::Value),
            OperandKind::Indicator => raw
                .parse::<IndicatorKind>()
                .map_or(OperandB::Unparsed(raw), OperandB::Indicator),
        }
    }
}

/// An action plus the conditions that must all hold to trigger it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub action: Action,
    #[serde(rename = "actionAmountPercent", alias = "amountPercent")]
    pub amount_percent: f64,
    pub priority: i32,
    pub conditions: Vec<Arc<Condition>>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            action: Action::Buy,
            amount_percent: 100.0,
            priority: 1,
            conditions: vec![Arc::new(Condition::default())],
        }
    }
}

impl Rule {
    /// Same rule-level fields, new condition sequence
    pub fn with_conditions(&self, conditions: Vec<Arc<Condition>>) -> Rule {
        Rule {
            action: self.action,
            amount_percent: self.amount_percent,
            priority: self.priority,
            conditions,
        }
    }
}

/// The strategy being authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDraft {
    pub name: String,
    pub description: String,
    pub rules: Vec<Arc<Rule>>,
}

impl Default for StrategyDraft {
    /// Empty name and description, one default rule
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            rules: vec![Arc::new(Rule::default())],
        }
    }
}

impl StrategyDraft {
    /// Same name and description, new rule sequence
    pub fn with_rules(&self, rules: Vec<Arc<Rule>>) -> StrategyDraft {
        StrategyDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            rules,
        }
    }

    pub fn condition_count(&self) -> usize {
        self.rules.iter().map(|r| r.conditions.len()).sum()
    }
}
