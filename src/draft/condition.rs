//! Condition editor
//!
//! Field edits that change an indicator selection reset the matching
//! parameter bag to the resolver's defaults for the new selection:
//!
//! | edit                                   | effect on parameters                  |
//! |----------------------------------------|---------------------------------------|
//! | `indicatorA = k`                       | A bag := defaults(k)                  |
//! | `indicatorBValue = v` under INDICATOR  | B bag := defaults(v)                  |
//! | `indicatorBValue = v` under VALUE      | none                                  |
//! | `indicatorBType = VALUE`               | B bag := {}                           |
//! | `indicatorBType = INDICATOR`           | none (B bag may be stale until the    |
//! |                                        | next `indicatorBValue` edit)          |
//! | `operator`                             | none                                  |
//!
//! Parameter edits merge a single key and never reset the bag.

use std::sync::Arc;

use super::{Condition, DraftStore, EditError, StrategyDraft};
use crate::indicators::{IndicatorRegistry, ParamBag};
use crate::types::{IndicatorKind, OperandKind, Operator, ParamSide};

/// Condition field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionField {
    IndicatorA(IndicatorKind),
    Operator(Operator),
    IndicatorBType(OperandKind),
    /// Free text: a literal under VALUE, an indicator name under INDICATOR
    IndicatorBValue(String),
}

impl ConditionField {
    /// Build from a string-keyed form event
    pub fn parse(field: &str, value: &str) -> Result<Self, EditError> {
        match field {
            "indicatorA" => Ok(ConditionField::IndicatorA(value.parse()?)),
            "operator" => Ok(ConditionField::Operator(value.parse()?)),
            "indicatorBType" => Ok(ConditionField::IndicatorBType(value.parse()?)),
            "indicatorBValue" => Ok(ConditionField::IndicatorBValue(value.to_string())),
            other => Err(EditError::UnknownField(other.to_string())),
        }
    }
}

impl Condition {
    /// Copy of this condition with `field` applied, resetting parameter bags
    /// whenever the indicator selection on that side changes
    pub fn with_field(&self, field: ConditionField, registry: &IndicatorRegistry) -> Condition {
        let mut next = self.clone();
        match field {
            ConditionField::IndicatorA(kind) => {
                next.indicator_a = kind;
                next.indicator_a_params = registry.defaults_for(kind);
            }
            ConditionField::Operator(operator) => next.operator = operator,
            ConditionField::IndicatorBType(kind) => {
                next.indicator_b_type = kind;
                if kind == OperandKind::Value {
                    next.indicator_b_params = ParamBag::new();
                }
            }
            ConditionField::IndicatorBValue(value) => {
                if next.indicator_b_type == OperandKind::Indicator {
                    next.indicator_b_params = registry.defaults_for_name(&value);
                }
                next.indicator_b_value = value;
            }
        }
        next
    }

    /// Copy of this condition with one parameter merged into the bag on `side`
    pub fn with_param(&self, side: ParamSide, key: impl Into<String>, value: f64) -> Condition {
        let mut next = self.clone();
        let bag = match side {
            ParamSide::A => &mut next.indicator_a_params,
            ParamSide::B => &mut next.indicator_b_params,
        };
        bag.insert(key.into(), value);
        next
    }

    pub fn params(&self, side: ParamSide) -> &ParamBag {
        match side {
            ParamSide::A => &self.indicator_a_params,
            ParamSide::B => &self.indicator_b_params,
        }
    }

    /// Indicator name selected on `side`, if that side holds an indicator
    pub fn indicator_name(&self, side: ParamSide) -> Option<&str> {
        match side {
            ParamSide::A => Some(self.indicator_a.as_str()),
            ParamSide::B => (self.indicator_b_type == OperandKind::Indicator)
                .then_some(self.indicator_b_value.as_str()),
        }
    }

    /// Parameter inputs an editing surface should show on `side`
    pub fn param_controls<'r>(
        &self,
        side: ParamSide,
        registry: &'r IndicatorRegistry,
    ) -> Vec<&'r str> {
        self.indicator_name(side)
            .map(|name| registry.controls_for_name(name))
            .unwrap_or_default()
    }
}

impl DraftStore {
    /// Append a default condition to the rule at `rule_index`
    pub fn add_condition(&mut self, rule_index: usize) -> Result<Arc<StrategyDraft>, EditError> {
        self.edit_rule(rule_index, "add_condition", |rule| {
            let mut conditions = rule.conditions.clone();
            conditions.push(Arc::new(Condition::default()));
            Ok(rule.with_conditions(conditions))
        })
    }

    /// Remove one condition; a rule may end up with none
    pub fn remove_condition(
        &mut self,
        rule_index: usize,
        cond_index: usize,
    ) -> Result<Arc<StrategyDraft>, EditError> {
        self.edit_rule(rule_index, "remove_condition", |rule| {
            let len = rule.conditions.len();
            if cond_index >= len {
                return Err(EditError::ConditionOutOfRange {
                    rule: rule_index,
                    index: cond_index,
                    len,
                });
            }
            let mut conditions = rule.conditions.clone();
            conditions.remove(cond_index);
            Ok(rule.with_conditions(conditions))
        })
    }

    /// Apply a field edit, with the parameter resets described in the module docs
    pub fn update_condition_field(
        &mut self,
        rule_index: usize,
        cond_index: usize,
        field: ConditionField,
    ) -> Result<Arc<StrategyDraft>, EditError> {
        let registry = Arc::clone(self.registry());
        self.edit_condition(rule_index, cond_index, "update_condition_field", |cond| {
            Ok(cond.with_field(field, &registry))
        })
    }

    /// Merge one parameter into the bag on `side`, keeping other keys.
    /// When `side` holds a known indicator the key and value must fit its
    /// schema; integer parameters take whole, non-negative values only.
    pub fn update_condition_param(
        &mut self,
        rule_index: usize,
        cond_index: usize,
        side: ParamSide,
        key: impl Into<String>,
        value: f64,
    ) -> Result<Arc<StrategyDraft>, EditError> {
        let key = key.into();
        if !value.is_finite() {
            return Err(EditError::InvalidValue {
                field: key,
                reason: format!("{} is not a finite number", value),
            });
        }
        let registry = Arc::clone(self.registry());
        self.edit_condition(rule_index, cond_index, "update_condition_param", |cond| {
            let schema = cond
                .indicator_name(side)
                .and_then(|name| registry.schema(name));
            if let Some(schema) = schema {
                schema
                    .check_param(&key, value)
                    .map_err(|e| EditError::InvalidValue {
                        field: key.clone(),
                        reason: e.to_string(),
                    })?;
            }
            Ok(cond.with_param(side, key, value))
        })
    }
}
