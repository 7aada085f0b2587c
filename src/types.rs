//! Core enums of the strategy data model
//!
//! Every enum serializes to the upper-case spelling the strategy service
//! expects (`BUY`, `GREATER_THAN`, `INDICATOR`, ...) and parses the same
//! spelling back through `FromStr`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a wire string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Order direction of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    #[default]
    Buy,
    Sell,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Buy, Action::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            _ => Err(ParseError::new("action", s)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Technical signal a condition can compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndicatorKind {
    #[default]
    Price,
    Sma,
    Ema,
    Rsi,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::Price,
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Rsi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Price => "PRICE",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRICE" => Ok(IndicatorKind::Price),
            "SMA" => Ok(IndicatorKind::Sma),
            "EMA" => Ok(IndicatorKind::Ema),
            "RSI" => Ok(IndicatorKind::Rsi),
            _ => Err(ParseError::new("indicator", s)),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison between the two sides of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    #[default]
    GreaterThan,
    LessThan,
    CrossesAbove,
    CrossesBelow,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::CrossesAbove,
        Operator::CrossesBelow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::GreaterThan => "GREATER_THAN",
            Operator::LessThan => "LESS_THAN",
            Operator::CrossesAbove => "CROSSES_ABOVE",
            Operator::CrossesBelow => "CROSSES_BELOW",
        }
    }

    /// Human label, e.g. "CROSSES ABOVE"
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl FromStr for Operator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GREATER_THAN" => Ok(Operator::GreaterThan),
            "LESS_THAN" => Ok(Operator::LessThan),
            "CROSSES_ABOVE" => Ok(Operator::CrossesAbove),
            "CROSSES_BELOW" => Ok(Operator::CrossesBelow),
            _ => Err(ParseError::new("operator", s)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the right-hand side of a condition is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperandKind {
    /// `indicatorBValue` is a numeric literal
    #[default]
    Value,
    /// `indicatorBValue` names an indicator
    Indicator,
}

impl OperandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperandKind::Value => "VALUE",
            OperandKind::Indicator => "INDICATOR",
        }
    }
}

impl FromStr for OperandKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALUE" => Ok(OperandKind::Value),
            "INDICATOR" => Ok(OperandKind::Indicator),
            _ => Err(ParseError::new("operand type", s)),
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a condition a parameter edit addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamSide {
    A,
    B,
}

impl FromStr for ParamSide {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(ParamSide::A),
            "B" | "b" => Ok(ParamSide::B),
            _ => Err(ParseError::new("parameter side", s)),
        }
    }
}

impl fmt::Display for ParamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSide::A => f.write_str("A"),
            ParamSide::B => f.write_str("B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_spelling_matches_display() {
        for kind in IndicatorKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
            assert_eq!(kind.as_str().parse::<IndicatorKind>().unwrap(), kind);
        }
        for op in Operator::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op));
        }
        assert_eq!(serde_json::to_string(&OperandKind::Indicator).unwrap(), "\"INDICATOR\"");
        assert_eq!(serde_json::to_string(&Action::Sell).unwrap(), "\"SELL\"");
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "MACD".parse::<IndicatorKind>().unwrap_err();
        assert_eq!(err.kind, "indicator");
        assert_eq!(err.to_string(), "unknown indicator 'MACD'");
        assert!("buy".parse::<Action>().is_err());
        assert!("C".parse::<ParamSide>().is_err());
    }

    #[test]
    fn test_operator_label() {
        assert_eq!(Operator::CrossesAbove.label(), "CROSSES ABOVE");
        assert_eq!(Operator::LessThan.label(), "LESS THAN");
    }
}
