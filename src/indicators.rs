//! Indicator parameter schemas
//!
//! Maps an indicator name to the parameter keys it requires and their
//! defaults. The condition editor asks this module for a fresh parameter
//! bag whenever an indicator selection changes, and the lint pass uses it to
//! check edited bags. New indicator kinds or parameter shapes are added by
//! registering a [`ParamSchema`]; editor call sites never change.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::types::IndicatorKind;

/// Parameter bag as carried on the wire: key -> numeric value
pub type ParamBag = BTreeMap<String, f64>;

/// Largest magnitude at which every whole `f64` is an exact integer
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Serialize a bag with whole values written as JSON integers, so a period
/// goes out as `14` rather than `14.0`
pub fn serialize_bag<S: Serializer>(bag: &ParamBag, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(bag.len()))?;
    for (key, value) in bag {
        if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT {
            map.serialize_entry(key, &(*value as i64))?;
        } else {
            map.serialize_entry(key, value)?;
        }
    }
    map.end()
}

/// Key of the lookback parameter shared by SMA, EMA and RSI
pub const PERIOD: &str = "period";

/// Default lookback for period-parameterized indicators
pub const DEFAULT_PERIOD: u32 = 14;

/// A parameter bag that does not match its indicator's schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unknown indicator '{0}'")]
    UnknownIndicator(String),

    #[error("missing parameter '{0}'")]
    MissingKey(String),

    #[error("unexpected parameter '{0}'")]
    UnexpectedKey(String),

    #[error("parameter '{key}' must be a non-negative integer, got {value}")]
    NotAnInteger { key: String, value: f64 },
}

/// One parameter of an open-ended schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub key: String,
    pub default: f64,
    /// Whether the value must be a whole number
    pub integer: bool,
}

impl ParamSpec {
    pub fn integer(key: impl Into<String>, default: u32) -> Self {
        Self {
            key: key.into(),
            default: f64::from(default),
            integer: true,
        }
    }

    pub fn real(key: impl Into<String>, default: f64) -> Self {
        Self {
            key: key.into(),
            default,
            integer: false,
        }
    }
}

/// The parameter shapes an indicator can declare
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ParamShape {
    /// No parameters (PRICE)
    None,
    /// A single integer lookback
    Period { default: u32 },
    /// Any fixed set of keys, validated generically
    Open { params: Vec<ParamSpec> },
}

/// Parameters of one indicator, decoded according to its schema
#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorParams {
    Unparameterized,
    Period { period: u32 },
    Open(ParamBag),
}

/// Schema of a single indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSchema {
    pub name: String,
    #[serde(flatten)]
    pub shape: ParamShape,
}

impl ParamSchema {
    pub fn new(name: impl Into<String>, shape: ParamShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Required parameter keys in display order
    pub fn keys(&self) -> Vec<&str> {
        match &self.shape {
            ParamShape::None => vec![],
            ParamShape::Period { .. } => vec![PERIOD],
            ParamShape::Open { params } => params.iter().map(|p| p.key.as_str()).collect(),
        }
    }

    pub fn takes_params(&self) -> bool {
        !matches!(self.shape, ParamShape::None)
    }

    /// Canonical default bag for a fresh selection
    pub fn defaults(&self) -> ParamBag {
        match &self.shape {
            ParamShape::None => ParamBag::new(),
            ParamShape::Period { default } => {
                ParamBag::from([(PERIOD.to_string(), f64::from(*default))])
            }
            ParamShape::Open { params } => params
                .iter()
                .map(|p| (p.key.clone(), p.default))
                .collect(),
        }
    }

    /// Decode a bag into the typed form, rejecting missing or extra keys
    pub fn typed(&self, bag: &ParamBag) -> Result<IndicatorParams, SchemaError> {
        let keys = self.keys();
        if let Some(extra) = bag.keys().find(|k| !keys.contains(&k.as_str())) {
            return Err(SchemaError::UnexpectedKey(extra.clone()));
        }
        if let Some(missing) = keys.iter().find(|k| !bag.contains_key(**k)) {
            return Err(SchemaError::MissingKey(missing.to_string()));
        }

        match &self.shape {
            ParamShape::None => Ok(IndicatorParams::Unparameterized),
            ParamShape::Period { .. } => {
                let period = as_whole(PERIOD, bag[PERIOD])?;
                Ok(IndicatorParams::Period { period })
            }
            ParamShape::Open { params } => {
                for spec in params.iter().filter(|p| p.integer) {
                    as_whole(&spec.key, bag[&spec.key])?;
                }
                Ok(IndicatorParams::Open(bag.clone()))
            }
        }
    }

    /// Check a single parameter edit: the key must belong to this schema and
    /// integer parameters only take whole, non-negative values
    pub fn check_param(&self, key: &str, value: f64) -> Result<(), SchemaError> {
        match &self.shape {
            ParamShape::None => Err(SchemaError::UnexpectedKey(key.to_string())),
            ParamShape::Period { .. } if key == PERIOD => as_whole(key, value).map(|_| ()),
            ParamShape::Period { .. } => Err(SchemaError::UnexpectedKey(key.to_string())),
            ParamShape::Open { params } => match params.iter().find(|p| p.key == key) {
                Some(spec) if spec.integer => as_whole(key, value).map(|_| ()),
                Some(_) => Ok(()),
                None => Err(SchemaError::UnexpectedKey(key.to_string())),
            },
        }
    }
}

fn as_whole(key: &str, value: f64) -> Result<u32, SchemaError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(SchemaError::NotAnInteger {
            key: key.to_string(),
            value,
        })
    }
}

/// Lookup table from indicator name to schema
#[derive(Debug, Clone, Default)]
pub struct IndicatorRegistry {
    schemas: BTreeMap<String, ParamSchema>,
}

impl IndicatorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding PRICE, SMA, EMA and RSI
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in IndicatorKind::ALL {
            let shape = match kind {
                IndicatorKind::Price => ParamShape::None,
                IndicatorKind::Sma | IndicatorKind::Ema | IndicatorKind::Rsi => {
                    ParamShape::Period {
                        default: DEFAULT_PERIOD,
                    }
                }
            };
            registry.register(ParamSchema::new(kind.as_str(), shape));
        }
        registry
    }

    /// Process-wide built-in registry
    pub fn shared() -> Arc<IndicatorRegistry> {
        static SHARED: OnceLock<Arc<IndicatorRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(IndicatorRegistry::builtin()))
            .clone()
    }

    /// Add or replace a schema
    pub fn register(&mut self, schema: ParamSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn schema(&self, name: &str) -> Option<&ParamSchema> {
        self.schemas.get(name)
    }

    pub fn schema_for(&self, kind: IndicatorKind) -> Option<&ParamSchema> {
        self.schema(kind.as_str())
    }

    /// Default bag for `name`; empty when the name is unknown or takes no parameters
    pub fn defaults_for_name(&self, name: &str) -> ParamBag {
        self.schema(name).map(ParamSchema::defaults).unwrap_or_default()
    }

    pub fn defaults_for(&self, kind: IndicatorKind) -> ParamBag {
        self.defaults_for_name(kind.as_str())
    }

    /// Parameter inputs an editing surface should show for `name`
    pub fn controls_for_name(&self, name: &str) -> Vec<&str> {
        self.schema(name).map(ParamSchema::keys).unwrap_or_default()
    }

    pub fn controls_for(&self, kind: IndicatorKind) -> Vec<&str> {
        self.controls_for_name(kind.as_str())
    }

    pub fn validate(&self, name: &str, bag: &ParamBag) -> Result<IndicatorParams, SchemaError> {
        self.schema(name)
            .ok_or_else(|| SchemaError::UnknownIndicator(name.to_string()))?
            .typed(bag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSchema> {
        self.schemas.values()
    }
}
