//! Schema command: list indicators and their parameter controls

use anyhow::Result;
use itertools::Itertools;
use strategy_builder::indicators::ParamShape;
use strategy_builder::{IndicatorKind, IndicatorRegistry};

pub fn run(json: bool) -> Result<()> {
    let registry = IndicatorRegistry::shared();

    if json {
        let schemas: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    println!("{:<10} {:<10} {}", "Indicator", "Shape", "Defaults");
    println!("{}", "-".repeat(40));
    for kind in IndicatorKind::ALL {
        let Some(schema) = registry.schema_for(kind) else {
            continue;
        };
        let shape = match &schema.shape {
            ParamShape::None => "none",
            ParamShape::Period { .. } => "period",
            ParamShape::Open { .. } => "open",
        };
        let defaults = schema
            .defaults()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .join(", ");
        println!("{:<10} {:<10} {}", kind.as_str(), shape, defaults);
    }
    Ok(())
}
