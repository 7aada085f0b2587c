//! Strategy Builder
//!
//! Authoring engine for rule-based trading strategies: an editable draft of
//! rules and conditions, per-indicator parameter schemas, and the cleaning
//! step that turns a draft into the payload accepted by the strategy
//! service.

pub mod client;
pub mod config;
pub mod draft;
pub mod indicators;
pub mod realtime;
pub mod submission;
pub mod types;

pub use config::Settings;
pub use draft::{Condition, DraftStore, EditCommand, EditError, Rule, StrategyDraft};
pub use indicators::{IndicatorRegistry, ParamBag};
pub use submission::{clean_for_submission, CleanedStrategy};
pub use types::*;
