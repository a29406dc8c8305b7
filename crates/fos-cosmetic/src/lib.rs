//! fOS Cosmetic - incremental DOM feature monitoring
//!
//! Watches a live document for structural and attribute changes and
//! reports the elements touched and the ids, class tokens and link
//! targets never reported before.
//!
//! - [`extract_features`]: pure extraction over a set of roots
//! - [`DomMonitor`]: stateful change monitor with lifetime deduplication
//! - [`inject_script`]: self-removing script carrier the monitor ignores

mod config;
mod dom;
mod features;
mod inject;
mod monitor;
mod source;

pub use config::{ConfigError, MonitorConfig, WATCHED_ATTRIBUTES};
pub use features::{FeatureSet, IGNORED_TAGS, extract_features, extract_features_with};
pub use inject::{
    InjectError, SCRIPT_ID, ScriptError, ScriptHost, auto_remove_script, inject_script,
    inject_script_with_id,
};
pub use monitor::{DomMonitor, KnownFeatures, MonitorUpdate};
pub use source::{ChangeRecord, ElementTree, MutationSource, ObserveOptions, SubscriptionId};
