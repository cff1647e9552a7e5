//! Appended (computed) attributes requested for serialization.
//!
//! The registry is owned by a single [`crate::Query`], so concurrent requests
//! never see each other's choices. Two modes exist per model:
//!
//! - **override**: serialize exactly the given attributes
//! - **merge**: serialize the given attributes followed by the model's
//!   [`ApiModel::default_appends`]
//!
//! Override wins when both are set. Within a mode the last write wins.

use std::collections::HashMap;

use crate::model::ApiModel;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Appends {
    overrides: HashMap<String, Vec<String>>,
    merges: HashMap<String, Vec<String>>,
}

impl Appends {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the model's appended attributes with `appends`
    pub fn override_appends(&mut self, model: &dyn ApiModel, appends: Vec<String>) {
        self.overrides
            .insert(model.table_name().to_string(), appends);
    }

    /// Serialize `appends` in addition to the model's defaults
    pub fn merge_appends(&mut self, model: &dyn ApiModel, appends: Vec<String>) {
        self.merges.insert(model.table_name().to_string(), appends);
    }

    /// Attributes to serialize for `model`
    #[must_use]
    pub fn effective(&self, model: &dyn ApiModel) -> Vec<String> {
        let key = model.table_name();
        if let Some(overridden) = self.overrides.get(key) {
            return overridden.clone();
        }

        let mut effective: Vec<String> = Vec::new();
        let merged = self.merges.get(key).into_iter().flatten().cloned();
        let defaults = model.default_appends().into_iter().map(str::to_string);
        for name in merged.chain(defaults) {
            if !effective.contains(&name) {
                effective.push(name);
            }
        }
        effective
    }

    /// Whether any append was registered for `model`
    #[must_use]
    pub fn is_set(&self, model: &dyn ApiModel) -> bool {
        let key = model.table_name();
        self.overrides.contains_key(key) || self.merges.contains_key(key)
    }
}
