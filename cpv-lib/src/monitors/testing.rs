//! In-memory monitor source for unit tests

use super::{Monitor, MonitorKind, MonitorSource};
use crate::Result;
use std::sync::Mutex;

/// Evaluates the selectors built by `label_selector`: `label`, `label=value`, and `!label`.
#[derive(Debug, Default)]
pub struct FakeSource {
    pub monitors: Vec<Monitor>,
    pub selectors: Mutex<Vec<String>>,
}

impl MonitorSource for FakeSource {
    async fn list(&self, kind: MonitorKind, selector: &str) -> Result<Vec<Monitor>> {
        self.selectors.lock().expect("lock not poisoned").push(selector.to_string());

        let unlabeled = selector.starts_with('!');
        let value = selector.split_once('=').map(|(_, v)| v);

        Ok(self
            .monitors
            .iter()
            .filter(|m| m.kind == kind)
            .filter(|m| match (unlabeled, value, m.profile.as_deref()) {
                (true, _, profile) => profile.is_none(),
                (false, None, profile) => profile.is_some(),
                (false, Some(v), Some(p)) => v == p,
                (false, Some(_), None) => false,
            })
            .cloned()
            .collect())
    }
}

pub fn monitor(name: &str, kind: MonitorKind, profile: Option<&str>) -> Monitor {
    Monitor {
        name: name.to_string(),
        kind,
        profile: profile.map(ToString::to_string),
        endpoints: Vec::new(),
    }
}
