//! Insertion-ordered node result map.
//!
//! Results are keyed by node ID and must iterate in execution order: output
//! nodes scan earlier results front to back, so the first producer of a
//! field wins. A plain `HashMap` loses that order, hence this small newtype
//! over a key/value vector. Workflows are tens of nodes, not thousands, so
//! linear lookup is fine.

use serde_json::{Map, Value};

/// Reserved key holding the run's initial input data.
pub const INPUT_KEY: &str = "input";

/// Results of every executed node, in execution order, plus the reserved
/// [`INPUT_KEY`] entry seeded before the first node runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMap {
    entries: Vec<(String, Value)>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map pre-populated with the reserved input entry.
    pub fn seeded(input_data: Value) -> Self {
        let mut map = Self::new();
        map.insert(INPUT_KEY, input_data);
        map
    }

    /// Store a node's result. Re-inserting an existing key replaces the
    /// value in place, keeping the original position.
    pub fn insert(&mut self, node_id: impl Into<String>, value: Value) {
        let node_id = node_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == node_id) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((node_id, value)),
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(id, _)| id == node_id)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.get(node_id).is_some()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(id, value)| (id.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the whole map as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (id, value) in &self.entries {
            object.insert(id.clone(), value.clone());
        }
        Value::Object(object)
    }
}
