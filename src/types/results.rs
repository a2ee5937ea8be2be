//! Multi-strategy result map.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{Chunk, StrategyKind};

/// Chunks produced per strategy, in the order the strategies were requested.
///
/// Strategies that failed are absent; a strategy that succeeded but found
/// nothing to emit maps to an empty batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyResults {
    entries: Vec<(StrategyKind, Vec<Chunk>)>,
}

impl StrategyResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the batch for `kind`, replacing any earlier one.
    pub fn insert(&mut self, kind: StrategyKind, chunks: Vec<Chunk>) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = chunks,
            None => self.entries.push((kind, chunks)),
        }
    }

    pub fn get(&self, kind: StrategyKind) -> Option<&[Chunk]> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, chunks)| chunks.as_slice())
    }

    pub fn contains(&self, kind: StrategyKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    /// Strategies present, in insertion order.
    pub fn strategies(&self) -> impl Iterator<Item = StrategyKind> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StrategyKind, &[Chunk])> {
        self.entries.iter().map(|(k, chunks)| (*k, chunks.as_slice()))
    }

    /// The first entry, if any.
    pub fn first(&self) -> Option<(StrategyKind, &[Chunk])> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take ownership of one strategy's batch.
    pub fn remove(&mut self, kind: StrategyKind) -> Option<Vec<Chunk>> {
        let position = self.entries.iter().position(|(k, _)| *k == kind)?;
        Some(self.entries.remove(position).1)
    }
}

impl IntoIterator for StrategyResults {
    type Item = (StrategyKind, Vec<Chunk>);
    type IntoIter = std::vec::IntoIter<(StrategyKind, Vec<Chunk>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(StrategyKind, Vec<Chunk>)> for StrategyResults {
    fn from_iter<I: IntoIterator<Item = (StrategyKind, Vec<Chunk>)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (kind, chunks) in iter {
            results.insert(kind, chunks);
        }
        results
    }
}

impl Serialize for StrategyResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, chunks) in &self.entries {
            map.serialize_entry(kind.as_str(), chunks)?;
        }
        map.end()
    }
}
