//! Record analyzer: classifies user-defined record types, identifies which
//! fields are child-pointer "tree edges", and records subtype relations.

use rustc_hash::FxHashMap;

use crate::base::{IStr, RecordId};
use crate::ir::Record;

/// Analyzed information for one record type.
#[derive(Debug, Clone)]
pub struct RecordInfo {
    pub id: RecordId,
    pub name: IStr,
    pub base: Option<RecordId>,
    /// Fields whose declared type names another analyzed record — these are
    /// the tree edges a traversal call can descend through.
    pub child_fields: Vec<IStr>,
}

/// Immutable, per-translation-unit analysis of every record type: computed
/// once and never mutated afterward.
#[derive(Debug, Default)]
pub struct RecordAnalyzer {
    records: Vec<RecordInfo>,
    by_name: FxHashMap<IStr, RecordId>,
    /// base record -> every record declared as derived from it, directly or
    /// transitively.
    derived_of: FxHashMap<RecordId, Vec<RecordId>>,
}

impl RecordAnalyzer {
    pub fn analyze(records: &[Record]) -> Self {
        let mut by_name = FxHashMap::default();
        let mut infos = Vec::with_capacity(records.len());

        for (idx, record) in records.iter().enumerate() {
            let id = RecordId::new(idx);
            by_name.insert(record.name.clone(), id);
            infos.push(RecordInfo {
                id,
                name: record.name.clone(),
                base: None,
                child_fields: Vec::new(),
            });
        }

        for (idx, record) in records.iter().enumerate() {
            let id = RecordId::new(idx);
            let base = record.base.as_ref().and_then(|b| by_name.get(b)).copied();
            infos[idx].base = base;

            let mut child_fields = Vec::new();
            for field in &record.fields {
                if by_name.contains_key(&field.type_name) {
                    child_fields.push(field.name.clone());
                }
            }
            infos[idx].child_fields = child_fields;
            let _ = id;
        }

        let mut derived_of: FxHashMap<RecordId, Vec<RecordId>> = FxHashMap::default();
        for info in &infos {
            let mut base = info.base;
            while let Some(base_id) = base {
                derived_of.entry(base_id).or_default().push(info.id);
                base = infos[base_id.index()].base;
            }
        }

        Self {
            records: infos,
            by_name,
            derived_of,
        }
    }

    pub fn record(&self, id: RecordId) -> &RecordInfo {
        &self.records[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<RecordId> {
        self.by_name.get(name).copied()
    }

    pub fn is_child_edge(&self, id: RecordId, field: &str) -> bool {
        self.records[id.index()]
            .child_fields
            .iter()
            .any(|f| &**f == field)
    }

    /// Every record derived from `id`, directly or transitively, in
    /// declaration order.
    pub fn derived_of(&self, id: RecordId) -> &[RecordId] {
        self.derived_of.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Field;

    fn record(name: &str, base: Option<&str>, fields: &[(&str, &str)]) -> Record {
        Record {
            name: name.into(),
            base: base.map(Into::into),
            fields: fields
                .iter()
                .map(|(n, t)| Field {
                    name: (*n).into(),
                    type_name: (*t).into(),
                })
                .collect(),
        }
    }

    #[test]
    fn identifies_child_edges_by_type_name() {
        let records = vec![
            record("Node", None, &[("left", "Node"), ("value", "int")]),
        ];
        let analyzer = RecordAnalyzer::analyze(&records);
        let node = analyzer.find("Node").unwrap();
        assert!(analyzer.is_child_edge(node, "left"));
        assert!(!analyzer.is_child_edge(node, "value"));
    }

    #[test]
    fn tracks_direct_and_transitive_derived_records() {
        let records = vec![
            record("Node", None, &[]),
            record("Leaf", Some("Node"), &[]),
            record("TaggedLeaf", Some("Leaf"), &[]),
        ];
        let analyzer = RecordAnalyzer::analyze(&records);
        let node = analyzer.find("Node").unwrap();
        let leaf = analyzer.find("Leaf").unwrap();
        let tagged_leaf = analyzer.find("TaggedLeaf").unwrap();

        assert!(analyzer.derived_of(node).contains(&leaf));
        assert!(analyzer.derived_of(node).contains(&tagged_leaf));
        assert!(analyzer.derived_of(leaf).contains(&tagged_leaf));
        assert!(analyzer.derived_of(tagged_leaf).is_empty());
    }
}
