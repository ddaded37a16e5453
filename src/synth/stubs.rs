//! Virtual-dispatch support: one fused body must exist per derived record a
//! virtual callee might actually resolve to at runtime, since the concrete
//! code executed depends on the traversed node's dynamic type rather than
//! its static one.

use crate::base::{FunctionId, IStr, RecordId};
use crate::functions::FunctionAnalyzer;
use crate::records::RecordAnalyzer;

/// Whether any of a candidate's participating callees is declared virtual.
pub fn has_virtual_callee(callees: &[FunctionId], functions: &FunctionAnalyzer) -> bool {
    callees.iter().any(|&id| functions.analysis(id).is_virtual_flag)
}

/// For each record derived from `owner`, resolves every callee's override on
/// that record — falling back to the callee itself when the derived record
/// doesn't override it, since the base implementation still applies there.
pub fn resolve_overrides_per_derived(
    owner: RecordId,
    callees: &[FunctionId],
    records: &RecordAnalyzer,
    functions: &FunctionAnalyzer,
) -> Vec<(RecordId, Vec<FunctionId>)> {
    records
        .derived_of(owner)
        .iter()
        .map(|&derived| {
            let derived_name = records.record(derived).name.clone();
            let resolved = callees
                .iter()
                .map(|&callee| {
                    let method_name = functions.analysis(callee).name.clone();
                    functions.find_method(&derived_name, &method_name).unwrap_or(callee)
                })
                .collect();
            (derived, resolved)
        })
        .collect()
}

/// The name distinguishing one derived record's stub from its siblings,
/// e.g. `_fuse_F1F2` becomes `_fuse_F1F2_Circle` for record `Circle`.
pub fn stub_suffix(base_name: &str, record_name: &IStr) -> String {
    format!("{base_name}_{record_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Field, Function, Param, Record, Stmt};

    fn traversal(name: &str, owner: Option<&str>, is_virtual: bool) -> Function {
        Function {
            name: IStr::from(name),
            owner_record: owner.map(IStr::from),
            is_virtual,
            params: vec![Param::new("n", "Node*")],
            body: vec![Stmt::Return(None)],
        }
    }

    fn record(name: &str, base: Option<&str>) -> Record {
        Record {
            name: IStr::from(name),
            base: base.map(IStr::from),
            fields: vec![Field { name: IStr::from("left"), type_name: IStr::from(name) }],
        }
    }

    #[test]
    fn a_candidate_with_one_virtual_callee_needs_stubs() {
        let f = traversal("accept", Some("Shape"), true);
        let functions = FunctionAnalyzer::analyze(&[f]);
        let accept = functions.find("accept").unwrap();
        assert!(has_virtual_callee(&[accept], &functions));
    }

    #[test]
    fn non_virtual_callees_need_no_stubs() {
        let f = traversal("visit", None, false);
        let functions = FunctionAnalyzer::analyze(&[f]);
        let visit = functions.find("visit").unwrap();
        assert!(!has_virtual_callee(&[visit], &functions));
    }

    #[test]
    fn derived_record_override_is_preferred_over_the_base() {
        let base_accept = traversal("accept", Some("Shape"), true);
        let circle_accept = traversal("accept", Some("Circle"), true);
        let functions = FunctionAnalyzer::analyze(&[base_accept, circle_accept]);
        let records = RecordAnalyzer::analyze(&[record("Shape", None), record("Circle", Some("Shape"))]);

        let owner = records.find("Shape").unwrap();
        let base_id = functions.find_method(&IStr::from("Shape"), &IStr::from("accept")).unwrap();
        let overrides = resolve_overrides_per_derived(owner, &[base_id], &records, &functions);

        assert_eq!(overrides.len(), 1);
        let (derived, resolved) = &overrides[0];
        assert_eq!(records.record(*derived).name, IStr::from("Circle"));
        assert_eq!(
            *resolved,
            vec![functions.find_method(&IStr::from("Circle"), &IStr::from("accept")).unwrap()]
        );
    }

    #[test]
    fn a_record_with_no_override_falls_back_to_the_base_implementation() {
        let base_accept = traversal("accept", Some("Shape"), true);
        let functions = FunctionAnalyzer::analyze(&[base_accept]);
        let records = RecordAnalyzer::analyze(&[record("Shape", None), record("Square", Some("Shape"))]);

        let owner = records.find("Shape").unwrap();
        let base_id = functions.find_method(&IStr::from("Shape"), &IStr::from("accept")).unwrap();
        let overrides = resolve_overrides_per_derived(owner, &[base_id], &records, &functions);

        assert_eq!(overrides[0].1, vec![base_id]);
    }
}
