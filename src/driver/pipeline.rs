//! Per-translation-unit orchestration: wires every analysis stage into one
//! run, and fans that out across translation units.
//!
//! Ported from `ToolMain.cpp`'s `main`: analyze records, analyze functions,
//! find candidates, run the transformer per candidate, collect the
//! changed-file writeback. Concurrency across translation units (absent
//! from the original's single-process-per-invocation loop) is added per
//! the single-threaded-per-unit model: each unit still runs its own stages
//! serially, but independent units run on separate `rayon` workers.

use std::path::PathBuf;

use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{FunctionId, RecordId, TuId};
use crate::candidates::{find_candidates, Candidate};
use crate::core::error::PlannerError;
use crate::core::FusionConfig;
use crate::dependence::build_dependence_graph;
use crate::fsm::SymbolTable;
use crate::functions::FunctionAnalyzer;
use crate::ir::{Function, Record, Stmt};
use crate::records::RecordAnalyzer;
use crate::scheduler::{parallel_schedule, run_greedy_fusion};
use crate::statement_info::StatementInfoCache;
use crate::synth::{self, names::NameRegistry, signature::Variant};

/// One translation unit's input IR: the concrete stand-in for whatever an
/// external parser/AST layer would hand the driver.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub id: TuId,
    pub path: PathBuf,
    pub records: Vec<Record>,
    pub functions: Vec<Function>,
}

/// One derived record's own fused-function pair, for a candidate whose
/// participating callees resolve virtually.
#[derive(Debug, Clone)]
pub struct DerivedStub {
    pub record: RecordId,
    pub name: String,
    pub parallel: Vec<Stmt>,
    pub serial: Vec<Stmt>,
}

/// One candidate's synthesized replacement: the parallel/serial fused
/// bodies plus any per-derived-record stubs a virtual callee requires.
#[derive(Debug, Clone)]
pub struct FusedCandidate {
    pub host_function: crate::base::IStr,
    pub candidate: Candidate,
    pub base_name: String,
    pub parallel: Vec<Stmt>,
    pub serial: Vec<Stmt>,
    pub stubs: Vec<DerivedStub>,
}

/// The full writeback plan for one translation unit.
#[derive(Debug, Clone)]
pub struct TuPlan {
    pub tu: TuId,
    pub fused: Vec<FusedCandidate>,
}

/// Runs every stage of the pipeline for one translation unit: records,
/// functions, candidates, then per-candidate dependence graph, schedule,
/// and synthesis.
pub fn run_translation_unit(
    tu: &TranslationUnit,
    config: &FusionConfig,
    names: &Mutex<NameRegistry>,
) -> Result<TuPlan, PlannerError> {
    let span = tracing::info_span!("translation_unit", path = %tu.path.display());
    let _entered = span.enter();

    let records = RecordAnalyzer::analyze(&tu.records);
    let functions = FunctionAnalyzer::analyze(&tu.functions);

    let mut fused = Vec::new();
    for function in &tu.functions {
        let host_id = functions.find(&function.name).expect("just analyzed this function");
        let host_analysis = functions.analysis(host_id);
        let candidates = find_candidates(host_analysis, &functions);
        for candidate in candidates {
            let built = build_one_candidate(tu, &candidate, host_analysis, &functions, &records, config, names)?;
            fused.push(built);
        }
    }

    tracing::info!(fused = fused.len(), "translation unit complete");
    Ok(TuPlan { tu: tu.id, fused })
}

fn build_one_candidate(
    tu: &TranslationUnit,
    candidate: &Candidate,
    host_analysis: &crate::functions::FunctionAnalysis,
    functions: &FunctionAnalyzer,
    records: &RecordAnalyzer,
    config: &FusionConfig,
    names: &Mutex<NameRegistry>,
) -> Result<FusedCandidate, PlannerError> {
    let mut table = SymbolTable::new();
    let mut cache = StatementInfoCache::new();
    let mut analysis = build_dependence_graph(candidate, host_analysis, functions, records, &mut table, &mut cache);

    run_greedy_fusion(&mut analysis.graph, config);
    debug_assert!(!analysis.graph.has_illegal_merge(), "greedy fusion left an illegal merge in place");

    let schedule = parallel_schedule(&analysis.graph);
    let participating = participating_callees(candidate, host_analysis, functions);

    let (base_name, parallel, serial) = {
        let mut names = names.lock();
        let parallel = synth::emit_fused_body(&schedule, &analysis.graph, &analysis.statements, &mut names, Variant::Parallel);
        let serial = synth::emit_fused_body(&schedule, &analysis.graph, &analysis.statements, &mut names, Variant::Serial);
        let base_name = names.fused_base_name(&participating);
        (base_name, parallel, serial)
    };
    tracing::debug!(base_name = %base_name, stmts = candidate.len(), "synthesized fused function");

    let stubs = if synth::has_virtual_callee(&participating, functions) {
        build_stubs(tu, candidate, host_analysis, functions, records, config, names, &participating, &base_name)?
    } else {
        Vec::new()
    };

    Ok(FusedCandidate {
        host_function: host_analysis.name.clone(),
        candidate: candidate.clone(),
        base_name,
        parallel,
        serial,
        stubs,
    })
}

fn participating_callees(
    candidate: &Candidate,
    host_analysis: &crate::functions::FunctionAnalysis,
    functions: &FunctionAnalyzer,
) -> Vec<FunctionId> {
    candidate
        .stmt_indices
        .iter()
        .filter_map(|&idx| host_analysis.stmts[idx].as_call())
        .filter_map(|call| functions.find(&call.callee))
        .collect()
}

/// Re-emits one fused function pair per derived record a virtual
/// participating callee might resolve to: a scoped function set swaps the
/// base callee out for the derived record's override, and the whole
/// candidate re-runs the dependence-graph → schedule → synthesis sequence
/// against it. The schedule's shape doesn't change across overrides (the
/// extended footprint used to build it already unions every override's
/// effects, see [`crate::statement_info::StatementInfoCache::call_footprint`]);
/// only the concrete statements each node resolves to differ.
#[allow(clippy::too_many_arguments)]
fn build_stubs(
    tu: &TranslationUnit,
    candidate: &Candidate,
    host_analysis: &crate::functions::FunctionAnalysis,
    functions: &FunctionAnalyzer,
    records: &RecordAnalyzer,
    config: &FusionConfig,
    names: &Mutex<NameRegistry>,
    participating: &[FunctionId],
    base_name: &str,
) -> Result<Vec<DerivedStub>, PlannerError> {
    let Some(owner_name) = functions.analysis(participating[0]).owner_record.clone() else {
        return Ok(Vec::new());
    };
    let Some(owner) = records.find(&owner_name) else {
        return Ok(Vec::new());
    };

    let overrides = synth::resolve_overrides_per_derived(owner, participating, records, functions);
    let mut stubs = Vec::with_capacity(overrides.len());

    for (derived, resolved_callees) in overrides {
        let scoped_fns = scoped_functions(&tu.functions, &resolved_callees);
        let scoped_functions_analyzer = FunctionAnalyzer::analyze(&scoped_fns);
        let Some(scoped_host_id) = scoped_functions_analyzer.find(&host_analysis.name) else {
            tracing::warn!(record = %records.record(derived).name, "host function missing from scoped override set, skipping stub");
            continue;
        };
        let scoped_host = scoped_functions_analyzer.analysis(scoped_host_id);

        let mut table = SymbolTable::new();
        let mut cache = StatementInfoCache::new();
        let mut analysis = build_dependence_graph(candidate, scoped_host, &scoped_functions_analyzer, records, &mut table, &mut cache);
        run_greedy_fusion(&mut analysis.graph, config);
        debug_assert!(!analysis.graph.has_illegal_merge());
        let schedule = parallel_schedule(&analysis.graph);

        let mut names = names.lock();
        let parallel = synth::emit_fused_body(&schedule, &analysis.graph, &analysis.statements, &mut names, Variant::Parallel);
        let serial = synth::emit_fused_body(&schedule, &analysis.graph, &analysis.statements, &mut names, Variant::Serial);
        let record_name = records.record(derived).name.clone();
        let name = synth::stub_suffix(base_name, &record_name);
        tracing::debug!(record = %record_name, name = %name, "synthesized virtual-dispatch stub");

        stubs.push(DerivedStub { record: derived, name, parallel, serial });
    }

    Ok(stubs)
}

/// A function list scoped to one derived record's overrides: any function
/// sharing a resolved override's name is dropped unless it *is* the
/// resolved override, so name lookups within the scoped set resolve
/// unambiguously to the derived record's implementation.
fn scoped_functions(tu_functions: &[Function], resolved_callees: &[FunctionId]) -> Vec<Function> {
    let resolved_ids: FxHashSet<usize> = resolved_callees.iter().map(|f| f.index()).collect();
    let kept_names: FxHashMap<crate::base::IStr, ()> = resolved_callees
        .iter()
        .map(|&id| (tu_functions[id.index()].name.clone(), ()))
        .collect();

    tu_functions
        .iter()
        .enumerate()
        .filter(|(idx, f)| !kept_names.contains_key(&f.name) || resolved_ids.contains(idx))
        .map(|(_, f)| f.clone())
        .collect()
}

/// Runs every translation unit, in parallel: each unit is single-threaded
/// internally (spec.md §5), but independent units may run concurrently. A
/// shared, mutex-guarded [`NameRegistry`] keeps fused-function numbering
/// unique across the whole run.
pub fn run(tus: &[TranslationUnit], config: &FusionConfig) -> Vec<Result<TuPlan, PlannerError>> {
    let names = Mutex::new(NameRegistry::new());
    tus.par_iter().map(|tu| run_translation_unit(tu, config, &names)).collect()
}
