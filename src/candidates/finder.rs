//! Finds maximal runs of two or more consecutive, compatible call
//! statements within a function body — the raw fusion candidates handed to
//! the dependence analyzer.

use crate::candidates::compat::are_compatible_calls;
use crate::functions::{FunctionAnalysis, FunctionAnalyzer};
use crate::ir::CallStmt;

/// A maximal run of compatible calls, as indices into the owning function's
/// top-level statement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub stmt_indices: Vec<usize>,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.stmt_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmt_indices.is_empty()
    }
}

/// Scans one function's top-level statements for fusion candidates. Every
/// non-call statement breaks the current run; a run of length one is
/// discarded since there is nothing to fuse it with.
pub fn find_candidates(analysis: &FunctionAnalysis, functions: &FunctionAnalyzer) -> Vec<Candidate> {
    // A callee this translation unit never analyzed is an ordinary external
    // call. A callee that was analyzed but failed a precondition (currently
    // just a declaration-only stub) was already flagged with a warning when
    // `FunctionAnalyzer` marked it invalid; this scan just respects that.
    let is_valid_for_fuse = |name: &str| {
        functions
            .find(name)
            .map(|id| functions.analysis(id).is_valid_for_fuse)
            .unwrap_or(false)
    };

    let mut candidates = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    let mut anchor: Option<CallStmt> = None;

    let flush = |run: &mut Vec<usize>, candidates: &mut Vec<Candidate>| {
        if run.len() > 1 {
            tracing::debug!(stmt_indices = ?run, "found fusion candidate");
            candidates.push(Candidate {
                stmt_indices: std::mem::take(run),
            });
        } else {
            run.clear();
        }
    };

    for (idx, stmt_info) in analysis.stmts.iter().enumerate() {
        let Some(call) = stmt_info.as_call() else {
            flush(&mut run, &mut candidates);
            anchor = None;
            continue;
        };

        match &anchor {
            None => {
                if is_valid_for_fuse(&call.callee) {
                    run.push(idx);
                    anchor = Some(call.clone());
                }
            }
            Some(first) => {
                if are_compatible_calls(first, call, is_valid_for_fuse) {
                    run.push(idx);
                } else {
                    flush(&mut run, &mut candidates);
                    if is_valid_for_fuse(&call.callee) {
                        run.push(idx);
                        anchor = Some(call.clone());
                    } else {
                        anchor = None;
                    }
                }
            }
        }
    }
    flush(&mut run, &mut candidates);

    candidates
}
