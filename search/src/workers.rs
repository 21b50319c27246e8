//! Node expansion and the bounded worker pool.
//!
//! Expansion is the pure half of a search step: run every cracker on a
//! node's value and run the checkers on every candidate. It touches no
//! shared search state, so a batch of popped nodes can be expanded on
//! several threads at once. Committing the results (dedup, node creation,
//! frontier pushes) stays on the coordinating thread.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::warn;
use unravel_kernel::carrier::value::Value;
use unravel_kernel::proof::hash::ContentHash;

use crate::contract::{CrackOutput, PluginSet};
use crate::node::NodeId;
use crate::policy::SearchPolicy;
use crate::scorer::{evaluate, Evaluation};

/// Checker verdict for a candidate that is in the run format.
#[derive(Debug, Clone)]
pub(crate) struct Checked {
    pub fingerprint: ContentHash,
    pub evaluation: Evaluation,
}

/// One candidate produced while expanding a node.
#[derive(Debug, Clone)]
pub(crate) struct Child {
    /// Index into `PluginSet::crackers`.
    pub cracker: usize,
    pub output: CrackOutput,
    /// `None` if the output is not in the run format.
    pub checked: Option<Checked>,
}

/// Everything learned by expanding one node.
#[derive(Debug, Clone, Default)]
pub(crate) struct Expansion {
    /// In cracker order, then candidate order.
    pub children: Vec<Child>,
    pub failures: u64,
    /// Candidates dropped by the per-node cap.
    pub truncated: u64,
}

/// Expand a single value. Cracker errors and panics are isolated here.
pub(crate) fn expand_value(value: &Value, plugins: &PluginSet, policy: &SearchPolicy) -> Expansion {
    let cap = usize::try_from(policy.max_candidates_per_node).unwrap_or(usize::MAX);
    let mut expansion = Expansion::default();

    for (index, cracker) in plugins.crackers.iter().enumerate() {
        let attempt = catch_unwind(AssertUnwindSafe(|| {
            if cracker.can_apply(value) {
                cracker.apply(value)
            } else {
                Ok(Vec::new())
            }
        }));
        let outputs = match attempt {
            Ok(Ok(outputs)) => outputs,
            Ok(Err(err)) => {
                warn!(cracker = cracker.name(), error = %err, "cracker failed; branch skipped");
                expansion.failures += 1;
                continue;
            }
            Err(_) => {
                warn!(cracker = cracker.name(), "cracker panicked; branch skipped");
                expansion.failures += 1;
                continue;
            }
        };

        for output in outputs {
            if expansion.children.len() >= cap {
                expansion.truncated += 1;
                continue;
            }
            let checked = (output.value.format() == plugins.format).then(|| Checked {
                fingerprint: output.value.fingerprint(),
                evaluation: evaluate(&plugins.checkers, &output.value, policy.combine),
            });
            expansion.children.push(Child {
                cracker: index,
                output,
                checked,
            });
        }
    }
    expansion
}

/// Expand `jobs` on up to `workers` threads.
///
/// Jobs are claimed in order. Once `stop` returns `true`, unclaimed jobs
/// are skipped, so the result may be shorter than `jobs`. The result is
/// sorted by node id.
pub(crate) fn expand_batch(
    jobs: &[(NodeId, &Value)],
    plugins: &PluginSet,
    policy: &SearchPolicy,
    stop: &(dyn Fn() -> bool + Sync),
) -> Vec<(NodeId, Expansion)> {
    let threads = policy.workers.min(jobs.len());
    if threads <= 1 {
        let mut done = Vec::with_capacity(jobs.len());
        for &(id, value) in jobs {
            if stop() {
                break;
            }
            done.push((id, expand_value(value, plugins, policy)));
        }
        return done;
    }

    let next = AtomicUsize::new(0);
    let done = Mutex::new(Vec::with_capacity(jobs.len()));
    std::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, Ordering::Relaxed);
                let Some(&(id, value)) = jobs.get(i) else {
                    break;
                };
                if stop() {
                    break;
                }
                let expansion = expand_value(value, plugins, policy);
                done.lock().push((id, expansion));
            });
        }
    });
    let mut done = done.into_inner();
    done.sort_by_key(|(id, _)| *id);
    done
}
