//! Fan-out/fan-in orchestration of one research run.
//!
//! One concurrent execution is spawned per step, eagerly, with no worker
//! pool cap, since step counts are small and each execution is dominated by
//! external I/O wait. Results travel through one unbounded MPSC channel and
//! surface to the caller in completion order; the consuming loop is the only
//! code that touches the accumulator, so no lock guards it.

use crate::research::report::ReportSynthesizer;
use crate::research::step::StepExecutor;
use crate::types::{ResearchEvent, ResearchRun, StepResult};
use async_stream::stream;
use futures::Stream;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Collects formatted step output for final synthesis.
///
/// Owned exclusively by the orchestrator's consuming loop for the lifetime of
/// one run.
#[derive(Debug, Default)]
struct RunAccumulator {
    completed: usize,
    succeeded: usize,
    all_text: String,
}

impl RunAccumulator {
    fn absorb(&mut self, result: &StepResult) {
        self.completed += 1;
        match result {
            StepResult::Completed(report) => {
                self.succeeded += 1;
                self.all_text.push_str(&format!(
                    "Step {}:\n{}\n",
                    report.step_index + 1,
                    report.summary
                ));
            }
            StepResult::Failed { step_index, error } => {
                self.all_text
                    .push_str(&format!("Step {} Error:\n{}\n", step_index + 1, error));
            }
        }
    }
}

/// Orchestrates one research run: concurrent step fan-out, completion-order
/// streaming, and final synthesis once every step has definitively finished.
pub struct ResearchCoordinator {
    executor: StepExecutor,
    synthesizer: ReportSynthesizer,
    step_timeout: Option<Duration>,
}

impl ResearchCoordinator {
    /// Creates a coordinator; no per-step timeout is applied by default.
    pub fn new(executor: StepExecutor, synthesizer: ReportSynthesizer) -> Self {
        Self {
            executor,
            synthesizer,
            step_timeout: None,
        }
    }

    /// Bounds each step execution. A step exceeding the timeout degrades to
    /// a failure result; siblings are unaffected. Default: none, so a hung
    /// external call hangs its step indefinitely.
    pub fn with_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Executes the run, producing a finite, non-restartable sequence of
    /// events: one [`ResearchEvent::Step`] per step in completion order,
    /// then, when at least one step succeeded, one closing
    /// [`ResearchEvent::Final`].
    ///
    /// Step failures never abort siblings or the batch; only orchestration
    /// bookkeeping errors close the stream with [`ResearchEvent::Fatal`].
    pub fn execute(&self, run: ResearchRun) -> impl Stream<Item = ResearchEvent> + Send + 'static {
        let executor = self.executor.clone();
        let synthesizer = self.synthesizer.clone();
        let step_timeout = self.step_timeout;

        stream! {
            let tasks = run.step_tasks();
            let total = tasks.len();
            tracing::info!(run_id = %run.run_id, steps = total, "starting research run");

            let (tx, mut rx) = mpsc::unbounded_channel::<StepResult>();
            let mut executions = JoinSet::new();

            for task in tasks {
                let tx = tx.clone();
                let executor = executor.clone();
                let run_id = run.run_id.clone();
                let entities = run.entities.clone();

                executions.spawn(async move {
                    let step_index = task.step_index;
                    let work = executor.run(&run_id, &task, &entities);

                    // The task boundary converts every error into a failure
                    // result; an execution must never kill the orchestrator.
                    let result = match step_timeout {
                        Some(limit) => match tokio::time::timeout(limit, work).await {
                            Ok(Ok(report)) => StepResult::Completed(report),
                            Ok(Err(e)) => StepResult::Failed {
                                step_index,
                                error: e.to_string(),
                            },
                            Err(_) => StepResult::Failed {
                                step_index,
                                error: format!(
                                    "step timed out after {}s",
                                    limit.as_secs()
                                ),
                            },
                        },
                        None => match work.await {
                            Ok(report) => StepResult::Completed(report),
                            Err(e) => StepResult::Failed {
                                step_index,
                                error: e.to_string(),
                            },
                        },
                    };

                    // The receiver only disappears if the consuming loop
                    // already bailed out.
                    let _ = tx.send(result);
                });
            }
            drop(tx);

            // Exactly N receives, driven purely by count: every spawned
            // execution sends exactly one result.
            let mut accumulator = RunAccumulator::default();
            for _ in 0..total {
                match rx.recv().await {
                    Some(result) => {
                        accumulator.absorb(&result);
                        yield ResearchEvent::Step(result);
                    }
                    None => {
                        tracing::error!(
                            run_id = %run.run_id,
                            "completion channel closed before all steps reported"
                        );
                        yield ResearchEvent::Fatal(
                            "completion channel closed before all steps reported".to_string(),
                        );
                        return;
                    }
                }
            }

            // Defensive drain: every execution has already delivered its
            // result, but no background work may outlive the run.
            while let Some(joined) = executions.join_next().await {
                if let Err(e) = joined {
                    tracing::error!(run_id = %run.run_id, error = %e, "step execution failed to join");
                    yield ResearchEvent::Fatal(format!("step execution failed to join: {e}"));
                    return;
                }
            }

            if accumulator.succeeded == 0 {
                tracing::warn!(
                    run_id = %run.run_id,
                    completed = accumulator.completed,
                    "every step failed; skipping final synthesis"
                );
                return;
            }

            match synthesizer.synthesize(&run.run_id, &accumulator.all_text).await {
                Ok(report) => yield ResearchEvent::Final(report),
                Err(e) => {
                    tracing::error!(run_id = %run.run_id, error = %e, "final synthesis failed");
                    yield ResearchEvent::Fatal(format!("final synthesis failed: {e}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepReport;

    #[test]
    fn accumulator_formats_success_and_error_blocks() {
        let mut accumulator = RunAccumulator::default();

        accumulator.absorb(&StepResult::Completed(StepReport {
            step_index: 0,
            summary: "alpha findings".to_string(),
            elapsed: Duration::from_secs(1),
        }));
        accumulator.absorb(&StepResult::Failed {
            step_index: 1,
            error: "search unavailable".to_string(),
        });
        accumulator.absorb(&StepResult::Completed(StepReport {
            step_index: 2,
            summary: "gamma findings".to_string(),
            elapsed: Duration::from_secs(2),
        }));

        assert_eq!(accumulator.completed, 3);
        assert_eq!(accumulator.succeeded, 2);
        assert!(accumulator.all_text.contains("Step 1:\nalpha findings\n"));
        assert!(accumulator
            .all_text
            .contains("Step 2 Error:\nsearch unavailable\n"));
        assert!(accumulator.all_text.contains("Step 3:\ngamma findings\n"));
    }

    #[test]
    fn accumulator_with_only_failures_counts_no_successes() {
        let mut accumulator = RunAccumulator::default();
        accumulator.absorb(&StepResult::Failed {
            step_index: 0,
            error: "boom".to_string(),
        });

        assert_eq!(accumulator.completed, 1);
        assert_eq!(accumulator.succeeded, 0);
        assert!(!accumulator.all_text.is_empty());
    }
}
