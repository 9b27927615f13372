//! Replay solver for tests and dry runs.
//!
//! `ScriptedSolver` hands out a fixed sequence of outcomes, one per call,
//! and records every topology it was asked to solve.

use std::collections::VecDeque;
use tracing::debug;
use ul_graph::Topology;

use crate::error::{SolverError, SolverResult};
use crate::solution::Solution;
use crate::solver::{NetworkSolver, SolveMode};

#[derive(Debug, Clone)]
pub enum Step {
    Converged(Solution),
    NotConverged,
    Fail(String),
}

#[derive(Debug, Default)]
pub struct ScriptedSolver {
    script: VecDeque<Step>,
    seen: Vec<(Topology, SolveMode)>,
}

impl ScriptedSolver {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    /// Converge every call with the same solution.
    pub fn repeating(solution: Solution, calls: usize) -> Self {
        Self::new(std::iter::repeat_n(Step::Converged(solution), calls))
    }

    pub fn push(&mut self, step: Step) {
        self.script.push_back(step);
    }

    pub fn calls(&self) -> usize {
        self.seen.len()
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn seen(&self) -> &[(Topology, SolveMode)] {
        &self.seen
    }
}

impl NetworkSolver for ScriptedSolver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(&mut self, topology: &Topology, mode: SolveMode) -> SolverResult<Solution> {
        self.seen.push((topology.clone(), mode));
        let step = self.script.pop_front().ok_or_else(|| SolverError::ProblemSetup {
            what: format!("script exhausted after {} calls", self.seen.len() - 1),
        })?;
        debug!(call = self.seen.len(), ?mode, "scripted solve");
        match step {
            Step::Converged(mut solution) => {
                solution.converged = true;
                Ok(solution)
            }
            Step::NotConverged => Ok(Solution::new(false, 0, f64::INFINITY)),
            Step::Fail(what) => Err(SolverError::ConvergenceFailed { what }),
        }
    }
}
