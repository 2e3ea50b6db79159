//! Trajectory search with a forbidden-move memory.
//!
//! Keeps a bounded FIFO of recently visited solution hashes and refuses
//! to revisit them unless a candidate beats the best score by an
//! aspiration margin. Repeated stagnation triggers a restart from a fresh
//! constructive solution.
//!
//! # Reference
//! Glover (1989), "Tabu Search — Part I"

use std::collections::VecDeque;

use rand::Rng;
use tracing::debug;

use super::{neighbor, SearchContext, SearchStrategy};
use crate::builder::GapFreeBuilder;
use crate::evaluator::FitnessEvaluator;
use crate::models::{DefenseProblem, Solution};

/// Tabu-style trajectory strategy.
#[derive(Debug, Clone)]
pub struct TabuSearch {
    evaluator: FitnessEvaluator,
    memory: VecDeque<u64>,
    memory_capacity: usize,
    attempts_per_proposal: usize,
    aspiration_margin: f64,
    stagnation_limit: u32,
    stagnation: u32,
}

impl TabuSearch {
    /// Creates a tabu strategy with default parameters.
    pub fn new() -> Self {
        Self {
            evaluator: FitnessEvaluator::default(),
            memory: VecDeque::new(),
            memory_capacity: 64,
            attempts_per_proposal: 16,
            aspiration_margin: 1.0,
            stagnation_limit: 200,
            stagnation: 0,
        }
    }

    /// Sets the forbidden-move memory size.
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    /// Sets the score margin over the best that overrides the memory.
    pub fn with_aspiration_margin(mut self, margin: f64) -> Self {
        self.aspiration_margin = margin;
        self
    }

    /// Sets how many rejected proposals in a row force a restart.
    pub fn with_stagnation_limit(mut self, limit: u32) -> Self {
        self.stagnation_limit = limit;
        self
    }

    fn remember(&mut self, hash: u64) {
        if self.memory.len() == self.memory_capacity {
            self.memory.pop_front();
        }
        self.memory.push_back(hash);
    }

    fn restart(&mut self, problem: &DefenseProblem, ctx: &mut SearchContext) -> Solution {
        debug!(stagnation = self.stagnation, "tabu restart from fresh construction");
        self.memory.clear();
        self.stagnation = 0;
        GapFreeBuilder::new()
            .with_seed(ctx.rng.random())
            .build(problem)
    }
}

impl Default for TabuSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStrategy for TabuSearch {
    fn name(&self) -> &'static str {
        "tabu"
    }

    fn initialize(&mut self, problem: &DefenseProblem, ctx: &mut SearchContext) -> Solution {
        self.memory.clear();
        self.stagnation = 0;
        let solution = GapFreeBuilder::new()
            .with_seed(ctx.rng.random())
            .build(problem);
        self.remember(solution.canonical_hash(problem));
        solution
    }

    fn propose(
        &mut self,
        current: &Solution,
        problem: &DefenseProblem,
        ctx: &mut SearchContext,
    ) -> Solution {
        if self.stagnation >= self.stagnation_limit {
            return self.restart(problem, ctx);
        }

        let mut fallback = None;
        for _ in 0..self.attempts_per_proposal {
            if ctx.is_cancelled() {
                break;
            }
            let candidate = neighbor::neighbor_of(current, problem, &mut ctx.rng);
            let hash = candidate.canonical_hash(problem);
            if !self.memory.contains(&hash) {
                self.remember(hash);
                return candidate;
            }
            // Tabu, but a strong enough score overrides the memory.
            let score = self.evaluator.score(&candidate, problem);
            if score > ctx.best_score + self.aspiration_margin {
                self.remember(hash);
                return candidate;
            }
            fallback = Some(candidate);
        }
        // Everything nearby is tabu; hand back the last look anyway and
        // let acceptance sort it out.
        fallback.unwrap_or_else(|| current.clone())
    }

    fn accept(
        &mut self,
        current_score: f64,
        candidate_score: f64,
        _ctx: &mut SearchContext,
    ) -> bool {
        if candidate_score > current_score {
            self.stagnation = 0;
            true
        } else {
            self.stagnation += 1;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, Instructor, Project, TimeSlot};
    use crate::search::{SearchConfig, SearchRunner};

    fn sample_problem() -> DefenseProblem {
        DefenseProblem::new(
            vec![
                Instructor::faculty("I1"),
                Instructor::faculty("I2"),
                Instructor::assistant("I3"),
            ],
            vec![
                Project::interim("P1", "I1"),
                Project::final_defense("P2", "I2"),
                Project::interim("P3", "I3"),
            ],
            vec![Classroom::new("C1", 30), Classroom::new("C2", 30)],
            vec![
                TimeSlot::at("T1", 9, 0, 30),
                TimeSlot::at("T2", 9, 30, 30),
                TimeSlot::at("T3", 10, 0, 30),
                TimeSlot::at("T4", 10, 30, 30),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_memory_is_bounded_fifo() {
        let mut tabu = TabuSearch::new().with_memory_capacity(3);
        for hash in 1..=5u64 {
            tabu.remember(hash);
        }
        assert_eq!(tabu.memory.len(), 3);
        assert_eq!(tabu.memory, [3, 4, 5]);
    }

    #[test]
    fn test_initialize_remembers_start() {
        let problem = sample_problem();
        let mut tabu = TabuSearch::new();
        let mut ctx = SearchContext::new(42);
        let solution = tabu.initialize(&problem, &mut ctx);
        assert!(tabu.memory.contains(&solution.canonical_hash(&problem)));
    }

    #[test]
    fn test_stagnation_triggers_restart() {
        let problem = sample_problem();
        let mut tabu = TabuSearch::new().with_stagnation_limit(3);
        let mut ctx = SearchContext::new(42);
        let current = tabu.initialize(&problem, &mut ctx);

        for _ in 0..3 {
            assert!(!tabu.accept(10.0, 5.0, &mut ctx));
        }
        assert_eq!(tabu.stagnation, 3);
        // Next proposal rebuilds from scratch and clears the state.
        let _ = tabu.propose(&current, &problem, &mut ctx);
        assert_eq!(tabu.stagnation, 0);
        assert!(tabu.memory.is_empty());
    }

    #[test]
    fn test_accept_greedy_with_stagnation_count() {
        let mut tabu = TabuSearch::new();
        let mut ctx = SearchContext::new(0);
        assert!(tabu.accept(1.0, 2.0, &mut ctx));
        assert_eq!(tabu.stagnation, 0);
        assert!(!tabu.accept(2.0, 2.0, &mut ctx));
        assert_eq!(tabu.stagnation, 1);
    }

    #[test]
    fn test_full_run_finds_usable_timetable() {
        let problem = sample_problem();
        let config = SearchConfig::new().with_max_iterations(500).with_seed(42);
        let outcome = SearchRunner::new(config).run(&problem, &mut TabuSearch::new());

        assert!(outcome.score > f64::MIN);
        assert_eq!(outcome.assignments.len(), 3);
        assert!(outcome.validation_report.role_violations.is_empty());
        assert!(outcome.validation_report.late_slots.is_empty());
    }
}
