//! Search strategy framework.
//!
//! One iteration harness, one neighbor-operator family, one evaluator —
//! and interchangeable strategy plug-ins behind the three-method
//! [`SearchStrategy`] trait. The runner drives propose → cheap-reject →
//! score → accept until the wall-clock budget, iteration cap, or an
//! external cancellation flag stops it, then finishes the best candidate
//! with conflict resolution and a full validation report.
//!
//! # Strategies
//!
//! - [`TabuSearch`]: trajectory search with a forbidden-move memory
//! - [`GeneticSearch`]: population search with tournament selection
//! - [`BeeColonySearch`]: swarm/trajectory hybrid with scout resets
//!
//! # References
//!
//! - Glover (1989), "Tabu Search — Part I"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Karaboga & Basturk (2007), "A powerful and efficient algorithm for
//!   numerical function optimization (ABC)"

pub mod bees;
pub mod genetic;
pub mod neighbor;
pub mod tabu;

pub use bees::BeeColonySearch;
pub use genetic::GeneticSearch;
pub use tabu::TabuSearch;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::conflict::resolve_conflicts;
use crate::constraints::placement_feasible;
use crate::evaluator::FitnessEvaluator;
use crate::models::{Assignment, DefenseProblem, Solution};
use crate::validation::{validate_with_tolerance, ValidationReport, DEFAULT_LOAD_TOLERANCE};

/// Per-run mutable context handed to every strategy call.
///
/// Owns the run's RNG (all randomness flows from the configured seed) and
/// the cooperative cancellation flag. `best_score` mirrors the runner's
/// best-so-far so strategies can implement aspiration-style decisions.
#[derive(Debug)]
pub struct SearchContext {
    /// Seeded RNG; the only randomness source inside a run.
    pub rng: SmallRng,
    /// Best score the runner has seen so far this run.
    pub best_score: f64,
    cancel: Option<Arc<AtomicBool>>,
}

impl SearchContext {
    /// Creates a context from an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            best_score: f64::MIN,
            cancel: None,
        }
    }

    /// Attaches an external cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the caller requested cancellation. Checked at the top of
    /// every runner iteration and every strategy inner loop, never
    /// mid-mutation.
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// A pluggable search strategy.
///
/// Strategy-specific state (tabu memory, population, swarm cohort) lives
/// in the implementing struct; everything shared — solution
/// representation, neighbor operators, evaluator — is common across
/// strategies.
pub trait SearchStrategy {
    /// Strategy name for logs and comparisons.
    fn name(&self) -> &'static str;

    /// Produces the starting solution and resets internal state.
    fn initialize(&mut self, problem: &DefenseProblem, ctx: &mut SearchContext) -> Solution;

    /// Produces the next candidate from the current incumbent.
    fn propose(
        &mut self,
        current: &Solution,
        problem: &DefenseProblem,
        ctx: &mut SearchContext,
    ) -> Solution;

    /// Decides whether the candidate replaces the incumbent.
    fn accept(&mut self, current_score: f64, candidate_score: f64, ctx: &mut SearchContext)
        -> bool;
}

/// Run limits and seeding.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Wall-clock budget for the iteration loop.
    pub time_budget: Duration,
    /// Hard iteration cap.
    pub max_iterations: u64,
    /// Seed for every random decision in the run.
    pub seed: u64,
    /// Load tolerance handed to the final validation.
    pub load_tolerance: f64,
    /// Optional external cancellation flag.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(5),
            max_iterations: 20_000,
            seed: 0,
            load_tolerance: DEFAULT_LOAD_TOLERANCE,
            cancel_flag: None,
        }
    }
}

impl SearchConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, cap: u64) -> Self {
        self.max_iterations = cap;
        self
    }

    /// Sets the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the load tolerance used by the final validation.
    pub fn with_load_tolerance(mut self, tolerance: f64) -> Self {
        self.load_tolerance = tolerance;
        self
    }

    /// Attaches an external cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }
}

/// Result of a search run: the best timetable found, its score, run
/// accounting, and the validation report consumers check before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Best-found assignments, canonically ordered by project.
    pub assignments: Vec<Assignment>,
    /// Score of the returned timetable.
    pub score: f64,
    /// Iterations executed before the loop stopped.
    pub iterations: u64,
    /// Wall-clock time spent.
    pub elapsed_seconds: f64,
    /// Full validation report; `accepted` is the usability signal.
    pub validation_report: ValidationReport,
}

/// Iteration harness shared by all strategies.
#[derive(Debug, Clone, Default)]
pub struct SearchRunner {
    config: SearchConfig,
    evaluator: FitnessEvaluator,
}

impl SearchRunner {
    /// Creates a runner with the given configuration and default weights.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            evaluator: FitnessEvaluator::default(),
        }
    }

    /// Replaces the evaluator (custom weights).
    pub fn with_evaluator(mut self, evaluator: FitnessEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Runs a strategy to completion or budget exhaustion.
    ///
    /// Budget exhaustion is not an error: the best-found solution is
    /// returned and its validation report tells the caller whether it is
    /// usable as-is.
    pub fn run<S: SearchStrategy>(
        &self,
        problem: &DefenseProblem,
        strategy: &mut S,
    ) -> SearchOutcome {
        let start = Instant::now();
        let mut ctx = SearchContext::new(self.config.seed);
        if let Some(flag) = &self.config.cancel_flag {
            ctx = ctx.with_cancel_flag(Arc::clone(flag));
        }

        let mut current = strategy.initialize(problem, &mut ctx);
        let mut current_score = self.evaluator.score(&current, problem);
        let mut best = current.clone();
        let mut best_score = current_score;
        ctx.best_score = best_score;

        let mut iterations = 0u64;
        while iterations < self.config.max_iterations
            && start.elapsed() < self.config.time_budget
            && !ctx.is_cancelled()
        {
            let candidate = strategy.propose(&current, problem, &mut ctx);
            iterations += 1;

            // Cheap reject: placement invariants, no scoring.
            if !placement_feasible(&candidate, problem) {
                continue;
            }
            let candidate_score = self.evaluator.score(&candidate, problem);
            if candidate_score > best_score {
                best = candidate.clone();
                best_score = candidate_score;
                ctx.best_score = best_score;
            }
            if strategy.accept(current_score, candidate_score, &mut ctx) {
                current = candidate;
                current_score = candidate_score;
            }
        }

        let mut final_solution = best;
        resolve_conflicts(&mut final_solution, problem);
        final_solution.canonicalize();
        let score = self.evaluator.score(&final_solution, problem);
        let validation_report =
            validate_with_tolerance(&final_solution, problem, self.config.load_tolerance);

        info!(
            strategy = strategy.name(),
            iterations,
            score,
            accepted = validation_report.accepted,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search run finished"
        );

        SearchOutcome {
            assignments: final_solution.assignments,
            score,
            iterations,
            elapsed_seconds: start.elapsed().as_secs_f64(),
            validation_report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GapFreeBuilder;
    use crate::models::{Classroom, Instructor, Project, TimeSlot};

    fn small_problem() -> DefenseProblem {
        DefenseProblem::new(
            vec![Instructor::faculty("I1"), Instructor::faculty("I2")],
            vec![Project::interim("P1", "I1"), Project::interim("P2", "I2")],
            vec![Classroom::new("C1", 30)],
            vec![
                TimeSlot::at("T1", 9, 0, 30),
                TimeSlot::at("T2", 9, 30, 30),
                TimeSlot::at("T3", 10, 0, 30),
            ],
        )
        .unwrap()
    }

    /// Minimal strategy for harness tests: restarts from the builder and
    /// proposes plain neighbors, greedy acceptance.
    struct HillClimb {
        builder: GapFreeBuilder,
    }

    impl HillClimb {
        fn new() -> Self {
            Self {
                builder: GapFreeBuilder::new(),
            }
        }
    }

    impl SearchStrategy for HillClimb {
        fn name(&self) -> &'static str {
            "hill-climb"
        }

        fn initialize(&mut self, problem: &DefenseProblem, _ctx: &mut SearchContext) -> Solution {
            self.builder.build(problem)
        }

        fn propose(
            &mut self,
            current: &Solution,
            problem: &DefenseProblem,
            ctx: &mut SearchContext,
        ) -> Solution {
            neighbor::neighbor_of(current, problem, &mut ctx.rng)
        }

        fn accept(
            &mut self,
            current_score: f64,
            candidate_score: f64,
            _ctx: &mut SearchContext,
        ) -> bool {
            candidate_score > current_score
        }
    }

    #[test]
    fn test_runner_returns_accepted_solution() {
        let problem = small_problem();
        let config = SearchConfig::new().with_max_iterations(200).with_seed(42);
        let outcome = SearchRunner::new(config).run(&problem, &mut HillClimb::new());

        assert!(outcome.score > f64::MIN);
        assert!(outcome.iterations > 0);
        assert_eq!(outcome.assignments.len(), 2);
        assert!(outcome.validation_report.accepted);
    }

    #[test]
    fn test_runner_deterministic_per_seed() {
        let problem = small_problem();
        let config = SearchConfig::new().with_max_iterations(100).with_seed(7);
        let a = SearchRunner::new(config.clone()).run(&problem, &mut HillClimb::new());
        let b = SearchRunner::new(config).run(&problem, &mut HillClimb::new());
        assert_eq!(a.score, b.score);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_runner_respects_iteration_cap() {
        let problem = small_problem();
        let config = SearchConfig::new().with_max_iterations(10);
        let outcome = SearchRunner::new(config).run(&problem, &mut HillClimb::new());
        assert_eq!(outcome.iterations, 10);
    }

    #[test]
    fn test_pre_set_cancel_flag_skips_loop() {
        let problem = small_problem();
        let flag = Arc::new(AtomicBool::new(true));
        let config = SearchConfig::new().with_cancel_flag(Arc::clone(&flag));
        let outcome = SearchRunner::new(config).run(&problem, &mut HillClimb::new());

        // No iterations ran, but the initial constructive solution is
        // still structurally sound.
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.score > f64::MIN);
        assert_eq!(outcome.assignments.len(), 2);
    }

    #[test]
    fn test_outcome_serializes() {
        let problem = small_problem();
        let config = SearchConfig::new().with_max_iterations(50);
        let outcome = SearchRunner::new(config).run(&problem, &mut HillClimb::new());

        let json = serde_json::to_string(&outcome).unwrap();
        let restored: SearchOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.assignments.len(), outcome.assignments.len());
        assert_eq!(restored.score, outcome.score);
    }

    #[test]
    fn test_context_cancellation_flag() {
        let ctx = SearchContext::new(0);
        assert!(!ctx.is_cancelled());

        let flag = Arc::new(AtomicBool::new(false));
        let ctx = SearchContext::new(0).with_cancel_flag(Arc::clone(&flag));
        assert!(!ctx.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(ctx.is_cancelled());
    }
}
