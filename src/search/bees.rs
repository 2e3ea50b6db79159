//! Swarm/trajectory hybrid in the artificial-bee-colony style.
//!
//! A cohort of solutions probabilistically moves toward the incumbent
//! best via the shared neighbor operators. Cohort entries that fail to
//! improve past a trial limit are reset to fresh constructive solutions
//! (the "scout" role). One `propose` call sweeps the whole cohort once.
//!
//! # Reference
//! Karaboga & Basturk (2007), "A powerful and efficient algorithm for
//! numerical function optimization (ABC)"

use rand::Rng;
use tracing::debug;

use super::{neighbor, SearchContext, SearchStrategy};
use crate::builder::GapFreeBuilder;
use crate::evaluator::FitnessEvaluator;
use crate::models::{DefenseProblem, Solution};

#[derive(Debug, Clone)]
struct CohortEntry {
    solution: Solution,
    fitness: f64,
    trials: u32,
}

/// Bee-colony-style swarm strategy.
#[derive(Debug, Clone)]
pub struct BeeColonySearch {
    evaluator: FitnessEvaluator,
    colony_size: usize,
    trial_limit: u32,
    recruit_probability: f64,
    cohort: Vec<CohortEntry>,
    best: Option<(Solution, f64)>,
}

impl BeeColonySearch {
    /// Creates a bee-colony strategy with default parameters.
    pub fn new() -> Self {
        Self {
            evaluator: FitnessEvaluator::default(),
            colony_size: 10,
            trial_limit: 15,
            recruit_probability: 0.5,
            cohort: Vec::new(),
            best: None,
        }
    }

    /// Sets the cohort size.
    pub fn with_colony_size(mut self, size: usize) -> Self {
        self.colony_size = size.max(1);
        self
    }

    /// Sets how many failed improvements send an entry scouting.
    pub fn with_trial_limit(mut self, limit: u32) -> Self {
        self.trial_limit = limit;
        self
    }

    /// Sets the probability of moving from the incumbent best rather than
    /// the entry's own position.
    pub fn with_recruit_probability(mut self, probability: f64) -> Self {
        self.recruit_probability = probability.clamp(0.0, 1.0);
        self
    }

    fn track_best(&mut self, solution: &Solution, fitness: f64) {
        let improved = match &self.best {
            Some((_, best_fitness)) => fitness > *best_fitness,
            None => true,
        };
        if improved {
            self.best = Some((solution.clone(), fitness));
        }
    }
}

impl Default for BeeColonySearch {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStrategy for BeeColonySearch {
    fn name(&self) -> &'static str {
        "bee-colony"
    }

    fn initialize(&mut self, problem: &DefenseProblem, ctx: &mut SearchContext) -> Solution {
        self.best = None;
        let mut cohort = Vec::with_capacity(self.colony_size);
        for _ in 0..self.colony_size {
            let solution = GapFreeBuilder::new()
                .with_seed(ctx.rng.random())
                .build(problem);
            let fitness = self.evaluator.score(&solution, problem);
            self.track_best(&solution, fitness);
            cohort.push(CohortEntry {
                solution,
                fitness,
                trials: 0,
            });
        }
        self.cohort = cohort;
        self.best
            .as_ref()
            .map(|(solution, _)| solution.clone())
            .expect("cohort is non-empty")
    }

    fn propose(
        &mut self,
        _current: &Solution,
        problem: &DefenseProblem,
        ctx: &mut SearchContext,
    ) -> Solution {
        for i in 0..self.cohort.len() {
            // Cancellation is honored between entries, never mid-update.
            if ctx.is_cancelled() {
                break;
            }

            let follow_best = ctx.rng.random_bool(self.recruit_probability);
            let base = if follow_best {
                self.best
                    .as_ref()
                    .map(|(solution, _)| solution.clone())
                    .unwrap_or_else(|| self.cohort[i].solution.clone())
            } else {
                self.cohort[i].solution.clone()
            };

            let candidate = neighbor::neighbor_of(&base, problem, &mut ctx.rng);
            let fitness = self.evaluator.score(&candidate, problem);

            if fitness > self.cohort[i].fitness {
                self.cohort[i] = CohortEntry {
                    solution: candidate.clone(),
                    fitness,
                    trials: 0,
                };
                self.track_best(&candidate, fitness);
            } else {
                self.cohort[i].trials += 1;
                if self.cohort[i].trials > self.trial_limit {
                    debug!(entry = i, "cohort entry exhausted; scouting");
                    let fresh = GapFreeBuilder::new()
                        .with_seed(ctx.rng.random())
                        .build(problem);
                    let fresh_fitness = self.evaluator.score(&fresh, problem);
                    self.track_best(&fresh, fresh_fitness);
                    self.cohort[i] = CohortEntry {
                        solution: fresh,
                        fitness: fresh_fitness,
                        trials: 0,
                    };
                }
            }
        }

        self.best
            .as_ref()
            .map(|(solution, _)| solution.clone())
            .expect("initialized before propose")
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
    fn test_initialize_fills_cohort() {
        let problem = sample_problem();
        let mut bees = BeeColonySearch::new().with_colony_size(6);
        let mut ctx = SearchContext::new(42);
        let best = bees.initialize(&problem, &mut ctx);

        assert_eq!(bees.cohort.len(), 6);
        assert!(!best.assignments.is_empty());
        let best_fitness = bees.best.as_ref().unwrap().1;
        for entry in &bees.cohort {
            assert!(entry.fitness <= best_fitness);
        }
    }

    #[test]
    fn test_propose_never_degrades_best() {
        let problem = sample_problem();
        let mut bees = BeeColonySearch::new().with_colony_size(5);
        let mut ctx = SearchContext::new(42);
        let initial = bees.initialize(&problem, &mut ctx);
        let initial_fitness = bees.best.as_ref().unwrap().1;

        for _ in 0..10 {
            let _ = bees.propose(&initial, &problem, &mut ctx);
            assert!(bees.best.as_ref().unwrap().1 >= initial_fitness);
        }
    }

    #[test]
    fn test_trial_limit_sends_entry_scouting() {
        let problem = sample_problem();
        let mut bees = BeeColonySearch::new()
            .with_colony_size(2)
            .with_trial_limit(1);
        let mut ctx = SearchContext::new(42);
        let initial = bees.initialize(&problem, &mut ctx);

        // Sweep enough times that stagnating entries must recycle.
        for _ in 0..20 {
            let _ = bees.propose(&initial, &problem, &mut ctx);
        }
        for entry in &bees.cohort {
            assert!(entry.trials <= bees.trial_limit + 1);
        }
    }

    #[test]
    fn test_full_run_finds_usable_timetable() {
        let problem = sample_problem();
        let config = SearchConfig::new().with_max_iterations(60).with_seed(42);
        let outcome = SearchRunner::new(config).run(
            &problem,
            &mut BeeColonySearch::new().with_colony_size(6),
        );

        assert!(outcome.score > f64::MIN);
        assert_eq!(outcome.assignments.len(), 3);
        assert!(outcome.validation_report.late_slots.is_empty());
    }
}
