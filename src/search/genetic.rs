//! Population-based search.
//!
//! Classic generational GA over the assignment list: tournament
//! selection, single-point crossover on the canonically ordered
//! assignments, neighbor-operator mutation, and elite retention. One
//! `propose` call advances one generation and returns the population's
//! incumbent.
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//! Machine Learning"

use rand::Rng;

use super::{neighbor, SearchContext, SearchStrategy};
use crate::builder::GapFreeBuilder;
use crate::evaluator::FitnessEvaluator;
use crate::models::{DefenseProblem, Solution};

#[derive(Debug, Clone)]
struct Individual {
    solution: Solution,
    fitness: f64,
}

/// Generational genetic strategy.
#[derive(Debug, Clone)]
pub struct GeneticSearch {
    evaluator: FitnessEvaluator,
    population_size: usize,
    tournament_size: usize,
    elite_count: usize,
    mutation_probability: f64,
    population: Vec<Individual>,
}

impl GeneticSearch {
    /// Creates a genetic strategy with default parameters.
    pub fn new() -> Self {
        Self {
            evaluator: FitnessEvaluator::default(),
            population_size: 20,
            tournament_size: 3,
            elite_count: 2,
            mutation_probability: 0.4,
            population: Vec::new(),
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    /// Sets how many top individuals survive each generation unchanged.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the per-child mutation probability.
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability.clamp(0.0, 1.0);
        self
    }

    fn tournament<'a, R: Rng>(&'a self, rng: &mut R) -> &'a Individual {
        let mut best = &self.population[rng.random_range(0..self.population.len())];
        for _ in 1..self.tournament_size {
            let contender = &self.population[rng.random_range(0..self.population.len())];
            if contender.fitness > best.fitness {
                best = contender;
            }
        }
        best
    }

    fn sort_population(&mut self) {
        self.population
            .sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap());
    }
}

impl Default for GeneticSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-point crossover over two canonically ordered assignment lists.
///
/// The child takes the head of `left` up to the cut, then fills the rest
/// from `right` and finally from `left`'s tail, skipping projects already
/// covered — project uniqueness is preserved by construction.
pub fn crossover<R: Rng>(left: &Solution, right: &Solution, rng: &mut R) -> Solution {
    let mut left = left.clone();
    left.canonicalize();
    let mut right = right.clone();
    right.canonicalize();

    if left.assignments.is_empty() {
        return right;
    }
    let cut = rng.random_range(0..=left.assignments.len());

    let mut child = Solution::new();
    child.assignments.extend_from_slice(&left.assignments[..cut]);
    for source in right.assignments.iter().chain(&left.assignments[cut..]) {
        if child.assignment_for_project(&source.project_id).is_none() {
            child.add_assignment(source.clone());
        }
    }
    child
}

impl SearchStrategy for GeneticSearch {
    fn name(&self) -> &'static str {
        "genetic"
    }

    fn initialize(&mut self, problem: &DefenseProblem, ctx: &mut SearchContext) -> Solution {
        let mut population = Vec::with_capacity(self.population_size);
        for _ in 0..self.population_size {
            let mut solution = GapFreeBuilder::new()
                .with_seed(ctx.rng.random())
                .build(problem);
            // Half the pool starts perturbed for diversity.
            if ctx.rng.random_bool(0.5) {
                neighbor::random_move(&mut solution, problem, &mut ctx.rng);
            }
            let fitness = self.evaluator.score(&solution, problem);
            population.push(Individual { solution, fitness });
        }
        self.population = population;
        self.sort_population();
        self.population[0].solution.clone()
    }

    fn propose(
        &mut self,
        _current: &Solution,
        problem: &DefenseProblem,
        ctx: &mut SearchContext,
    ) -> Solution {
        let mut next: Vec<Individual> = self
            .population
            .iter()
            .take(self.elite_count)
            .cloned()
            .collect();

        while next.len() < self.population_size {
            if ctx.is_cancelled() {
                break;
            }
            let left = self.tournament(&mut ctx.rng).solution.clone();
            let right = self.tournament(&mut ctx.rng).solution.clone();
            let mut child = crossover(&left, &right, &mut ctx.rng);
            if ctx.rng.random_bool(self.mutation_probability) {
                neighbor::random_move(&mut child, problem, &mut ctx.rng);
            }
            let fitness = self.evaluator.score(&child, problem);
            next.push(Individual {
                solution: child,
                fitness,
            });
        }

        // A cancelled sweep can leave the batch empty; keep the old
        // population rather than replacing it with nothing.
        if !next.is_empty() {
            self.population = next;
            self.sort_population();
        }
        self.population[0].solution.clone()
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
