//! Fitness evaluation.
//!
//! Maps a candidate [`Solution`] to a single scalar score. Higher is
//! better. Structurally invalid candidates score `f64::MIN` immediately;
//! valid ones combine role compliance, instructor load balance, classroom
//! continuity, and time-of-day placement under fixed weights.
//!
//! # Reference
//! Gini-based dispersion: Sen (1973), "On Economic Inequality"

use crate::constraints::{self, role_rule_satisfied};
use crate::models::{DefenseProblem, Solution};

/// Score evaluator with tunable weights.
///
/// The defaults reproduce the production weighting: compliance dominates,
/// balance is secondary, continuity and slot placement break ties, and the
/// disqualifying penalties make late slots and classroom gaps practically
/// unusable without hard-rejecting them.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    /// Weight on the role-compliance ratio (ratio is 0..1).
    pub compliance_weight: f64,
    /// Penalty per classroom change in an instructor's slot-ordered day.
    pub classroom_change_penalty: f64,
    /// Weight on the load-balance score (score is 0..100).
    pub balance_weight: f64,
    /// Penalty per assignment at or after the daily cutoff. Disqualifying.
    pub late_slot_penalty: f64,
    /// Penalty per assignment in the boundary band before the cutoff.
    pub boundary_slot_penalty: f64,
    /// Penalty applied once when any classroom has an internal gap.
    /// Disqualifying.
    pub gap_penalty: f64,
}

impl Default for FitnessEvaluator {
    fn default() -> Self {
        Self {
            compliance_weight: 100.0,
            classroom_change_penalty: 10.0,
            balance_weight: 50.0,
            late_slot_penalty: 1_000_000.0,
            boundary_slot_penalty: 25.0,
            gap_penalty: 1_000_000.0,
        }
    }
}

impl FitnessEvaluator {
    /// Creates an evaluator with the default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the role-compliance weight.
    pub fn with_compliance_weight(mut self, weight: f64) -> Self {
        self.compliance_weight = weight;
        self
    }

    /// Sets the per-change classroom continuity penalty.
    pub fn with_classroom_change_penalty(mut self, penalty: f64) -> Self {
        self.classroom_change_penalty = penalty;
        self
    }

    /// Sets the load-balance weight.
    pub fn with_balance_weight(mut self, weight: f64) -> Self {
        self.balance_weight = weight;
        self
    }

    /// Sets the late-slot penalty.
    pub fn with_late_slot_penalty(mut self, penalty: f64) -> Self {
        self.late_slot_penalty = penalty;
        self
    }

    /// Sets the boundary-band penalty.
    pub fn with_boundary_slot_penalty(mut self, penalty: f64) -> Self {
        self.boundary_slot_penalty = penalty;
        self
    }

    /// Sets the gap penalty.
    pub fn with_gap_penalty(mut self, penalty: f64) -> Self {
        self.gap_penalty = penalty;
        self
    }

    /// Scores a candidate solution. Higher is better; `f64::MIN` marks a
    /// structurally invalid candidate.
    pub fn score(&self, solution: &Solution, problem: &DefenseProblem) -> f64 {
        if !constraints::is_valid(solution, problem) {
            return f64::MIN;
        }

        let mut score = self.compliance_weight * self.compliance_ratio(solution, problem);
        score -= self.classroom_change_penalty
            * classroom_change_count(solution, problem) as f64;
        score += self.balance_weight
            * load_balance_score(&solution.instructor_loads(problem));

        for a in &solution.assignments {
            let Some(order) = problem.timeslot_order(&a.timeslot_id) else {
                continue;
            };
            score += problem.slot_reward(order);
            let slot = problem.timeslot_at(order);
            if slot.is_forbidden() {
                score -= self.late_slot_penalty;
            } else if slot.is_boundary() {
                score -= self.boundary_slot_penalty;
            }
        }

        if constraints::classroom_gap_count(solution, problem) > 0 {
            score -= self.gap_penalty;
        }
        score
    }

    /// Fraction of assignments whose panel satisfies the role rule.
    /// An empty solution is vacuously compliant.
    fn compliance_ratio(&self, solution: &Solution, problem: &DefenseProblem) -> f64 {
        if solution.assignments.is_empty() {
            return 1.0;
        }
        let satisfied = solution
            .assignments
            .iter()
            .filter(|a| {
                problem
                    .project_by_id(&a.project_id)
                    .is_some_and(|p| role_rule_satisfied(a, p))
            })
            .count();
        satisfied as f64 / solution.assignments.len() as f64
    }
}

/// Counts classroom changes across each instructor's slot-ordered
/// assignments, summed over all instructors.
pub fn classroom_change_count(solution: &Solution, problem: &DefenseProblem) -> usize {
    let mut per_instructor: Vec<Vec<(usize, usize)>> =
        vec![Vec::new(); problem.instructor_count()];
    for a in &solution.assignments {
        let (Some(room), Some(slot)) = (
            problem.classroom_index(&a.classroom_id),
            problem.timeslot_order(&a.timeslot_id),
        ) else {
            continue;
        };
        for id in &a.instructor_ids {
            if let Some(instructor) = problem.instructor_index(id) {
                per_instructor[instructor].push((slot, room));
            }
        }
    }

    let mut changes = 0;
    for day in &mut per_instructor {
        day.sort_unstable();
        changes += day.windows(2).filter(|w| w[0].1 != w[1].1).count();
    }
    changes
}

/// Load-balance score in `[0, 100]`: `(1 - gini) * 100`.
/// 100 means perfectly equal loads.
pub fn load_balance_score(loads: &[usize]) -> f64 {
    (1.0 - gini_coefficient(loads)) * 100.0
}

/// Gini coefficient of a non-negative load vector, 0 = perfect equality.
fn gini_coefficient(loads: &[usize]) -> f64 {
    let n = loads.len();
    if n == 0 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = loads.iter().map(|&l| l as f64).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let total: f64 = sorted.iter().sum();
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i + 1) as f64 * x)
        .sum();
    // Epsilon keeps the all-zero vector at gini 0 instead of dividing by zero.
    let gini = (2.0 * weighted) / (n as f64 * total + f64::EPSILON) - (n as f64 + 1.0) / n as f64;
    gini.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Classroom, Instructor, Project, TimeSlot};
    use approx::assert_relative_eq;

    fn sample_problem() -> DefenseProblem {
        DefenseProblem::new(
            vec![
                Instructor::faculty("I1"),
                Instructor::faculty("I2"),
                Instructor::assistant("I3"),
            ],
            vec![
                Project::interim("P1", "I1"),
                Project::interim("P2", "I2"),
                Project::final_defense("P3", "I3"),
            ],
            vec![Classroom::new("C1", 30), Classroom::new("C2", 30)],
            vec![
                TimeSlot::at("T1", 9, 0, 30),
                TimeSlot::at("T2", 9, 30, 30),
                TimeSlot::at("T3", 10, 0, 30),
                TimeSlot::at("T4", 16, 0, 30),
                TimeSlot::at("T5", 17, 0, 30),
            ],
        )
        .unwrap()
    }

    fn valid_solution() -> Solution {
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        s.add_assignment(Assignment::new("P2", "C1", "T2", "I2"));
        s.add_assignment(Assignment::new("P3", "C1", "T3", "I3").with_jury("I1"));
        s
    }

    #[test]
    fn test_invalid_scores_minimum() {
        let problem = sample_problem();
        let mut s = valid_solution();
        // Double-book the (C1, T1) cell.
        s.assignments[1].timeslot_id = "T1".into();
        assert_eq!(FitnessEvaluator::new().score(&s, &problem), f64::MIN);
    }

    #[test]
    fn test_valid_scores_above_minimum() {
        let problem = sample_problem();
        let score = FitnessEvaluator::new().score(&valid_solution(), &problem);
        assert!(score > f64::MIN);
        assert!(score.is_finite());
    }

    fn singleton_at(slot: &str) -> Solution {
        let mut s = Solution::new();
        s.add_assignment(Assignment::new("P1", "C1", slot, "I1"));
        s
    }

    #[test]
    fn test_late_slot_disqualifies() {
        let problem = sample_problem();
        let evaluator = FitnessEvaluator::new();
        // 17:00 slot versus the same defense one slot earlier at 16:00.
        let late = evaluator.score(&singleton_at("T5"), &problem);
        let boundary = evaluator.score(&singleton_at("T4"), &problem);
        assert!(boundary - late > 900_000.0);
    }

    #[test]
    fn test_boundary_slot_moderate_penalty() {
        let problem = sample_problem();
        let evaluator = FitnessEvaluator::new();
        // 16:00 slot: moderate boundary penalty, not the disqualifying one.
        let morning = evaluator.score(&singleton_at("T3"), &problem);
        let boundary = evaluator.score(&singleton_at("T4"), &problem);
        let drop = morning - boundary;
        assert!(drop > 0.0);
        assert!(drop < 1000.0, "boundary drop too large: {drop}");
    }

    #[test]
    fn test_gap_penalty_applies() {
        let problem = sample_problem();
        let evaluator = FitnessEvaluator::new();
        let mut gapped = valid_solution();
        // Vacate order 1, leaving C1 occupied at orders 0 and 2.
        gapped.assignments.remove(1);
        let score = evaluator.score(&gapped, &problem);
        assert!(score < -900_000.0);
    }

    #[test]
    fn test_earlier_slots_preferred() {
        let problem = sample_problem();
        let evaluator = FitnessEvaluator::new();

        let mut early = Solution::new();
        early.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        let mut later = Solution::new();
        later.add_assignment(Assignment::new("P1", "C1", "T3", "I1"));

        assert!(evaluator.score(&early, &problem) > evaluator.score(&later, &problem));
    }

    #[test]
    fn test_classroom_change_count() {
        let problem = sample_problem();
        let mut s = Solution::new();
        // I1 hops C1 -> C2 -> C1 across three consecutive slots.
        s.add_assignment(Assignment::new("P1", "C1", "T1", "I1"));
        s.add_assignment(Assignment::new("P2", "C2", "T2", "I1"));
        s.add_assignment(Assignment::new("P3", "C1", "T3", "I1"));
        assert_eq!(classroom_change_count(&s, &problem), 2);
    }

    #[test]
    fn test_load_balance_equal_loads() {
        assert_relative_eq!(load_balance_score(&[3, 3, 3, 3]), 100.0, epsilon = 1e-6);
        assert_relative_eq!(load_balance_score(&[1, 1]), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_load_balance_decreases_with_variance() {
        let equal = load_balance_score(&[2, 2, 2, 2]);
        let mild = load_balance_score(&[1, 2, 2, 3]);
        let harsh = load_balance_score(&[0, 0, 0, 8]);
        assert!(equal > mild);
        assert!(mild > harsh);
    }

    #[test]
    fn test_load_balance_all_zero() {
        // Nobody assigned anything: degenerate but not a crash, and the
        // epsilon guard keeps it at perfect equality.
        assert_relative_eq!(load_balance_score(&[0, 0, 0]), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_weight_setters() {
        let e = FitnessEvaluator::new()
            .with_compliance_weight(10.0)
            .with_classroom_change_penalty(1.0)
            .with_balance_weight(5.0)
            .with_late_slot_penalty(99.0)
            .with_boundary_slot_penalty(9.0)
            .with_gap_penalty(77.0);
        assert_eq!(e.compliance_weight, 10.0);
        assert_eq!(e.gap_penalty, 77.0);
    }
}
