//! Timetable validation.
//!
//! Pure detector functions over a candidate [`Solution`]. Each detector
//! returns a structured report and never mutates its input; the top-level
//! [`validate`] aggregates all of them into a [`ValidationReport`] whose
//! `accepted` flag is the authoritative "usable as-is" signal for
//! consumers. Repair helpers at the bottom are advisory only — each search
//! strategy owns the repair logic for the representation it mutates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constraints::{required_instructor_count, BoolMatrix};
use crate::models::{DefenseProblem, ProjectKind, Solution};

/// Default tolerated deviation of an instructor's load from the mean.
pub const DEFAULT_LOAD_TOLERANCE: f64 = 1.0;

/// A project placed more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateAssignment {
    /// The duplicated project.
    pub project_id: String,
    /// How many assignments carry it.
    pub count: usize,
}

/// Expected-versus-actual project coverage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Expected projects that no assignment covers. Includes projects the
    /// problem excluded for lacking a responsible instructor.
    pub missing: Vec<String>,
    /// Assigned project IDs outside the expected set.
    pub extra: Vec<String>,
}

impl CoverageReport {
    /// Whether every expected project is covered and nothing else is.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// A classroom whose occupied slot span has holes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomGapReport {
    /// The gapped classroom.
    pub classroom_id: String,
    /// Inclusive `(from, to)` ranges of missing slot order indices.
    pub missing_ranges: Vec<(usize, usize)>,
}

/// An assignment using a slot at or after the daily cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateSlotUse {
    /// The offending project.
    pub project_id: String,
    /// The late slot it sits in.
    pub timeslot_id: String,
}

/// A panel breaking the role rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleViolation {
    /// The offending project.
    pub project_id: String,
    /// What went wrong.
    pub kind: RoleViolationKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of role-rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleViolationKind {
    /// The panel head is not the project's responsible instructor.
    WrongResponsible,
    /// The responsible instructor also appears as a jury member.
    ResponsibleOnJury,
    /// A final defense has no distinct jury member.
    MissingJury,
    /// The panel is smaller than the project kind requires.
    PanelTooSmall,
}

/// An instructor whose load strays from the mean beyond tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadImbalance {
    /// The instructor.
    pub instructor_id: String,
    /// Their assignment count (jury seats included).
    pub load: usize,
    /// Mean load across all instructors.
    pub mean_load: f64,
}

/// Per-instructor classroom switching along their slot-ordered day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassroomSwitchCount {
    /// The instructor.
    pub instructor_id: String,
    /// Number of room changes between consecutive assignments.
    pub switch_count: usize,
}

/// Slot-grid usage summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationReport {
    /// Occupied `(classroom, timeslot)` cells.
    pub used_cells: usize,
    /// Total cells in the grid.
    pub total_cells: usize,
    /// Fraction of occupied cells per classroom.
    pub by_classroom: HashMap<String, f64>,
}

impl UtilizationReport {
    /// Overall grid utilization in `[0, 1]`.
    pub fn overall(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.used_cells as f64 / self.total_cells as f64
        }
    }
}

/// Aggregate validation result for a timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Projects placed more than once.
    pub duplicates: Vec<DuplicateAssignment>,
    /// Expected-versus-actual project coverage.
    pub coverage: CoverageReport,
    /// Classrooms with holes in their occupied span.
    pub gaps: Vec<ClassroomGapReport>,
    /// Assignments at or after the daily cutoff.
    pub late_slots: Vec<LateSlotUse>,
    /// Panels breaking the role rule.
    pub role_violations: Vec<RoleViolation>,
    /// Instructors outside the load tolerance.
    pub load_imbalances: Vec<LoadImbalance>,
    /// Per-instructor classroom switching.
    pub classroom_switches: Vec<ClassroomSwitchCount>,
    /// Slot-grid usage.
    pub utilization: UtilizationReport,
    /// Whether the timetable is usable as-is: no duplicates, full
    /// coverage, no gaps, no role violations, no late slots, and loads
    /// within tolerance.
    pub accepted: bool,
}

/// Detects projects appearing in more than one assignment.
pub fn detect_duplicates(solution: &Solution) -> Vec<DuplicateAssignment> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for a in &solution.assignments {
        *counts.entry(a.project_id.as_str()).or_insert(0) += 1;
    }
    let mut duplicates: Vec<DuplicateAssignment> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(project_id, count)| DuplicateAssignment {
            project_id: project_id.to_string(),
            count,
        })
        .collect();
    duplicates.sort_by(|a, b| a.project_id.cmp(&b.project_id));
    duplicates
}

/// Compares the assigned project set against the problem's expected set.
/// Projects the problem excluded at load time count as missing.
pub fn detect_coverage(solution: &Solution, problem: &DefenseProblem) -> CoverageReport {
    let mut missing: Vec<String> = problem
        .projects()
        .iter()
        .filter(|p| solution.assignment_for_project(&p.id).is_none())
        .map(|p| p.id.clone())
        .collect();
    missing.extend(problem.excluded_project_ids().iter().cloned());
    missing.sort();

    let mut extra: Vec<String> = solution
        .assignments
        .iter()
        .filter(|a| problem.project_index(&a.project_id).is_none())
        .map(|a| a.project_id.clone())
        .collect();
    extra.sort();
    extra.dedup();

    CoverageReport { missing, extra }
}

/// Reports, per classroom, the exact missing slot-index ranges inside the
/// occupied span.
pub fn detect_gaps(solution: &Solution, problem: &DefenseProblem) -> Vec<ClassroomGapReport> {
    let mut reports = Vec::new();
    for classroom in problem.classrooms() {
        let mut orders: Vec<usize> = solution
            .assignments_in_classroom(&classroom.id)
            .iter()
            .filter_map(|a| problem.timeslot_order(&a.timeslot_id))
            .collect();
        orders.sort_unstable();
        orders.dedup();

        let mut missing_ranges = Vec::new();
        for w in orders.windows(2) {
            if w[1] - w[0] > 1 {
                missing_ranges.push((w[0] + 1, w[1] - 1));
            }
        }
        if !missing_ranges.is_empty() {
            reports.push(ClassroomGapReport {
                classroom_id: classroom.id.clone(),
                missing_ranges,
            });
        }
    }
    reports
}

/// Detects assignments using slots at or after the daily cutoff.
pub fn detect_late_slots(solution: &Solution, problem: &DefenseProblem) -> Vec<LateSlotUse> {
    solution
        .assignments
        .iter()
        .filter(|a| {
            problem
                .timeslot_order(&a.timeslot_id)
                .is_some_and(|order| problem.timeslot_at(order).is_forbidden())
        })
        .map(|a| LateSlotUse {
            project_id: a.project_id.clone(),
            timeslot_id: a.timeslot_id.clone(),
        })
        .collect()
}

/// Detects panels breaking the role rule for their project kind.
pub fn detect_role_violations(
    solution: &Solution,
    problem: &DefenseProblem,
) -> Vec<RoleViolation> {
    let mut violations = Vec::new();
    for a in &solution.assignments {
        let Some(project) = problem.project_by_id(&a.project_id) else {
            continue;
        };
        let responsible = &project.responsible_instructor_id;

        match a.instructor_ids.first() {
            Some(first) if first == responsible => {}
            _ => violations.push(RoleViolation {
                project_id: a.project_id.clone(),
                kind: RoleViolationKind::WrongResponsible,
                message: format!("panel head is not responsible instructor '{responsible}'"),
            }),
        }

        if a.jury().iter().any(|j| j == responsible) {
            violations.push(RoleViolation {
                project_id: a.project_id.clone(),
                kind: RoleViolationKind::ResponsibleOnJury,
                message: format!("responsible instructor '{responsible}' also sits as jury"),
            });
        }

        let (min_panel, _) = required_instructor_count(project);
        if a.instructor_ids.len() < min_panel {
            violations.push(RoleViolation {
                project_id: a.project_id.clone(),
                kind: RoleViolationKind::PanelTooSmall,
                message: format!(
                    "panel has {} member(s), needs {min_panel}",
                    a.instructor_ids.len()
                ),
            });
        } else if project.kind == ProjectKind::Final
            && !a.jury().iter().any(|j| j != responsible)
        {
            violations.push(RoleViolation {
                project_id: a.project_id.clone(),
                kind: RoleViolationKind::MissingJury,
                message: "final defense has no distinct jury member".into(),
            });
        }
    }
    violations
}

/// Flags instructors whose load deviates from the mean by more than
/// `tolerance` assignments.
pub fn detect_load_balance_violations(
    solution: &Solution,
    problem: &DefenseProblem,
    tolerance: f64,
) -> Vec<LoadImbalance> {
    let loads = solution.instructor_loads(problem);
    if loads.is_empty() {
        return Vec::new();
    }
    let mean = loads.iter().sum::<usize>() as f64 / loads.len() as f64;

    problem
        .instructors()
        .iter()
        .zip(&loads)
        .filter(|&(_, &load)| (load as f64 - mean).abs() > tolerance)
        .map(|(instructor, &load)| LoadImbalance {
            instructor_id: instructor.id.clone(),
            load,
            mean_load: mean,
        })
        .collect()
}

/// Counts classroom changes per instructor across their slot-ordered day.
/// Instructors with no assignments are omitted.
pub fn detect_classroom_switch_counts(
    solution: &Solution,
    problem: &DefenseProblem,
) -> Vec<ClassroomSwitchCount> {
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

    problem
        .instructors()
        .iter()
        .zip(&mut per_instructor)
        .filter(|(_, day)| !day.is_empty())
        .map(|(instructor, day)| {
            day.sort_unstable();
            ClassroomSwitchCount {
                instructor_id: instructor.id.clone(),
                switch_count: day.windows(2).filter(|w| w[0].1 != w[1].1).count(),
            }
        })
        .collect()
}

/// Measures slot-grid usage overall and per classroom.
pub fn detect_session_utilization(
    solution: &Solution,
    problem: &DefenseProblem,
) -> UtilizationReport {
    let slots = problem.timeslot_count();
    let mut by_classroom = HashMap::new();
    let mut used_cells = 0;
    for classroom in problem.classrooms() {
        let used = solution.assignments_in_classroom(&classroom.id).len();
        used_cells += used;
        by_classroom.insert(classroom.id.clone(), used as f64 / slots as f64);
    }
    UtilizationReport {
        used_cells,
        total_cells: problem.classroom_count() * slots,
        by_classroom,
    }
}

/// Runs every detector with the default load tolerance.
pub fn validate(solution: &Solution, problem: &DefenseProblem) -> ValidationReport {
    validate_with_tolerance(solution, problem, DEFAULT_LOAD_TOLERANCE)
}

/// Runs every detector and aggregates the results.
pub fn validate_with_tolerance(
    solution: &Solution,
    problem: &DefenseProblem,
    load_tolerance: f64,
) -> ValidationReport {
    let duplicates = detect_duplicates(solution);
    let coverage = detect_coverage(solution, problem);
    let gaps = detect_gaps(solution, problem);
    let late_slots = detect_late_slots(solution, problem);
    let role_violations = detect_role_violations(solution, problem);
    let load_imbalances = detect_load_balance_violations(solution, problem, load_tolerance);
    let classroom_switches = detect_classroom_switch_counts(solution, problem);
    let utilization = detect_session_utilization(solution, problem);

    let accepted = duplicates.is_empty()
        && coverage.is_complete()
        && gaps.is_empty()
        && late_slots.is_empty()
        && role_violations.is_empty()
        && load_imbalances.is_empty();

    ValidationReport {
        duplicates,
        coverage,
        gaps,
        late_slots,
        role_violations,
        load_imbalances,
        classroom_switches,
        utilization,
        accepted,
    }
}

// ======================== Advisory repair helpers ========================

/// Drops all but the first assignment of each duplicated project.
/// Returns the number of assignments removed. Best-effort utility; the
/// survivor is not guaranteed to be the best of the duplicates.
pub fn drop_duplicate_assignments(solution: &mut Solution) -> usize {
    let mut seen: HashMap<String, ()> = HashMap::new();
    let before = solution.assignments.len();
    solution
        .assignments
        .retain(|a| seen.insert(a.project_id.clone(), ()).is_none());
    before - solution.assignments.len()
}

/// Moves assignments sitting in forbidden slots to the earliest free
/// pre-cutoff cell whose slot is clear for the whole panel. Returns the
/// number of assignments moved; assignments with no legal destination are
/// left in place.
pub fn reassign_late_slots(solution: &mut Solution, problem: &DefenseProblem) -> usize {
    let slots = problem.timeslot_count();
    let mut cell_used = BoolMatrix::new(problem.classroom_count(), slots);
    let mut instructor_busy = BoolMatrix::new(problem.instructor_count(), slots);

    for a in &solution.assignments {
        let (Some(room), Some(slot)) = (
            problem.classroom_index(&a.classroom_id),
            problem.timeslot_order(&a.timeslot_id),
        ) else {
            continue;
        };
        cell_used.set(room, slot);
        for id in &a.instructor_ids {
            if let Some(instructor) = problem.instructor_index(id) {
                instructor_busy.set(instructor, slot);
            }
        }
    }

    let mut moved = 0;
    for i in 0..solution.assignments.len() {
        let a = &solution.assignments[i];
        let (Some(old_room), Some(old_slot)) = (
            problem.classroom_index(&a.classroom_id),
            problem.timeslot_order(&a.timeslot_id),
        ) else {
            continue;
        };
        if !problem.timeslot_at(old_slot).is_forbidden() {
            continue;
        }
        let panel: Vec<usize> = a
            .instructor_ids
            .iter()
            .filter_map(|id| problem.instructor_index(id))
            .collect();

        let destination = (0..slots)
            .filter(|&slot| !problem.timeslot_at(slot).is_forbidden())
            .find_map(|slot| {
                let panel_free = panel.iter().all(|&p| !instructor_busy.get(p, slot));
                if !panel_free {
                    return None;
                }
                (0..problem.classroom_count())
                    .find(|&room| !cell_used.get(room, slot))
                    .map(|room| (room, slot))
            });

        if let Some((room, slot)) = destination {
            cell_used.clear(old_room, old_slot);
            cell_used.set(room, slot);
            for &p in &panel {
                instructor_busy.clear(p, old_slot);
                instructor_busy.set(p, slot);
            }
            let a = &mut solution.assignments[i];
            a.classroom_id = problem.classrooms()[room].id.clone();
            a.timeslot_id = problem.timeslot_at(slot).id.clone();
            moved += 1;
        }
    }
    moved
}
