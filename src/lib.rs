//! Defense timetabling engine.
//!
//! Assigns academic project defenses (interim reviews and final defenses)
//! to `(classroom, timeslot, panel)` triples under hard role, conflict,
//! and continuity rules, while balancing instructor workload, minimizing
//! classroom changes, and favoring earlier slots. Scheduling here is a
//! constraint-satisfaction-plus-optimization problem, so the engine is
//! heuristic: it returns the best timetable it finds within a wall-clock
//! budget, never a guaranteed optimum.
//!
//! # Modules
//!
//! - **`models`**: input entities, the compiled [`models::DefenseProblem`]
//!   arena, and the [`models::Solution`] aggregate
//! - **`constraints`**: validity predicates and gap counting
//! - **`evaluator`**: the fitness function strategies optimize
//! - **`builder`**: gap-free constructive builder for initial timetables
//! - **`search`**: the strategy framework (tabu, genetic, bee colony)
//! - **`conflict`**: instructor double-booking detection and resolution
//! - **`validation`**: detectors, the aggregate report, repair helpers
//! - **`error`**: the configuration-error taxonomy
//!
//! # Usage
//!
//! ```
//! use defense_scheduler::models::{Classroom, DefenseProblem, Instructor, Project, TimeSlot};
//! use defense_scheduler::search::{SearchConfig, SearchRunner, TabuSearch};
//!
//! let problem = DefenseProblem::new(
//!     vec![Instructor::faculty("I1"), Instructor::faculty("I2")],
//!     vec![
//!         Project::final_defense("P1", "I1"),
//!         Project::interim("P2", "I2"),
//!     ],
//!     vec![Classroom::new("C1", 30)],
//!     vec![
//!         TimeSlot::at("T1", 9, 0, 30),
//!         TimeSlot::at("T2", 9, 30, 30),
//!         TimeSlot::at("T3", 10, 0, 30),
//!     ],
//! )?;
//!
//! let config = SearchConfig::new().with_seed(42).with_max_iterations(1_000);
//! let outcome = SearchRunner::new(config).run(&problem, &mut TabuSearch::new());
//! assert!(outcome.validation_report.accepted);
//! # Ok::<(), defense_scheduler::error::ConfigurationError>(())
//! ```
//!
//! A run is single-threaded; independent runs (different seeds or
//! strategies) share no mutable state and may execute in parallel threads.
//!
//! # References
//!
//! - Glover (1989), "Tabu Search — Part I"
//! - Karaboga & Basturk (2007), "ABC for numerical function optimization"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod builder;
pub mod conflict;
pub mod constraints;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod search;
pub mod validation;

pub use builder::GapFreeBuilder;
pub use error::ConfigurationError;
pub use evaluator::FitnessEvaluator;
pub use models::{Assignment, DefenseProblem, Solution};
pub use search::{
    BeeColonySearch, GeneticSearch, SearchConfig, SearchOutcome, SearchRunner, SearchStrategy,
    TabuSearch,
};
pub use validation::{validate, ValidationReport};
