//! Assignment Solver (S6) and Relaxation Controller (§4.7): per-cluster
//! profiles, feasibility/cost evaluation, the Hungarian-style rectangular
//! solve, and the progressive constraint-relaxation loop that salvages
//! deferrals after the strict pass.

pub mod cost;
pub mod profile;
pub mod relaxation;
pub mod solver;

pub use cost::{evaluate_pair, driver_ready_time_surrogate, PairEvaluation};
pub use profile::{AssignmentProfile, Constraints, Weights};
pub use relaxation::{relax_hotness, relax_lateness, RelaxationController, RelaxationOutcome, RelaxationStrategy};
pub use solver::{solve_with_profiles, StrictAssignmentResult};
