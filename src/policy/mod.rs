//! Pure-function business policies: the decisions that don't touch I/O.

pub mod office_selection;
pub mod required_skills;
pub mod round_robin;

pub use office_selection::{select_fallback, select_nearest, HubNames, OfficeSelection};
pub use required_skills::{determine_required_skills, manager_satisfies, SkillRequirement};
pub use round_robin::pick_next;
