mod assignments;

pub use assignments::{AssignmentSet, Enumeration, group1_assignments};
