pub mod chase;

pub use chase::{ChaseLines, chase_task};
