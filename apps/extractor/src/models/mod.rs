pub mod cv;
pub mod job;
