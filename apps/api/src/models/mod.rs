pub mod bid;
pub mod generation;
pub mod job;
