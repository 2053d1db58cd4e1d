pub mod accounts;
pub mod core;
pub mod exams;
pub mod schedule;
pub mod subjects;
