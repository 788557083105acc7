pub mod handlers;
pub mod performance;
pub mod statistics;
