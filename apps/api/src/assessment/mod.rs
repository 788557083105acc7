pub mod engine;
pub mod handlers;
pub mod level;
pub mod pipeline;
pub mod progress;
pub mod scoring;
pub mod skills;
