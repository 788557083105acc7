pub mod cv;
pub mod progress;
pub mod recommendation;
pub mod skill;
pub mod test;
pub mod user;
