pub mod battle;
pub mod challenge;
pub mod queue;
