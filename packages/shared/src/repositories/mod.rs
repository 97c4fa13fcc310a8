pub mod challenge_repository;
pub mod errors;
pub mod judge_client;
pub mod profile_repository;
