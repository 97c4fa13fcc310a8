pub mod challenge_repository_errors;
pub mod judge_client_errors;
pub mod profile_repository_errors;
