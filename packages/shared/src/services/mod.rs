pub mod battle_service;
pub mod errors;
pub mod matchmaking_service;
pub mod session_directory;
