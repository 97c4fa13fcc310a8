pub mod battle_service_errors;
pub mod matchmaking_service_errors;
