pub mod competition_handler;
pub mod fixture_handler;
