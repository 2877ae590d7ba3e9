pub mod common;
pub mod competition;
pub mod fixture;
pub mod user;
