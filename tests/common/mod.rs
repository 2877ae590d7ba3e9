#![allow(dead_code)]

pub mod competition_helpers;
pub mod utils;
