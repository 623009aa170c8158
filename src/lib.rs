pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod expansion;
pub mod handlers;
pub mod tree;

#[cfg(test)]
pub mod testing;
