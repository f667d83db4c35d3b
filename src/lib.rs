pub mod app;
pub mod auth;
pub mod error;
pub mod leaderboard;
pub mod league;
pub mod remote;
pub mod round;
pub mod runtime;
pub mod sample;
pub mod scoring;
pub mod state;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
