pub mod app;
pub mod services;

pub use app::{AppOptions, run};
