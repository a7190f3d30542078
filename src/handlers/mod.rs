//! Entry points for each way of running the console.

pub mod line;
pub mod oneshot;
pub mod repl;
