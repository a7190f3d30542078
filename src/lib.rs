//! Ledis: a command console for the `/execute` endpoint and the key-value
//! server behind it.

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod printer;
pub mod server;
pub mod storage;
pub mod tui;
pub mod utils;

pub use client::ExecuteClient;
pub use console::{Console, OutputLog, ReplyOrder};
pub use error::{CommandError, ConsoleError};
pub use storage::Ledis;
