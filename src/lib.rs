#![doc = include_str!("../README.md")]

//! A remote control console for embedded devices.
//!
//! This crate reads raw keystrokes from the local terminal and turns them into
//! drive commands, edited lines or single pass-through keys for a device on
//! the other end of a persistent connection.

pub mod completion;
pub mod console;
pub mod delay;
pub mod drive;
pub mod error;
pub mod history;
pub mod platform;
pub mod terminal;
pub mod transport;
pub mod writer;

pub use console::{Console, ConsoleConfig, LineDiscipline, Mode, MODE_SWITCH};
pub use error::ConsoleError;
pub use history::History;
pub use terminal::{Line, LINE_MAX};
pub use writer::TerminalWriter;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::console::{Console, ConsoleConfig, LineDiscipline, Mode, MODE_SWITCH};
    pub use crate::error::ConsoleError;
    pub use crate::platform::{open_keyboard, SystemKeyboard};
    pub use crate::transport::TcpTransport;
    pub use crate::writer::StdoutSink;
}
