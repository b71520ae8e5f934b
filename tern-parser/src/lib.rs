//! Terminal escape sequence front end
//!
//! The byte-facing half of the emulator:
//! - `parser`: streaming ECMA-48/DEC lexer producing low-level parse events
//! - `builder`: assembles events into typed commands via the function table
//! - `processor`: glues lexer and builder to a `tern_core::Screen`
//!
//! Input is untrusted child-process output; nothing in this crate may
//! panic or abort on malformed bytes.

mod builder;
mod functions;
mod parser;
mod processor;
mod sequence;
mod utf8;

pub use builder::{ApplyResult, CommandBuilder};
pub use functions::{select, FunctionDefinition, FunctionId};
pub use parser::{Parser, Perform};
pub use processor::Processor;
pub use sequence::{FunctionCategory, FunctionSelector, Sequence};
pub use utf8::{Utf8Decoder, Utf8Result};
