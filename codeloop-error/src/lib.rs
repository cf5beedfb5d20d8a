//! # codeloop-error
//!
//! Unified error handling for codeloop, following OpenDAL's error handling practices.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., AgentReplyFailed, InferenceFailed)
//! - **ErrorStatus**: Decide how to handle it (Permanent, Temporary, Persistent)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use codeloop_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::AgentReplyFailed, "coder produced no reply")
//!         .with_operation("chat::turn")
//!         .with_context("agent", "Coder")
//!         .with_context("turn", "2"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, codeloop_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - Don't abuse `From<OtherError>` to prevent raw error leakage

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using codeloop Error
pub type Result<T> = std::result::Result<T, Error>;
