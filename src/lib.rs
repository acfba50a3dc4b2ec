//! Exception handling runtime for compiled code.
//!
//! Compiled code throws with [`__trq_throw`], registers
//! [`__trq_personality_v0`] as the personality routine of every function,
//! and reads the payload of a caught exception with [`__trq_get_exception`]
//! before releasing it with [`__trq_end_catch`]. Walking the stack is left to
//! the platform unwinder.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate tracing;

mod stdext;

pub mod uw;

mod arch;
pub mod context;
pub mod dwarf;
mod error;
pub mod exception;
mod identify;
pub mod install;
pub mod personality;
pub mod scan;
pub mod throw;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
pub use personality::__trq_personality_v0;
pub use throw::{__trq_end_catch, __trq_get_exception, __trq_throw};
