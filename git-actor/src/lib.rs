//! Identifying the actors (authors, committers, taggers) behind a git object: a name, an email,
//! and the instant at which the action was taken, plus the timestamp type that instant is built
//! from.

mod identity;
mod time;

pub use identity::{Error, Signature};
pub use time::{Error as TimeError, Sign, Time};
