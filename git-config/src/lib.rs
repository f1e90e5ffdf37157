//! Git config text parsing, typed value access, mutation, and serialization (§4.3, §4.4): the
//! `[section "subsection"]` / `key = value` grammar, independent of any particular config file's
//! location on disk or of `include`/`includeIf` path resolution, both of which are left to a
//! collaborating filesystem layer.

mod entry;
mod error;
mod file;
mod format;
mod parser;
mod value;

pub use entry::{ConfigEntry, ConfigSource, Unevaluated, Value};
pub use error::Error;
pub use file::{File, SectionRef};
pub use value::{RefSpec, TimeUnit};
