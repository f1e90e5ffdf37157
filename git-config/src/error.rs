/// The error taxonomy for config parsing, value conversion, and mutation (§7 "Config").
#[derive(Debug, thiserror::Error, Eq, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum Error {
    #[error("line {line}: could not be parsed as config syntax")]
    InvalidLine { line: usize },
    #[error("line {line}: malformed section header")]
    BadGroupHeader { line: usize },
    #[error("line {line}: malformed section entry")]
    BadSectionEntry { line: usize },
    #[error("line {line}: key names may only contain letters, digits, and '-'")]
    BadEntryName { line: usize },
    #[error("line {line}: expected '=' or end of line after a key name")]
    BadEntryDelimiter { line: usize },
    #[error("line {line}: invalid escape sequence '\\{escaped}'")]
    BadEscape { line: usize, escaped: char },
    #[error("line {line}: newline inside a quoted string")]
    NewlineInQuotes { line: usize },
    #[error("line {line}: file ended inside an escape sequence")]
    EndOfFileInEscape { line: usize },
    #[error("unexpected end of config file")]
    UnexpectedEndOfConfigFile,
    #[error("line {line}: a config value must not contain a NUL byte")]
    ValueContainsNullByte { line: usize },
    #[error("line {line}: a subsection name must not contain a NUL byte")]
    SubsectionContainsNullByte { line: usize },
    #[error("line {line}: a subsection name must not contain a raw newline")]
    SubsectionContainsNewline { line: usize },
    #[error("integer value out of range")]
    IntegerOutOfRange,
    #[error("integer value out of the requested [{min}, {max}] range")]
    InvalidIntegerRange { min: i64, max: i64 },
    #[error("'{0}' is not a valid boolean")]
    InvalidBoolean(String),
    #[error("'{0}' is not a valid time unit")]
    InvalidTimeUnit(String),
    #[error("too many levels of include recursion (limit is {limit})")]
    TooManyIncludeRecursions { limit: usize },
    #[error("'{0}' is not a valid core.abbrev value")]
    InvalidCoreAbbrev(String),
}
