//! Parse strict `.env` files.
//!
//! Each line holds one `KEY=value` assignment. Values may mix unquoted,
//! `'single'` and `"double"` quoted segments; double quotes understand the
//! JSON escapes `\" \\ \n \t \r \uXXXX`, including UTF-16 surrogate pairs.
//! There is no variable interpolation.
//!
//! [`parse_reader`] returns an in-memory map. [`EnvLoader`] reads a file and
//! applies it to a [`TargetEnv`]; the process-environment helpers are `unsafe`
//! because callers must guarantee no concurrent process-environment access.

mod env;
mod error;
mod line;
mod loader;
mod model;
mod parser;
mod quote;

pub use env::TargetEnv;
pub use error::{Error, ParseError, ParseErrorKind};
pub use line::parse_line;
pub use loader::{EnvLoader, dotenv, from_path};
pub use model::{LoadReport, ParsedLine};
pub use parser::{parse_bytes, parse_reader, parse_str};
pub use quote::quote;
