//! YAML parsing, layering and error reporting

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use parser::{merge_yaml, parse_yaml, read_yaml_value};
