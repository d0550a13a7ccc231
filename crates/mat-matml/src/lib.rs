//! MatML engineering-data XML codec.
//!
//! - [`MatmlWriter`] renders materials into an `EngineeringData` document
//!   with interned `pr<N>` / `pa<N>` metadata ids
//! - [`read_matml_str`] / [`read_matml_file`] walk such a document back into
//!   [`mat_model::Material`] values

mod error;
pub mod reader;
pub mod unit_tree;
pub mod writer;
pub mod xml;

pub use error::{MatmlError, Result};
pub use reader::{parse_numbers, read_matml_file, read_matml_str};
pub use writer::{MatmlWriter, format_number, write_matml, write_matml_file};
pub use xml::Element;
