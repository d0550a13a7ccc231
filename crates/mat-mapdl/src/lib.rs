//! MAPDL material command codec.
//!
//! Encodes material models as `MP`/`MPTEMP`/`MPDATA`/`TB*`/`MPAMOD`
//! commands and reads such scripts back into materials.

pub mod commands;
mod error;
pub mod format;
pub mod reader;
mod session;
pub mod writer;

pub use commands::{Command, Declaration, Script, ScriptLine};
pub use error::{MapdlError, Result};
pub use reader::{read_file, read_script, read_str};
pub use session::{MapdlSession, SessionError, write_to_session};
pub use writer::{
    EncodeFn, MapdlWriter, MaterialBlock, encode_model, encoder_for, field_codes,
    write_mapdl_file, write_materials,
};
