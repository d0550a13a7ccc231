//! Output to a live MAPDL session.

use mat_model::{ExportConfig, Material};

use crate::error::{MapdlError, Result};
use crate::writer::write_materials;

pub type SessionError = Box<dyn std::error::Error + Send + Sync>;

/// The part of a MAPDL client the writer needs.
pub trait MapdlSession {
    /// Enters the preprocessor.
    fn prep7(&mut self) -> std::result::Result<(), SessionError>;

    /// Sends a block of commands.
    fn input_strings(&mut self, commands: &str) -> std::result::Result<(), SessionError>;
}

/// Encodes `materials` and sends them to `session`.
///
/// Encoding happens first, so a validation failure leaves the session untouched.
pub fn write_to_session<S: MapdlSession + ?Sized>(
    session: &mut S,
    materials: &[Material],
    config: &ExportConfig,
) -> Result<()> {
    let commands = write_materials(materials, config)?;
    session.prep7().map_err(MapdlError::Session)?;
    session.input_strings(&commands).map_err(MapdlError::Session)?;
    Ok(())
}
