//! Debug transaction structure

use super::opcodes;
use crate::error::Result;
use crate::line::LineController;
use crate::protocol::ProtocolEngine;

/// Maximum number of parameter bytes following the opcode
pub const MAX_PARAMS: usize = 3;

/// Maximum number of response bytes
pub const MAX_RESPONSE: usize = 2;

/// A single debug transaction
///
/// Opcode and parameters are written, the line is turned around, and
/// `response.len()` bytes are read back.
#[derive(Debug)]
pub struct Transaction<'a> {
    /// Command opcode
    pub opcode: u8,
    /// Parameter bytes (at most [`MAX_PARAMS`])
    pub params: &'a [u8],
    /// Buffer for the response (at most [`MAX_RESPONSE`] bytes)
    pub response: &'a mut [u8],
}

impl<'a> Transaction<'a> {
    /// Command without parameters
    pub fn new(opcode: u8, response: &'a mut [u8]) -> Self {
        Self::with_params(opcode, &[], response)
    }

    /// Command with parameter bytes
    pub fn with_params(opcode: u8, params: &'a [u8], response: &'a mut [u8]) -> Self {
        debug_assert!(params.len() <= MAX_PARAMS);
        debug_assert!(response.len() <= MAX_RESPONSE);
        Self {
            opcode,
            params,
            response,
        }
    }

    /// Total number of bytes written to the target
    pub fn write_len(&self) -> usize {
        1 + self.params.len()
    }
}

/// Run one transaction: write, turn around, read, turn back
///
/// The active/debug-mode gate is checked before any line moves, so a
/// rejected transaction has no electrical effect.
pub fn execute<L: LineController>(
    engine: &mut ProtocolEngine<L>,
    tx: &mut Transaction<'_>,
) -> Result<()> {
    engine.require_debug_mode()?;

    log::trace!(
        "ccdebug: {} (0x{:02X}) params={:02X?}",
        opcodes::name(tx.opcode),
        tx.opcode,
        tx.params
    );

    engine.write_byte(tx.opcode)?;
    engine.write_bytes(tx.params)?;
    engine.switch_to_read()?;
    for byte in tx.response.iter_mut() {
        *byte = engine.read_byte()?;
    }
    engine.switch_to_write()?;

    log::trace!("ccdebug: response={:02X?}", tx.response);
    Ok(())
}
