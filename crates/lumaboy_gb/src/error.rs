use thiserror::Error;

/// Errors surfaced to the host.
///
/// Hardware quirks (illegal opcodes, open-bus reads, VRAM access during
/// rendering) are not errors; they follow fixed compatibility policies
/// inside the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid cartridge header: {reason}")]
    InvalidHeader { reason: String },
    #[error("unsupported memory bank controller in cartridge header: {code:02X}")]
    UnsupportedMbc { code: u8 },
    #[error("corrupt save state: {reason}")]
    CorruptState { reason: String },
    #[error("emulator not initialized")]
    NotInitialized,
}

impl Error {
    pub(crate) fn invalid_header(reason: impl Into<String>) -> Self {
        Error::InvalidHeader {
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt_state(reason: impl Into<String>) -> Self {
        Error::CorruptState {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
