use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("Stack overflow: call at {address:#05X} with all 16 stack levels in use")]
    StackOverflow { address: u16 },

    #[error("Stack underflow: return at {address:#05X} with an empty call stack")]
    StackUnderflow { address: u16 },

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("Could not read ROM {path:?}")]
    RomRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
