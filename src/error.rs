use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load memory image: {0}")]
    LoadError(#[from] LoadError),

    #[error("Memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Assembly error: {0}")]
    AsmError(#[from] AsmError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors related to memory image loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read memory image '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Malformed image line {line}: expected 8 hex digits, got '{text}'")]
    MalformedLine { line: usize, text: String },

    #[error("Image is {image} bytes but memory holds {memory}")]
    ImageTooLarge { image: usize, memory: usize },
}

/// Errors related to memory accesses
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Out-of-bounds access of {len} byte(s) at address {address:#010x} (memory size {size:#x})")]
    OutOfBounds { address: u32, len: usize, size: usize },
}

/// Errors related to instruction decoding
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid opcode {opcode:#04x} in word {raw:#010x}")]
    InvalidOpcode { raw: u32, opcode: u8 },
}

/// Errors related to assembling source text
#[derive(Error, Debug)]
pub enum AsmError {
    #[error("Line {line}: unknown mnemonic '{mnemonic}'")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("Line {line}: expected a register like 'R4', got '{token}'")]
    BadRegister { line: usize, token: String },

    #[error("Line {line}: bad immediate '{token}'")]
    BadImmediate { line: usize, token: String },

    #[error("Line {line}: immediate {value} does not fit in 16 bits")]
    ImmediateOutOfRange { line: usize, value: i64 },

    #[error("Line {line}: {mnemonic} takes {expected} operand(s), got {got}")]
    WrongOperandCount { line: usize, mnemonic: String, expected: usize, got: usize },
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
