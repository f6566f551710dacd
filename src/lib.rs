pub mod display;
mod error;
pub mod instruction;
pub mod interpreter;
pub mod keyboard;
mod memory;
pub mod registers;

pub use error::MachineError;
pub use interpreter::{Cycle, Interpreter, TimerMode};
pub use memory::{FONT_START, MAX_ROM_SIZE, START_ROM};

pub type Result<T, E = MachineError> = std::result::Result<T, E>;
