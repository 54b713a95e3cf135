pub mod memory;
pub mod validity;

pub use memory::{simulate, Memory, MemoryCell};
pub use validity::is_valid;
