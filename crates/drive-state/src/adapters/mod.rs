pub mod leaf;
pub mod memory;

pub use leaf::*;
pub use memory::*;
