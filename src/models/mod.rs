//! Metasys API model types and operations.

mod command;
mod device;
mod object;
mod token;
mod variant;

pub use command::*;
pub use device::*;
pub use object::*;
pub use token::*;
pub use variant::*;
