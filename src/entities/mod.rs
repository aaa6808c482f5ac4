pub mod building;
pub mod spawning;

pub use building::*;
pub use spawning::*;
