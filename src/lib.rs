// SLMsg-Rust: Second Life / OpenSim message codec layer in Rust
// Exact wire compatibility, checked by the type system

pub mod bitpack;
pub mod caps;
pub mod error;
pub mod llsd;
pub mod messages;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CapError, CodecError, CodecResult, LlsdError, ValueError, ValueResult};
pub use messages::{Message, MessageFrequency, MessageType, PacketReader, PacketWriter};
pub use types::{Value, ValueArray, ValueMap};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
