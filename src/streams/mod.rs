//! Stream implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
#[cfg(feature = "network")]
pub mod network;

#[cfg(feature = "console")]
pub use console::{ConsoleStream, ConsoleTarget};
#[cfg(feature = "file")]
pub use file::FileStream;
#[cfg(feature = "http")]
pub use http::{BodyPrepareFn, HttpStream};
pub use memory::MemoryStream;
#[cfg(feature = "network")]
pub use network::NetworkStream;

pub use crate::core::{BufferedStream, Stream};
