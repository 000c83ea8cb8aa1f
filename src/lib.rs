//! Tracks a bounded set of sockets and reports, with a single blocking call, which of them
//! have data waiting to be read.
//!
//! ## Example
//! ```no_run
//! use std::net::TcpStream;
//! use std::time::Duration;
//! use sockselect::ReadinessSelector;
//!
//! let stream = TcpStream::connect("127.0.0.1:4222").unwrap();
//! let mut selector = ReadinessSelector::new();
//! selector.add(&stream);
//! if selector.wait(Duration::from_secs(1)) && selector.is_ready(&stream) {
//!     // read from the stream without blocking
//! }
//! ```

#[cfg(not(unix))]
compile_error!("sockselect requires a unix target");

pub mod handle;
pub mod select;

pub use handle::{INVALID_SOCKET, RawSocket, SocketHandle};
pub use select::error::SelectError;
pub use select::{MAX_SOCKET_HANDLE, MAX_TRACKED_SOCKETS, ReadinessSelector, Selectable};
