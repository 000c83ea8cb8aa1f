//! Socket handles as seen by the selector.

use std::os::fd::{AsRawFd, RawFd};

/// Platform identifier of an open socket. On unix this is the raw file descriptor.
pub type SocketHandle = RawFd;

/// Distinguished handle value that never refers to an open socket.
pub const INVALID_SOCKET: SocketHandle = -1;

/// Bare handle value that can stand in for a socket owned elsewhere.
///
/// The selector only stores and compares handles, so any descriptor obtained through FFI can be
/// tracked by wrapping it in [`RawSocket`]. Dropping it does not close anything.
///
/// ## Example
/// ```
/// use sockselect::{RawSocket, Selectable, INVALID_SOCKET};
///
/// assert_eq!(INVALID_SOCKET, RawSocket::invalid().handle());
/// assert!(RawSocket::new(3).is_valid());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RawSocket(SocketHandle);

impl RawSocket {
    pub const fn new(handle: SocketHandle) -> Self {
        Self(handle)
    }

    pub const fn invalid() -> Self {
        Self(INVALID_SOCKET)
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 != INVALID_SOCKET
    }
}

impl Default for RawSocket {
    fn default() -> Self {
        Self::invalid()
    }
}

impl From<SocketHandle> for RawSocket {
    fn from(handle: SocketHandle) -> Self {
        Self(handle)
    }
}

impl AsRawFd for RawSocket {
    #[inline]
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::Selectable;
    use std::net::{TcpListener, UdpSocket};

    #[test]
    fn should_expose_raw_handle() {
        let socket = RawSocket::new(42);
        assert!(socket.is_valid());
        assert_eq!(42, socket.handle());
        assert_eq!(42, socket.as_raw_fd());
    }

    #[test]
    fn should_default_to_invalid_handle() {
        let socket = RawSocket::default();
        assert!(!socket.is_valid());
        assert_eq!(INVALID_SOCKET, socket.handle());
    }

    #[test]
    fn should_use_descriptor_of_std_sockets() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let udp = UdpSocket::bind("127.0.0.1:0").unwrap();
        assert_eq!(listener.as_raw_fd(), listener.handle());
        assert_eq!(udp.as_raw_fd(), udp.handle());
        assert_ne!(listener.handle(), udp.handle());
    }
}
