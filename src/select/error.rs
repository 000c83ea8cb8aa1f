use std::io;
use std::io::ErrorKind::Other;
use thiserror::Error;

use crate::handle::SocketHandle;

#[derive(Error, Debug)]
pub enum SelectError {
    #[error("the selector is full: at most {limit} sockets can be tracked (FD_SETSIZE)")]
    CapacityExceeded { limit: usize },
    #[error("socket handle {handle} is too high: handles must be below {limit} (FD_SETSIZE)")]
    HandleOutOfRange { handle: SocketHandle, limit: usize },
    #[error("invalid socket handle")]
    InvalidHandle,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<SelectError> for io::Error {
    fn from(value: SelectError) -> Self {
        match value {
            SelectError::Io(err) => err,
            other => io::Error::new(Other, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_os_error_when_converting_to_io_error() {
        let err: io::Error = SelectError::Io(io::Error::from_raw_os_error(libc::EINTR)).into();
        assert_eq!(io::ErrorKind::Interrupted, err.kind());
    }

    #[test]
    fn should_describe_range_error() {
        let err = SelectError::HandleOutOfRange { handle: 2048, limit: 1024 };
        assert_eq!(
            "socket handle 2048 is too high: handles must be below 1024 (FD_SETSIZE)",
            err.to_string()
        );
        let err: io::Error = err.into();
        assert_eq!(Other, err.kind());
    }
}
