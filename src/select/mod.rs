//! Socket readiness multiplexing on top of `select(2)`.

use std::fmt::{Debug, Formatter};
use std::mem;
use std::os::fd::AsRawFd;
use std::time::Duration;

use log::{error, trace, warn};

use crate::handle::{INVALID_SOCKET, SocketHandle};
use crate::select::error::SelectError;
use crate::select::fdset::FdSet;

pub mod error;
pub mod fdset;
mod sys;

/// Socket handles must be strictly below this value to be tracked.
pub const MAX_SOCKET_HANDLE: usize = libc::FD_SETSIZE as usize;

/// Maximum number of sockets a single [`ReadinessSelector`] can track at once.
pub const MAX_TRACKED_SOCKETS: usize = libc::FD_SETSIZE as usize;

/// Anything that exposes a socket handle. The selector reads the handle and never touches the
/// underlying resource.
pub trait Selectable {
    fn handle(&self) -> SocketHandle;
}

impl<T: AsRawFd + ?Sized> Selectable for T {
    #[inline]
    fn handle(&self) -> SocketHandle {
        self.as_raw_fd()
    }
}

/// Tracks a bounded set of sockets and reports which of them are ready to be read.
///
/// The selector holds handle values only. Sockets stay owned by the caller and must outlive
/// their membership; dropping or clearing the selector never closes anything.
///
/// Cloning produces an independent selector referring to the same sockets. The ready set
/// reflects exactly the last [`ReadinessSelector::wait`] and is replaced wholesale by each call.
///
/// ## Example
/// ```no_run
/// use std::net::TcpListener;
/// use std::time::Duration;
/// use sockselect::ReadinessSelector;
///
/// let listener = TcpListener::bind("127.0.0.1:9000").unwrap();
/// let mut selector = ReadinessSelector::new();
/// selector.add(&listener);
/// loop {
///     // zero timeout blocks until something is ready
///     if selector.wait(Duration::ZERO) && selector.is_ready(&listener) {
///         let (_stream, _addr) = listener.accept().unwrap();
///     }
/// }
/// ```
pub struct ReadinessSelector {
    tracked: FdSet,
    ready: FdSet,
    max_handle: Option<SocketHandle>,
    count: usize,
}

impl ReadinessSelector {
    /// Creates an empty selector.
    pub fn new() -> ReadinessSelector {
        Self {
            tracked: FdSet::new(),
            ready: FdSet::new(),
            max_handle: None,
            count: 0,
        }
    }

    /// Starts tracking `socket`. Invalid handles are ignored. If the handle is too high or the
    /// selector is full the condition is logged and the selector is left unchanged.
    pub fn add<S: Selectable + ?Sized>(&mut self, socket: &S) {
        match self.try_add(socket) {
            Ok(_) | Err(SelectError::InvalidHandle) => {}
            Err(err) => error!("the socket can't be added to the selector: {}", err),
        }
    }

    /// Starts tracking `socket`, returning `Ok(true)` if it was not tracked before and
    /// `Ok(false)` if it already was. On error the selector is left unchanged.
    pub fn try_add<S: Selectable + ?Sized>(&mut self, socket: &S) -> Result<bool, SelectError> {
        self.insert_bounded(socket.handle(), MAX_TRACKED_SOCKETS)
    }

    /// Inserts `handle` unless that would track more than `limit` sockets.
    fn insert_bounded(&mut self, handle: SocketHandle, limit: usize) -> Result<bool, SelectError> {
        if handle == INVALID_SOCKET {
            return Err(SelectError::InvalidHandle);
        }
        if !FdSet::in_range(handle) {
            return Err(SelectError::HandleOutOfRange {
                handle,
                limit: MAX_SOCKET_HANDLE,
            });
        }
        if self.tracked.contains(handle) {
            return Ok(false);
        }
        if self.count >= limit {
            return Err(SelectError::CapacityExceeded { limit });
        }
        self.tracked.insert(handle);
        self.count += 1;
        self.max_handle = Some(self.max_handle.map_or(handle, |max| max.max(handle)));
        Ok(true)
    }

    /// Stops tracking `socket` and forgets any readiness recorded for it. Untracked, invalid and
    /// out of range handles are ignored.
    pub fn remove<S: Selectable + ?Sized>(&mut self, socket: &S) {
        let handle = socket.handle();
        if handle == INVALID_SOCKET || !self.tracked.contains(handle) {
            return;
        }
        // the scan bound is left as is, a stale upper bound only costs a longer scan
        self.tracked.remove(handle);
        self.ready.remove(handle);
        self.count -= 1;
    }

    /// Removes every socket and resets the bookkeeping.
    pub fn clear(&mut self) {
        self.tracked.clear();
        self.ready.clear();
        self.max_handle = None;
        self.count = 0;
    }

    /// Blocks until at least one tracked socket is readable or `timeout` elapses, returning
    /// `true` if any socket became ready. [`Duration::ZERO`] blocks indefinitely.
    ///
    /// Returns `false` right away when nothing is tracked. A failed or interrupted wait is logged
    /// and reported as `false`, it is not retried.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        match self.try_wait(timeout) {
            Ok(count) => count > 0,
            Err(err) => {
                warn!("error when waiting for socket readiness: {}", err);
                false
            }
        }
    }

    /// Same as [`ReadinessSelector::wait`] but returns the number of ready sockets and surfaces
    /// the OS error (for example `EINTR`) instead of logging it.
    pub fn try_wait(&mut self, timeout: Duration) -> Result<usize, SelectError> {
        self.ready = self.tracked;
        let max_handle = match self.max_handle {
            Some(max_handle) if self.count > 0 => max_handle,
            _ => return Ok(0),
        };
        match sys::select_read(&mut self.ready, max_handle, timeout) {
            Ok(count) => {
                trace!("{} of {} sockets ready", count, self.count);
                Ok(count)
            }
            Err(err) => {
                // select(2) leaves the sets unspecified on error
                self.ready.clear();
                Err(err.into())
            }
        }
    }

    /// Returns `true` if `socket` was found ready by the last wait and has not been removed
    /// since.
    pub fn is_ready<S: Selectable + ?Sized>(&self, socket: &S) -> bool {
        let handle = socket.handle();
        handle != INVALID_SOCKET && self.ready.contains(handle)
    }

    /// Returns `true` if `socket` is currently tracked.
    pub fn contains<S: Selectable + ?Sized>(&self, socket: &S) -> bool {
        let handle = socket.handle();
        handle != INVALID_SOCKET && self.tracked.contains(handle)
    }

    /// Handles found ready by the last wait, in ascending order.
    pub fn ready(&self) -> impl Iterator<Item = SocketHandle> + '_ {
        self.ready.iter_until(self.max_handle.unwrap_or(INVALID_SOCKET))
    }

    /// Number of tracked sockets.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Upper bound on the tracked handles, scanned by each wait. It can overestimate after
    /// removals and is `None` until the first add after creation or [`ReadinessSelector::clear`].
    #[inline]
    pub fn max_handle(&self) -> Option<SocketHandle> {
        self.max_handle
    }
}

impl Default for ReadinessSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ReadinessSelector {
    fn clone(&self) -> Self {
        Self {
            tracked: self.tracked,
            ready: self.ready,
            max_handle: self.max_handle,
            count: self.count,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        let mut temp = source.clone();
        mem::swap(self, &mut temp);
    }
}

impl Debug for ReadinessSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let upper = self.max_handle.unwrap_or(INVALID_SOCKET);
        f.debug_struct("ReadinessSelector")
            .field("tracked", &self.tracked.iter_until(upper).collect::<Vec<_>>())
            .field("ready", &self.ready().collect::<Vec<_>>())
            .field("max_handle", &self.max_handle)
            .field("count", &self.count)
            .finish()
    }
}
