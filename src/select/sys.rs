//! Platform readiness primitive: a single `select(2)` call watching for read readiness only.

use std::io;
use std::ptr;
use std::time::Duration;

use libc::{c_int, time_t, timeval};

use crate::handle::SocketHandle;
use crate::select::fdset::FdSet;

/// Longest timeout handed to `select(2)`. macOS and the BSDs reject larger `tv_sec` values with
/// `EINVAL`.
const MAX_TIMEOUT_SECS: u128 = 100_000_000;

/// Converts `timeout` into the `timeval` expected by `select(2)`. [`Duration::ZERO`] means block
/// indefinitely and maps to `None`.
pub(crate) fn to_timeval(timeout: Duration) -> Option<timeval> {
    if timeout.is_zero() {
        return None;
    }
    let micros = timeout.as_micros();
    let secs = (micros / 1_000_000).min(MAX_TIMEOUT_SECS) as time_t;
    let usecs = (micros % 1_000_000) as libc::suseconds_t;
    Some(timeval {
        tv_sec: secs,
        tv_usec: usecs,
    })
}

/// Waits until at least one handle in `ready` is readable, scanning handles up to and including
/// `max_handle`. On return `ready` holds only the readable handles. Interruptions are reported
/// as errors and never retried.
pub(crate) fn select_read(ready: &mut FdSet, max_handle: SocketHandle, timeout: Duration) -> io::Result<usize> {
    let mut time = to_timeval(timeout);
    let time_ptr = time.as_mut().map_or(ptr::null_mut(), |time| time as *mut timeval);
    let nfds: c_int = max_handle + 1;
    let count = unsafe { libc::select(nfds, ready.as_mut_ptr(), ptr::null_mut(), ptr::null_mut(), time_ptr) };
    if count < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(count as usize)
    }
}
