//! Owned wrapper over the platform `fd_set`.

use std::fmt::{Debug, Formatter};
use std::mem::MaybeUninit;

use libc::{FD_CLR, FD_ISSET, FD_SET, FD_ZERO, fd_set};

use crate::handle::SocketHandle;
use crate::select::MAX_SOCKET_HANDLE;

/// Fixed capacity bit set of socket handles. Copying an [`FdSet`] copies the bits, the two
/// values never share storage.
///
/// Handles outside `0..MAX_SOCKET_HANDLE` are never members: inserting them is ignored and
/// queries return `false`.
#[derive(Copy, Clone)]
pub struct FdSet {
    inner: fd_set,
}

impl FdSet {
    pub fn new() -> Self {
        let mut inner = MaybeUninit::<fd_set>::uninit();
        // SAFETY: FD_ZERO fully initialises the set
        let inner = unsafe {
            FD_ZERO(inner.as_mut_ptr());
            inner.assume_init()
        };
        Self { inner }
    }

    #[inline]
    pub fn in_range(handle: SocketHandle) -> bool {
        handle >= 0 && (handle as usize) < MAX_SOCKET_HANDLE
    }

    #[inline]
    pub fn insert(&mut self, handle: SocketHandle) {
        if Self::in_range(handle) {
            unsafe { FD_SET(handle, &mut self.inner) }
        }
    }

    #[inline]
    pub fn remove(&mut self, handle: SocketHandle) {
        if Self::in_range(handle) {
            unsafe { FD_CLR(handle, &mut self.inner) }
        }
    }

    #[inline]
    pub fn contains(&self, handle: SocketHandle) -> bool {
        Self::in_range(handle) && unsafe { FD_ISSET(handle, &self.inner) }
    }

    pub fn clear(&mut self) {
        unsafe { FD_ZERO(&mut self.inner) }
    }

    /// Iterates members in ascending order, scanning handles up to and including `upper`.
    pub fn iter_until(&self, upper: SocketHandle) -> impl Iterator<Item = SocketHandle> + '_ {
        let end = upper.min(MAX_SOCKET_HANDLE as SocketHandle - 1);
        (0..=end).filter(move |handle| self.contains(*handle))
    }

    /// Pointer handed to `select(2)`, which rewrites the set in place.
    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut fd_set {
        &mut self.inner
    }
}

impl Default for FdSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for FdSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.iter_until(MAX_SOCKET_HANDLE as SocketHandle - 1))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_empty() {
        let set = FdSet::new();
        assert_eq!(0, set.iter_until(MAX_SOCKET_HANDLE as SocketHandle).count());
        assert!(!set.contains(0));
    }

    #[test]
    fn should_insert_and_remove() {
        let mut set = FdSet::new();
        set.insert(3);
        set.insert(7);
        assert!(set.contains(3));
        assert!(set.contains(7));
        assert!(!set.contains(4));

        set.remove(3);
        assert!(!set.contains(3));
        assert_eq!(vec![7], set.iter_until(10).collect::<Vec<_>>());

        set.clear();
        assert!(!set.contains(7));
    }

    #[test]
    fn should_ignore_handles_out_of_range() {
        let mut set = FdSet::new();
        set.insert(-1);
        set.insert(MAX_SOCKET_HANDLE as SocketHandle);
        set.remove(MAX_SOCKET_HANDLE as SocketHandle + 5);
        assert!(!set.contains(-1));
        assert!(!set.contains(MAX_SOCKET_HANDLE as SocketHandle));
        assert_eq!(0, set.iter_until(SocketHandle::MAX).count());
    }

    #[test]
    fn should_copy_by_value() {
        let mut original = FdSet::new();
        original.insert(5);
        let copy = original;
        original.remove(5);
        assert!(copy.contains(5));
        assert!(!original.contains(5));
    }

    #[test]
    fn should_stop_scan_at_upper_bound() {
        let mut set = FdSet::new();
        set.insert(2);
        set.insert(9);
        assert_eq!(vec![2], set.iter_until(8).collect::<Vec<_>>());
        assert_eq!(vec![2, 9], set.iter_until(9).collect::<Vec<_>>());
        assert_eq!("{2, 9}", format!("{:?}", set));
    }
}
