// Copyright 2025 acilink contributors
// SPDX-License-Identifier: Apache-2.0

//! Bounded frame queues
//!
//! [`BoundedQueue`] is a plain fixed-capacity FIFO. [`SharedQueue`] wraps it
//! in a `critical_section::Mutex` so the foreground loop and the ready-line
//! interrupt can both touch it; every operation is one critical section that
//! covers a single queue mutation.

use core::cell::{RefCell, RefMut};

use critical_section::{CriticalSection, Mutex};
use heapless::Deque;

use crate::frame::Frame;

/// Default number of frames per direction
pub const DEFAULT_QUEUE_CAPACITY: usize = 4;

/// Fixed-capacity FIFO of frames
///
/// Frames go in and come out by copy. A full queue rejects new frames and
/// is left untouched.
#[derive(Clone)]
pub struct BoundedQueue<const N: usize> {
    frames: Deque<Frame, N>,
}

impl<const N: usize> BoundedQueue<N> {
    pub const fn new() -> Self {
        Self { frames: Deque::new() }
    }

    /// Append a frame
    ///
    /// # Errors
    ///
    /// Hands the frame back if the queue is full
    pub fn enqueue(&mut self, frame: Frame) -> Result<(), Frame> {
        self.frames.push_back(frame)
    }

    /// Remove and return the oldest frame
    pub fn dequeue(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    /// Oldest frame, left in place
    pub fn peek(&self) -> Option<Frame> {
        self.frames.front().copied()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.frames.is_full()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

impl<const N: usize> Default for BoundedQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for BoundedQueue<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.frames.iter()).finish()
    }
}

/// [`BoundedQueue`] behind a critical section
///
/// Usable from a `static`:
///
/// ```rust
/// use acilink_transport::{Frame, SharedQueue};
///
/// static EVENTS: SharedQueue<4> = SharedQueue::new();
///
/// # fn main() {
/// EVENTS.enqueue(Frame::new(&[0x81]).unwrap()).unwrap();
/// assert_eq!(EVENTS.dequeue().map(|f| f.len()), Some(1));
/// # }
/// ```
pub struct SharedQueue<const N: usize> {
    inner: Mutex<RefCell<BoundedQueue<N>>>,
}

impl<const N: usize> SharedQueue<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(BoundedQueue::new())),
        }
    }

    /// Run `f` with exclusive access to the queue
    ///
    /// Use this for compound checks that must not be split by an interrupt,
    /// and keep `f` short.
    pub fn with<R>(&self, f: impl FnOnce(&mut BoundedQueue<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Borrow the queue inside a critical section the caller already holds
    ///
    /// Lets one critical section cover several queues.
    pub fn borrow_mut<'cs>(&'cs self, cs: CriticalSection<'cs>) -> RefMut<'cs, BoundedQueue<N>> {
        self.inner.borrow_ref_mut(cs)
    }

    /// # Errors
    ///
    /// Hands the frame back if the queue is full
    pub fn enqueue(&self, frame: Frame) -> Result<(), Frame> {
        self.with(|q| q.enqueue(frame))
    }

    pub fn dequeue(&self) -> Option<Frame> {
        self.with(|q| q.dequeue())
    }

    pub fn peek(&self) -> Option<Frame> {
        self.with(|q| q.peek())
    }

    pub fn is_full(&self) -> bool {
        self.with(|q| q.is_full())
    }

    pub fn is_empty(&self) -> bool {
        self.with(|q| q.is_empty())
    }

    pub fn len(&self) -> usize {
        self.with(|q| q.len())
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&self) {
        self.with(|q| q.clear())
    }
}

impl<const N: usize> Default for SharedQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for SharedQueue<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.with(|q| f.debug_struct("SharedQueue").field("frames", q).finish())
    }
}
