//! Blocking queue / dequeue
use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::errors::{Error, PushError, Result};

use super::Capacity;

// -----------------------------------------------------------------------------
// 		- Wait -
// -----------------------------------------------------------------------------
// How long an operation is allowed to park the calling thread
#[derive(Debug, Clone, Copy)]
enum Wait {
    Never,
    Forever,
    Until(Instant),
}

impl Wait {
    // A timeout that overflows `Instant` has no deadline
    fn timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Wait::Until(deadline),
            None => Wait::Forever,
        }
    }

    // Park on the condvar, or return the reason not to.
    // The caller re-tests its predicate once this returns `Ok`, as
    // the wake-up might be spurious.
    fn park<S>(&self, condvar: &Condvar, guard: &mut MutexGuard<'_, S>, idle: Error) -> Result<()> {
        match *self {
            Wait::Never => Err(idle),
            Wait::Forever => {
                condvar.wait(guard);
                Ok(())
            }
            Wait::Until(deadline) => {
                if Instant::now() >= deadline {
                    return Err(Error::Timeout);
                }
                condvar.wait_until(guard, deadline);
                Ok(())
            }
        }
    }
}

// -----------------------------------------------------------------------------
// 		- Shared state -
// -----------------------------------------------------------------------------
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: Capacity,
}

// -----------------------------------------------------------------------------
// 		- Queue -
// -----------------------------------------------------------------------------
/// A blocking multi producer / multi consumer FIFO queue.
///
/// Every clone is a handle to the same queue, so a queue is shared by cloning
/// it into each producer and consumer thread.
///
/// A bounded queue creates back pressure: once it holds `capacity` messages
/// [`push`] blocks until a consumer makes room.
///
/// Closing the queue releases every blocked thread. Messages pushed
/// before the queue was closed can still be popped, after that
/// [`pop`] returns [`Error::Closed`].
///
/// ```
/// # use std::thread;
/// use handoff::sync::queue::Queue;
/// use handoff::errors::Error;
///
/// let queue = Queue::bounded(2).unwrap();
/// let rx = queue.clone();
///
/// let consumer = thread::spawn(move || {
///     let mut total = 0;
///     while let Ok(val) = rx.pop() {
///         total += val;
///     }
///     total
/// });
///
/// for i in 1..=10 {
///     queue.push(i).unwrap();
/// }
/// queue.close();
///
/// assert_eq!(consumer.join().unwrap(), 55);
/// assert_eq!(queue.pop(), Err(Error::Closed));
/// ```
///
/// [`push`]: struct.Queue.html#method.push
/// [`pop`]: struct.Queue.html#method.pop
/// [`Error::Closed`]: ../../errors/enum.Error.html
pub struct Queue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Queue<T> {
    /// Create a queue with a given capacity.
    /// A bounded queue with a capacity of zero is rejected, use
    /// [`Capacity::Bounded(1)`] for a hand-off of a single message.
    ///
    /// [`Capacity::Bounded(1)`]: ../enum.Capacity.html
    pub fn new(capacity: Capacity) -> Result<Self> {
        match capacity {
            Capacity::Bounded(0) => Err(Error::ZeroCapacity),
            Capacity::Bounded(cap) => Ok(Self::with_items(capacity, VecDeque::with_capacity(cap))),
            Capacity::Unbounded => Ok(Self::unbounded()),
        }
    }

    /// Create an unbounded queue
    pub fn unbounded() -> Self {
        Self::with_items(Capacity::Unbounded, VecDeque::new())
    }

    fn with_items(capacity: Capacity, items: VecDeque<T>) -> Self {
        debug!("new queue: {:?}", capacity);

        let inner = Inner {
            state: Mutex::new(State { items, closed: false }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        };

        Self { inner: Arc::new(inner) }
    }

    /// Create a bounded queue.
    ///
    /// ```
    /// # use handoff::sync::queue::Queue;
    /// assert!(Queue::<u8>::bounded(0).is_err());
    ///
    /// let queue = Queue::bounded(1).unwrap();
    /// queue.try_push(1).unwrap();
    /// assert!(queue.try_push(2).is_err());
    /// ```
    pub fn bounded(capacity: usize) -> Result<Self> {
        Self::new(Capacity::Bounded(capacity))
    }

    /// Push a message onto the tail of the queue.
    ///
    /// Blocks while a bounded queue is full. Fails only if the
    /// queue is closed, in which case the message is handed back.
    pub fn push(&self, val: T) -> std::result::Result<(), PushError<T>> {
        self.put(val, Wait::Forever)
    }

    /// Push a message without blocking.
    pub fn try_push(&self, val: T) -> std::result::Result<(), PushError<T>> {
        self.put(val, Wait::Never)
    }

    /// Push a message, waiting at most `timeout` for space to free up.
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use handoff::sync::queue::Queue;
    /// # use handoff::errors::PushError;
    /// let queue = Queue::bounded(1).unwrap();
    /// queue.push("first").unwrap();
    ///
    /// let res = queue.push_timeout("second", Duration::from_millis(10));
    /// assert_eq!(res, Err(PushError::Timeout("second")));
    /// ```
    pub fn push_timeout(&self, val: T, timeout: Duration) -> std::result::Result<(), PushError<T>> {
        self.put(val, Wait::timeout(timeout))
    }

    /// Remove the message at the head of the queue.
    ///
    /// Blocks until a message is available.
    /// Returns `Error::Closed` once the queue is closed and empty.
    pub fn pop(&self) -> Result<T> {
        self.take(Wait::Forever)
    }

    /// Remove the head of the queue without blocking.
    /// Returns `Error::Empty` if there is nothing to take.
    pub fn try_pop(&self) -> Result<T> {
        self.take(Wait::Never)
    }

    /// Remove the head of the queue, waiting at most `timeout` for
    /// a message to arrive.
    ///
    /// `Error::Timeout` is never returned before the timeout has passed,
    /// and `Error::Closed` means no message will ever arrive.
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use handoff::sync::queue::Queue;
    /// # use handoff::errors::Error;
    /// let queue = Queue::<u32>::unbounded();
    /// assert_eq!(queue.try_pop_for(Duration::from_millis(5)), Err(Error::Timeout));
    ///
    /// queue.close();
    /// assert_eq!(queue.try_pop_for(Duration::from_millis(5)), Err(Error::Closed));
    /// ```
    pub fn try_pop_for(&self, timeout: Duration) -> Result<T> {
        self.take(Wait::timeout(timeout))
    }

    /// Remove every pending message, oldest first.
    pub fn drain(&self) -> Vec<T> {
        let drained = {
            let mut state = self.inner.state.lock();
            state.items.drain(..).collect::<Vec<_>>()
        };
        trace!("drained {} message(s)", drained.len());
        self.inner.not_full.notify_all();
        drained
    }

    /// Close the queue and wake up every blocked producer and consumer.
    ///
    /// Returns `true` if this call closed the queue, and `false`
    /// if it was already closed.
    pub fn close(&self) -> bool {
        let pending = {
            let mut state = self.inner.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.items.len()
        };

        debug!("queue closed with {} pending message(s)", pending);
        self.inner.not_empty.notify_all();
        self.inner.not_full.notify_all();
        true
    }

    /// `true` once the queue is closed
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Number of pending messages.
    /// This is a snapshot and may be stale as soon as it returns.
    pub fn len(&self) -> usize {
        self.inner.state.lock().items.len()
    }

    /// `true` if there are no pending messages
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The capacity the queue was created with
    pub fn capacity(&self) -> Capacity {
        self.inner.capacity
    }

    /// A blocking iterator over popped messages.
    /// The iterator ends once the queue is closed and empty.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { queue: self }
    }

    fn put(&self, val: T, wait: Wait) -> std::result::Result<(), PushError<T>> {
        let mut state = self.inner.state.lock();

        loop {
            if state.closed {
                return Err(PushError::Closed(val));
            }

            if !self.inner.capacity.is_full(state.items.len()) {
                state.items.push_back(val);
                drop(state);
                self.inner.not_empty.notify_one();
                return Ok(());
            }

            if let Err(e) = wait.park(&self.inner.not_full, &mut state, Error::Full) {
                return Err(match e {
                    Error::Timeout => PushError::Timeout(val),
                    _ => PushError::Full(val),
                });
            }
        }
    }

    fn take(&self, wait: Wait) -> Result<T> {
        let mut state = self.inner.state.lock();

        loop {
            if let Some(val) = state.items.pop_front() {
                drop(state);
                self.inner.not_full.notify_one();
                return Ok(val);
            }

            if state.closed {
                return Err(Error::Closed);
            }

            wait.park(&self.inner.not_empty, &mut state, Error::Empty)?;
        }
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Queue")
            .field("len", &state.items.len())
            .field("capacity", &self.inner.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// 		- Iterators -
// -----------------------------------------------------------------------------
/// Blocking iterator borrowing a [`Queue`].
///
/// [`Queue`]: struct.Queue.html
pub struct Iter<'a, T> {
    queue: &'a Queue<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop().ok()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Blocking iterator owning a queue handle.
pub struct IntoIter<T> {
    queue: Queue<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.queue.pop().ok()
    }
}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { queue: self }
    }
}
