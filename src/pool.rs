//! Registry of outstanding worker handles.
//!
//! Handles live in an arena of slots linked in insertion order by index.
//! Appending and removing a known handle are both O(1); freed slots are
//! recycled through a free list. Each [`WorkerId`] carries the generation of
//! its slot so a stale id can never remove a handle that later reused it.
//!
//! The pool is owned by the thread that spawns workers. Workers never see it,
//! and every mutating method takes `&mut self`.

use std::thread;

use log::trace;

use crate::error::{BlurError, Result};

/// Something that can be polled for completion and then joined.
pub trait WorkerHandle {
    /// Non-blocking completion check.
    fn is_finished(&self) -> bool;

    /// Blocks until the worker exits and releases it.
    fn join(self) -> Result<()>;
}

fn panicked(t: &thread::Thread) -> BlurError {
    BlurError::WorkerPanicked {
        name: t.name().unwrap_or("<unnamed>").to_string(),
    }
}

impl WorkerHandle for thread::JoinHandle<()> {
    fn is_finished(&self) -> bool {
        thread::JoinHandle::is_finished(self)
    }

    fn join(self) -> Result<()> {
        let err = panicked(self.thread());
        thread::JoinHandle::join(self).map_err(|_| err)
    }
}

impl<'scope> WorkerHandle for thread::ScopedJoinHandle<'scope, ()> {
    fn is_finished(&self) -> bool {
        thread::ScopedJoinHandle::is_finished(self)
    }

    fn join(self) -> Result<()> {
        let err = panicked(self.thread());
        thread::ScopedJoinHandle::join(self).map_err(|_| err)
    }
}

/// Stable reference to one tracked handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Slot<H> {
    handle: Option<H>,
    generation: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
pub struct WorkerPool<H> {
    slots: Vec<Slot<H>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<H> Default for WorkerPool<H> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }
}

impl<H: WorkerHandle> WorkerPool<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Tracks `handle` behind every handle already in the pool.
    pub fn append(&mut self, handle: H) -> WorkerId {
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.handle = Some(handle);
                slot.prev = self.tail;
                slot.next = None;
                index
            }
            None => {
                self.slots.push(Slot {
                    handle: Some(handle),
                    generation: 0,
                    prev: self.tail,
                    next: None,
                });
                self.slots.len() - 1
            }
        };

        match self.tail {
            Some(tail) => self.slots[tail].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        WorkerId {
            index,
            generation: self.slots[index].generation,
        }
    }

    /// Untracks the handle behind `id` without joining it.
    ///
    /// Returns `None` if the id was already removed.
    pub fn remove(&mut self, id: WorkerId) -> Option<H> {
        let slot = self.slots.get(id.index)?;
        if slot.generation != id.generation || slot.handle.is_none() {
            return None;
        }
        Some(self.unlink(id.index))
    }

    /// Joins every handle that has already finished and leaves the rest alone.
    /// Never blocks on a running worker.
    ///
    /// Returns how many handles were released. If a reclaimed worker
    /// panicked, the walk still completes and the first failure is returned.
    pub fn try_reclaim(&mut self) -> Result<usize> {
        let mut reclaimed = 0;
        let mut first_err = None;
        let mut cursor = self.head;

        while let Some(index) = cursor {
            cursor = self.slots[index].next;
            let finished = self.slots[index]
                .handle
                .as_ref()
                .is_some_and(|h| h.is_finished());
            if finished {
                let handle = self.unlink(index);
                reclaimed += 1;
                if let Err(err) = handle.join() {
                    first_err.get_or_insert(err);
                }
            }
        }

        trace!("reclaimed {reclaimed} finished workers, {} still running", self.len);
        match first_err {
            Some(err) => Err(err),
            None => Ok(reclaimed),
        }
    }

    /// Untracks the oldest handle without joining it.
    pub fn pop_oldest(&mut self) -> Option<H> {
        let index = self.head?;
        Some(self.unlink(index))
    }

    /// Blocks on the oldest handle and releases it.
    ///
    /// Returns `false` if the pool was empty.
    pub fn join_oldest(&mut self) -> Result<bool> {
        match self.pop_oldest() {
            Some(handle) => {
                handle.join()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Blocks until every tracked worker has exited; the pool is empty
    /// afterwards even when a worker panicked.
    ///
    /// Returns how many handles were joined, or the first failure.
    pub fn drain_all(&mut self) -> Result<usize> {
        let mut joined = 0;
        let mut first_err = None;

        while let Some(handle) = self.pop_oldest() {
            joined += 1;
            if let Err(err) = handle.join() {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(joined),
        }
    }

    fn unlink(&mut self, index: usize) -> H {
        let slot = &mut self.slots[index];
        let handle = slot
            .handle
            .take()
            .expect("unlink called on a vacant slot");
        let (prev, next) = (slot.prev.take(), slot.next.take());
        slot.generation += 1;

        match prev {
            Some(prev) => self.slots[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next].prev = prev,
            None => self.tail = prev,
        }

        self.free.push(index);
        self.len -= 1;
        handle
    }
}
