//! Fixed-capacity object pool.
//!
//! An arena of `N` pre-constructed objects. Allocation hands out a typed
//! [`Handle`] (pool id + slot index + generation) rather than a reference;
//! releasing a slot bumps its generation so stale handles are rejected by
//! every later lookup.
//!
//! Occupancy is one atomic word per slot. Allocation and release run inside
//! a critical section; lookups ([`ObjectPool::get`]) are a single atomic load
//! and are safe from interrupt context.

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use log::warn;

use crate::error::{SysError, SysResult};

/// Slot is allocated
const IN_USE: u32 = 1;
/// Generation counter lives above the in-use bit
const GENERATION_SHIFT: u32 = 1;
/// Generation counter width
const GENERATION_MASK: u32 = 0xFFFF;

/// Source of pool identities; 0 means "not yet assigned"
static NEXT_POOL_ID: AtomicU16 = AtomicU16::new(1);

/// Objects that can live in an [`ObjectPool`].
///
/// `INIT` is the state every slot is constructed in.
pub trait PoolObject: Sized {
    /// Initial (idle) value of a slot
    const INIT: Self;
}

// =============================================================================
// Handle
// =============================================================================

/// Typed reference to an allocated pool slot.
pub struct Handle<T> {
    pool: u16,
    index: u16,
    generation: u16,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Slot index inside its pool
    #[inline]
    pub const fn index(&self) -> usize {
        self.index as usize
    }

    /// Generation the slot had when this handle was issued
    #[inline]
    pub const fn generation(&self) -> u16 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("pool", &self.pool)
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<T> defmt::Format for Handle<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Handle({}:{}#{})", self.pool, self.index, self.generation);
    }
}

// =============================================================================
// ObjectPool
// =============================================================================

/// Fixed-capacity pool of `N` objects of type `T`.
pub struct ObjectPool<T, const N: usize> {
    items: [T; N],
    slots: [AtomicU32; N],
    id: AtomicU16,
}

impl<T: PoolObject, const N: usize> ObjectPool<T, N> {
    /// Create a pool with every slot free (const, suitable for statics).
    pub const fn new() -> Self {
        Self {
            items: [const { T::INIT }; N],
            slots: [const { AtomicU32::new(0) }; N],
            id: AtomicU16::new(0),
        }
    }
}

impl<T: PoolObject, const N: usize> Default for ObjectPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> ObjectPool<T, N> {
    /// Number of slots
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Identity of this pool, assigned on first use
    fn id(&self) -> u16 {
        let current = self.id.load(Ordering::Acquire);
        if current != 0 {
            return current;
        }
        let mut fresh = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        if fresh == 0 {
            fresh = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        }
        match self
            .id
            .compare_exchange(0, fresh, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => fresh,
            Err(existing) => existing,
        }
    }

    /// Claim the first free slot.
    ///
    /// Returns `None` when all `N` slots are occupied. Never blocks.
    pub fn allocate(&self) -> Option<Handle<T>> {
        let pool = self.id();
        critical_section::with(|_| {
            self.slots.iter().enumerate().find_map(|(index, slot)| {
                let state = slot.load(Ordering::Acquire);
                if state & IN_USE != 0 {
                    return None;
                }
                slot.store(state | IN_USE, Ordering::Release);
                Some(Handle {
                    pool,
                    index: index as u16,
                    generation: ((state >> GENERATION_SHIFT) & GENERATION_MASK) as u16,
                    _marker: PhantomData,
                })
            })
        })
    }

    /// Return a slot to the pool.
    ///
    /// A handle that is stale, already released or issued by another pool is
    /// reported and rejected without touching any slot.
    pub fn release(&self, handle: Handle<T>) -> SysResult<()> {
        if !self.owns(&handle) {
            warn!("pool: release of foreign handle {handle:?}");
            return Err(SysError::InvalidHandle);
        }
        let slot = &self.slots[handle.index()];
        critical_section::with(|_| {
            let state = slot.load(Ordering::Acquire);
            if state != Self::live_state(&handle) {
                warn!("pool: release of free or stale slot {handle:?}");
                return Err(SysError::InvalidHandle);
            }
            let next = (handle.generation as u32).wrapping_add(1) & GENERATION_MASK;
            slot.store(next << GENERATION_SHIFT, Ordering::Release);
            Ok(())
        })
    }

    /// Resolve a handle to its object.
    ///
    /// Lock-free; usable from interrupt context.
    #[inline]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if !self.owns(&handle) {
            return None;
        }
        let state = self.slots[handle.index()].load(Ordering::Acquire);
        (state == Self::live_state(&handle)).then(|| &self.items[handle.index()])
    }

    /// Whether `handle` currently refers to an allocated slot of this pool
    #[inline]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of allocated slots
    pub fn in_use(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.load(Ordering::Relaxed) & IN_USE != 0)
            .count()
    }

    fn owns(&self, handle: &Handle<T>) -> bool {
        handle.pool == self.id.load(Ordering::Acquire) && handle.index() < N
    }

    const fn live_state(handle: &Handle<T>) -> u32 {
        ((handle.generation as u32) << GENERATION_SHIFT) | IN_USE
    }
}

// =============================================================================
// Tests
// =============================================================================
