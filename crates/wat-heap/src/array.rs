//! [`Array<E>`]: the growable container of owned element handles.
//!
//! The header is `#[repr(C)] { int length; int alloc; E *array; }`, and
//! arrays are always held behind a [`Shared`] cell ([`SharedArray<E>`]), so
//! the reference count comes from the same protocol as every record.
//!
//! Every slot in `0..length` holds exactly one ownership stake. The stake is
//! released when the slot is overwritten, popped, cleared, or when the array
//! itself is dropped. Growth follows the installed
//! [`ArrayGrowth`](wat_core::ArrayGrowth) policy.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use wat_core::LifecycleError;

use crate::alloc;
use crate::copy::DeepCopy;
use crate::shared::Shared;
use crate::string::WatString;

/// Reference-counted array, the only form arrays take inside records.
pub type SharedArray<E> = Shared<Array<E>>;

/// How [`Array::append`] takes its stake in the entry.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppendMode {
    /// Clone the entry: the new slot shares the caller's cell (`WAT_CLONE`).
    Share = 0,
    /// Deep copy the entry: the new slot owns an independent copy (`WAT_COPY`).
    Isolate = 1,
}

impl TryFrom<i32> for AppendMode {
    type Error = LifecycleError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Share),
            1 => Ok(Self::Isolate),
            _ => Err(LifecycleError::InvalidMode { value }),
        }
    }
}

/// An element type an array can hold.
pub trait Element: DeepCopy {
    /// Produce the stake stored by [`AppendMode::Share`].
    fn share(&self) -> Result<Self, LifecycleError>;
}

impl<T: DeepCopy> Element for Shared<T> {
    fn share(&self) -> Result<Self, LifecycleError> {
        Ok(self.clone())
    }
}

impl Element for WatString {
    /// Strings carry no count, so sharing duplicates the text.
    fn share(&self) -> Result<Self, LifecycleError> {
        self.duplicate()
    }
}

/// Growable, ordered sequence of owned `E` stakes.
#[repr(C)]
pub struct Array<E> {
    length: i32,
    alloc: i32,
    array: *mut E,
    _owns: PhantomData<E>,
}

// SAFETY: the array uniquely owns its buffer and elements.
unsafe impl<E: Send> Send for Array<E> {}
// SAFETY: shared access only reads elements.
unsafe impl<E: Sync> Sync for Array<E> {}

impl<E> Array<E> {
    /// An empty array with no buffer.
    pub const fn new() -> Self {
        Self {
            length: 0,
            alloc: 0,
            array: ptr::null_mut(),
            _owns: PhantomData,
        }
    }

    /// An empty array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, LifecycleError> {
        let mut array = Self::new();
        if capacity > 0 {
            array.grow_to(capacity)?;
        }
        Ok(array)
    }

    /// Collect owned elements, stopping at the first allocation failure.
    pub fn try_from_iter<I>(iter: I) -> Result<Self, LifecycleError>
    where
        I: IntoIterator<Item = E>,
    {
        let iter = iter.into_iter();
        let mut array = Self::with_capacity(iter.size_hint().0)?;
        for item in iter {
            array.push(item)?;
        }
        Ok(array)
    }

    /// Verify `0 <= length <= alloc` and a buffer behind any capacity.
    pub fn check(&self) -> Result<(), LifecycleError> {
        let corrupt = self.length < 0
            || self.alloc < 0
            || self.length > self.alloc
            || (self.alloc > 0 && self.array.is_null());
        if corrupt {
            return Err(LifecycleError::CorruptContainer {
                length: self.length,
                capacity: self.alloc,
            });
        }
        Ok(())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.length.max(0) as usize
    }

    /// `true` when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated slots.
    pub fn capacity(&self) -> usize {
        self.alloc.max(0) as usize
    }

    /// Occupied slots as a slice.
    pub fn as_slice(&self) -> &[E] {
        if self.array.is_null() || self.check().is_err() {
            return &[];
        }
        // SAFETY: `check` passed, so `array` holds `length` initialised slots.
        unsafe { std::slice::from_raw_parts(self.array, self.len()) }
    }

    /// Occupied slots as a mutable slice. Assigning to a slot releases the
    /// stake previously stored there.
    pub fn as_mut_slice(&mut self) -> &mut [E] {
        if self.array.is_null() || self.check().is_err() {
            return &mut [];
        }
        // SAFETY: as in `as_slice`, plus `&mut self` for exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.array, self.len()) }
    }

    /// Iterate the occupied slots.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.as_slice().iter()
    }

    /// The element at `index`, if occupied.
    pub fn get(&self, index: usize) -> Option<&E> {
        self.as_slice().get(index)
    }

    /// Ensure room for `additional` more elements, growing geometrically.
    ///
    /// On failure the array is unchanged.
    pub fn reserve(&mut self, additional: usize) -> Result<(), LifecycleError> {
        self.check()?;
        let required = self
            .len()
            .checked_add(additional)
            .ok_or(LifecycleError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        if required <= self.capacity() {
            return Ok(());
        }
        let growth = wat_core::config::current().array;
        let target = growth
            .next_capacity(self.capacity(), required)
            .min(i32::MAX as usize)
            .max(required);
        self.grow_to(target)
    }

    fn grow_to(&mut self, capacity: usize) -> Result<(), LifecycleError> {
        const { assert!(std::mem::size_of::<E>() > 0, "zero-sized array elements") };
        if capacity > i32::MAX as usize {
            return Err(LifecycleError::CapacityOverflow {
                requested: capacity,
            });
        }
        let layout = Layout::array::<E>(capacity).map_err(|_| LifecycleError::CapacityOverflow {
            requested: capacity,
        })?;
        let fresh = alloc::allocate(layout)?.cast::<E>();
        if let Some(old) = NonNull::new(self.array) {
            // SAFETY: `old` holds `length` initialised slots and was
            // allocated with `alloc` slots; the fresh block is larger.
            unsafe {
                ptr::copy_nonoverlapping(old.as_ptr(), fresh.as_ptr(), self.len());
                alloc::release(old.cast(), Layout::array::<E>(self.capacity()).unwrap_unchecked());
            }
        }
        self.array = fresh.as_ptr();
        self.alloc = capacity as i32;
        Ok(())
    }

    /// Move `value` into the next slot, growing if full.
    ///
    /// On failure `value` is dropped and the array keeps its length.
    pub fn push(&mut self, value: E) -> Result<(), LifecycleError> {
        self.reserve(1)?;
        // SAFETY: `reserve` guarantees `length < alloc`.
        unsafe { self.array.add(self.len()).write(value) };
        self.length += 1;
        Ok(())
    }

    /// Append a stake in `entry` according to `mode`.
    ///
    /// A `None` entry succeeds without appending. The array is either one
    /// element longer on return or exactly as long as before.
    pub fn append(&mut self, entry: Option<&E>, mode: AppendMode) -> Result<(), LifecycleError>
    where
        E: Element,
    {
        let Some(entry) = entry else {
            return Ok(());
        };
        // The stake comes first so a failed copy never touches the buffer.
        let stake = match mode {
            AppendMode::Share => entry.share()?,
            AppendMode::Isolate => entry.deep_copy()?,
        };
        self.push(stake)
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<E> {
        if self.is_empty() || self.check().is_err() {
            return None;
        }
        self.length -= 1;
        // SAFETY: slot `length` was initialised and is now outside the live range.
        Some(unsafe { self.array.add(self.len()).read() })
    }

    /// Release every element, keeping the buffer.
    pub fn clear(&mut self) {
        let live = self.as_mut_slice() as *mut [E];
        self.length = 0;
        // SAFETY: the slots were initialised and are no longer reachable.
        unsafe { ptr::drop_in_place(live) };
    }
}

impl<E> Drop for Array<E> {
    fn drop(&mut self) {
        self.clear();
        if let Some(buf) = NonNull::new(self.array) {
            if let Ok(layout) = Layout::array::<E>(self.capacity()) {
                // SAFETY: the buffer came from `grow_to` with this capacity.
                unsafe { alloc::release(buf.cast(), layout) };
            }
        }
    }
}

impl<E> Default for Array<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DeepCopy> DeepCopy for Array<E> {
    fn deep_copy(&self) -> Result<Self, LifecycleError> {
        self.check()?;
        let mut copy = Array::with_capacity(self.len())?;
        for element in self.iter() {
            copy.push(element.deep_copy()?)?;
        }
        Ok(copy)
    }
}

impl<'a, E> IntoIterator for &'a Array<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: PartialEq> PartialEq for Array<E> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<E: fmt::Debug> fmt::Debug for Array<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
