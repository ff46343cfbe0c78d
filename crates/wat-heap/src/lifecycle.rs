//! The four lifecycle operations plus `append`, in their nullable form.
//!
//! These are the shapes every boundary entry point reduces to: a missing
//! argument is `None`, an absent result is `Ok(None)`, and the three
//! outcomes (usage error, allocation failure, success) stay distinguishable.

use wat_core::LifecycleError;

use crate::array::{AppendMode, Array, Element};
use crate::copy::DeepCopy;
use crate::shared::Shared;

/// Release the stake held in `slot` and leave it null.
///
/// A null slot is a no-op. For a [`Shared`] value this decrements the
/// count and tears down the object graph only when it reaches zero.
pub fn delete<T>(slot: &mut Option<T>) {
    drop(slot.take());
}

/// Take an additional stake in `value`. Null in, null out.
pub fn clone<T>(value: Option<&Shared<T>>) -> Option<Shared<T>> {
    value.cloned()
}

/// Independent duplicate of `value` and everything it owns.
///
/// Null in yields `Ok(None)`. On failure nothing allocated along the way
/// survives.
pub fn deep_copy<T: DeepCopy>(value: Option<&T>) -> Result<Option<T>, LifecycleError> {
    value.map(T::deep_copy).transpose()
}

/// [`deep_copy`] writing into an out-parameter.
///
/// On failure `out` is left null.
pub fn deep_copy_into<T: DeepCopy>(
    out: Option<&mut Option<T>>,
    value: Option<&T>,
) -> Result<(), LifecycleError> {
    let out = out.ok_or(LifecycleError::NullArgument { name: "out" })?;
    match deep_copy(value) {
        Ok(copy) => {
            *out = copy;
            Ok(())
        }
        Err(err) => {
            *out = None;
            Err(err)
        }
    }
}

/// Release the old content of `slot` and store `value` in it.
///
/// `value` is a stake the caller hands over. The old content is released
/// exactly once, whether `value` is null, an alias of it, or unrelated.
pub fn reassign<T>(slot: &mut Option<T>, value: Option<T>) {
    let old = std::mem::replace(slot, value);
    drop(old);
}

/// Append a stake in `entry` to `array`.
///
/// A null array is a usage error. A null entry succeeds without change.
pub fn append<E: Element>(
    array: Option<&mut Array<E>>,
    entry: Option<&E>,
    mode: AppendMode,
) -> Result<(), LifecycleError> {
    let array = array.ok_or(LifecycleError::NullArgument { name: "array" })?;
    array.append(entry, mode)
}
