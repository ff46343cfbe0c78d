//! The [`DeepCopy`] trait: recursive, fully independent duplication.

use wat_core::{LifecycleError, Uuid};

/// Allocate an independent duplicate of `self` and everything it owns.
///
/// Implementations recurse into owned children, so sharing present in the
/// source is never preserved in the copy. Every new reference-counted
/// cell starts at `ref_count == 1`. On failure every partially built
/// piece has already been released when the error is returned.
pub trait DeepCopy: Sized {
    /// Duplicate `self`.
    fn deep_copy(&self) -> Result<Self, LifecycleError>;
}

macro_rules! deep_copy_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl DeepCopy for $t {
                #[inline]
                fn deep_copy(&self) -> Result<Self, LifecycleError> {
                    Ok(*self)
                }
            }
        )*
    };
}

deep_copy_by_value!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Uuid);

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy(&self) -> Result<Self, LifecycleError> {
        match self {
            Some(v) => Ok(Some(v.deep_copy()?)),
            None => Ok(None),
        }
    }
}
