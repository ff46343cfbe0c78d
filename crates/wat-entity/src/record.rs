//! The `record!` macro: one declaration per record type.
//!
//! A declaration lists the fields once; the macro emits the `#[repr(C)]`
//! struct, its [`DeepCopy`](wat_heap::DeepCopy) implementation, and a
//! `try_new` constructor returning a fresh [`Shared`](wat_heap::Shared)
//! cell. Every lifecycle operation the boundary exports is generic over
//! those three, so adding a field never touches lifecycle code.
//!
//! Field types decide ownership:
//!
//! | Field type | Meaning | Deep copy |
//! |---|---|---|
//! | scalar (`i32`, `f64`, `bool`, ...) | value | copied |
//! | `Option<Owned<Uuid>>` | owned identifier | new cell |
//! | `Option<WatString>` | owned text | duplicated |
//! | `Option<Shared<R>>` | owned record stake | recursive |
//! | `Option<Shared<Array<E>>>` | owned array stake | recursive |

macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C)]
        #[derive(Debug, Default, PartialEq)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $crate::record::DeepCopy for $name {
            fn deep_copy(&self) -> Result<Self, $crate::record::LifecycleError> {
                Ok(Self {
                    $( $field: $crate::record::DeepCopy::deep_copy(&self.$field)?, )*
                })
            }
        }

        impl $name {
            #[doc = concat!("Allocate a default `", stringify!($name), "` with `ref_count == 1`.")]
            ///
            /// Scalars start at zero and every reference starts null.
            pub fn try_new() -> Result<$crate::record::Shared<Self>, $crate::record::LifecycleError> {
                $crate::record::Shared::try_new(Self::default())
            }
        }
    };
}

pub(crate) use wat_core::LifecycleError;
pub(crate) use wat_heap::{DeepCopy, Shared};
