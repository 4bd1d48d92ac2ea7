// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error type shared by the registries, the archives and every serializer.
//!
//! Errors are created through the static constructors on [`Error`]. They are
//! `#[cold]` and `#[track_caller]` so that the happy paths of buffer reads and
//! registry lookups stay small, and so that `MORPHIC_PANIC_ON_ERROR` can point
//! at the exact call site that produced a failure.

use std::borrow::Cow;

use thiserror::Error;

/// Set `MORPHIC_PANIC_ON_ERROR` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("MORPHIC_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for morphic serialization and deserialization.
///
/// Do not build variants directly; use the constructor functions, which accept
/// anything convertible into `Cow<'static, str>` and honour
/// `MORPHIC_PANIC_ON_ERROR`.
///
/// ```rust
/// use morphic_core::error::Error;
///
/// let err = Error::unregistered_relation("dyn Animal", "Dog");
/// assert!(err.to_string().contains("Dog"));
/// let err = Error::invalid_data(format!("bad length {}", 3));
/// ```
///
/// For a stack trace at the point of failure:
///
/// ```bash
/// RUST_BACKTRACE=1 MORPHIC_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No cast path is known between a base and a derived type.
    #[error(
        "Trying to cast between unregistered polymorphic types ({derived} and {base}). \
         Register the relation with register_polymorphic! or register_polymorphic_relation!"
    )]
    UnregisteredRelation {
        base: Cow<'static, str>,
        derived: Cow<'static, str>,
    },

    /// A polymorphic type has no binding for the archive in use.
    #[error("Trying to use an unregistered polymorphic type ({0}) with this archive")]
    UnregisteredType(Cow<'static, str>),

    /// A shared pointer id was referenced before it was ever written.
    #[error("Could not find shared object id {0} in this archive")]
    UnknownSharedId(u32),

    /// A polymorphic type ordinal was referenced before its name was written.
    #[error("Could not find polymorphic type id {0} in this archive")]
    UnknownPolymorphicId(u32),

    /// More than one way to serialize a type was registered.
    #[error("{0}")]
    AmbiguousShape(Cow<'static, str>),

    /// A strong reference points at an object whose body is still being read.
    #[error(
        "Shared object id {0} refers to an object that is still being constructed; \
         use RcWeak for back references or wrap the object in a RefCell"
    )]
    CyclicReference(u32),

    /// User construction logic rejected the data it was given.
    #[error("{0}")]
    Construction(Cow<'static, str>),

    /// A stored object does not have the type the caller asked for.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        found: Cow<'static, str>,
    },

    /// Buffer boundary violation while reading.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// Invalid or corrupted data.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// Maximum nesting depth exceeded.
    #[error("{0}")]
    DepthExceed(Cow<'static, str>),

    /// Generic error.
    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::UnregisteredRelation`] naming both sides of the missing cast.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unregistered_relation<B, D>(base: B, derived: D) -> Self
    where
        B: Into<Cow<'static, str>>,
        D: Into<Cow<'static, str>>,
    {
        let err = Error::UnregisteredRelation {
            base: base.into(),
            derived: derived.into(),
        };
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unregistered_type<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnregisteredType(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_shared_id(id: u32) -> Self {
        let err = Error::UnknownSharedId(id);
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown_polymorphic_id(id: u32) -> Self {
        let err = Error::UnknownPolymorphicId(id);
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn ambiguous_shape<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::AmbiguousShape(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn cyclic_reference(id: u32) -> Self {
        let err = Error::CyclicReference(id);
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::Construction`]. Meant for user `Load` impls that
    /// validate what they read.
    ///
    /// ```
    /// use morphic_core::error::Error;
    ///
    /// let err = Error::construction("age must be positive");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn construction<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Construction(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<E, F>(expected: E, found: F) -> Self
    where
        E: Into<Cow<'static, str>>,
        F: Into<Cow<'static, str>>,
    {
        let err = Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        };
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        let err = Error::BufferOutOfBound(offset, length, capacity);
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::InvalidData(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn depth_exceed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::DepthExceed(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::Unknown(s.into());
        if PANIC_ON_ERROR {
            panic!("MORPHIC_PANIC_ON_ERROR: {}", err);
        }
        err
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// ```
/// use morphic_core::ensure;
/// use morphic_core::error::Error;
///
/// fn check_len(n: usize) -> Result<(), Error> {
///     ensure!(n > 0, "length must be positive");
///     ensure!(n < 10, Error::invalid_data(format!("length {} too large", n)));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`enum@Error`].
///
/// ```
/// use morphic_core::bail;
/// use morphic_core::error::Error;
///
/// fn fail_fast() -> Result<(), Error> {
///     bail!("something went wrong");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::unknown($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)))
    };
}
