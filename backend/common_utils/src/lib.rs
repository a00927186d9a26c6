//! Common utilities for the gateway integration layer.

/// Masking primitives. Secrets serialize to their real value for wire
/// requests; `Debug`/`Display` output is always redacted through the
/// masking strategy.
pub mod masking {
    use std::{fmt, marker::PhantomData};

    /// Controls how a masked value renders in debug output.
    pub trait Strategy<T> {
        fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    }

    /// Default strategy: redact the value, keep the type name.
    #[derive(Debug, Clone, Copy)]
    pub enum WithType {}

    impl<T> Strategy<T> for WithType {
        fn fmt(_val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "*** {} ***", std::any::type_name::<T>())
        }
    }

    /// A value that must never reach logs or debug output in cleartext.
    pub struct Secret<T, S = WithType>
    where
        S: Strategy<T>,
    {
        inner: T,
        masking_strategy: PhantomData<S>,
    }

    impl<T, S: Strategy<T>> Secret<T, S> {
        pub fn new(inner: T) -> Self {
            Self {
                inner,
                masking_strategy: PhantomData,
            }
        }
    }

    impl<T, S: Strategy<T>> From<T> for Secret<T, S> {
        fn from(inner: T) -> Self {
            Self::new(inner)
        }
    }

    impl<T: Clone, S: Strategy<T>> Clone for Secret<T, S> {
        fn clone(&self) -> Self {
            Self::new(self.inner.clone())
        }
    }

    impl<T: PartialEq, S: Strategy<T>> PartialEq for Secret<T, S> {
        fn eq(&self, other: &Self) -> bool {
            self.inner == other.inner
        }
    }

    impl<T: Eq, S: Strategy<T>> Eq for Secret<T, S> {}

    impl<T: std::hash::Hash, S: Strategy<T>> std::hash::Hash for Secret<T, S> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.inner.hash(state)
        }
    }

    impl<T: Default, S: Strategy<T>> Default for Secret<T, S> {
        fn default() -> Self {
            Self::new(T::default())
        }
    }

    impl<T, S: Strategy<T>> fmt::Debug for Secret<T, S> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            S::fmt(&self.inner, f)
        }
    }

    impl<T: serde::Serialize, S: Strategy<T>> serde::Serialize for Secret<T, S> {
        fn serialize<Ser: serde::Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
            self.inner.serialize(serializer)
        }
    }

    impl<'de, T: serde::Deserialize<'de>, S: Strategy<T>> serde::Deserialize<'de> for Secret<T, S> {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            T::deserialize(deserializer).map(Self::new)
        }
    }

    /// Borrow the inner value without consuming the secret.
    pub trait PeekInterface<T> {
        fn peek(&self) -> &T;
    }

    impl<T, S: Strategy<T>> PeekInterface<T> for Secret<T, S> {
        fn peek(&self) -> &T {
            &self.inner
        }
    }

    /// Consume the secret and take the inner value.
    pub trait ExposeInterface<T> {
        fn expose(self) -> T;
    }

    impl<T, S: Strategy<T>> ExposeInterface<T> for Secret<T, S> {
        fn expose(self) -> T {
            self.inner
        }
    }

    /// A value that is either plain or masked; header lists carry these so
    /// credential headers stay redacted when the request is logged.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Maskable<T> {
        Masked(Secret<T>),
        Normal(T),
    }

    impl<T: std::hash::Hash> std::hash::Hash for Maskable<T> {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            match self {
                Self::Masked(secret) => secret.hash(state),
                Self::Normal(value) => value.hash(state),
            }
        }
    }

    impl<T: Clone> Maskable<T> {
        pub fn into_inner(self) -> T {
            match self {
                Self::Masked(secret) => secret.expose(),
                Self::Normal(value) => value,
            }
        }

        pub fn is_masked(&self) -> bool {
            matches!(self, Self::Masked(_))
        }
    }

    impl<T> From<T> for Maskable<T> {
        fn from(value: T) -> Self {
            Self::Normal(value)
        }
    }

    impl<T> From<Secret<T>> for Maskable<T> {
        fn from(value: Secret<T>) -> Self {
            Self::Masked(value)
        }
    }

    /// Convenience conversion into the masked arm.
    pub trait Mask {
        type Output;
        fn into_masked(self) -> Maskable<Self::Output>;
    }

    impl Mask for String {
        type Output = String;
        fn into_masked(self) -> Maskable<String> {
            Maskable::Masked(Secret::new(self))
        }
    }

    impl Mask for Secret<String> {
        type Output = String;
        fn into_masked(self) -> Maskable<String> {
            Maskable::Masked(self)
        }
    }
}

pub use masking::{ExposeInterface, Mask, Maskable, PeekInterface, Secret, Strategy, WithType};

pub mod consts;
pub mod crypto;
pub mod errors;
pub mod ext_traits;
pub mod pii;
pub mod request;
pub mod types;

pub use errors::{CustomResult, ParsingError, ValidationError};
pub use pii::{Email, SecretSerdeValue};
pub use request::{Method, Request, RequestContent};
pub use types::{
    AmountConvertor, FloatMajorUnit, FloatMajorUnitForGateway, MinorUnit, MinorUnitForGateway,
    StringMajorUnit, StringMajorUnitForGateway, StringMinorUnit, StringMinorUnitForGateway,
};
