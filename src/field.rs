//! # Field Values
//!
//! Decoder and driver outputs carry an explicit validity tag. A value that is
//! not available is [`Reading::Invalid`], never a zero or default.

/// A value that is either present or unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    /// The value was decoded and can be displayed.
    Valid(T),
    /// No value has been decoded yet, or the source marked it unusable.
    Invalid,
}

impl<T> Reading<T> {
    /// Returns `true` for [`Reading::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Reading::Valid(_))
    }

    /// Converts into an `Option`, dropping the validity tag.
    pub fn value(self) -> Option<T> {
        match self {
            Reading::Valid(value) => Some(value),
            Reading::Invalid => None,
        }
    }

    /// Maps the contained value, keeping `Invalid` as is.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Reading<U> {
        match self {
            Reading::Valid(value) => Reading::Valid(f(value)),
            Reading::Invalid => Reading::Invalid,
        }
    }

    /// Carries this reading's validity over to another value.
    ///
    /// Used for derived columns (e.g. age of a fix) that are only
    /// meaningful while their source is valid.
    pub fn gate<U>(&self, value: U) -> Reading<U> {
        match self {
            Reading::Valid(_) => Reading::Valid(value),
            Reading::Invalid => Reading::Invalid,
        }
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Reading::Valid(value),
            None => Reading::Invalid,
        }
    }
}

/// Age reported for fields that were never updated.
pub const AGE_NEVER: u64 = u64::MAX;

/// A decoder field: the reading plus the time since it was last updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<T> {
    /// Current value or `Invalid`
    pub reading: Reading<T>,
    /// Milliseconds since the last update ([`AGE_NEVER`] if never updated)
    pub age_ms: u64,
}

impl<T> Field<T> {
    /// A field holding a value updated `age_ms` milliseconds ago.
    pub fn valid(value: T, age_ms: u64) -> Self {
        Self {
            reading: Reading::Valid(value),
            age_ms,
        }
    }

    /// A field that has no value.
    pub fn invalid() -> Self {
        Self {
            reading: Reading::Invalid,
            age_ms: AGE_NEVER,
        }
    }

    /// Age as a reading gated on this field's validity.
    pub fn age(&self) -> Reading<u64> {
        self.reading.gate(self.age_ms)
    }
}
