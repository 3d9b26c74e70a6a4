use std::fmt;

/// A monotonically increasing position within a single aggregate instance's event stream.
///
/// Starts at 1 for the first event an aggregate instance ever emits.
pub type Version = i64;

/// A monotonically increasing position across *all* instances of one aggregate type.
///
/// Backed by a `BIGSERIAL` column on the per-aggregate-type events table; this is what
/// lets a projection or policy resume "from where it left off" without re-scanning
/// every aggregate instance.
pub type GlobalSequence = i64;

/// Opaque currency code (e.g. `"USD"`, `"EUR"`). Never interpreted, only compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Currency(pub String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Arbitrary-precision signed monetary amount.
pub type Money = rust_decimal::Decimal;
