use std::fmt;

/// Numeric storage of a scalar's SI value.
///
/// Arithmetic and conversions run in `f64` and are narrowed back through
/// [`Storage::from_f64`] after every step, so `f32` scalars lose precision at
/// each conversion exactly as a single-precision value would.
pub trait Storage:
    Copy
    + PartialEq
    + PartialOrd
    + Default
    + fmt::Debug
    + fmt::Display
    + fmt::LowerExp
    + Send
    + Sync
    + 'static
{
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl Storage for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Storage for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}
