use core::cmp::Ordering;

use crate::ErrorCode;

/// A decoded numeric value, in the representation it was stored with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer (including small ints).
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// IEEE-754 double.
    Double(f64),
}

impl Number {
    /// Widen to `f64`; integers beyond 2^53 round to the nearest double.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn to_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::UInt(v) => v as f64,
            Self::Double(v) => v,
        }
    }

    /// Exact integer value, if the number is integral and fits into `i128`.
    #[must_use]
    fn to_i128_exact(self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(v)),
            Self::UInt(v) => Some(i128::from(v)),
            Self::Double(d) => exact_integral(d),
        }
    }

    /// Total order across representations without precision loss.
    ///
    /// Integers compare exactly against doubles; NaN sorts above every other number and equal
    /// to itself.
    #[must_use]
    pub fn total_cmp(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Double(a), Self::Double(b)) => cmp_doubles(a, b),
            (Self::Double(d), n) => cmp_int_double(int_of(n), d).reverse(),
            (n, Self::Double(d)) => cmp_int_double(int_of(n), d),
            (a, b) => int_of(a).cmp(&int_of(b)),
        }
    }
}

const fn int_of(n: Number) -> i128 {
    match n {
        Number::Int(v) => v as i128,
        Number::UInt(v) => v as i128,
        Number::Double(_) => 0,
    }
}

fn cmp_doubles(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // -0.0 and 0.0 are the same number here.
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn cmp_int_double(i: i128, d: f64) -> Ordering {
    const TWO_POW_127: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if d.is_nan() {
        return Ordering::Less;
    }
    if d >= TWO_POW_127 {
        return Ordering::Less;
    }
    if d < -TWO_POW_127 {
        return Ordering::Greater;
    }
    let t = d.trunc();
    match i.cmp(&(t as i128)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(d - t)).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn exact_integral(d: f64) -> Option<i128> {
    const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
    if !d.is_finite() || d.trunc() != d || d >= TWO_POW_64 || d < -TWO_POW_64 {
        return None;
    }
    Some(d as i128)
}

mod sealed {
    pub trait Sealed {}
}

/// Numeric types a [`crate::Slice`] can be decoded into via [`crate::Slice::get_number`].
///
/// Integral targets accept any stored number that they can hold exactly; floating targets
/// accept every number.
pub trait FromNumber: sealed::Sealed + Sized {
    /// Convert, or report why the value does not fit.
    ///
    /// # Errors
    ///
    /// Returns `NumericOverflow` if an integral target cannot represent the value exactly.
    fn from_number(n: Number) -> Result<Self, ErrorCode>;
}

macro_rules! impl_from_number_int {
    ($($t:ty),*) => {$(
        impl sealed::Sealed for $t {}

        impl FromNumber for $t {
            fn from_number(n: Number) -> Result<Self, ErrorCode> {
                let v = n.to_i128_exact().ok_or(ErrorCode::NumericOverflow)?;
                <$t>::try_from(v).map_err(|_| ErrorCode::NumericOverflow)
            }
        }
    )*};
}

impl_from_number_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl sealed::Sealed for f64 {}

impl FromNumber for f64 {
    fn from_number(n: Number) -> Result<Self, ErrorCode> {
        Ok(n.to_f64())
    }
}

impl sealed::Sealed for f32 {}

impl FromNumber for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_number(n: Number) -> Result<Self, ErrorCode> {
        let v = n.to_f64();
        if v.is_finite() && v.abs() > f64::from(f32::MAX) {
            return Err(ErrorCode::NumericOverflow);
        }
        Ok(v as f32)
    }
}
