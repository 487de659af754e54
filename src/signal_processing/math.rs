use std::fmt::{Debug, Display, LowerExp};

use num_complex::Complex;
use num_traits::Float;

/// Real sample precision used by the gain loop.
///
/// Implemented for `f32` and `f64`. Precision is chosen once at the type
/// level; nothing in the loop dispatches on it at runtime.
pub trait Real: Float + Debug + Display + LowerExp + Send + Sync + 'static {
    /// Convert a constant expressed in `f64` to this precision.
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64` for reporting.
    fn as_f64(self) -> f64;
}

macro_rules! impl_real {
    ($t:ty) => {
        impl Real for $t {
            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);

/// Energy of a complex sample, `Re(x * conj(x))`.
///
/// Computed through the conjugate product rather than `norm_sqr()` so the
/// rounding matches the product form exactly.
#[inline]
pub fn energy<T: Real>(x: Complex<T>) -> T {
    (x * x.conj()).re
}

/// Convert a power (energy) ratio to decibels.
pub fn power_to_db<T: Real>(ratio: T) -> T {
    T::from_f64(10.0) * ratio.log10()
}

/// Convert an amplitude ratio to decibels.
pub fn amplitude_to_db<T: Real>(ratio: T) -> T {
    T::from_f64(20.0) * ratio.log10()
}
