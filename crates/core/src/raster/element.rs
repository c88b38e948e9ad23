//! Pixel value types

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Values a [`crate::Raster`] can hold.
///
/// Intensities are read as `f64`, thickness maps store pixel radii as `u32`
/// and exported masks use `u8`. Integer TIFF samples are normalized by
/// [`RasterElement::max_value`].
pub trait RasterElement:
    Copy + Debug + PartialOrd + NumCast + Zero + Send + Sync + 'static
{
    fn max_value() -> Self;

    /// Whether the value is a usable measurement (finite for floats)
    fn is_valid(&self) -> bool;

    fn to_f64(self) -> f64 {
        NumCast::from(self).unwrap_or(f64::NAN)
    }
}

macro_rules! impl_integer_element {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn max_value() -> Self {
                    <$t>::MAX
                }

                fn is_valid(&self) -> bool {
                    true
                }
            }
        )*
    };
}

macro_rules! impl_float_element {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn max_value() -> Self {
                    <$t>::MAX
                }

                fn is_valid(&self) -> bool {
                    self.is_finite()
                }
            }
        )*
    };
}

impl_integer_element!(u8, u16, u32);
impl_float_element!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_and_conversion() {
        assert_eq!(7u32.to_f64(), 7.0);
        assert_eq!(<u16 as RasterElement>::max_value().to_f64(), 65535.0);
        assert!(!f64::NAN.is_valid());
        assert!(!f32::INFINITY.is_valid());
        assert!(3u8.is_valid());
    }
}
