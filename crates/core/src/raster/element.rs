//! Raster element trait for generic cell values

use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Besides numeric values, rasters in this crate hold masks (`bool`) and
/// ordinal class codes, so the bound is deliberately not numeric.
pub trait RasterElement: Copy + Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Value used to fill freshly allocated rasters
    fn fill_value() -> Self;

    /// Default no-data value for this type
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;
}

macro_rules! impl_raster_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn fill_value() -> Self {
                0
            }

            fn default_nodata() -> Self {
                <$t>::MIN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn fill_value() -> Self {
                0.0
            }

            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    };
}

impl_raster_element_int!(i16);
impl_raster_element_int!(i32);
impl_raster_element_int!(u8);
impl_raster_element_int!(u16);
impl_raster_element_int!(u32);
impl_raster_element_float!(f32);
impl_raster_element_float!(f64);

impl RasterElement for bool {
    fn fill_value() -> Self {
        false
    }

    fn default_nodata() -> Self {
        false
    }

    // Masks have no nodata state.
    fn is_nodata(&self, _nodata: Option<Self>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_always_nodata() {
        assert!(f64::NAN.is_nodata(None));
        assert!(f64::NAN.is_nodata(Some(-9999.0)));
        assert!((-9999.0f64).is_nodata(Some(-9999.0)));
        assert!(!0.0f64.is_nodata(Some(-9999.0)));
    }

    #[test]
    fn test_int_nodata_requires_sentinel() {
        assert!(!0u8.is_nodata(None));
        assert!(255u8.is_nodata(Some(255)));
    }

    #[test]
    fn test_bool_never_nodata() {
        assert!(!true.is_nodata(Some(true)));
    }
}
