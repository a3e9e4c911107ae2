//! Property tests for dtype queries.

use proptest::prelude::*;

use crate::{DType, HasDType, ScalarDType};
use crate::test::generators::*;

proptest! {
    /// Vector byte width is the lane count times the scalar width.
    #[test]
    fn vector_bytes_scale_with_lanes(scalar in scalar_generator(), count in 2usize..=16) {
        let vector = DType::Scalar(scalar).vec(count);
        prop_assert_eq!(vector.bytes(), scalar.bytes() * count);
        prop_assert_eq!(vector.base(), scalar);
        prop_assert!(vector.scalar().is_none());
    }

    /// Integer bounds contain zero and are ordered.
    #[test]
    fn int_bounds_are_ordered(scalar in int_dtype()) {
        let (lo, hi) = scalar.int_bounds().unwrap();
        prop_assert!(lo <= 0 && 0 < hi);
        prop_assert_eq!(scalar.is_signed(), lo < 0);
    }

    /// Float types have no integer bounds.
    #[test]
    fn float_has_no_int_bounds(scalar in float_dtype()) {
        prop_assert!(scalar.int_bounds().is_none());
        prop_assert!(DType::Scalar(scalar).is_float());
    }
}

#[test]
fn test_literal_dtypes() {
    assert_eq!(<i32 as HasDType>::dtype(), DType::Int32);
    assert_eq!(<usize as HasDType>::dtype(), DType::UInt64);
    assert_eq!(<f32 as HasDType>::SCALAR, ScalarDType::Float32);
    assert_eq!(<bool as HasDType>::dtype(), DType::Bool);
}
