//! Order-preserving mapping between doubles and longs.
//!
//! The IEEE-754 bit pattern of a non-negative double already sorts like a signed
//! long. For negative doubles every bit except the sign is flipped so larger
//! magnitudes sort lower. The mapping is its own inverse.

/// Map a double to a long with the same total order
pub fn double_to_sortable_long(value: f64) -> i64 {
    sortable_bits(value.to_bits() as i64)
}

/// Inverse of [`double_to_sortable_long`]
pub fn sortable_long_to_double(value: i64) -> f64 {
    f64::from_bits(sortable_bits(value) as u64)
}

/// Smallest double greater than `value`
///
/// Both zeros step to the smallest positive subnormal. NaN and positive
/// infinity are returned unchanged.
pub fn next_up(value: f64) -> f64 {
    if value.is_nan() || value == f64::INFINITY {
        return value;
    }
    if value == 0.0 {
        return f64::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Largest double smaller than `value`
pub fn next_down(value: f64) -> f64 {
    -next_up(-value)
}

fn sortable_bits(bits: i64) -> i64 {
    bits ^ ((bits >> 63) & 0x7fff_ffff_ffff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_preserved() {
        let ordered = [
            f64::NEG_INFINITY,
            f64::MIN,
            -1e10,
            -1.5,
            -f64::MIN_POSITIVE,
            -0.0,
            0.0,
            f64::MIN_POSITIVE,
            1.0,
            1.5,
            f64::MAX,
            f64::INFINITY,
        ];
        for pair in ordered.windows(2) {
            assert!(
                double_to_sortable_long(pair[0]) < double_to_sortable_long(pair[1]),
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_roundtrip_keeps_sign_of_zero() {
        for value in [-0.0f64, 0.0, -3.25, 7.5e-300, f64::INFINITY] {
            let back = sortable_long_to_double(double_to_sortable_long(value));
            assert_eq!(back.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn test_adjacent_longs_are_adjacent_doubles() {
        let one = double_to_sortable_long(1.0);
        let next = f64::from_bits(1.0f64.to_bits() + 1);
        assert_eq!(sortable_long_to_double(one + 1), next);
    }

    #[test]
    fn test_next_up_and_down_skip_signed_zero() {
        let tiny = f64::from_bits(1);
        assert_eq!(next_up(-0.0).to_bits(), tiny.to_bits());
        assert_eq!(next_up(0.0).to_bits(), tiny.to_bits());
        assert_eq!(next_down(0.0).to_bits(), (-tiny).to_bits());
        assert_eq!(next_down(-0.0).to_bits(), (-tiny).to_bits());
        assert_eq!(next_up(-tiny).to_bits(), (-0.0f64).to_bits());

        assert_eq!(next_up(1.0), f64::from_bits(1.0f64.to_bits() + 1));
        assert_eq!(next_down(-1.0), f64::from_bits((-1.0f64).to_bits() + 1));
        assert_eq!(next_up(f64::MAX), f64::INFINITY);
        assert_eq!(next_up(f64::INFINITY), f64::INFINITY);
        assert_eq!(next_down(f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert!(next_up(f64::NAN).is_nan());
    }
}
