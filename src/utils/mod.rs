use alloy_primitives::{U256, U512};
use std::cmp::Ordering;

pub fn remove_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url[..url.len() - 1].to_string()
    } else {
        url.to_string()
    }
}

/// Lossless 256 -> 512 bit widening. Products of two widened values never overflow.
pub fn widen(v: U256) -> U512 {
    let l = v.as_limbs();
    U512::from_limbs([l[0], l[1], l[2], l[3], 0, 0, 0, 0])
}

/// 512 -> 256 bit narrowing, `None` when the upper half is set.
pub fn narrow(v: U512) -> Option<U256> {
    let l = v.as_limbs();
    if l[4..].iter().any(|&limb| limb != 0) {
        return None;
    }
    Some(U256::from_limbs([l[0], l[1], l[2], l[3]]))
}

/// `ceil(a * b / d)`. `None` on a zero divisor or when the result exceeds 256 bits.
pub fn mul_div_ceil(a: U256, b: U256, d: U256) -> Option<U256> {
    if d.is_zero() {
        return None;
    }
    let (q, r) = (widen(a) * widen(b)).div_rem(widen(d));
    if r.is_zero() {
        narrow(q)
    } else {
        narrow(q + U512::from(1u64))
    }
}

/// `a * b / d` rounded to the nearest integer, ties to even.
pub fn mul_div_round_half_even(a: U256, b: U256, d: U256) -> Option<U256> {
    if d.is_zero() {
        return None;
    }
    let d = widen(d);
    let (q, r) = (widen(a) * widen(b)).div_rem(d);
    let twice_r = r + r;
    let round_up = match twice_r.cmp(&d) {
        Ordering::Greater => true,
        Ordering::Equal => q.as_limbs()[0] & 1 == 1,
        Ordering::Less => false,
    };
    if round_up {
        narrow(q + U512::from(1u64))
    } else {
        narrow(q)
    }
}

/// `10^exp`, `None` once it no longer fits in 256 bits (`exp > 77`).
pub fn pow10(exp: u32) -> Option<U256> {
    let ten = U256::from(10u64);
    (0..exp).try_fold(U256::from(1u64), |acc, _| acc.checked_mul(ten))
}

/// Compare the ratios `a_num / a_den` and `b_num / b_den` exactly.
/// A zero denominator stands for positive infinity; two infinities are equal.
pub fn cmp_ratio(a_num: U256, a_den: U256, b_num: U256, b_den: U256) -> Ordering {
    match (a_den.is_zero(), b_den.is_zero()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => (widen(a_num) * widen(b_den)).cmp(&(widen(b_num) * widen(a_den))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_mul_div_ceil() {
        assert_eq!(mul_div_ceil(u(10), u(1), u(3)), Some(u(4)));
        assert_eq!(mul_div_ceil(u(9), u(1), u(3)), Some(u(3)));
        assert_eq!(mul_div_ceil(u(0), u(7), u(3)), Some(u(0)));
        assert_eq!(mul_div_ceil(u(1), u(1), u(0)), None);
    }

    #[test]
    fn test_mul_div_ceil_wide_intermediate() {
        // the product overflows 256 bits but the quotient does not
        assert_eq!(mul_div_ceil(U256::MAX, U256::MAX, U256::MAX), Some(U256::MAX));
        assert_eq!(mul_div_ceil(U256::MAX, u(2), u(1)), None);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(mul_div_round_half_even(u(5), u(1), u(2)), Some(u(2)));
        assert_eq!(mul_div_round_half_even(u(7), u(1), u(2)), Some(u(4)));
        assert_eq!(mul_div_round_half_even(u(10), u(1), u(3)), Some(u(3)));
        assert_eq!(mul_div_round_half_even(u(11), u(1), u(3)), Some(u(4)));
        assert_eq!(mul_div_round_half_even(u(1), u(1), u(0)), None);
    }

    #[test]
    fn test_cmp_ratio() {
        assert_eq!(cmp_ratio(u(1), u(2), u(2), u(4)), Ordering::Equal);
        assert_eq!(cmp_ratio(u(3), u(2), u(1), u(1)), Ordering::Greater);
        assert_eq!(cmp_ratio(u(1), u(0), u(1000), u(1)), Ordering::Greater);
        assert_eq!(cmp_ratio(u(1), u(0), u(5), u(0)), Ordering::Equal);
    }

    #[test]
    fn test_narrow_rejects_upper_half() {
        let big = widen(U256::MAX) + U512::from(1u64);
        assert_eq!(narrow(big), None);
        assert_eq!(narrow(widen(u(42))), Some(u(42)));
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0), Some(u(1)));
        assert_eq!(pow10(18), Some(u(1_000_000_000_000_000_000)));
        assert!(pow10(77).is_some());
        assert_eq!(pow10(78), None);
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(remove_trailing_slash("http://node:8545/"), "http://node:8545");
        assert_eq!(remove_trailing_slash("http://node:8545"), "http://node:8545");
    }
}
