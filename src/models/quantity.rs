use alloy_primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::models::Amount;
use crate::utils::{mul_div_round_half_even, pow10};

/// An exact token quantity in human units: `base / 10^decimals`.
///
/// Every 256-bit base amount is representable at any number of decimals.
/// Displays and serializes as a plain decimal string without trailing zeros.
/// Equality is structural: `1.0` at 6 decimals and at 18 decimals differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenQuantity {
    base: Amount,
    decimals: u32,
}

impl TokenQuantity {
    pub fn new(base: Amount, decimals: u32) -> Self {
        Self { base, decimals }
    }

    pub fn base(&self) -> Amount {
        self.base
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Express the quantity with `decimals` digits after the point.
    /// `None` when that needs more than 256 bits. Never drops precision.
    pub fn rescale_up(self, decimals: u32) -> Option<Self> {
        if decimals < self.decimals {
            return None;
        }
        let factor = pow10(decimals - self.decimals)?;
        let base = self.base.as_u256().checked_mul(factor)?;
        Some(Self::new(Amount(base), decimals))
    }

    /// Exact sum, kept at the larger of the two precisions.
    pub fn checked_add(self, other: TokenQuantity) -> Option<TokenQuantity> {
        let decimals = self.decimals.max(other.decimals);
        let a = self.rescale_up(decimals)?;
        let b = other.rescale_up(decimals)?;
        Some(Self::new(a.base.checked_add(b.base)?, decimals))
    }

    /// Fixed-point rendering with exactly `dp` fractional digits, rounded
    /// half to even.
    pub fn to_fixed(&self, dp: u32) -> String {
        let rounded = if self.decimals > dp {
            let base = match pow10(self.decimals - dp) {
                Some(divisor) => {
                    mul_div_round_half_even(self.base.as_u256(), U256::from(1u64), divisor)
                        .unwrap_or(U256::ZERO)
                }
                // the divisor exceeds twice any 256-bit value
                None => U256::ZERO,
            };
            Self::new(Amount(base), dp)
        } else {
            *self
        };
        let (int, mut frac) = split_digits(rounded.base.as_u256(), rounded.decimals);
        frac.extend(std::iter::repeat('0').take((dp - rounded.decimals) as usize));
        if frac.is_empty() {
            int
        } else {
            format!("{}.{}", int, frac)
        }
    }
}

/// Integer digits and exactly `decimals` fractional digits of `base / 10^decimals`.
fn split_digits(base: U256, decimals: u32) -> (String, String) {
    let digits = base.to_string();
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int, frac) = padded.split_at(padded.len() - decimals);
    (int.to_string(), frac.to_string())
}

impl fmt::Display for TokenQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (int, frac) = split_digits(self.base.as_u256(), self.decimals);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            write!(f, "{}", int)
        } else {
            write!(f, "{}.{}", int, frac)
        }
    }
}

impl Serialize for TokenQuantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(base: u64, decimals: u32) -> TokenQuantity {
        TokenQuantity::new(Amount::from(base), decimals)
    }

    #[test]
    fn test_display_exact() {
        assert_eq!(q(1_500_000, 6).to_string(), "1.5");
        assert_eq!(q(7, 0).to_string(), "7");
        assert_eq!(q(120, 18).to_string(), "0.00000000000000012");
        assert_eq!(q(0, 18).to_string(), "0");
        assert_eq!(q(5, 40).to_string(), format!("0.{}5", "0".repeat(39)));
    }

    #[test]
    fn test_full_width_amounts() {
        let max = TokenQuantity::new(Amount(U256::MAX), 0);
        assert_eq!(max.to_string(), U256::MAX.to_string());
        let unlimited = TokenQuantity::new(Amount::from_u128(u128::MAX), 6);
        assert_eq!(unlimited.to_string(), "340282366920938463463374607431768.211455");
        assert_eq!(unlimited.to_fixed(2), "340282366920938463463374607431768.21");
    }

    #[test]
    fn test_to_fixed_rounds_half_even() {
        assert_eq!(q(1_500_000, 6).to_fixed(6), "1.500000");
        assert_eq!(q(7, 0).to_fixed(2), "7.00");
        assert_eq!(q(125, 3).to_fixed(2), "0.12");
        assert_eq!(q(135, 3).to_fixed(2), "0.14");
        assert_eq!(q(3, 0).to_fixed(0), "3");
        assert_eq!(TokenQuantity::new(Amount(U256::MAX), 90).to_fixed(6), "0.000000");
    }

    #[test]
    fn test_checked_add_across_precisions() {
        let sum = q(1_500_000, 6).checked_add(q(250_000_000_000_000_000, 18)).unwrap();
        assert_eq!(sum.decimals(), 18);
        assert_eq!(sum.to_string(), "1.75");
        assert_eq!(TokenQuantity::default().checked_add(q(3, 2)).unwrap(), q(3, 2));
        let max = TokenQuantity::new(Amount(U256::MAX), 0);
        assert!(max.checked_add(q(1, 0)).is_none());
        assert!(max.checked_add(q(0, 1)).is_none());
    }

    #[test]
    fn test_serializes_as_string() {
        assert_eq!(serde_json::to_string(&q(1_500_000, 6)).unwrap(), "\"1.5\"");
    }
}
