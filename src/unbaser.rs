use std::collections::HashMap;

use crate::error::{UnbaseError, UnpackError};

const ALPHANUMERIC: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const EXTENDED_ASCII: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// How digits are turned into values, fixed once per base.
#[derive(Debug)]
enum Digits {
    /// Bases 2 to 36, handed to [`usize::from_str_radix`].
    Native,
    /// Character-to-value table for the extended alphabets.
    Lookup(HashMap<char, usize>),
}

/// Functor for a given base. Will convert strings to natural numbers
#[derive(Debug)]
pub struct Unbaser {
    /// The numeric base for conversion (2-95)
    base: usize,
    digits: Digits,
}

impl Unbaser {
    /// Creates a new `Unbaser` for the given base.
    ///
    /// # Supported bases
    ///
    /// - **0**: Treated as base 36, which is what packers emit for the `[]` radix placeholder.
    ///
    /// - **2 to 36**: Uses standard alphanumeric digits with Rust's native [`usize::from_str_radix`].
    ///   Digits above 9 are case-insensitive.
    ///
    /// - **37 to 62**: Uses the first `base` characters of `0-9a-zA-Z`.
    ///
    /// - **63 to 95**: Uses the first `base` characters of the printable ASCII table
    ///   (space through tilde).
    ///
    /// # Errors
    ///
    /// Returns [`UnpackError::UnsupportedRadix`] for base 1 and anything above 95.
    pub fn new(radix: usize) -> Result<Self, UnpackError> {
        let base = if radix == 0 { 36 } else { radix };

        let digits = match base {
            2..=36 => Digits::Native,
            37..=62 => Digits::Lookup(Self::build_dict(&ALPHANUMERIC[..base])),
            63..=95 => Digits::Lookup(Self::build_dict(&EXTENDED_ASCII[..base])),
            _ => return Err(UnpackError::UnsupportedRadix(radix)),
        };

        Ok(Self { base, digits })
    }

    /// The effective base, after the `0 => 36` default.
    pub fn base(&self) -> usize {
        self.base
    }

    fn build_dict(alphabet: &str) -> HashMap<char, usize> {
        alphabet.chars().enumerate().map(|(i, c)| (c, i)).collect()
    }

    /// Converts a string representing a number in the given base into a `usize`.
    ///
    /// # Errors
    ///
    /// - [`UnbaseError::InvalidDigit`] if the input is empty or contains a
    ///   character that is not a digit of this base.
    /// - [`UnbaseError::Overflow`] if the value does not fit in a `usize`.
    pub fn unbase(&self, input: &str) -> Result<usize, UnbaseError> {
        match &self.digits {
            Digits::Native => usize::from_str_radix(input, self.base as u32).map_err(|err| {
                match err.kind() {
                    std::num::IntErrorKind::PosOverflow => UnbaseError::Overflow,
                    _ => UnbaseError::InvalidDigit,
                }
            }),
            Digits::Lookup(dict) => self.unbase_with_dict(dict, input),
        }
    }

    /// Big-endian positional decoding: `sum(digit_value × base^position)`,
    /// folded most-significant digit first so overflow is only reported for
    /// values that genuinely exceed `usize`.
    fn unbase_with_dict(
        &self,
        dict: &HashMap<char, usize>,
        input: &str,
    ) -> Result<usize, UnbaseError> {
        if input.is_empty() {
            return Err(UnbaseError::InvalidDigit);
        }

        input.chars().try_fold(0usize, |acc, ch| {
            let value = *dict.get(&ch).ok_or(UnbaseError::InvalidDigit)?;
            acc.checked_mul(self.base)
                .and_then(|shifted| shifted.checked_add(value))
                .ok_or(UnbaseError::Overflow)
        })
    }
}
