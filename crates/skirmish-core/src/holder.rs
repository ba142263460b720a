//! Value holders passed through attribute dispatch.
//!
//! A holder is a single mutable cell handed to a dispatch call as `&mut` so
//! that any number of attributes can observe and rewrite the in-flight value
//! (a damage multiplier, an effect chance, a cancellation flag) before the
//! caller reads it back. Holders are created by the caller, lent to exactly
//! one dispatch call and never stored.
//!
//! # Example
//!
//! ```
//! use skirmish_core::holder::{BoolHolder, NumberHolder};
//!
//! let mut chance = NumberHolder::new(20.0);
//! chance.scale(2.0);
//! chance.clamp(0.0, 100.0);
//! assert_eq!(chance.value, 40.0);
//!
//! let mut cancelled = BoolHolder::default();
//! cancelled.set(true);
//! assert!(cancelled.value);
//! ```

use std::fmt;

/// A mutable boolean cell, typically a veto or cancellation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoolHolder {
    /// The current value.
    pub value: bool,
}

impl BoolHolder {
    /// Creates a holder with the given starting value.
    #[must_use]
    pub const fn new(value: bool) -> Self {
        Self { value }
    }

    /// Overwrites the held value.
    pub fn set(&mut self, value: bool) {
        self.value = value;
    }

    /// Sets the value to `true` if `value` is `true`; never clears it.
    pub fn raise(&mut self, value: bool) {
        self.value |= value;
    }
}

impl fmt::Display for BoolHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A mutable numeric cell, typically a multiplier, chance or amount.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberHolder {
    /// The current value.
    pub value: f64,
}

impl NumberHolder {
    /// Creates a holder with the given starting value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value }
    }

    /// Overwrites the held value.
    pub fn set(&mut self, value: f64) {
        self.value = value;
    }

    /// Multiplies the held value by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.value *= factor;
    }

    /// Clamps the held value into `[min, max]`.
    pub fn clamp(&mut self, min: f64, max: f64) {
        self.value = self.value.clamp(min, max);
    }
}

impl fmt::Display for NumberHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_never_clears() {
        let mut flag = BoolHolder::new(true);
        flag.raise(false);
        assert!(flag.value);

        let mut flag = BoolHolder::default();
        flag.raise(true);
        assert!(flag.value);
    }

    #[test]
    fn composed_scaling_is_multiplicative() {
        let mut value = NumberHolder::new(10.0);
        value.scale(2.0);
        value.scale(1.5);
        assert!((value.value - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_bounds_both_sides() {
        let mut high = NumberHolder::new(250.0);
        high.clamp(0.0, 100.0);
        assert_eq!(high.value, 100.0);

        let mut low = NumberHolder::new(-3.0);
        low.clamp(0.0, 100.0);
        assert_eq!(low.value, 0.0);
    }
}
