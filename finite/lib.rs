/*!
This crate provides the `Finite` type, which is used to indicate that an `f64` is not infinite and not `NaN`. The csv loader uses it to reject non finite numbers before they can reach a table, so every `Real` cell downstream can be compared and bucketized without checking again.

# Example

```
use arbor_finite::Finite;

let n = Finite::new(1.0).unwrap();
assert!(Finite::new(n.get() / 0.0).is_err());
```
*/

use std::cmp::Ordering;
use thiserror::Error;

/// An `f64` that is known to be neither infinite nor NaN. It is similar in spirit to the standard library's NonZero{U8, I8, etc.} types.
#[derive(Clone, Copy, Debug)]
pub struct Finite(f64);

/// An error type indicating that the number is not finite.
#[derive(Debug, Error)]
#[error("not finite")]
pub struct NotFiniteError;

impl Finite {
	pub fn new(value: f64) -> Result<Self, NotFiniteError> {
		if value.is_finite() {
			Ok(Self(value))
		} else {
			Err(NotFiniteError)
		}
	}

	pub fn get(self) -> f64 {
		self.0
	}
}

impl std::fmt::Display for Finite {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl PartialEq for Finite {
	fn eq(&self, other: &Self) -> bool {
		self.0.eq(&other.0)
	}
}

impl Eq for Finite {}

impl PartialOrd for Finite {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Finite {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.partial_cmp(&other.0).unwrap()
	}
}

/// Use this trait to conveniently convert an `f64` to its `Finite` counterpart.
pub trait ToFinite {
	/// If the value is finite, return `Ok(Finite(self))`, otherwise return an error.
	fn to_finite(self) -> Result<Finite, NotFiniteError>;
}

impl ToFinite for f64 {
	fn to_finite(self) -> Result<Finite, NotFiniteError> {
		Finite::new(self)
	}
}

#[test]
fn test_finite() {
	assert_eq!(Finite::new(1.5).unwrap().get(), 1.5);
	assert!(Finite::new(f64::NAN).is_err());
	assert!(Finite::new(f64::INFINITY).is_err());
	assert!(Finite::new(f64::NEG_INFINITY).is_err());
}

#[test]
fn test_finite_order() {
	assert!(Finite::new(1.0).unwrap() < Finite::new(2.0).unwrap());
	assert_eq!(Finite::new(1.0).unwrap(), Finite::new(1.0).unwrap());
}
