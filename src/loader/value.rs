/* src/loader/value.rs */

/// A field type that can be decoded from a raw env value.
///
/// Implemented for `bool`, `String` and the primitive integers. Declaring a
/// schema field of any other type fails to compile.
pub trait FromValue: Sized {
	/// Type name used in conversion errors.
	const KIND: &'static str;

	fn from_value(raw: &str) -> Option<Self>;
}

/// Env-style boolean: `false`, `0` and the empty string (any case) are false,
/// everything else is true.
pub fn parse_bool(raw: &str) -> bool {
	!(raw.is_empty() || raw == "0" || raw.eq_ignore_ascii_case("false"))
}

impl FromValue for bool {
	const KIND: &'static str = "bool";

	fn from_value(raw: &str) -> Option<Self> {
		Some(parse_bool(raw))
	}
}

impl FromValue for String {
	const KIND: &'static str = "string";

	fn from_value(raw: &str) -> Option<Self> {
		Some(raw.to_string())
	}
}

macro_rules! int_value {
	($($ty:ty),*) => {
		$(
			impl FromValue for $ty {
				const KIND: &'static str = stringify!($ty);

				fn from_value(raw: &str) -> Option<Self> {
					raw.parse().ok()
				}
			}
		)*
	};
}

int_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bool_tokens() {
		for raw in ["false", "FALSE", "False", "0", ""] {
			assert!(!parse_bool(raw), "{raw:?} should be false");
		}
		for raw in ["true", "1", "yes", "off", "no"] {
			assert!(parse_bool(raw), "{raw:?} should be true");
		}
	}

	#[test]
	fn integers_respect_width() {
		assert_eq!(u8::from_value("255"), Some(255));
		assert_eq!(u8::from_value("256"), None);
		assert_eq!(i64::from_value("-42"), Some(-42));
		assert_eq!(u16::from_value("8080x"), None);
	}
}
