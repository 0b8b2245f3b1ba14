/* src/loader/schema.rs */

use super::{FromValue, Items, LoadError};

type Setter<T> = Box<dyn Fn(&mut T, &str) -> Result<(), &'static str>>;

struct Field<T> {
	key: String,
	required: bool,
	set: Setter<T>,
}

/// Explicit mapping from env keys to typed setters on `T`.
///
/// ```
/// use livehold::loader::Schema;
///
/// #[derive(Default)]
/// struct Db {
/// 	host: String,
/// 	port: u16,
/// 	debug: bool,
/// }
///
/// let schema = Schema::<Db>::new()
/// 	.required("DB_HOST", |c, v| c.host = v)
/// 	.required("DB_PORT", |c, v| c.port = v)
/// 	.optional("DB_DEBUG", |c, v| c.debug = v);
/// # let _ = schema;
/// ```
pub struct Schema<T> {
	fields: Vec<Field<T>>,
}

impl<T> Schema<T> {
	pub fn new() -> Self {
		Self { fields: Vec::new() }
	}

	/// Declares a key that must be present with a non-blank value.
	pub fn required<V, F>(self, key: impl Into<String>, set: F) -> Self
	where
		V: FromValue,
		F: Fn(&mut T, V) + 'static,
	{
		self.field(key.into(), true, set)
	}

	/// Declares a key that is decoded when present and non-blank, skipped otherwise.
	pub fn optional<V, F>(self, key: impl Into<String>, set: F) -> Self
	where
		V: FromValue,
		F: Fn(&mut T, V) + 'static,
	{
		self.field(key.into(), false, set)
	}

	fn field<V, F>(mut self, key: String, required: bool, set: F) -> Self
	where
		V: FromValue,
		F: Fn(&mut T, V) + 'static,
	{
		self.fields.push(Field {
			key,
			required,
			set: Box::new(move |target, raw| {
				let value = V::from_value(raw).ok_or(V::KIND)?;
				set(target, value);
				Ok(())
			}),
		});
		self
	}

	/// Declared keys in declaration order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fields.iter().map(|f| f.key.as_str())
	}

	/// Decodes `items` into `target`, field by field in declaration order.
	///
	/// Values are trimmed before conversion. Stops at the first missing
	/// required key or failed conversion; fields decoded before that point
	/// have already been written.
	pub fn decode(&self, items: &Items, target: &mut T) -> Result<(), LoadError> {
		for field in &self.fields {
			let raw = items
				.get(&field.key)
				.map(|v| v.trim())
				.filter(|v| !v.is_empty());

			let Some(raw) = raw else {
				if field.required {
					return Err(LoadError::MissingField {
						key: field.key.clone(),
					});
				}
				continue;
			};

			(field.set)(target, raw).map_err(|expected| LoadError::InvalidValue {
				key: field.key.clone(),
				value: raw.to_string(),
				expected,
			})?;
		}
		Ok(())
	}
}

impl<T> Default for Schema<T> {
	fn default() -> Self {
		Self::new()
	}
}

/// A struct that declares its env schema once and can be populated from it.
pub trait Scan: Default {
	fn schema() -> Schema<Self>;

	fn scan(items: &Items) -> Result<Self, LoadError> {
		let mut target = Self::default();
		Self::schema().decode(items, &mut target)?;
		Ok(target)
	}
}
