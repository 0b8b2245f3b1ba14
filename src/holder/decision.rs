/* src/holder/decision.rs */

/// Outcome of comparing a resource's stored config with a freshly fetched one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
	/// Nothing relevant changed.
	#[default]
	NoNeed,
	/// The current object can absorb the change in place.
	NeedReset,
	/// The object identity must change; a new one is constructed from the new config.
	NeedReplace,
}
