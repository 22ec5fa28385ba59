/// Tuning for a [`Patcher`](`crate::diff::Patcher`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
	/// How deep the engine recurses into a tree before giving up with [`Error::DepthLimit`](`crate::Error::DepthLimit`).
	///
	/// Each element level counts once.
	pub depth_limit: usize,

	/// Whether each pass first checks the new tree for duplicate sibling keys.
	///
	/// Turning this off saves a walk over the tree, but duplicate keys then lead to unspecified (though memory-safe) reordering.
	pub validate_keys: bool,
}

impl Config {
	pub const DEFAULT_DEPTH_LIMIT: usize = 512;

	#[must_use]
	pub fn new() -> Self {
		Self {
			depth_limit: Self::DEFAULT_DEPTH_LIMIT,
			validate_keys: true,
		}
	}

	#[must_use]
	pub fn depth_limit(self, depth_limit: usize) -> Self {
		Self { depth_limit, ..self }
	}

	#[must_use]
	pub fn validate_keys(self, validate_keys: bool) -> Self {
		Self { validate_keys, ..self }
	}
}

impl Default for Config {
	fn default() -> Self {
		Self::new()
	}
}
