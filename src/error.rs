use crate::vnode::Key;
use thiserror::Error;

/// Everything a render pass can fail with.
///
/// Any of these means the pass failed for the affected subtree.
/// Host nodes of siblings that weren't reached yet are left as they were.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Build(#[from] BuildError),

	#[error(transparent)]
	Host(#[from] HostError),

	#[error("Depth limit of {limit} reached")]
	DepthLimit { limit: usize },

	#[error("The previous tree was never mounted")]
	Unmounted,
}

/// A virtual tree that can't be reconciled as written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
	#[error("Empty selector")]
	EmptySelector,

	#[error("Children of <{selector}> are nested more than one level deep")]
	NestedChildren { selector: String },

	#[error("`class` of <{selector}> is neither a class map nor a string")]
	InvalidClass { selector: String },

	#[error("Duplicate key {key} among the children of <{parent}>")]
	DuplicateKey { parent: String, key: Key },
}

/// A host document operation that didn't go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Host operation `{operation}` failed: {message}")]
pub struct HostError {
	pub operation: &'static str,
	pub message: String,
}

impl HostError {
	#[must_use]
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self {
			operation,
			message: message.into(),
		}
	}
}
