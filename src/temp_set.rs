use crate::vnode::Key;
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashSet;

/// Finds repeated sibling [`Key`]s, reusing one allocation across all checks.
#[derive(Default)]
pub struct DuplicateKeys(HashSet<&'static Key>);
impl DuplicateKeys {
	pub fn new() -> Self {
		Self(HashSet::new())
	}

	/// Returns the first key in `keys` that was already seen earlier in it.
	pub fn first<'a>(&mut self, keys: impl IntoIterator<Item = &'a Key>) -> Option<&'a Key> {
		self.0.clear();
		let seen: &mut HashSet<&'a Key> = unsafe {
			//SAFETY: The set was just emptied, so it only ever holds references from this call.
			// Stale ones left behind by an early return or an unwind are cleared without being read, at the start of the next call.
			&mut *(&mut self.0 as *mut HashSet<&'static Key>).cast()
		};
		keys.into_iter().find(|&key| !seen.insert(key))
	}

	/// The scratch set's capacity, which persists between checks.
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

/// Leftover entries may dangle, so only the capacity is shown.
impl Debug for DuplicateKeys {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("DuplicateKeys").field("capacity", &self.capacity()).finish_non_exhaustive()
	}
}
