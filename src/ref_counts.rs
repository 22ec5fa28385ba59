use core::hash::Hash;
use hashbrown::HashMap;
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

/// Values shared between several users, counted per key.
///
/// Releasing the last user doesn't drop a value right away:
/// It can still be reacquired until the next [`sweep`](`RefCounts::sweep`), which drops all unused values at once.
pub struct RefCounts<K, V, C = u16> {
	entries: HashMap<K, Shared<C, V>>,
}

struct Shared<C, V> {
	users: C,
	value: V,
}

/// A user count would have over- or underflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSaturatedError;

impl<K: Hash + Eq, V, C: CheckedAdd + CheckedSub + One + Zero> RefCounts<K, V, C> {
	pub fn new() -> Self {
		Self { entries: HashMap::new() }
	}

	/// Adds a user to the value at `key`, creating it first if there is none.
	pub fn acquire(&mut self, key: K, create: impl FnOnce() -> V) -> Result<&V, CountSaturatedError> {
		let shared = self.entries.entry(key).or_insert_with(|| Shared { users: C::zero(), value: create() });
		shared.users = shared.users.checked_add(&C::one()).ok_or(CountSaturatedError)?;
		Ok(&shared.value)
	}

	/// Removes a user from the value at `key`, which is returned for cleanup if present.
	pub fn release(&mut self, key: &K) -> Result<Option<&V>, CountSaturatedError> {
		let shared = match self.entries.get_mut(key) {
			Some(shared) => shared,
			None => return Ok(None),
		};
		shared.users = shared.users.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
		Ok(Some(&shared.value))
	}

	/// Drops every value without users and returns how many there were.
	pub fn sweep(&mut self) -> usize {
		self.entries.extract_if(|_, shared| shared.users.is_zero()).count()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn capacity(&self) -> usize {
		self.entries.capacity()
	}
}

impl<K: Hash + Eq, V, C: CheckedAdd + CheckedSub + One + Zero> Default for RefCounts<K, V, C> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn released_values_live_until_sweep() {
		let mut counts = RefCounts::<&str, u8, u16>::new();
		assert_eq!(counts.acquire("a", || 1), Ok(&1));
		assert_eq!(counts.acquire("a", || unreachable!()), Ok(&1));
		assert_eq!(counts.release(&"a"), Ok(Some(&1)));
		assert_eq!(counts.sweep(), 0);

		assert_eq!(counts.release(&"a"), Ok(Some(&1)));
		assert_eq!(counts.acquire("a", || unreachable!()), Ok(&1));
		assert_eq!(counts.release(&"a"), Ok(Some(&1)));
		assert_eq!(counts.sweep(), 1);
		assert_eq!(counts.len(), 0);
	}

	#[test]
	fn unbalanced_release_is_reported() {
		let mut counts = RefCounts::<&str, (), u16>::new();
		assert_eq!(counts.release(&"missing"), Ok(None));

		counts.acquire("a", || ()).unwrap();
		assert_eq!(counts.release(&"a"), Ok(Some(&())));
		assert_eq!(counts.release(&"a"), Err(CountSaturatedError));
	}

	#[test]
	fn saturated_count_is_reported() {
		let mut counts = RefCounts::<&str, (), u8>::new();
		for _ in 0..u8::MAX {
			counts.acquire("a", || ()).unwrap();
		}
		assert_eq!(counts.acquire("a", || ()), Err(CountSaturatedError));
	}
}
