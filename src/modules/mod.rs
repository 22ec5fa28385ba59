//! Property modules: each one owns a single concern of an element's [`Props`](`crate::vnode::Props`).
//!
//! The engine calls every registered module at each phase, in registration order for [`Module::create`] and [`Module::update`]
//! and in reverse order for [`Module::destroy`] and [`Module::remove`]. Modules never call each other.

use crate::{error::HostError, host::Host, vnode::VElement};

mod attributes;
mod class;
mod events;
mod style;

pub use attributes::{is_boolean_attribute, Attributes, BOOLEAN_ATTRIBUTES};
pub use class::Classes;
pub use events::Events;
pub use style::Styles;

/// Lifecycle hooks for one property concern.
///
/// `element` is always the host node of the [`VElement`]s passed alongside it.
#[allow(unused_variables)]
pub trait Module<H: Host> {
	/// For logs and [`Debug`](`core::fmt::Debug`) output.
	fn name(&self) -> &'static str;

	/// `element` was just created and is not inserted yet.
	fn create(&self, host: &mut H, element: &H::Node, new: &VElement<H::Node>) -> Result<(), HostError> {
		Ok(())
	}

	/// `old` and `new` share `element`. Only apply what changed.
	fn update(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>, new: &VElement<H::Node>) -> Result<(), HostError> {
		Ok(())
	}

	/// `element` is the root of a subtree that is about to be detached.
	fn remove(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>) -> Result<(), HostError> {
		Ok(())
	}

	/// `element` is about to be discarded along with its subtree. Called for every element in it, children first.
	fn destroy(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>) -> Result<(), HostError> {
		Ok(())
	}
}

/// [`Attributes`], [`Classes`], [`Styles`] and [`Events`], in that order.
#[must_use]
pub fn default_modules<H: Host>() -> Vec<Box<dyn Module<H>>> {
	vec![Box::new(Attributes), Box::new(Classes), Box::new(Styles), Box::new(Events)]
}
