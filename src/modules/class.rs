use super::Module;
use crate::{
	error::HostError,
	host::Host,
	vnode::{ClassMap, VElement},
};
use tracing::trace;

/// Toggles the classes named in the `class` map.
///
/// Classes that neither the old nor the new map mention are left alone, so classes added by other code survive updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classes;

fn is_on(classes: Option<&ClassMap>, class: &str) -> bool {
	classes.and_then(|classes| classes.get(class)).copied().unwrap_or(false)
}

impl<H: Host> Module<H> for Classes {
	fn name(&self) -> &'static str {
		"classes"
	}

	fn create(&self, host: &mut H, element: &H::Node, new: &VElement<H::Node>) -> Result<(), HostError> {
		for (class, _) in new.props.classes().into_iter().flatten().filter(|&(_, &on)| on) {
			host.add_class(element, class)?;
		}
		Ok(())
	}

	fn update(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>, new: &VElement<H::Node>) -> Result<(), HostError> {
		let (old, new) = (old.props.classes(), new.props.classes());
		if old == new {
			return Ok(());
		}

		for (class, _) in old.into_iter().flatten().filter(|&(_, &on)| on) {
			if !is_on(new, class) {
				trace!(class = %class, "Removing class.");
				host.remove_class(element, class)?;
			}
		}
		for (class, _) in new.into_iter().flatten().filter(|&(_, &on)| on) {
			if !is_on(old, class) {
				trace!(class = %class, "Adding class.");
				host.add_class(element, class)?;
			}
		}
		Ok(())
	}
}
