use super::Module;
use crate::{error::HostError, host::Host, loggable, vnode::VElement};
use tracing::trace;

/// Inline styles from the `style` map.
#[derive(Debug, Clone, Copy, Default)]
pub struct Styles;

impl<H: Host> Module<H> for Styles {
	fn name(&self) -> &'static str {
		"styles"
	}

	fn create(&self, host: &mut H, element: &H::Node, new: &VElement<H::Node>) -> Result<(), HostError> {
		for (property, value) in new.props.styles().into_iter().flatten() {
			host.set_style(element, property, value)?;
		}
		Ok(())
	}

	fn update(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>, new: &VElement<H::Node>) -> Result<(), HostError> {
		let (old, new) = (old.props.styles(), new.props.styles());
		if old == new {
			return Ok(());
		}

		for (property, _) in old.into_iter().flatten() {
			if !new.map_or(false, |new| new.contains_key(property)) {
				trace!(property = %property, "Removing style.");
				host.remove_style(element, property)?;
			}
		}
		for (property, value) in new.into_iter().flatten() {
			if old.and_then(|old| old.get(property)) != Some(value) {
				trace!(property = %property, value = loggable(value), "Setting style.");
				host.set_style(element, property, value)?;
			}
		}
		Ok(())
	}
}
