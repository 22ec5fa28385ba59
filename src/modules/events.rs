use super::Module;
use crate::{
	error::HostError,
	host::Host,
	vnode::{event_name, Handler, Props, VElement, Value},
};
use tracing::{trace, trace_span};

/// Event listeners from `on…` properties.
///
/// Handlers are compared by identity: a different [`Handler`] for the same event replaces the listener.
/// All listeners are detached when their element is destroyed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Events;

fn handler<'a>(props: &'a Props, property: &str) -> Option<&'a Handler> {
	match props.get(property) {
		Some(Value::Handler(handler)) => Some(handler),
		_ => None,
	}
}

fn add<H: Host>(host: &mut H, element: &H::Node, property: &str, handler: &Handler) -> Result<(), HostError> {
	if let Some(event) = event_name(property) {
		trace!(event = %event, ?handler, "Adding listener.");
		host.add_listener(element, &event, handler)?;
	}
	Ok(())
}

fn remove<H: Host>(host: &mut H, element: &H::Node, property: &str, handler: &Handler) -> Result<(), HostError> {
	if let Some(event) = event_name(property) {
		trace!(event = %event, ?handler, "Removing listener.");
		host.remove_listener(element, &event, handler)?;
	}
	Ok(())
}

impl<H: Host> Module<H> for Events {
	fn name(&self) -> &'static str {
		"events"
	}

	fn create(&self, host: &mut H, element: &H::Node, new: &VElement<H::Node>) -> Result<(), HostError> {
		for (property, handler) in new.props.listeners() {
			add(host, element, property, handler)?;
		}
		Ok(())
	}

	fn update(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>, new: &VElement<H::Node>) -> Result<(), HostError> {
		let span = trace_span!("Updating listeners", tag = %new.tag);
		let _enter = span.enter();
		for (property, old_handler) in old.props.listeners() {
			if handler(&new.props, property) != Some(old_handler) {
				remove(host, element, property, old_handler)?;
			}
		}
		for (property, new_handler) in new.props.listeners() {
			if handler(&old.props, property) != Some(new_handler) {
				add(host, element, property, new_handler)?;
			}
		}
		Ok(())
	}

	fn destroy(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>) -> Result<(), HostError> {
		let span = trace_span!("Detaching listeners", tag = %old.tag);
		let _enter = span.enter();
		for (property, handler) in old.props.listeners() {
			remove(host, element, property, handler)?;
		}
		Ok(())
	}
}
