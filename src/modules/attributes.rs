use super::Module;
use crate::{
	error::HostError,
	host::{Host, Namespace, XLINK_NAMESPACE},
	loggable,
	vnode::{is_attribute, VElement, Value},
};
use std::borrow::Cow;
use tracing::{trace, trace_span};

/// Attributes whose presence alone is their meaning.
///
/// For these, any truthy value sets the attribute (`true` as the empty string) and any falsy one removes it.
/// Other attributes are only removed by `false` and null, so e.g. `0` is still written as `"0"`.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
	"allowfullscreen",
	"async",
	"autofocus",
	"autoplay",
	"checked",
	"controls",
	"default",
	"defer",
	"disabled",
	"formnovalidate",
	"hidden",
	"inert",
	"ismap",
	"itemscope",
	"loop",
	"multiple",
	"muted",
	"nomodule",
	"novalidate",
	"open",
	"playsinline",
	"readonly",
	"required",
	"reversed",
	"selected",
];

#[must_use]
pub fn is_boolean_attribute(name: &str) -> bool {
	BOOLEAN_ATTRIBUTES.iter().any(|boolean| boolean.eq_ignore_ascii_case(name))
}

/// Plain attributes: every property that isn't `key`, `class`, `style` or an event handler.
///
/// In SVG content, `xlink:href` and `xlinkHref` are written as `href` in the XLink namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attributes;

fn attribute_text(name: &str, value: &Value) -> Option<String> {
	if is_boolean_attribute(name) {
		match value {
			Value::Bool(true) => Some(String::new()),
			value if value.is_truthy() => value.to_attribute_string(),
			_ => None,
		}
	} else {
		value.to_attribute_string()
	}
}

fn qualify(namespace: Namespace, name: &str) -> (Option<&'static str>, Cow<'_, str>) {
	if namespace == Namespace::Svg {
		let lowercase = name.to_ascii_lowercase();
		if let Some(rest) = lowercase.strip_prefix("xlink") {
			let local = rest.strip_prefix(':').unwrap_or(rest);
			if !local.is_empty() {
				return (Some(XLINK_NAMESPACE), Cow::Owned(local.to_owned()));
			}
		}
	}
	(None, Cow::Borrowed(name))
}

fn apply<H: Host>(host: &mut H, element: &H::Node, namespace: Namespace, name: &str, old: Option<&Value>, new: Option<&Value>) -> Result<(), HostError> {
	let old = old.and_then(|old| attribute_text(name, old));
	let new = new.and_then(|new| attribute_text(name, new));
	if old == new {
		return Ok(());
	}

	let (attribute_namespace, local_name) = qualify(namespace, name);
	match new {
		Some(text) => {
			trace!(name = %local_name, value = loggable(&text), "Setting attribute.");
			host.set_attribute(element, attribute_namespace, &local_name, &text)
		}
		None => {
			trace!(name = %local_name, "Removing attribute.");
			host.remove_attribute(element, attribute_namespace, &local_name)
		}
	}
}

impl<H: Host> Module<H> for Attributes {
	fn name(&self) -> &'static str {
		"attributes"
	}

	fn create(&self, host: &mut H, element: &H::Node, new: &VElement<H::Node>) -> Result<(), HostError> {
		let span = trace_span!("Creating attributes", tag = %new.tag);
		let _enter = span.enter();
		for (name, value) in new.props.attributes() {
			apply(host, element, new.namespace(), name, None, Some(value))?;
		}
		Ok(())
	}

	fn update(&self, host: &mut H, element: &H::Node, old: &VElement<H::Node>, new: &VElement<H::Node>) -> Result<(), HostError> {
		let span = trace_span!("Updating attributes", tag = %new.tag);
		let _enter = span.enter();
		let namespace = new.namespace();
		for (name, value) in old.props.attributes() {
			if !new.props.get(name).map_or(false, |new_value| is_attribute(name, new_value)) {
				apply(host, element, namespace, name, Some(value), None)?;
			}
		}
		for (name, value) in new.props.attributes() {
			let old_value = old.props.get(name).filter(|old_value| is_attribute(name, old_value));
			apply(host, element, namespace, name, old_value, Some(value))?;
		}
		Ok(())
	}
}
