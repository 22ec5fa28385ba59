//! The virtual tree: disposable descriptions of what the host document should look like after one render pass.

use crate::host::Namespace;
use core::{
	any::Any,
	fmt::{self, Debug, Display, Formatter},
};
use std::{collections::BTreeMap, rc::Rc};

/// Class name → whether it is on.
pub type ClassMap = BTreeMap<String, bool>;

/// CSS property name → value.
pub type StyleMap = BTreeMap<String, String>;

/// Identity of a node among its siblings, stable across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	Num(i64),
}

impl Key {
	/// Derives a key from a `key` property value.
	///
	/// Integral numbers become [`Key::Num`], other scalars their string form.
	#[must_use]
	#[allow(clippy::cast_possible_truncation)]
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Null | Value::Classes(_) | Value::Style(_) | Value::Handler(_) => None,
			Value::Bool(bool) => Some(Self::Str(bool.to_string())),
			&Value::Number(number) if number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 => Some(Self::Num(number as i64)),
			Value::Number(number) => Some(Self::Str(number.to_string())),
			Value::Str(str) => Some(Self::Str(str.clone())),
		}
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Key::Str(str) => Debug::fmt(str, f),
			Key::Num(num) => Display::fmt(num, f),
		}
	}
}

impl From<&str> for Key {
	fn from(str: &str) -> Self {
		Self::Str(str.to_owned())
	}
}
impl From<String> for Key {
	fn from(string: String) -> Self {
		Self::Str(string)
	}
}
impl From<i64> for Key {
	fn from(num: i64) -> Self {
		Self::Num(num)
	}
}
impl From<i32> for Key {
	fn from(num: i32) -> Self {
		Self::Num(num.into())
	}
}
impl From<u32> for Key {
	fn from(num: u32) -> Self {
		Self::Num(num.into())
	}
}

/// An event handler.
///
/// Handlers compare by identity: Reuse the same [`Handler`] (or a clone of it) across renders to keep a listener attached,
/// since a new one always replaces the old listener.
///
/// The argument is the host's event object, e.g. a [`web_sys::Event`] for [`WebHost`](`crate::host::web::WebHost`).
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&dyn Any)>);

impl Handler {
	pub fn new(handler: impl 'static + Fn(&dyn Any)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}

	/// Address-based identity, valid for as long as any clone of this [`Handler`] is alive.
	#[must_use]
	pub fn id(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}

impl PartialEq for Handler {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}
impl Eq for Handler {}

impl Debug for Handler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Handler({:#x})", self.id())
	}
}

/// A property value.
///
/// An absent property reads as "undefined", which behaves like [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
	Classes(ClassMap),
	Style(StyleMap),
	Handler(Handler),
}

impl Value {
	#[must_use]
	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Null => false,
			&Value::Bool(bool) => bool,
			&Value::Number(number) => number != 0.0 && !number.is_nan(),
			Value::Str(str) => !str.is_empty(),
			Value::Classes(_) | Value::Style(_) | Value::Handler(_) => true,
		}
	}

	/// The attribute text for this value, or [`None`] if it means "no attribute".
	#[must_use]
	pub fn to_attribute_string(&self) -> Option<String> {
		match self {
			Value::Null | Value::Bool(false) | Value::Classes(_) | Value::Style(_) | Value::Handler(_) => None,
			Value::Bool(true) => Some("true".to_owned()),
			Value::Number(number) => Some(number.to_string()),
			Value::Str(str) => Some(str.clone()),
		}
	}
}

impl From<bool> for Value {
	fn from(bool: bool) -> Self {
		Self::Bool(bool)
	}
}
impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}
impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}
impl From<u32> for Value {
	fn from(number: u32) -> Self {
		Self::Number(number.into())
	}
}
impl From<i64> for Value {
	#[allow(clippy::cast_precision_loss)]
	fn from(number: i64) -> Self {
		Self::Number(number as f64)
	}
}
impl From<&str> for Value {
	fn from(str: &str) -> Self {
		Self::Str(str.to_owned())
	}
}
impl From<String> for Value {
	fn from(string: String) -> Self {
		Self::Str(string)
	}
}
impl From<ClassMap> for Value {
	fn from(classes: ClassMap) -> Self {
		Self::Classes(classes)
	}
}
impl From<StyleMap> for Value {
	fn from(style: StyleMap) -> Self {
		Self::Style(style)
	}
}
impl From<Handler> for Value {
	fn from(handler: Handler) -> Self {
		Self::Handler(handler)
	}
}
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(option: Option<T>) -> Self {
		option.map_or(Self::Null, Into::into)
	}
}

/// Whether `name` is an event property (`on` followed by an uppercase letter, like `onClick`).
#[must_use]
pub fn is_event_property(name: &str) -> bool {
	name.len() > 2 && name.starts_with("on") && name.as_bytes()[2].is_ascii_uppercase()
}

/// `onClick` → `click`, `onIonChange` → `ionChange`.
#[must_use]
pub fn event_name(property: &str) -> Option<String> {
	if !is_event_property(property) {
		return None;
	}
	let rest = &property[2..];
	Some(rest[..1].to_ascii_lowercase() + &rest[1..])
}

/// `click` → `onClick`.
#[must_use]
pub fn event_property(event: &str) -> String {
	let mut chars = event.chars();
	match chars.next() {
		Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
		None => "on".to_owned(),
	}
}

/// The property bag of an element.
///
/// `key`, `class` and `style` are reserved, `on…` properties are event handlers, everything else is an attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(BTreeMap<String, Value>);

impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// A string `class` is split on whitespace into a class map with each name on.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		let name = name.into();
		let value = match (name.as_str(), value.into()) {
			("class", Value::Str(names)) => Value::Classes(names.split_whitespace().map(|class| (class.to_owned(), true)).collect()),
			(_, value) => value,
		};
		self.0.insert(name, value)
	}

	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.0.remove(name)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value))
	}

	#[must_use]
	pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	#[must_use]
	pub fn key(self, key: impl Into<Key>) -> Self {
		#[allow(clippy::cast_precision_loss)]
		let value = match key.into() {
			Key::Str(str) => Value::Str(str),
			Key::Num(num) => Value::Number(num as f64),
		};
		self.set("key", value)
	}

	#[must_use]
	pub fn class(mut self, name: impl Into<String>, on: bool) -> Self {
		self.classes_mut().insert(name.into(), on);
		self
	}

	#[must_use]
	pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
		let entry = self.0.entry("style".to_owned()).or_insert_with(|| Value::Style(StyleMap::new()));
		if !matches!(entry, Value::Style(_)) {
			*entry = Value::Style(StyleMap::new());
		}
		if let Value::Style(style) = entry {
			style.insert(property.into(), value.into());
		}
		self
	}

	#[must_use]
	pub fn on(self, event: &str, handler: Handler) -> Self {
		self.set(event_property(event), handler)
	}

	#[must_use]
	pub fn classes(&self) -> Option<&ClassMap> {
		match self.get("class") {
			Some(Value::Classes(classes)) => Some(classes),
			_ => None,
		}
	}

	pub(crate) fn classes_mut(&mut self) -> &mut ClassMap {
		let entry = self.0.entry("class".to_owned()).or_insert_with(|| Value::Classes(ClassMap::new()));
		if !matches!(entry, Value::Classes(_)) {
			*entry = Value::Classes(ClassMap::new());
		}
		match entry {
			Value::Classes(classes) => classes,
			_ => unreachable!(),
		}
	}

	#[must_use]
	pub fn styles(&self) -> Option<&StyleMap> {
		match self.get("style") {
			Some(Value::Style(style)) => Some(style),
			_ => None,
		}
	}

	/// `(property name, handler)` for each event property.
	pub fn listeners(&self) -> impl Iterator<Item = (&str, &Handler)> {
		self.iter().filter_map(|(name, value)| match value {
			Value::Handler(handler) if is_event_property(name) => Some((name, handler)),
			_ => None,
		})
	}

	/// Everything that isn't reserved or an event handler.
	pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.iter().filter(|&(name, value)| is_attribute(name, value))
	}
}

pub(crate) fn is_attribute(name: &str, value: &Value) -> bool {
	!matches!(name, "key" | "class" | "style") && !is_event_property(name) && !matches!(value, Value::Handler(_))
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut props = Self::new();
		for (name, value) in iter {
			props.insert(name, value);
		}
		props
	}
}

/// One position in a virtual tree.
///
/// A [`VNode`] owns the host node it represents once it has been materialized.
/// That handle moves on to the matching node of the next render, so this type is intentionally not [`Clone`].
#[derive(Debug)]
pub enum VNode<N> {
	Text(VText<N>),
	Element(VElement<N>),
}

#[derive(Debug)]
pub struct VText<N> {
	pub text: String,
	pub(crate) host: Option<N>,
}

#[derive(Debug)]
pub struct VElement<N> {
	pub tag: String,
	pub key: Option<Key>,
	pub props: Props,
	pub children: Vec<VNode<N>>,
	pub(crate) namespace: Namespace,
	pub(crate) host: Option<N>,
}

impl<N> VText<N> {
	#[must_use]
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into(), host: None }
	}

	#[must_use]
	pub fn host(&self) -> Option<&N> {
		self.host.as_ref()
	}
}

impl<N> VElement<N> {
	#[must_use]
	pub fn new(tag: impl Into<String>, props: Props, children: Vec<VNode<N>>) -> Self {
		Self {
			tag: tag.into(),
			key: props.get("key").and_then(Key::from_value),
			props,
			children,
			namespace: Namespace::Html,
			host: None,
		}
	}

	#[must_use]
	pub fn host(&self) -> Option<&N> {
		self.host.as_ref()
	}

	/// The namespace this element was created in. Only meaningful once mounted.
	#[must_use]
	pub fn namespace(&self) -> Namespace {
		self.namespace
	}
}

impl<N> VNode<N> {
	#[must_use]
	pub fn host(&self) -> Option<&N> {
		match self {
			VNode::Text(text) => text.host.as_ref(),
			VNode::Element(element) => element.host.as_ref(),
		}
	}

	pub(crate) fn host_mut(&mut self) -> &mut Option<N> {
		match self {
			VNode::Text(text) => &mut text.host,
			VNode::Element(element) => &mut element.host,
		}
	}

	#[must_use]
	pub fn key(&self) -> Option<&Key> {
		match self {
			VNode::Text(_) => None,
			VNode::Element(element) => element.key.as_ref(),
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&VElement<N>> {
		match self {
			VNode::Element(element) => Some(element),
			VNode::Text(_) => None,
		}
	}

	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			VNode::Text(text) => Some(&text.text),
			VNode::Element(_) => None,
		}
	}

	#[must_use]
	pub fn children(&self) -> &[VNode<N>] {
		match self {
			VNode::Text(_) => &[],
			VNode::Element(element) => &element.children,
		}
	}

	/// Whether `other` can take over this node's host node in place.
	///
	/// Text matches text. Elements match if tag and key (or lack thereof) are equal.
	#[must_use]
	pub fn is_same_as<M>(&self, other: &VNode<M>) -> bool {
		match (self, other) {
			(VNode::Text(_), VNode::Text(_)) => true,
			(VNode::Element(a), VNode::Element(b)) => a.tag == b.tag && a.key == b.key,
			_ => false,
		}
	}
}
