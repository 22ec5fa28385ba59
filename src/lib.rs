#![doc(html_root_url = "https://docs.rs/xylem-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod build;
pub mod config;
pub mod diff;
pub mod error;
pub mod host;
pub mod load;
pub mod modules;
pub mod vnode;

mod ref_counts;
mod temp_set;

pub use build::{h, text, Child};
pub use config::Config;
pub use diff::{Patcher, Prior};
pub use error::{BuildError, Error, HostError};

/// Page content only shows up in logs with the `"dangerous-logging"` feature enabled.
pub(crate) fn loggable(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"<redacted>"
	}
}
