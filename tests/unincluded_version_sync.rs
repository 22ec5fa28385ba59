#![cfg(not(target_arch = "wasm32"))]

#[test]
fn readme_deps() {
	version_sync::assert_markdown_deps_updated!("README.md");
}

#[test]
fn html_root_url() {
	version_sync::assert_html_root_url_updated!("src/lib.rs");
}

#[test]
fn rust_version_badge() {
	let rust_version = include_str!("../Cargo.toml")
		.lines()
		.find_map(|line| line.strip_prefix("rust-version = \"")?.strip_suffix('"'))
		.expect("`rust-version` in Cargo.toml");
	let badge = format!("![Rust {}](https://img.shields.io/static/v1?logo=Rust&label=&message={}&color=grey)", rust_version, rust_version);
	assert!(include_str!("../README.md").contains(&badge), "README.md should show {}", badge);
}
