//! Slug generation and copy suffixes

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

static COPY_SLUG_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^.*-copy(?:-(\d+))?$").unwrap());

/// URL-safe slug derived from a title
pub fn slugify(title: &str) -> String {
	slug::slugify(title)
}

/// Reject slugs that cannot be a single path segment
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
	if slug.is_empty() || slug.contains('/') || slug.chars().any(char::is_whitespace) {
		return Err(ValidationError::InvalidSlug(slug.to_string()));
	}
	Ok(())
}

/// Normalize an overwrite URL: no surrounding slashes, not empty
pub fn normalize_overwrite_url(path: &str) -> Result<String, ValidationError> {
	let trimmed = path.trim().trim_matches('/');
	if trimmed.is_empty() || trimmed.split('/').any(str::is_empty) {
		return Err(ValidationError::InvalidSlug(path.to_string()));
	}
	Ok(trimmed.to_string())
}

/// Next candidate for a slug that is already taken
///
/// ```
/// use pagetree_cms::slugs::next_copy_slug;
///
/// assert_eq!(next_copy_slug("about"), "about-copy");
/// assert_eq!(next_copy_slug("about-copy"), "about-copy-2");
/// assert_eq!(next_copy_slug("about-copy-2"), "about-copy-3");
/// ```
pub fn next_copy_slug(slug: &str) -> String {
	let Some(captures) = COPY_SLUG_REGEX.captures(slug) else {
		return format!("{slug}-copy");
	};
	match captures.get(1).and_then(|n| n.as_str().parse::<u64>().ok()) {
		Some(n) => {
			let stem = &slug[..slug.len() - captures[1].len() - 1];
			format!("{stem}-{}", n + 1)
		}
		None => format!("{slug}-2"),
	}
}

/// Join a parent path and a slug; an empty base yields the slug alone
pub fn join_path(base: Option<&str>, slug: &str) -> String {
	match base {
		Some(base) if !base.is_empty() => format!("{base}/{slug}"),
		_ => slug.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("about", "about-copy")]
	#[case("about-copy", "about-copy-2")]
	#[case("about-copy-9", "about-copy-10")]
	#[case("copy", "copy-copy")]
	#[case("my-copy-cat", "my-copy-cat-copy")]
	fn test_next_copy_slug(#[case] slug: &str, #[case] expected: &str) {
		assert_eq!(next_copy_slug(slug), expected);
	}

	#[rstest]
	#[case("Hello World", "hello-world")]
	#[case("  Über uns!  ", "uber-uns")]
	fn test_slugify(#[case] title: &str, #[case] expected: &str) {
		assert_eq!(slugify(title), expected);
	}

	#[rstest]
	#[case("")]
	#[case("a/b")]
	#[case("a b")]
	fn test_invalid_slugs(#[case] slug: &str) {
		assert!(validate_slug(slug).is_err());
	}

	#[rstest]
	fn test_overwrite_url_normalization() {
		assert_eq!(normalize_overwrite_url("/news/latest/").unwrap(), "news/latest");
		assert!(normalize_overwrite_url("//").is_err());
		assert!(normalize_overwrite_url("a//b").is_err());
	}

	#[rstest]
	fn test_join_path() {
		assert_eq!(join_path(Some("news"), "2024"), "news/2024");
		assert_eq!(join_path(Some(""), "about"), "about");
		assert_eq!(join_path(None, "about"), "about");
	}
}
