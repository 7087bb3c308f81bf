//! Fixed-width path step encoding
//!
//! Every tree level occupies [`STEPLEN`] characters of base-36 digits, so
//! lexicographic ordering of paths equals depth-first tree ordering and
//! ancestry reduces to a prefix test.

use crate::error::{Result, TreeError};

/// Digits used for one step, in sort order
pub const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Characters per tree level
pub const STEPLEN: usize = 4;

/// Path encoder/decoder for a fixed alphabet and step length
///
/// # Examples
///
/// ```
/// use pagetree_tree::PathCodec;
///
/// let codec = PathCodec::default();
/// assert_eq!(codec.encode(1).unwrap(), "0001");
/// assert_eq!(codec.encode(36).unwrap(), "0010");
/// assert_eq!(codec.child_path("0001", 2).unwrap(), "00010002");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathCodec {
	alphabet: &'static str,
	steplen: usize,
}

impl Default for PathCodec {
	fn default() -> Self {
		Self {
			alphabet: ALPHABET,
			steplen: STEPLEN,
		}
	}
}

impl PathCodec {
	/// Characters per level
	pub fn steplen(&self) -> usize {
		self.steplen
	}

	fn radix(&self) -> u32 {
		self.alphabet.len() as u32
	}

	/// Largest step value that fits in one level
	pub fn max_step(&self) -> u32 {
		self.radix().pow(self.steplen as u32) - 1
	}

	/// Encode a step number as a zero-padded fixed-width segment
	pub fn encode(&self, mut value: u32) -> Result<String> {
		if value > self.max_step() {
			return Err(TreeError::PathOverflow {
				path: value.to_string(),
				max: self.max_step(),
			});
		}
		let digits = self.alphabet.as_bytes();
		let mut out = vec![digits[0]; self.steplen];
		for slot in out.iter_mut().rev() {
			*slot = digits[(value % self.radix()) as usize];
			value /= self.radix();
		}
		Ok(String::from_utf8_lossy(&out).into_owned())
	}

	/// Decode one segment back into its step number
	pub fn decode(&self, step: &str) -> Result<u32> {
		if step.len() != self.steplen {
			return Err(TreeError::Corrupted(format!(
				"step {step:?} is not {} characters long",
				self.steplen
			)));
		}
		step.chars().try_fold(0u32, |acc, ch| {
			let digit = self
				.alphabet
				.find(ch)
				.ok_or_else(|| TreeError::Corrupted(format!("invalid path character {ch:?}")))?;
			Ok(acc * self.radix() + digit as u32)
		})
	}

	/// Depth encoded by a path
	pub fn depth_of(&self, path: &str) -> u32 {
		(path.len() / self.steplen) as u32
	}

	/// Path of the parent, empty for roots
	pub fn parent_path<'a>(&self, path: &'a str) -> &'a str {
		&path[..path.len().saturating_sub(self.steplen)]
	}

	/// Last segment of a path
	pub fn last_step<'a>(&self, path: &'a str) -> &'a str {
		&path[path.len().saturating_sub(self.steplen)..]
	}

	/// Path of the `n`-th child slot under `parent`
	pub fn child_path(&self, parent: &str, n: u32) -> Result<String> {
		Ok(format!("{parent}{}", self.encode(n)?))
	}

	/// Path of the slot right after `path` on the same level
	pub fn next_sibling(&self, path: &str) -> Result<String> {
		let step = self.decode(self.last_step(path))?;
		if step >= self.max_step() {
			return Err(TreeError::PathOverflow {
				path: path.to_string(),
				max: self.max_step(),
			});
		}
		self.child_path(self.parent_path(path), step + 1)
	}

	/// Path of the slot right before `path` on the same level
	pub fn prev_sibling(&self, path: &str) -> Result<String> {
		let step = self.decode(self.last_step(path))?;
		if step == 0 {
			return Err(TreeError::Corrupted(format!(
				"no slot before {path:?}"
			)));
		}
		self.child_path(self.parent_path(path), step - 1)
	}

	/// Whether `candidate` lies strictly below `ancestor`
	pub fn is_descendant(&self, ancestor: &str, candidate: &str) -> bool {
		candidate.len() > ancestor.len() && candidate.starts_with(ancestor)
	}
}
