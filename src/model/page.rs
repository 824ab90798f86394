//! Paging requests and results for declaration search.

// self
use crate::_prelude::*;

/// Zero-based page request for search operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
	/// Zero-based page index.
	pub number: usize,
	/// Requested page size, clamped to `1..=Page::MAX_SIZE`.
	pub size: usize,
}
impl Page {
	/// Default number of items per page.
	pub const DEFAULT_SIZE: usize = 20;
	/// Upper bound applied to the page size.
	pub const MAX_SIZE: usize = 500;

	/// Creates a page request, clamping the size into the supported range.
	pub fn new(number: usize, size: usize) -> Self {
		Self { number, size: size.clamp(1, Self::MAX_SIZE) }
	}

	/// Slices an already ordered collection into a page.
	pub fn apply<T>(self, items: Vec<T>) -> PageResult<T> {
		let total = items.len();
		let size = self.size.clamp(1, Self::MAX_SIZE);
		let content =
			items.into_iter().skip(self.number.saturating_mul(size)).take(size).collect();

		PageResult { content, number: self.number, size, total }
	}
}
impl Default for Page {
	fn default() -> Self {
		Self { number: 0, size: Self::DEFAULT_SIZE }
	}
}

/// One page of results plus the total match count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
	/// Items on this page.
	pub content: Vec<T>,
	/// Zero-based page index.
	pub number: usize,
	/// Effective page size.
	pub size: usize,
	/// Total number of matching items across all pages.
	pub total: usize,
}
impl<T> PageResult<T> {
	/// Returns an empty result for the requested page.
	pub fn empty(page: Page) -> Self {
		Self { content: Vec::new(), number: page.number, size: page.size, total: 0 }
	}

	/// Number of pages needed to hold every match.
	pub fn total_pages(&self) -> usize {
		self.total.div_ceil(self.size.max(1))
	}
}
