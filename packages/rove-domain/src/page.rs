/// Returns the 1-based `page` of `items`. Pages past the end yield an empty
/// slice rather than an error, so callers can probe for more results freely.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
	if page == 0 || page_size == 0 {
		return &[];
	}

	let start = (page - 1).saturating_mul(page_size);

	if start >= items.len() {
		return &[];
	}

	let end = (start + page_size).min(items.len());

	&items[start..end]
}
