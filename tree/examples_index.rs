use crate::categorize::CategoryId;
use ndarray::Array2;

/**
Rearrange `row_index` between `offsets[0]` and `offsets[k]` so that the rows whose category on `attribute` is `i` occupy exactly `row_index[offsets[i]..offsets[i + 1]]`. The scatter is stable: rows keep their relative order within a bucket.

`offsets` must be the exclusive prefix sum of the attribute's category histogram, shifted by the range start. `scatter` is a reused buffer at least as long as `row_index`.
*/
pub(crate) fn rearrange_examples_index(
	encoded: &Array2<CategoryId>,
	attribute: usize,
	offsets: &[usize],
	row_index: &mut [usize],
	scatter: &mut [usize],
) {
	let start = offsets[0];
	let end = offsets[offsets.len() - 1];
	scatter[start..end].copy_from_slice(&row_index[start..end]);
	let mut cursors = offsets[..offsets.len() - 1].to_vec();
	for &row in scatter[start..end].iter() {
		let bucket = encoded[[attribute, row]];
		row_index[cursors[bucket]] = row;
		cursors[bucket] += 1;
	}
	debug_assert_eq!(&cursors[..], &offsets[1..]);
}
