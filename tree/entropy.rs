use crate::categorize::CategoryId;
use ndarray::{Array2, ArrayViewMut2};
use num_traits::ToPrimitive;

/**
Compute the expected entropy of the goal column after splitting the rows in `rows` by their category on `attribute`:

```text
H(G | A) = - sum_v (n_v / N) * sum_g (n_vg / n_v) * log2(n_vg / n_v)
```

with the convention that `0 * log2(0) = 0`. `header` must hold one counter per category of `attribute` and is left holding the per category histogram of `attribute`, which the builder reuses to partition the winning attribute's rows. `samples` is the reused category-by-goal count matrix, sliced to this attribute's dimensions.
*/
pub(crate) fn expected_entropy_after_split(
	encoded: &Array2<CategoryId>,
	attribute: usize,
	goal: usize,
	rows: &[usize],
	header: &mut [usize],
	mut samples: ArrayViewMut2<usize>,
) -> f64 {
	header.fill(0);
	samples.fill(0);
	for &row in rows {
		let category = encoded[[attribute, row]];
		let goal_category = encoded[[goal, row]];
		samples[[category, goal_category]] += 1;
		header[category] += 1;
	}
	let n = rows.len().to_f64().unwrap();
	let mut mean_entropy = 0.0;
	for (category, &n_v) in header.iter().enumerate() {
		// Accumulate entropy scaled by the category's sample count; the weighted average needs that product anyway.
		let mut entropy = 0.0;
		for &n_vg in samples.row(category) {
			if n_vg != 0 {
				entropy += n_vg.to_f64().unwrap()
					* (n_vg.to_f64().unwrap() / n_v.to_f64().unwrap()).log2();
			}
		}
		mean_entropy += entropy / n;
	}
	-mean_entropy
}
