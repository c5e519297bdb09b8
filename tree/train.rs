use crate::{
	categorize::{Categorizer, CategoryId, INVALID_CATEGORY},
	entropy::expected_entropy_after_split,
	examples_index::rearrange_examples_index,
	progress::{Phase, Progress},
	BranchNode, BuildOptions, LeafNode, Node, Tree,
};
use anyhow::{bail, Result};
use arbor_table::{Selection, Table};
use ndarray::{s, Array2};
use num_traits::ToPrimitive;

impl Tree {
	/// Build a decision tree predicting the categories of the `goal` column over the selected rows and columns of `table`.
	pub fn build(
		table: &Table,
		selection: &Selection,
		goal: usize,
		options: &BuildOptions,
		update_progress: &mut dyn FnMut(Progress),
	) -> Result<Tree> {
		let selection = selection.validate(table)?;
		let n_rows = selection.n_rows();
		let n_cols = selection.n_cols();
		if n_cols < 2 {
			bail!(
				"cannot build a tree over {} selected columns, at least 2 are required",
				n_cols
			);
		}
		if n_rows == 0 {
			bail!("cannot build a tree over an empty row selection");
		}
		if !selection.contains_col(goal) {
			bail!(
				"the goal column {} is outside the selected columns {}-{}",
				goal,
				selection.col_beg,
				selection.col_end
			);
		}
		for &column in options.excluded_columns.iter() {
			if !selection.contains_col(column) {
				bail!(
					"the excluded column {} is outside the selected columns {}-{}",
					column,
					selection.col_beg,
					selection.col_end
				);
			}
		}

		// Build the per column categorizers over the selected rows.
		let categorizers = (selection.col_beg..selection.col_end)
			.map(|col| Categorizer::build(table, col, &selection, options))
			.collect::<Result<Vec<_>>>()?;
		let category_counts: Vec<usize> = categorizers
			.iter()
			.map(|categorizer| categorizer.count())
			.collect();
		let goal_rel = goal - selection.col_beg;
		let max_category_count = category_counts.iter().copied().max().unwrap();
		let goal_category_count = category_counts[goal_rel];

		// Encode the selected rectangle once, column major, so the recursion never touches the table again.
		let encode_progress = Progress::new(Phase::Encoding, (n_cols * n_rows).to_u64().unwrap());
		update_progress(encode_progress.clone());
		let mut encoded = Array2::zeros((n_cols, n_rows));
		for (rel_col, categorizer) in categorizers.iter().enumerate() {
			for rel_row in 0..n_rows {
				let cell = table.cell(selection.row_beg + rel_row, selection.col_beg + rel_col);
				let id = categorizer.to_category(cell);
				debug_assert_ne!(id, INVALID_CATEGORY);
				encoded[[rel_col, rel_row]] = id;
			}
			encode_progress.inc(n_rows.to_u64().unwrap());
		}

		let grow_progress = Progress::new(Phase::Growing, n_rows.to_u64().unwrap());
		update_progress(grow_progress.clone());

		let mut used_columns = vec![false; n_cols];
		used_columns[goal_rel] = true;
		for &column in options.excluded_columns.iter() {
			used_columns[column - selection.col_beg] = true;
		}

		let mut context = TreeBuildContext {
			encoded,
			category_counts,
			goal: goal_rel,
			threshold: options.threshold,
			header_live: vec![0; max_category_count],
			header_scratch: vec![0; max_category_count],
			samples: Array2::zeros((max_category_count, goal_category_count)),
			used_columns,
			row_index: (0..n_rows).collect(),
			scatter: vec![0; n_rows],
			col_beg: selection.col_beg,
			progress: grow_progress,
		};
		let root = context.grow(0, n_rows);

		Ok(Tree {
			root,
			categorizers,
			columns: selection.col_beg..selection.col_end,
			goal,
			column_names: table.column_names().to_vec(),
		})
	}
}

/// The scratch state for one build: the encoded category matrix, the row index permutation the recursion partitions in place, the path's used column flags, and the histogram buffers the entropy kernel reuses at every node. Everything is allocated once, before the recursion starts.
struct TreeBuildContext {
	/// The category matrix, column major: `encoded[[col, row]]` with both indexes relative to the selection.
	encoded: Array2<CategoryId>,
	category_counts: Vec<usize>,
	goal: usize,
	threshold: usize,
	header_live: Vec<usize>,
	header_scratch: Vec<usize>,
	samples: Array2<usize>,
	used_columns: Vec<bool>,
	row_index: Vec<usize>,
	scatter: Vec<usize>,
	col_beg: usize,
	progress: Progress,
}

impl TreeBuildContext {
	/// Grow the node whose sample set is `row_index[start..end]`. The range must not be empty.
	fn grow(&mut self, start: usize, end: usize) -> Node {
		let n_examples = end - start;
		if n_examples <= self.threshold || self.is_pure(start, end) {
			return self.leaf(start, end, n_examples);
		}

		// Pick the attribute whose split minimizes the expected entropy, with ties broken toward the lowest column index. The buffer swap happens only on a strictly better candidate, so `header_live` ends up holding the winner's per category histogram.
		let mut best_column = None;
		let mut best_entropy = f64::INFINITY;
		for column in 0..self.used_columns.len() {
			if self.used_columns[column] {
				continue;
			}
			let attribute_count = self.category_counts[column];
			let goal_count = self.category_counts[self.goal];
			let entropy = expected_entropy_after_split(
				&self.encoded,
				column,
				self.goal,
				&self.row_index[start..end],
				&mut self.header_scratch[..attribute_count],
				self.samples.slice_mut(s![..attribute_count, ..goal_count]),
			);
			if entropy < best_entropy {
				std::mem::swap(&mut self.header_live, &mut self.header_scratch);
				best_entropy = entropy;
				best_column = Some(column);
			}
		}
		let best_column = match best_column {
			Some(best_column) => best_column,
			// Every attribute is already consumed on this path.
			None => return self.leaf(start, end, n_examples),
		};

		// The exclusive prefix sum of the winner's histogram gives each bucket its range.
		let category_count = self.category_counts[best_column];
		let mut offsets = vec![start; category_count + 1];
		for i in 0..category_count {
			offsets[i + 1] = offsets[i] + self.header_live[i];
		}
		rearrange_examples_index(
			&self.encoded,
			best_column,
			&offsets,
			&mut self.row_index,
			&mut self.scatter,
		);

		self.used_columns[best_column] = true;
		let mut children = Vec::with_capacity(category_count);
		for i in 0..category_count {
			let (bucket_start, bucket_end) = (offsets[i], offsets[i + 1]);
			let size = bucket_end - bucket_start;
			let child = if size == 0 {
				// An empty bucket has no samples of its own, so its class is the majority over the whole parent range.
				self.leaf(start, end, 0)
			} else if size <= self.threshold {
				self.leaf(bucket_start, bucket_end, size)
			} else {
				self.grow(bucket_start, bucket_end)
			};
			children.push(child);
		}
		self.used_columns[best_column] = false;

		Node::Branch(BranchNode {
			column: self.col_beg + best_column,
			children,
			n_examples,
		})
	}

	/// Whether every row in `start..end` has the same goal category.
	fn is_pure(&self, start: usize, end: usize) -> bool {
		let mut rows = self.row_index[start..end].iter();
		let first = match rows.next() {
			Some(&row) => self.encoded[[self.goal, row]],
			None => return true,
		};
		rows.all(|&row| self.encoded[[self.goal, row]] == first)
	}

	/// Emit a leaf whose class is the majority goal category over `row_index[start..end]`, with ties broken toward the category that reaches the running maximum first.
	fn leaf(&mut self, start: usize, end: usize, n_examples: usize) -> Node {
		let goal_count = self.category_counts[self.goal];
		let histogram = &mut self.header_scratch[..goal_count];
		histogram.fill(0);
		let mut class = INVALID_CATEGORY;
		let mut best_count = 0;
		for &row in self.row_index[start..end].iter() {
			let category = self.encoded[[self.goal, row]];
			histogram[category] += 1;
			if histogram[category] > best_count {
				best_count = histogram[category];
				class = category;
			}
		}
		self.progress.inc(n_examples.to_u64().unwrap());
		Node::Leaf(LeafNode { class, n_examples })
	}
}
