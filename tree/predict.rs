use crate::{Categorizer, CategoryId, Node, Tree, INVALID_CATEGORY};
use anyhow::{bail, Result};
use arbor_table::{Cell, Table};

impl Tree {
	/// Walk the tree against a row of cells aligned by index to the training table's columns. Returns `None` when the row cannot be classified: a cell that matches no category of its column, or a category with no child.
	pub fn classify(&self, row: &[Cell]) -> Option<CategoryId> {
		let mut node = &self.root;
		loop {
			match node {
				Node::Branch(branch) => {
					let cell = row.get(branch.column)?;
					let category = self.categorizer(branch.column).to_category(cell);
					if category == INVALID_CATEGORY {
						return None;
					}
					node = branch.children.get(category)?;
				}
				Node::Leaf(leaf) => return Some(leaf.class),
			}
		}
	}

	/// Classify every row of a samples table. Sample columns whose tree categorizer is interval typed are promoted to intervals up front; a non promotable cell aborts the whole batch, while rows that merely fail to classify yield `None` and the batch continues.
	pub fn classify_table(&self, samples: &mut Table) -> Result<Vec<Option<CategoryId>>> {
		if samples.rows() == 0 {
			return Ok(Vec::new());
		}
		if samples.cols() < self.required_columns() {
			bail!(
				"the samples table has {} columns, but the tree needs {}",
				samples.cols(),
				self.required_columns()
			);
		}
		for column in self.columns.clone() {
			if column == self.goal || column >= samples.cols() {
				continue;
			}
			if let Categorizer::Intervals(_) = self.categorizer(column) {
				samples.promote_column(column)?;
			}
		}
		Ok((0..samples.rows())
			.map(|row| self.classify(samples.row(row)))
			.collect())
	}

	/// The columns a sample row must provide: every tree column, except that a goal in the last position may be omitted.
	fn required_columns(&self) -> usize {
		if self.goal + 1 == self.columns.end {
			self.columns.end - 1
		} else {
			self.columns.end
		}
	}
}
