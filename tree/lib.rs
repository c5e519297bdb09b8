/*!
This crate implements decision tree induction over typed tables. Each selected column is discretized into a small set of dense categories and the selected rectangle is encoded once into a column major category matrix. The tree is then grown by repeatedly choosing the attribute whose split minimizes the expected entropy of the goal column. A built tree classifies new rows against the same categorizers.

```no_run
use arbor_table::{Selection, Table};
use arbor_tree::{BuildOptions, Tree};

let table = Table::from_path("weather.csv".as_ref()).unwrap();
let goal = table.cols() - 1;
let tree = Tree::build(&table, &Selection::all(), goal, &BuildOptions::default(), &mut |_| {}).unwrap();
let class = tree.classify(table.row(0));
```
*/

mod categorize;
mod entropy;
mod examples_index;
mod predict;
mod print;
mod progress;
mod train;

#[cfg(test)]
mod test;

pub use self::categorize::{Categorizer, CategoryId, INVALID_CATEGORY};
pub use self::progress::{Phase, Progress};

use std::ops::Range;

/// These are the options passed to [`Tree::build`].
#[derive(Clone, Debug)]
pub struct BuildOptions {
	/// Subsets with at most this many samples become leaves instead of being split further.
	pub threshold: usize,
	/// Columns that must not be chosen as split attributes. The goal column is always excluded.
	pub excluded_columns: Vec<usize>,
	/// An integer column with more than this many distinct values is reinterpreted as a continuous attribute and bucketized.
	pub integer_category_limit: usize,
	/// The number of equal width buckets a continuous column is divided into.
	pub bins_count: usize,
}

impl Default for BuildOptions {
	fn default() -> Self {
		Self {
			threshold: 3,
			excluded_columns: Vec::new(),
			integer_category_limit: 7,
			bins_count: 4,
		}
	}
}

/// A decision tree over the categories of a table's columns.
#[derive(Debug)]
pub struct Tree {
	pub root: Node,
	/// The per column categorizers, one for each column in `columns`.
	pub categorizers: Vec<Categorizer>,
	/// The table columns the tree was built over.
	pub columns: Range<usize>,
	/// The column whose categories the tree predicts.
	pub goal: usize,
	/// The names of every training table column, used when printing the tree.
	pub column_names: Vec<String>,
}

#[derive(Debug)]
pub enum Node {
	Branch(BranchNode),
	Leaf(LeafNode),
}

/// An internal node; samples are routed to the child indexed by their category on `column`.
#[derive(Debug)]
pub struct BranchNode {
	/// The table column this node splits on.
	pub column: usize,
	/// One child for each category of `column`, indexed by category id.
	pub children: Vec<Node>,
	/// The number of training samples that reached this node.
	pub n_examples: usize,
}

#[derive(Debug)]
pub struct LeafNode {
	/// The goal category predicted for samples that reach this leaf.
	pub class: CategoryId,
	/// The number of training samples that reached this leaf.
	pub n_examples: usize,
}

impl Tree {
	/// The categorizer for a table column inside [`Tree::columns`].
	pub fn categorizer(&self, column: usize) -> &Categorizer {
		&self.categorizers[column - self.columns.start]
	}

	/// The printable form of a goal category.
	pub fn class_label(&self, class: CategoryId) -> String {
		self.categorizer(self.goal).label(class)
	}
}

impl Node {
	pub fn n_examples(&self) -> usize {
		match self {
			Node::Branch(branch) => branch.n_examples,
			Node::Leaf(leaf) => leaf.n_examples,
		}
	}
}
