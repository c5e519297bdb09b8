use crate::{Node, Tree};
use std::fmt;

impl fmt::Display for Tree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.fmt_node(f, &self.root, 0, true)
	}
}

impl Tree {
	fn fmt_node(&self, f: &mut fmt::Formatter<'_>, node: &Node, offset: usize, root: bool) -> fmt::Result {
		match node {
			Node::Leaf(leaf) => {
				writeln!(f, " '{}' ({})", self.class_label(leaf.class), leaf.n_examples)
			}
			Node::Branch(branch) => {
				if !root {
					writeln!(f)?;
				}
				writeln!(
					f,
					"{:offset$}<{} ({})>",
					"",
					self.column_names[branch.column],
					branch.n_examples,
					offset = offset
				)?;
				let categorizer = self.categorizer(branch.column);
				for (category, child) in branch.children.iter().enumerate() {
					write!(
						f,
						"{:offset$}{}:",
						"",
						categorizer.label(category),
						offset = offset + 2
					)?;
					self.fmt_node(f, child, offset + 2, false)?;
				}
				Ok(())
			}
		}
	}
}
