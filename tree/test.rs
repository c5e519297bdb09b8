use crate::{BuildOptions, Categorizer, Node, Tree, INVALID_CATEGORY};
use arbor_table::{Cell, Selection, Table};
use std::io::Cursor;
use std::sync::Arc;

const WEATHER: &str = "outlook,temperature,humidity,wind,play
sunny,85,85,weak,no
sunny,80,90,strong,no
overcast,83,78,weak,yes
rain,70,96,weak,yes
rain,68,80,weak,yes
rain,65,70,strong,no
overcast,64,65,strong,yes
sunny,72,95,weak,no
sunny,69,70,weak,yes
rain,75,80,weak,yes
sunny,75,70,strong,yes
overcast,72,90,strong,yes
overcast,81,75,weak,yes
rain,71,80,strong,no
";

fn table(csv: &str) -> Table {
	let mut reader = csv::Reader::from_reader(Cursor::new(csv));
	Table::from_csv(&mut reader).unwrap()
}

fn samples(csv: &str) -> Table {
	let mut reader = csv::ReaderBuilder::new()
		.has_headers(false)
		.from_reader(Cursor::new(csv));
	Table::samples_from_csv(&mut reader).unwrap()
}

fn build(table: &Table, goal: usize, threshold: usize) -> Tree {
	let options = BuildOptions {
		threshold,
		..Default::default()
	};
	Tree::build(table, &Selection::all(), goal, &options, &mut |_| {}).unwrap()
}

#[test]
fn test_splits_on_zero_entropy_attribute() {
	let table = table("A,B,G\nx,0,Y\nx,1,Y\ny,0,N\ny,1,N\n");
	let tree = build(&table, 2, 0);
	let branch = match &tree.root {
		Node::Branch(branch) => branch,
		Node::Leaf(_) => panic!("expected the root to split"),
	};
	assert_eq!(branch.column, 0);
	assert_eq!(branch.n_examples, 4);
	assert_eq!(branch.children.len(), 2);
	for (child, expected) in branch.children.iter().zip(&[("Y", 2), ("N", 2)]) {
		match child {
			Node::Leaf(leaf) => {
				assert_eq!(tree.class_label(leaf.class), expected.0);
				assert_eq!(leaf.n_examples, expected.1);
			}
			Node::Branch(_) => panic!("expected a leaf under the root"),
		}
	}
}

#[test]
fn test_threshold_short_circuits() {
	let table = table("A,B,G\nx,0,Y\nx,1,Y\ny,0,N\ny,1,N\n");
	let tree = build(&table, 2, 4);
	match &tree.root {
		Node::Leaf(leaf) => {
			// Y and N tie at two samples each; the first seen category wins.
			assert_eq!(tree.class_label(leaf.class), "Y");
			assert_eq!(leaf.n_examples, 4);
		}
		Node::Branch(_) => panic!("expected a single leaf"),
	}
}

#[test]
fn test_numeric_binning() {
	let table = table("V,G\n0,low\n1,low\n2,low\n10,mid\n11,mid\n12,mid\n20,high\n21,high\n");
	let tree = build(&table, 1, 3);
	let categorizer = tree.categorizer(0);
	assert_eq!(categorizer.count(), 4);
	assert_eq!(categorizer.label(0), "<7");
	assert_eq!(categorizer.label(1), "7-14");
	assert_eq!(categorizer.label(2), "14-21");
	assert_eq!(categorizer.label(3), ">21");
	let branch = match &tree.root {
		Node::Branch(branch) => branch,
		Node::Leaf(_) => panic!("expected the root to split"),
	};
	assert_eq!(branch.column, 0);
	assert_eq!(branch.children.len(), 4);
	let expected = [("low", 3), ("mid", 3), ("high", 2), ("low", 0)];
	for (child, (class, n_examples)) in branch.children.iter().zip(&expected) {
		match child {
			Node::Leaf(leaf) => {
				assert_eq!(tree.class_label(leaf.class), *class);
				assert_eq!(leaf.n_examples, *n_examples);
			}
			Node::Branch(_) => panic!("expected a leaf under the root"),
		}
	}
}

#[test]
fn test_bin_lookup_boundaries() {
	let table = table("V,G\n0,low\n1,low\n2,low\n10,mid\n11,mid\n12,mid\n20,high\n21,high\n");
	let options = BuildOptions::default();
	let selection = Selection::all().validate(&table).unwrap();
	let categorizer = Categorizer::build(&table, 0, &selection, &options).unwrap();
	assert_eq!(categorizer.to_category(&Cell::Integer(0)), 0);
	assert_eq!(categorizer.to_category(&Cell::Integer(-5)), 0);
	assert_eq!(categorizer.to_category(&Cell::Real(7.0)), 0);
	assert_eq!(categorizer.to_category(&Cell::Real(7.5)), 1);
	assert_eq!(categorizer.to_category(&Cell::Integer(21)), 2);
	assert_eq!(categorizer.to_category(&Cell::Integer(22)), 3);
	assert_eq!(
		categorizer.to_category(&Cell::String(Arc::from("x"))),
		INVALID_CATEGORY
	);
}

#[test]
fn test_integer_category_limit() {
	// Exactly seven distinct values keep the one to one mapping.
	let table_at_limit = table("V,G\n1,a\n2,a\n3,a\n4,a\n5,a\n6,a\n7,a\n1,a\n");
	let options = BuildOptions::default();
	let selection = Selection::all().validate(&table_at_limit).unwrap();
	let categorizer = Categorizer::build(&table_at_limit, 0, &selection, &options).unwrap();
	match &categorizer {
		Categorizer::Integers(_) => {}
		_ => panic!("expected an integer categorizer"),
	}
	assert_eq!(categorizer.count(), 7);
	assert_eq!(categorizer.to_category(&Cell::Integer(3)), 2);
	assert_eq!(categorizer.to_category(&Cell::Integer(8)), INVALID_CATEGORY);

	// One more distinct value tips the column into bins.
	let table_over_limit = table("V,G\n1,a\n2,a\n3,a\n4,a\n5,a\n6,a\n7,a\n8,a\n");
	let selection = Selection::all().validate(&table_over_limit).unwrap();
	let categorizer = Categorizer::build(&table_over_limit, 0, &selection, &options).unwrap();
	match &categorizer {
		Categorizer::Bins(_) => {}
		_ => panic!("expected a bin categorizer"),
	}
	assert_eq!(categorizer.count(), options.bins_count);
}

#[test]
fn test_categorizer_round_trip() {
	let table = table("A,V,G\nx,1,a\ny,2,b\nz,3,a\nx,1,b\n");
	let options = BuildOptions::default();
	let selection = Selection::all().validate(&table).unwrap();
	for col in 0..table.cols() {
		let categorizer = Categorizer::build(&table, col, &selection, &options).unwrap();
		for row in 0..table.rows() {
			let cell = table.cell(row, col);
			let id = categorizer.to_category(cell);
			assert!(id < categorizer.count());
			assert_eq!(categorizer.from_category(id).as_ref(), Some(cell));
		}
		assert_eq!(categorizer.from_category(categorizer.count()), None);
	}
}

#[test]
fn test_mixed_column_types_fail() {
	let table = table("A,G\n1,x\ny,z\n");
	let options = BuildOptions::default();
	let result = Tree::build(&table, &Selection::all(), 1, &options, &mut |_| {});
	assert!(result.is_err());
}

#[test]
fn test_majority_fallback() {
	let table = table("A,G\na,Y\na,Y\na,N\n");
	let tree = build(&table, 1, 0);
	let branch = match &tree.root {
		Node::Branch(branch) => branch,
		Node::Leaf(_) => panic!("expected the root to split"),
	};
	assert_eq!(branch.column, 0);
	assert_eq!(branch.children.len(), 1);
	match &branch.children[0] {
		Node::Leaf(leaf) => {
			assert_eq!(tree.class_label(leaf.class), "Y");
			assert_eq!(leaf.n_examples, 3);
		}
		Node::Branch(_) => panic!("expected a leaf"),
	}
}

#[test]
fn test_unclassifiable_sample() {
	let table = table("A,B,G\nx,0,Y\nx,1,Y\ny,0,N\ny,1,N\n");
	let tree = build(&table, 2, 0);
	let row = vec![Cell::String(Arc::from("z")), Cell::Integer(0)];
	assert_eq!(tree.classify(&row), None);
	let row = vec![Cell::String(Arc::from("x")), Cell::Integer(0)];
	assert!(tree.classify(&row).is_some());
}

#[test]
fn test_interval_promotion() {
	let table = table("R,G\n0-10,low\n10-20,mid\n20-30,high\n");
	let tree = build(&table, 1, 0);
	let mut samples = samples("15\n25\n95\n");
	let classes = tree.classify_table(&mut samples).unwrap();
	assert_eq!(classes.len(), 3);
	assert_eq!(tree.class_label(classes[0].unwrap()), "mid");
	assert_eq!(tree.class_label(classes[1].unwrap()), "high");
	assert_eq!(classes[2], None);
}

#[test]
fn test_interval_containment_prefers_lowest() {
	let table = table("R,G\n5-15,b\n0-10,a\n");
	let options = BuildOptions::default();
	let selection = Selection::all().validate(&table).unwrap();
	let categorizer = Categorizer::build(&table, 0, &selection, &options).unwrap();
	// Ids follow first seen order, but containment scans intervals in (min, max) order.
	assert_eq!(categorizer.to_category(&Cell::Real(7.0)), 1);
	assert_eq!(categorizer.to_category(&Cell::Real(12.0)), 0);
	assert_eq!(categorizer.to_category(&Cell::Real(20.0)), INVALID_CATEGORY);
}

#[test]
fn test_excluded_columns() {
	let table = table(WEATHER);
	let options = BuildOptions {
		excluded_columns: vec![0],
		..Default::default()
	};
	let tree = Tree::build(&table, &Selection::all(), 4, &options, &mut |_| {}).unwrap();
	match &tree.root {
		Node::Branch(branch) => assert_ne!(branch.column, 0),
		Node::Leaf(_) => {}
	}
	let excluded_outside = BuildOptions {
		excluded_columns: vec![9],
		..Default::default()
	};
	assert!(Tree::build(&table, &Selection::all(), 4, &excluded_outside, &mut |_| {}).is_err());
}

#[test]
fn test_build_validation() {
	let table = table(WEATHER);
	let options = BuildOptions::default();
	// The goal must be inside the selection.
	let selection = Selection {
		col_beg: 0,
		col_end: 4,
		..Selection::all()
	};
	assert!(Tree::build(&table, &selection, 4, &options, &mut |_| {}).is_err());
	// At least two columns must be selected.
	let selection = Selection {
		col_beg: 4,
		col_end: 5,
		..Selection::all()
	};
	assert!(Tree::build(&table, &selection, 4, &options, &mut |_| {}).is_err());
	// An empty row selection cannot be built.
	let selection = Selection {
		row_beg: 3,
		row_end: 3,
		..Selection::all()
	};
	assert!(Tree::build(&table, &selection, 4, &options, &mut |_| {}).is_err());
}

#[test]
fn test_selection_scopes_build() {
	let table = table(WEATHER);
	let selection = Selection {
		row_beg: 0,
		row_end: 8,
		col_beg: 0,
		col_end: 5,
	};
	let tree = Tree::build(&table, &selection, 4, &BuildOptions::default(), &mut |_| {}).unwrap();
	assert_eq!(tree.root.n_examples(), 8);
}

fn check_sample_counts(tree: &Tree, node: &Node) {
	if let Node::Branch(branch) = node {
		assert_eq!(
			branch.children.len(),
			tree.categorizer(branch.column).count()
		);
		let child_sum: usize = branch.children.iter().map(|child| child.n_examples()).sum();
		assert_eq!(child_sum, branch.n_examples);
		for child in branch.children.iter() {
			check_sample_counts(tree, child);
		}
	}
}

#[test]
fn test_tree_invariants() {
	let table = table(WEATHER);
	for threshold in &[0, 1, 3, 5] {
		let tree = build(&table, 4, *threshold);
		assert_eq!(tree.root.n_examples(), table.rows());
		check_sample_counts(&tree, &tree.root);
		// Every training row reaches a leaf.
		for row in 0..table.rows() {
			assert!(tree.classify(table.row(row)).is_some());
		}
	}
}

#[test]
fn test_training_rows_reach_their_leaf_majority() {
	let table = table("A,B,G\nx,0,Y\nx,1,Y\ny,0,N\ny,1,N\n");
	let tree = build(&table, 2, 0);
	let goal = tree.categorizer(2);
	for (row, expected) in [(0, "Y"), (1, "Y"), (2, "N"), (3, "N")].iter() {
		let class = tree.classify(table.row(*row)).unwrap();
		assert_eq!(class, goal.to_category(table.cell(*row, 2)));
		assert_eq!(tree.class_label(class), *expected);
	}
}

#[test]
fn test_deterministic_build() {
	let table = table(WEATHER);
	let first = build(&table, 4, 3);
	let second = build(&table, 4, 3);
	assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_progress_counters_complete() {
	let table = table(WEATHER);
	let mut phases = Vec::new();
	let options = BuildOptions::default();
	Tree::build(&table, &Selection::all(), 4, &options, &mut |progress| {
		phases.push(progress);
	})
	.unwrap();
	assert_eq!(phases.len(), 2);
	assert_eq!(phases[0].phase(), crate::Phase::Encoding);
	assert_eq!(phases[1].phase(), crate::Phase::Growing);
	for progress in phases.iter() {
		assert_eq!(progress.get(), progress.total());
	}
}

#[test]
fn test_print_tree() {
	let table = table("A,B,G\nx,0,Y\nx,1,Y\ny,0,N\ny,1,N\n");
	let tree = build(&table, 2, 0);
	let printed = tree.to_string();
	assert!(printed.contains("<A (4)>"));
	assert!(printed.contains("x: 'Y' (2)"));
	assert!(printed.contains("y: 'N' (2)"));
}
