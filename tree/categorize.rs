use crate::BuildOptions;
use anyhow::Result;
use arbor_table::{Cell, Interval, Selection, Table};
use fnv::FnvHashMap;
use num_traits::ToPrimitive;
use std::{collections::BTreeMap, sync::Arc};

/// A dense identifier for one value of a categorized column.
pub type CategoryId = usize;

/// The sentinel returned when a cell matches no category of its column.
pub const INVALID_CATEGORY: CategoryId = usize::MAX;

/*
A categorizer maps the cells of one column to dense category ids and back. The variant is decided by the column's cell variant and, for integers, by how many distinct values the column holds:

## Strings, integers, intervals
One category per distinct value, ids assigned in first seen order over the scanned rows.

## Bins
An integer column with too many distinct values, and every real column, is cut into `bins_count` equal width buckets between the observed minimum and maximum, with the outer buckets extended to infinity. For `thresholds` of `[7, 14, 21]` the buckets are:
0. (-infinity, 7]
1. (7, 14]
2. (14, 21]
3. (21, +infinity)
*/
#[derive(Debug)]
pub enum Categorizer {
	Strings(StringCategorizer),
	Integers(IntegerCategorizer),
	Bins(BinCategorizer),
	Intervals(IntervalCategorizer),
}

#[derive(Debug)]
pub struct StringCategorizer {
	to: FnvHashMap<Arc<str>, CategoryId>,
	from: Vec<Arc<str>>,
}

#[derive(Debug)]
pub struct IntegerCategorizer {
	to: FnvHashMap<i64, CategoryId>,
	from: Vec<i64>,
}

/// Equal width buckets over a continuous column. `thresholds` holds the interior bucket boundaries in ascending order; bucket `i` covers `(thresholds[i - 1], thresholds[i]]`.
#[derive(Debug)]
pub struct BinCategorizer {
	thresholds: Vec<f64>,
}

#[derive(Debug)]
pub struct IntervalCategorizer {
	to: BTreeMap<Interval, CategoryId>,
	from: Vec<Interval>,
}

impl Categorizer {
	/// Scan the selected rows of `col` once and build the column's categorizer. Fails if two rows disagree on the cell variant.
	pub fn build(
		table: &Table,
		col: usize,
		selection: &Selection,
		options: &BuildOptions,
	) -> Result<Categorizer> {
		match table.cell(selection.row_beg, col) {
			Cell::String(_) => build_strings(table, col, selection),
			Cell::Integer(_) => build_integers(table, col, selection, options),
			Cell::Real(_) => build_bins(table, col, selection, options),
			Cell::Interval(_) => build_intervals(table, col, selection),
		}
	}

	/// Map a cell to its category id, or [`INVALID_CATEGORY`] if the cell is not in this categorizer's domain.
	pub fn to_category(&self, cell: &Cell) -> CategoryId {
		match self {
			Categorizer::Strings(strings) => match cell {
				Cell::String(value) => strings
					.to
					.get(value.as_ref())
					.copied()
					.unwrap_or(INVALID_CATEGORY),
				_ => INVALID_CATEGORY,
			},
			Categorizer::Integers(integers) => match cell {
				Cell::Integer(value) => integers
					.to
					.get(value)
					.copied()
					.unwrap_or(INVALID_CATEGORY),
				_ => INVALID_CATEGORY,
			},
			Categorizer::Bins(bins) => match cell {
				Cell::Integer(value) => bins.bin(value.to_f64().unwrap()),
				Cell::Real(value) => bins.bin(*value),
				_ => INVALID_CATEGORY,
			},
			Categorizer::Intervals(intervals) => match cell {
				Cell::Interval(value) => match intervals.to.get(value) {
					Some(id) => *id,
					None => intervals.find(value.max),
				},
				Cell::Integer(value) => intervals.find(value.to_f64().unwrap()),
				Cell::Real(value) => intervals.find(*value),
				Cell::String(_) => INVALID_CATEGORY,
			},
		}
	}

	/// The cell a category id stands for, or `None` if the id is out of range. Bucket ids synthesize an interval cell covering the bucket.
	pub fn from_category(&self, id: CategoryId) -> Option<Cell> {
		match self {
			Categorizer::Strings(strings) => {
				strings.from.get(id).map(|value| Cell::String(value.clone()))
			}
			Categorizer::Integers(integers) => integers.from.get(id).copied().map(Cell::Integer),
			Categorizer::Bins(bins) => {
				if id < self.count() {
					Some(Cell::Interval(bins.bounds(id)))
				} else {
					None
				}
			}
			Categorizer::Intervals(intervals) => {
				intervals.from.get(id).copied().map(Cell::Interval)
			}
		}
	}

	/// The number of categories; valid ids are `0..count`.
	pub fn count(&self) -> usize {
		match self {
			Categorizer::Strings(strings) => strings.from.len(),
			Categorizer::Integers(integers) => integers.from.len(),
			Categorizer::Bins(bins) => bins.thresholds.len() + 1,
			Categorizer::Intervals(intervals) => intervals.from.len(),
		}
	}

	/// The printable form of a category id.
	pub fn label(&self, id: CategoryId) -> String {
		match self.from_category(id) {
			Some(cell) => cell.to_string(),
			None => "(null)".to_owned(),
		}
	}
}

impl BinCategorizer {
	fn new(min: f64, max: f64, bins_count: usize) -> Self {
		debug_assert!(bins_count >= 2);
		let step = (max - min) / (bins_count - 1).to_f64().unwrap();
		let thresholds = (1..bins_count)
			.map(|i| min + i.to_f64().unwrap() * step)
			.collect();
		Self { thresholds }
	}

	/// The bucket holding `value`: the first whose upper boundary is at least `value`, or the final open bucket.
	fn bin(&self, value: f64) -> CategoryId {
		self.thresholds.partition_point(|threshold| *threshold < value)
	}

	fn bounds(&self, id: CategoryId) -> Interval {
		let min = if id == 0 {
			f64::NEG_INFINITY
		} else {
			self.thresholds[id - 1]
		};
		let max = if id == self.thresholds.len() {
			f64::INFINITY
		} else {
			self.thresholds[id]
		};
		Interval::new(min, max)
	}
}

impl IntervalCategorizer {
	/// The first stored interval, in `(min, max)` order, that admits `value`.
	fn find(&self, value: f64) -> CategoryId {
		self.to
			.iter()
			.find(|(interval, _)| interval.admits(value))
			.map(|(_, id)| *id)
			.unwrap_or(INVALID_CATEGORY)
	}
}

fn build_strings(table: &Table, col: usize, selection: &Selection) -> Result<Categorizer> {
	let mut to = FnvHashMap::default();
	let mut from: Vec<Arc<str>> = Vec::new();
	for row in selection.row_beg..selection.row_end {
		let value = match table.cell(row, col) {
			Cell::String(value) => value,
			cell => return Err(variant_mismatch(table, row, col, "string", cell)),
		};
		if !to.contains_key(value) {
			to.insert(value.clone(), from.len());
			from.push(value.clone());
		}
	}
	Ok(Categorizer::Strings(StringCategorizer { to, from }))
}

fn build_integers(
	table: &Table,
	col: usize,
	selection: &Selection,
	options: &BuildOptions,
) -> Result<Categorizer> {
	let mut to = FnvHashMap::default();
	let mut from: Vec<i64> = Vec::new();
	let mut min = i64::MAX;
	let mut max = i64::MIN;
	let mut overflowed = false;
	for row in selection.row_beg..selection.row_end {
		let value = match table.cell(row, col) {
			Cell::Integer(value) => *value,
			cell => return Err(variant_mismatch(table, row, col, "integer", cell)),
		};
		// Track the bounds unconditionally: the bins branch needs them even when the map fills up late in the scan.
		min = min.min(value);
		max = max.max(value);
		if !overflowed && !to.contains_key(&value) {
			if to.len() == options.integer_category_limit {
				overflowed = true;
			} else {
				to.insert(value, from.len());
				from.push(value);
			}
		}
	}
	if overflowed {
		Ok(Categorizer::Bins(BinCategorizer::new(
			min.to_f64().unwrap(),
			max.to_f64().unwrap(),
			options.bins_count,
		)))
	} else {
		Ok(Categorizer::Integers(IntegerCategorizer { to, from }))
	}
}

fn build_bins(
	table: &Table,
	col: usize,
	selection: &Selection,
	options: &BuildOptions,
) -> Result<Categorizer> {
	let mut min = f64::INFINITY;
	let mut max = f64::NEG_INFINITY;
	for row in selection.row_beg..selection.row_end {
		let value = match table.cell(row, col) {
			Cell::Real(value) => *value,
			cell => return Err(variant_mismatch(table, row, col, "real", cell)),
		};
		min = min.min(value);
		max = max.max(value);
	}
	Ok(Categorizer::Bins(BinCategorizer::new(
		min,
		max,
		options.bins_count,
	)))
}

fn build_intervals(table: &Table, col: usize, selection: &Selection) -> Result<Categorizer> {
	let mut to = BTreeMap::new();
	let mut from: Vec<Interval> = Vec::new();
	for row in selection.row_beg..selection.row_end {
		let value = match table.cell(row, col) {
			Cell::Interval(value) => *value,
			cell => return Err(variant_mismatch(table, row, col, "interval", cell)),
		};
		if !to.contains_key(&value) {
			to.insert(value, from.len());
			from.push(value);
		}
	}
	Ok(Categorizer::Intervals(IntervalCategorizer { to, from }))
}

fn variant_mismatch(
	table: &Table,
	row: usize,
	col: usize,
	expected: &str,
	found: &Cell,
) -> anyhow::Error {
	anyhow::format_err!(
		"column {} ({:?}) mixes cell types: expected a {} at row {}, but found a {}",
		col,
		table.column_name(col),
		expected,
		row,
		found.variant_name()
	)
}
