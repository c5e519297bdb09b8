/*!
This crate provides the typed tabular model the tree builder trains on. A table is a row major matrix of tagged cells, where the type of every cell is inferred individually by the csv lexer in this crate. Cells hold strings, integers, finite reals, or closed numeric intervals; string cells are interned in a pool shared across the table.
*/

use anyhow::{bail, Result};
use fnv::FnvHashSet;
use num_traits::ToPrimitive;
use std::{cmp::Ordering, fmt, sync::Arc};

mod load;

/// A closed numeric range. A bound of `f64::NEG_INFINITY` or `f64::INFINITY` means the range is open ended on that side.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
	pub min: f64,
	pub max: f64,
}

impl Interval {
	/// Create an interval from two bounds, swapping them if they arrive out of order.
	pub fn new(a: f64, b: f64) -> Self {
		if a <= b {
			Self { min: a, max: b }
		} else {
			Self { min: b, max: a }
		}
	}

	/// The interval `(-inf, max]`.
	pub fn below(max: f64) -> Self {
		Self {
			min: f64::NEG_INFINITY,
			max,
		}
	}

	/// The interval `[min, +inf)`.
	pub fn above(min: f64) -> Self {
		Self {
			min,
			max: f64::INFINITY,
		}
	}

	/// Whether `value` falls within this interval's bounds.
	pub fn admits(&self, value: f64) -> bool {
		self.min <= value && value <= self.max
	}
}

impl PartialEq for Interval {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Interval {}

impl PartialOrd for Interval {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Interval {
	/// Intervals are ordered lexicographically by `(min, max)`.
	fn cmp(&self, other: &Self) -> Ordering {
		self.min
			.total_cmp(&other.min)
			.then_with(|| self.max.total_cmp(&other.max))
	}
}

impl fmt::Display for Interval {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.min == f64::NEG_INFINITY && self.max != f64::INFINITY {
			write!(f, "<{}", self.max)
		} else if self.max == f64::INFINITY && self.min != f64::NEG_INFINITY {
			write!(f, ">{}", self.min)
		} else {
			write!(f, "{}-{}", self.min, self.max)
		}
	}
}

/// A single value of a [`Table`]. Every cell is exactly one variant; `Real` cells are finite by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
	String(Arc<str>),
	Integer(i64),
	Real(f64),
	Interval(Interval),
}

impl Cell {
	pub fn as_string(&self) -> Option<&str> {
		match self {
			Cell::String(value) => Some(value),
			_ => None,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Cell::Integer(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_real(&self) -> Option<f64> {
		match self {
			Cell::Real(value) => Some(*value),
			_ => None,
		}
	}

	pub fn as_interval(&self) -> Option<Interval> {
		match self {
			Cell::Interval(value) => Some(*value),
			_ => None,
		}
	}

	/// The name of this cell's variant, used in diagnostics.
	pub fn variant_name(&self) -> &'static str {
		match self {
			Cell::String(_) => "string",
			Cell::Integer(_) => "integer",
			Cell::Real(_) => "real",
			Cell::Interval(_) => "interval",
		}
	}
}

impl fmt::Display for Cell {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Cell::String(value) => write!(f, "{}", value),
			Cell::Integer(value) => write!(f, "{}", value),
			Cell::Real(value) => write!(f, "{}", value),
			Cell::Interval(value) => write!(f, "{}", value),
		}
	}
}

/// A row major matrix of cells with named columns. Tables are immutable once loaded, except for [`Table::promote_column`].
#[derive(Debug)]
pub struct Table {
	cells: Vec<Cell>,
	rows: usize,
	cols: usize,
	column_names: Vec<String>,
	strings: FnvHashSet<Arc<str>>,
}

impl Table {
	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn cols(&self) -> usize {
		self.cols
	}

	pub fn cell(&self, row: usize, col: usize) -> &Cell {
		&self.cells[row * self.cols + col]
	}

	/// The cells of one row, in column order.
	pub fn row(&self, row: usize) -> &[Cell] {
		&self.cells[row * self.cols..(row + 1) * self.cols]
	}

	pub fn column_name(&self, col: usize) -> &str {
		&self.column_names[col]
	}

	pub fn column_names(&self) -> &[String] {
		&self.column_names
	}

	/// Lift every numeric cell in `col` to an interval: an integer or real `v` becomes `(-inf, v]`, and interval cells are left alone. Fails on the first string cell, leaving earlier cells of the column promoted.
	pub fn promote_column(&mut self, col: usize) -> Result<()> {
		if col >= self.cols {
			bail!(
				"column {} is out of range for a table with {} columns",
				col,
				self.cols
			);
		}
		for row in 0..self.rows {
			let index = row * self.cols + col;
			match &self.cells[index] {
				Cell::Interval(_) => {}
				Cell::Integer(value) => {
					self.cells[index] = Cell::Interval(Interval::below(value.to_f64().unwrap()));
				}
				Cell::Real(value) => {
					self.cells[index] = Cell::Interval(Interval::below(*value));
				}
				Cell::String(value) => bail!(
					"cannot promote the value {:?} at row {}, column {} to an interval",
					value,
					row,
					col
				),
			}
		}
		Ok(())
	}

	fn intern(&mut self, text: &str) -> Arc<str> {
		if let Some(interned) = self.strings.get(text) {
			interned.clone()
		} else {
			let interned: Arc<str> = Arc::from(text);
			self.strings.insert(interned.clone());
			interned
		}
	}
}

/// A half open row/column rectangle that scopes a build to part of a table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
	pub row_beg: usize,
	pub row_end: usize,
	pub col_beg: usize,
	pub col_end: usize,
}

impl Selection {
	/// Select every row and column. The open ends are clamped by [`Selection::validate`].
	pub fn all() -> Self {
		Self {
			row_beg: 0,
			row_end: usize::MAX,
			col_beg: 0,
			col_end: usize::MAX,
		}
	}

	/// Clamp open ends to the table bounds and reject inverted or out of range selections.
	pub fn validate(&self, table: &Table) -> Result<Selection> {
		let mut selection = *self;
		selection.row_end = selection.row_end.min(table.rows());
		selection.col_end = selection.col_end.min(table.cols());
		if selection.row_beg > selection.row_end {
			bail!(
				"the selected rows {}-{} are inverted or out of range for a table with {} rows",
				self.row_beg,
				self.row_end,
				table.rows()
			);
		}
		if selection.col_beg > selection.col_end {
			bail!(
				"the selected columns {}-{} are inverted or out of range for a table with {} columns",
				self.col_beg,
				self.col_end,
				table.cols()
			);
		}
		Ok(selection)
	}

	pub fn n_rows(&self) -> usize {
		self.row_end - self.row_beg
	}

	pub fn n_cols(&self) -> usize {
		self.col_end - self.col_beg
	}

	pub fn contains_col(&self, col: usize) -> bool {
		self.col_beg <= col && col < self.col_end
	}
}

impl Default for Selection {
	fn default() -> Self {
		Self::all()
	}
}

#[test]
fn test_interval_order() {
	assert!(Interval::new(1.0, 5.0) < Interval::new(2.0, 3.0));
	assert!(Interval::new(1.0, 2.0) < Interval::new(1.0, 5.0));
	assert_eq!(Interval::new(1.0, 2.0), Interval::new(2.0, 1.0));
	assert!(Interval::below(3.0) < Interval::new(0.0, 1.0));
	assert!(Interval::new(0.0, 1.0) < Interval::above(0.5));
}

#[test]
fn test_interval_display() {
	assert_eq!(Interval::below(70.0).to_string(), "<70");
	assert_eq!(Interval::above(70.0).to_string(), ">70");
	assert_eq!(Interval::new(60.0, 70.0).to_string(), "60-70");
}

#[test]
fn test_interval_admits() {
	let interval = Interval::new(10.0, 20.0);
	assert!(interval.admits(10.0));
	assert!(interval.admits(15.0));
	assert!(interval.admits(20.0));
	assert!(!interval.admits(9.9));
	assert!(Interval::below(5.0).admits(-1e300));
}
