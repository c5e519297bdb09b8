use super::*;
use anyhow::{bail, Context, Result};
use arbor_finite::ToFinite;
use fnv::FnvHashSet;
use num_traits::ToPrimitive;
use std::path::Path;

impl Table {
	/// Load a table from a csv file whose first record holds the column names.
	pub fn from_path(path: &Path) -> Result<Table> {
		let mut reader = csv::Reader::from_path(path)
			.with_context(|| format!("failed to open the data file {}", path.display()))?;
		Table::from_csv(&mut reader)
			.with_context(|| format!("failed to load the data file {}", path.display()))
	}

	pub fn from_csv<R>(reader: &mut csv::Reader<R>) -> Result<Table>
	where
		R: std::io::Read,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let mut table = Table {
			cells: Vec::new(),
			rows: 0,
			cols: column_names.len(),
			column_names,
			strings: FnvHashSet::default(),
		};
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			table.push_record(&record)?;
		}
		Ok(table)
	}

	/// Load a samples table from a headerless csv file. The column count is taken from the first record; column order must match the training table by index.
	pub fn samples_from_path(path: &Path) -> Result<Table> {
		let mut reader = csv::ReaderBuilder::new()
			.has_headers(false)
			.from_path(path)
			.with_context(|| format!("failed to open the samples file {}", path.display()))?;
		Table::samples_from_csv(&mut reader)
			.with_context(|| format!("failed to load the samples file {}", path.display()))
	}

	/// As [`Table::samples_from_path`], over a reader built with `has_headers(false)`.
	pub fn samples_from_csv<R>(reader: &mut csv::Reader<R>) -> Result<Table>
	where
		R: std::io::Read,
	{
		let mut table = Table {
			cells: Vec::new(),
			rows: 0,
			cols: 0,
			column_names: Vec::new(),
			strings: FnvHashSet::default(),
		};
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			if table.cols == 0 {
				table.cols = record.len();
				table.column_names = vec![String::new(); record.len()];
			}
			table.push_record(&record)?;
		}
		Ok(table)
	}

	fn push_record(&mut self, record: &csv::StringRecord) -> Result<()> {
		let line = record.position().map(|position| position.line()).unwrap_or(0);
		if record.len() != self.cols {
			bail!(
				"line {}: expected {} cells, but got {}",
				line,
				self.cols,
				record.len()
			);
		}
		for (index, field) in record.iter().enumerate() {
			let cell = self
				.parse_cell(field)
				.with_context(|| format!("line {}, column {}", line, index))?;
			self.cells.push(cell);
		}
		self.rows += 1;
		Ok(())
	}

	/// Infer the type of a single csv field: integers, `$` tallies, finite reals, `a-b`/`<x`/`>x` intervals, and strings for everything else.
	fn parse_cell(&mut self, text: &str) -> Result<Cell> {
		if text.is_empty() {
			bail!("empty cells are not supported");
		}
		// A run of dollar signs is an integer equal to their count.
		if text.bytes().all(|byte| byte == b'$') {
			return Ok(Cell::Integer(text.len().to_i64().unwrap()));
		}
		if let Some(rest) = text.strip_prefix('<') {
			if let Some(max) = parse_finite(rest) {
				return Ok(Cell::Interval(Interval::below(max)));
			}
		}
		if let Some(rest) = text.strip_prefix('>') {
			if let Some(min) = parse_finite(rest) {
				return Ok(Cell::Interval(Interval::above(min)));
			}
		}
		if looks_numeric(text) {
			if let Ok(value) = lexical::parse::<i64, _>(text) {
				return Ok(Cell::Integer(value));
			}
			if let Some(value) = parse_finite(text) {
				return Ok(Cell::Real(value));
			}
			// A dash after the first character may separate the two bounds of a range.
			for (index, _) in text.match_indices('-').skip_while(|(index, _)| *index == 0) {
				let (left, right) = (&text[..index], &text[index + 1..]);
				if let (Some(a), Some(b)) = (parse_finite(left), parse_finite(right)) {
					return Ok(Cell::Interval(Interval::new(a, b)));
				}
			}
		}
		Ok(Cell::String(self.intern(text)))
	}
}

fn parse_finite(text: &str) -> Option<f64> {
	if !looks_numeric(text) {
		return None;
	}
	lexical::parse::<f64, _>(text)
		.ok()
		.and_then(|value| value.to_finite().ok())
		.map(|value| value.get())
}

fn looks_numeric(text: &str) -> bool {
	!text.is_empty()
		&& text
			.bytes()
			.all(|byte| byte.is_ascii_digit() || byte == b'+' || byte == b'-' || byte == b'.')
}

#[cfg(test)]
fn test_table() -> Table {
	Table {
		cells: Vec::new(),
		rows: 0,
		cols: 0,
		column_names: Vec::new(),
		strings: FnvHashSet::default(),
	}
}

#[test]
fn test_cell_grammar() {
	let mut table = test_table();
	let cells: Vec<Cell> = [
		"sunny", "85", "-3", "85.5", "$$$", "<70", ">70", "60-70", "70-60", "1e5",
	]
	.iter()
	.map(|text| table.parse_cell(text).unwrap())
	.collect();
	insta::assert_debug_snapshot!(cells, @r###"
 [
     String(
         "sunny",
     ),
     Integer(
         85,
     ),
     Integer(
         -3,
     ),
     Real(
         85.5,
     ),
     Integer(
         3,
     ),
     Interval(
         Interval {
             min: -inf,
             max: 70.0,
         },
     ),
     Interval(
         Interval {
             min: 70.0,
             max: inf,
         },
     ),
     Interval(
         Interval {
             min: 60.0,
             max: 70.0,
         },
     ),
     Interval(
         Interval {
             min: 60.0,
             max: 70.0,
         },
     ),
     String(
         "1e5",
     ),
 ]
 "###);
}

#[test]
fn test_cell_grammar_rejects_empty() {
	let mut table = test_table();
	assert!(table.parse_cell("").is_err());
}

#[test]
fn test_string_interning() {
	use std::sync::Arc;
	let mut table = test_table();
	let a = table.parse_cell("rain").unwrap();
	let b = table.parse_cell("rain").unwrap();
	match (a, b) {
		(Cell::String(a), Cell::String(b)) => assert!(Arc::ptr_eq(&a, &b)),
		_ => panic!("expected string cells"),
	}
}

#[test]
fn test_from_csv() {
	let csv = "outlook,temperature,play\nsunny,85,no\novercast,83.5,yes\n";
	let mut reader = csv::Reader::from_reader(std::io::Cursor::new(csv));
	let table = Table::from_csv(&mut reader).unwrap();
	assert_eq!(table.rows(), 2);
	assert_eq!(table.cols(), 3);
	assert_eq!(table.column_name(1), "temperature");
	assert_eq!(*table.cell(0, 1), Cell::Integer(85));
	assert_eq!(*table.cell(1, 1), Cell::Real(83.5));
	assert_eq!(table.cell(1, 0).as_string(), Some("overcast"));
}

#[test]
fn test_from_csv_ragged_row() {
	let csv = "a,b\n1,2\n3\n";
	let mut reader = csv::Reader::from_reader(std::io::Cursor::new(csv));
	assert!(Table::from_csv(&mut reader).is_err());
}

#[test]
fn test_promote_column() {
	let csv = "v,g\n5,a\n1.5,b\n0-3,c\n";
	let mut reader = csv::Reader::from_reader(std::io::Cursor::new(csv));
	let mut table = Table::from_csv(&mut reader).unwrap();
	table.promote_column(0).unwrap();
	assert_eq!(*table.cell(0, 0), Cell::Interval(Interval::below(5.0)));
	assert_eq!(*table.cell(1, 0), Cell::Interval(Interval::below(1.5)));
	assert_eq!(*table.cell(2, 0), Cell::Interval(Interval::new(0.0, 3.0)));
	assert!(table.promote_column(1).is_err());
	assert!(table.promote_column(2).is_err());
}

#[test]
fn test_selection_validate() {
	let csv = "a,b,c\n1,2,3\n4,5,6\n";
	let mut reader = csv::Reader::from_reader(std::io::Cursor::new(csv));
	let table = Table::from_csv(&mut reader).unwrap();
	let selection = Selection::all().validate(&table).unwrap();
	assert_eq!(selection.row_end, 2);
	assert_eq!(selection.col_end, 3);
	let inverted = Selection {
		row_beg: 2,
		row_end: 1,
		..Selection::all()
	};
	assert!(inverted.validate(&table).is_err());
	let out_of_range = Selection {
		row_beg: 5,
		..Selection::all()
	};
	assert!(out_of_range.validate(&table).is_err());
}
