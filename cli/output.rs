/*!
Plain text grid rendering for the `--print-table` diagnostic and the samples output.
*/

use arbor_table::Table;
use itertools::izip;
use std::fmt;

pub struct Grid {
	header: Vec<String>,
	rows: Vec<Vec<String>>,
}

impl Grid {
	pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
		Self { header, rows }
	}
}

pub fn render_table(table: &Table) -> Grid {
	let header = table.column_names().to_vec();
	let rows = (0..table.rows())
		.map(|row| table.row(row).iter().map(|cell| cell.to_string()).collect())
		.collect();
	Grid::new(header, rows)
}

impl fmt::Display for Grid {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut column_widths: Vec<usize> = self.header.iter().map(|name| name.len()).collect();
		for row in self.rows.iter() {
			for (column_width, value) in izip!(column_widths.iter_mut(), row.iter()) {
				*column_width = usize::max(*column_width, value.len());
			}
		}
		write_row(f, &column_widths, &self.header)?;
		write_line(f, &column_widths)?;
		for row in self.rows.iter() {
			write_row(f, &column_widths, row)?;
		}
		Ok(())
	}
}

fn write_line(f: &mut fmt::Formatter<'_>, column_widths: &[usize]) -> fmt::Result {
	write!(f, "|")?;
	for column_width in column_widths.iter() {
		for _ in 0..column_width + 2 {
			write!(f, "-")?;
		}
		write!(f, "|")?;
	}
	writeln!(f)
}

fn write_row(f: &mut fmt::Formatter<'_>, column_widths: &[usize], values: &[String]) -> fmt::Result {
	write!(f, "|")?;
	for (column_width, value) in izip!(column_widths.iter(), values.iter()) {
		write!(f, " {:width$} |", value, width = *column_width)?;
	}
	writeln!(f)
}
