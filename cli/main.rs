//! This module contains the main entrypoint to the arbor cli.

use anyhow::{bail, Context, Result};
use arbor_table::{Selection, Table};
use arbor_tree::{BuildOptions, Phase, Progress, Tree};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

mod config;
mod output;

#[derive(Parser)]
#[clap(about = "Infer a decision tree from a csv table and classify new rows with it.")]
struct Args {
	#[clap(
		short,
		long,
		help = "the path to the training csv, whose first row names the columns"
	)]
	data: PathBuf,
	#[clap(
		short,
		long,
		help = "the path to a headerless csv of rows to classify after training"
	)]
	samples: Option<PathBuf>,
	#[clap(
		short,
		long,
		help = "the zero based index of the column to predict; defaults to the last selected column"
	)]
	goal: Option<usize>,
	#[clap(short, long, help = "subsets with at most this many rows become leaves")]
	threshold: Option<usize>,
	#[clap(
		long,
		help = "comma separated indexes of columns to ignore during split selection"
	)]
	exclude: Option<String>,
	#[clap(
		long,
		help = "the sub rectangle to train on, e.g. r10-90,c0-4; either bound may be omitted"
	)]
	selection: Option<String>,
	#[clap(
		short,
		long,
		help = "the path to a yaml config file; command line flags take precedence"
	)]
	config: Option<PathBuf>,
	#[clap(long, help = "print the effective configuration before training")]
	show_config: bool,
	#[clap(long, help = "print the loaded table")]
	print_table: bool,
	#[clap(long, help = "print the built tree")]
	print_tree: bool,
	#[clap(
		long = "no-progress",
		parse(from_flag = std::ops::Not::not),
		help = "disable progress reporting"
	)]
	progress: bool,
}

fn main() {
	let args = Args::parse();
	if let Err(error) = run(args) {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn run(args: Args) -> Result<()> {
	let config = config::load(args.config.as_deref())?.unwrap_or_default();

	let selection = match args.selection.as_deref().or_else(|| config.selection.as_deref()) {
		Some(text) => parse_selection(text)?,
		None => Selection::all(),
	};

	let table = Table::from_path(&args.data)?;
	let selection = selection.validate(&table)?;
	let goal = args
		.goal
		.or(config.goal)
		.unwrap_or_else(|| selection.col_end.saturating_sub(1));
	let excluded_columns = match args.exclude.as_deref() {
		Some(text) => parse_excluded(text)?,
		None => config.exclude.clone().unwrap_or_default(),
	};

	let defaults = BuildOptions::default();
	let options = BuildOptions {
		threshold: args.threshold.or(config.threshold).unwrap_or(defaults.threshold),
		excluded_columns,
		integer_category_limit: config
			.integer_category_limit
			.unwrap_or(defaults.integer_category_limit),
		bins_count: config.bins_count.unwrap_or(defaults.bins_count),
	};

	if args.show_config {
		let samples = match &args.samples {
			Some(path) => path.display().to_string(),
			None => "(no file provided)".to_owned(),
		};
		let excluded = if options.excluded_columns.is_empty() {
			"(none)".to_owned()
		} else {
			options
				.excluded_columns
				.iter()
				.map(|column| column.to_string())
				.collect::<Vec<_>>()
				.join(", ")
		};
		println!("Config:");
		println!(" - data file: {}", args.data.display());
		println!(" - samples file: {}", samples);
		println!(
			" - selection: rows {}-{}; columns {}-{}",
			selection.row_beg, selection.row_end, selection.col_beg, selection.col_end
		);
		println!(" - goal column: {}", goal);
		println!(" - threshold: {}", options.threshold);
		println!(" - excluded columns: {}", excluded);
		println!();
	}

	if args.print_table {
		print!("{}", output::render_table(&table));
	}

	let show_progress = args.progress;
	let mut update_progress = |progress: Progress| {
		if show_progress {
			match progress.phase() {
				Phase::Encoding => eprintln!("{}", "encoding table...".dimmed()),
				Phase::Growing => eprintln!("{}", "growing tree...".dimmed()),
			}
		}
	};
	let tree = Tree::build(&table, &selection, goal, &options, &mut update_progress)?;

	if args.print_tree {
		print!("{}", tree);
	}

	if let Some(samples_path) = &args.samples {
		let mut samples = Table::samples_from_path(samples_path)?;
		let classes = tree.classify_table(&mut samples)?;
		let rows = classes
			.iter()
			.enumerate()
			.map(|(row, class)| {
				let label = match class {
					Some(class) => tree.class_label(*class),
					None => "(null)".to_owned(),
				};
				vec![row.to_string(), label]
			})
			.collect();
		print!(
			"{}",
			output::Grid::new(vec!["Row".to_owned(), "Class".to_owned()], rows)
		);
	}

	Ok(())
}

/// Parse a selection of the form `rX-Y,cX-Y`. Either bound of either range may be omitted to mean the start or end of the table, and inverted bounds are swapped.
fn parse_selection(text: &str) -> Result<Selection> {
	let mut selection = Selection::all();
	for part in text.split(',') {
		let mut chars = part.chars();
		let prefix = chars.next();
		let (beg, end) = parse_range(chars.as_str())?;
		match prefix {
			Some('r') => {
				selection.row_beg = beg;
				selection.row_end = end;
			}
			Some('c') => {
				selection.col_beg = beg;
				selection.col_end = end;
			}
			_ => bail!("invalid selection prefix in {:?}, expected `r` or `c`", part),
		}
	}
	if selection.row_beg > selection.row_end {
		std::mem::swap(&mut selection.row_beg, &mut selection.row_end);
	}
	if selection.col_beg > selection.col_end {
		std::mem::swap(&mut selection.col_beg, &mut selection.col_end);
	}
	Ok(selection)
}

fn parse_range(text: &str) -> Result<(usize, usize)> {
	let mut bounds = text.splitn(2, '-');
	let beg = match bounds.next() {
		None | Some("") => 0,
		Some(bound) => bound
			.parse()
			.with_context(|| format!("invalid selection bound {:?}", bound))?,
	};
	let end = match bounds.next() {
		None | Some("") => usize::MAX,
		Some(bound) => bound
			.parse()
			.with_context(|| format!("invalid selection bound {:?}", bound))?,
	};
	Ok((beg, end))
}

fn parse_excluded(text: &str) -> Result<Vec<usize>> {
	text.split(',')
		.filter(|part| !part.is_empty())
		.map(|part| {
			part.parse()
				.with_context(|| format!("invalid excluded column {:?}", part))
		})
		.collect()
}

#[test]
fn test_parse_selection() {
	assert_eq!(
		parse_selection("r1-4,c0-2").unwrap(),
		Selection {
			row_beg: 1,
			row_end: 4,
			col_beg: 0,
			col_end: 2,
		}
	);
	assert_eq!(
		parse_selection("r-4").unwrap(),
		Selection {
			row_beg: 0,
			row_end: 4,
			..Selection::all()
		}
	);
	assert_eq!(
		parse_selection("c2-").unwrap(),
		Selection {
			col_beg: 2,
			col_end: usize::MAX,
			..Selection::all()
		}
	);
	assert_eq!(
		parse_selection("r4-1").unwrap(),
		Selection {
			row_beg: 1,
			row_end: 4,
			..Selection::all()
		}
	);
	assert!(parse_selection("x1-2").is_err());
	assert!(parse_selection("r1-x").is_err());
}

#[test]
fn test_parse_excluded() {
	assert_eq!(parse_excluded("0,2,5").unwrap(), vec![0, 2, 5]);
	assert!(parse_excluded("0,x").is_err());
}
