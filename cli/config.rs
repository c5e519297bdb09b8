/*!
This module defines the optional yaml config file. Every field mirrors a command line flag; flags take precedence over the file.
*/

use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Default, serde::Deserialize)]
pub struct Config {
	pub goal: Option<usize>,
	pub threshold: Option<usize>,
	pub exclude: Option<Vec<usize>>,
	pub selection: Option<String>,
	pub integer_category_limit: Option<usize>,
	pub bins_count: Option<usize>,
}

pub fn load(path: Option<&Path>) -> Result<Option<Config>> {
	if let Some(path) = path {
		let config = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read config file {}", path.display()))?;
		let config = serde_yaml::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", path.display()))?;
		Ok(Some(config))
	} else {
		Ok(None)
	}
}
