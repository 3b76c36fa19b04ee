// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret loading with the `*_FILE` convention used by Docker and
//! Kubernetes secrets.

use std::path::PathBuf;
use std::{env, fs};

use thiserror::Error;

use cadence_common_secret::SecretString;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load `var` from the process environment. `{var}_FILE`, when set, names a
/// file holding the value and takes precedence.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	load_secret_with(var, |name| env::var(name).ok())
}

pub(crate) fn load_secret_with<F>(var: &str, lookup: F) -> Result<Option<SecretString>, SecretEnvError>
where
	F: Fn(&str) -> Option<String>,
{
	let file_var = format!("{var}_FILE");

	if let Some(path_str) = lookup(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|e| SecretEnvError::Io {
			path: path.clone(),
			source: e,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(secret)));
	}

	Ok(lookup(var)
		.filter(|value| !value.is_empty())
		.map(SecretString::new))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn lookup(vars: &HashMap<String, String>) -> impl Fn(&str) -> Option<String> + '_ {
		move |name| vars.get(name).cloned()
	}

	#[test]
	fn reads_plain_variable() {
		let vars = HashMap::from([("TOKEN".to_string(), "plain".to_string())]);
		let secret = load_secret_with("TOKEN", lookup(&vars)).unwrap().unwrap();
		assert_eq!(secret.expose(), "plain");
	}

	#[test]
	fn file_takes_precedence_and_trailing_newline_is_stripped() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		let vars = HashMap::from([
			("TOKEN".to_string(), "plain".to_string()),
			(
				"TOKEN_FILE".to_string(),
				file.path().to_string_lossy().into_owned(),
			),
		]);
		let secret = load_secret_with("TOKEN", lookup(&vars)).unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");
	}

	#[test]
	fn empty_file_path_is_an_error() {
		let vars = HashMap::from([("TOKEN_FILE".to_string(), String::new())]);
		assert!(matches!(
			load_secret_with("TOKEN", lookup(&vars)),
			Err(SecretEnvError::EmptyPath { .. })
		));
	}

	#[test]
	fn missing_file_is_an_error() {
		let vars = HashMap::from([(
			"TOKEN_FILE".to_string(),
			"/nonexistent/cadence/token".to_string(),
		)]);
		assert!(matches!(
			load_secret_with("TOKEN", lookup(&vars)),
			Err(SecretEnvError::Io { .. })
		));
	}

	#[test]
	fn unset_is_none() {
		let vars = HashMap::new();
		assert!(load_secret_with("TOKEN", lookup(&vars)).unwrap().is_none());
	}
}
