//! Thin wrapper around the pip command line.
//!
//! Every function here runs pip synchronously with captured output; the
//! runtime calls them from `tokio::task::spawn_blocking` so the interface
//! thread never waits on a subprocess.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::state::{InstalledDetail, InstalledPackage};

/// Sentinel string pip and the index API use for unset metadata fields.
pub const UNKNOWN_SENTINEL: &str = "UNKNOWN";

/// Handle to a resolved pip executable.
#[derive(Clone, Debug)]
pub struct Pip {
    program: PathBuf,
    dry_run: bool,
}

impl Pip {
    /// Resolve the pip binary on `PATH`, preferring `pip3` over `pip`, or the
    /// explicit `override_cmd` when one was configured.
    pub fn resolve(override_cmd: Option<&str>, dry_run: bool) -> Result<Self> {
        let program = match override_cmd {
            Some(cmd) => which::which(cmd).map_err(|e| RegistryError::Execution {
                output: format!("{cmd}: {e}"),
            })?,
            None => which::which("pip3")
                .or_else(|_| which::which("pip"))
                .map_err(|e| RegistryError::Execution {
                    output: format!("no pip executable on PATH: {e}"),
                })?,
        };
        info!(program = %program.display(), dry_run, "resolved pip executable");
        Ok(Self { program, dry_run })
    }

    /// Build a wrapper around an explicit path without consulting `PATH`.
    #[must_use]
    pub const fn with_program(program: PathBuf, dry_run: bool) -> Self {
        Self { program, dry_run }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!(program = %self.program.display(), ?args, "running pip");
        let out = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| RegistryError::Execution {
                output: format!("failed to run {}: {e}", self.program.display()),
            })?;
        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
        if !out.status.success() {
            text.push_str(&String::from_utf8_lossy(&out.stderr));
            return Err(RegistryError::Execution { output: text });
        }
        Ok(text)
    }

    /// Run a state-changing subcommand, honoring dry-run mode.
    fn run_mutating(&self, args: &[&str]) -> Result<String> {
        if self.dry_run {
            info!(?args, "dry run, skipping pip command");
            return Ok(format!("dry run: pip {}", args.join(" ")));
        }
        self.run(args)
    }

    /// List installed packages via `pip list`.
    pub fn list_installed(&self) -> Result<Vec<InstalledPackage>> {
        let text = self.run(&["list"])?;
        parse_list_output(&text)
    }

    /// Fetch and normalize metadata for one installed package via
    /// `pip show <name>`.
    pub fn installed_detail(&self, name: &str) -> Result<InstalledDetail> {
        let text = self.run(&["show", name])?;
        let fields = parse_show_output(&text)?;
        Ok(normalize_show_fields(name, fields))
    }

    /// `pip install <name>`, returning the captured output.
    pub fn install(&self, name: &str) -> Result<String> {
        self.run_mutating(&["install", name])
    }

    /// `pip uninstall -y <name>`, returning the captured output.
    pub fn uninstall(&self, name: &str) -> Result<String> {
        self.run_mutating(&["uninstall", "-y", name])
    }

    /// `pip install --upgrade <name>`, returning the captured output.
    pub fn upgrade(&self, name: &str) -> Result<String> {
        self.run_mutating(&["install", "--upgrade", name])
    }

    /// Upgrade pip itself via `pip install --upgrade pip`.
    pub fn upgrade_pip(&self) -> Result<String> {
        self.run_mutating(&["install", "--upgrade", "pip"])
    }
}

/// Parse the output of `pip list`: two header lines, then one
/// `<name> <version>` line per package, with an optional trailing blank line.
pub fn parse_list_output(text: &str) -> Result<Vec<InstalledPackage>> {
    let mut rows = Vec::new();
    for line in text.lines().skip(2) {
        if line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let (Some(name), Some(version)) = (tokens.next(), tokens.next()) else {
            return Err(RegistryError::Parse(format!(
                "unexpected pip list line: {line:?}"
            )));
        };
        rows.push(InstalledPackage {
            name: name.to_string(),
            version: version.to_string(),
        });
    }
    Ok(rows)
}

/// Parse `pip show` output into its raw `Key: Value` mapping.
pub fn parse_show_output(text: &str) -> Result<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(": ").or_else(|| {
            // A field with no value prints as "Key:" with nothing after it.
            line.strip_suffix(':').map(|k| (k, ""))
        }) else {
            return Err(RegistryError::Parse(format!(
                "unexpected pip show line: {line:?}"
            )));
        };
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

/// Normalize the raw `pip show` mapping into an [`InstalledDetail`].
///
/// `Requires` and `Required-by` become lists (empty string maps to an empty
/// list, not `[""]`), `Location` is dropped, and any field carrying the
/// `UNKNOWN` sentinel becomes absent.
#[must_use]
pub fn normalize_show_fields(
    requested: &str,
    mut fields: BTreeMap<String, String>,
) -> InstalledDetail {
    let requirements = split_name_list(&fields.remove("Requires").unwrap_or_default());
    let required_by = split_name_list(&fields.remove("Required-by").unwrap_or_default());
    fields.remove("Location");

    let name = fields
        .remove("Name")
        .unwrap_or_else(|| requested.to_string());
    let version = fields.remove("Version").unwrap_or_default();
    let author = normalize_value(fields.remove("Author"));
    let author_email = normalize_value(fields.remove("Author-email"));
    let home_page = normalize_value(fields.remove("Home-page"));
    let license = normalize_value(fields.remove("License"));
    let summary = normalize_value(fields.remove("Summary"));

    InstalledDetail {
        name,
        version,
        author,
        author_email,
        home_page,
        license,
        summary,
        requirements,
        required_by,
    }
}

/// Split a comma-separated name list; the empty string is an empty list.
fn split_name_list(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        Vec::new()
    } else {
        value.split(", ").map(|s| s.trim().to_string()).collect()
    }
}

/// Map empty strings and the `UNKNOWN` sentinel to absent.
fn normalize_value(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != UNKNOWN_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// What: `pip list` parsing skips headers and the trailing blank line
    ///
    /// - Input: Two header lines, one data line, one blank line
    /// - Output: A single (name, version) row
    #[test]
    fn list_parsing_skips_headers_and_trailing_blank() {
        let raw = "Package    Version\n---------- -------\nrequests   2.28.1\n";
        let rows = parse_list_output(raw).expect("parses");
        assert_eq!(
            rows,
            vec![InstalledPackage {
                name: "requests".into(),
                version: "2.28.1".into(),
            }]
        );
    }

    /// What: A data line without a version token is a parse error
    ///
    /// - Input: Line with a single token after the headers
    /// - Output: `RegistryError::Parse`
    #[test]
    fn list_parsing_rejects_malformed_line() {
        let raw = "Package Version\n------- -------\nloner\n";
        let err = parse_list_output(raw).expect_err("must fail");
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    /// What: `pip show` normalization of list fields and the sentinel
    ///
    /// - Input: Empty `Requires`, two-name `Required-by`, `License: UNKNOWN`
    /// - Output: Empty requirements, split required-by, absent license
    #[test]
    fn show_normalization_handles_lists_and_sentinel() {
        let raw = "Name: pytest\nVersion: 7.1.2\nSummary: simple testing\nAuthor: Holger Krekel\nAuthor-email: holger@example.org\nHome-page: https://pytest.org\nLicense: UNKNOWN\nLocation: /usr/lib/python3/site-packages\nRequires: \nRequired-by: a, b\n";
        let fields = parse_show_output(raw).expect("parses");
        let detail = normalize_show_fields("pytest", fields);
        assert_eq!(detail.name, "pytest");
        assert_eq!(detail.version, "7.1.2");
        assert!(detail.requirements.is_empty());
        assert_eq!(detail.required_by, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(detail.license, None);
        assert_eq!(detail.summary.as_deref(), Some("simple testing"));
        assert_eq!(detail.home_page.as_deref(), Some("https://pytest.org"));
    }

    /// What: The install location never reaches the detail struct
    ///
    /// - Input: Show output containing a `Location` field
    /// - Output: Location is dropped during normalization
    #[test]
    fn show_normalization_drops_location() {
        let raw = "Name: wheel\nVersion: 0.38.0\nLocation: /tmp/site-packages\nRequires: \nRequired-by: \n";
        let fields = parse_show_output(raw).expect("parses");
        assert!(fields.contains_key("Location"));
        let detail = normalize_show_fields("wheel", fields);
        assert!(detail.required_by.is_empty());
        assert!(detail.requirements.is_empty());
    }

    /// What: A line without the `Key: Value` shape is a parse error
    ///
    /// - Input: Free-form text among the fields
    /// - Output: `RegistryError::Parse`
    #[test]
    fn show_parsing_rejects_unexpected_line() {
        let raw = "Name: x\nthis is not a field\n";
        let err = parse_show_output(raw).expect_err("must fail");
        assert!(matches!(err, RegistryError::Parse(_)));
    }

    /// What: Bare "Key:" lines parse as empty values
    ///
    /// - Input: `License:` with no trailing space
    /// - Output: Field present with empty value, normalized to absent
    #[test]
    fn show_parsing_accepts_bare_key_lines() {
        let raw = "Name: x\nVersion: 1.0\nLicense:\nRequires: \nRequired-by: \n";
        let fields = parse_show_output(raw).expect("parses");
        let detail = normalize_show_fields("x", fields);
        assert_eq!(detail.license, None);
    }
}
