//! Rendering Poetry dependency declarations as PEP 508 requirements.
//!
//! Poetry accepts its own constraint dialect on top of PEP 440 (`^1.2`, `~1.2`,
//! bare versions, space-separated clauses). Everything here maps that dialect
//! onto specifier sets and environment markers that PEP 621 tooling accepts.

use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

use thiserror::Error;
use uv_normalize::{ExtraName, InvalidNameError, PackageName};
use uv_pep440::Version;
use uv_pep508::MarkerTree;
use version_ranges::Ranges;

/// Errors raised while translating a Poetry constraint.
#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("`{0}` is a union of disjoint version ranges, which a PEP 440 specifier set cannot express")]
    Union(String),
    #[error("`{0}` is not a valid version")]
    InvalidVersion(String),
    #[error("`{marker}` is not a valid marker: {message}")]
    InvalidMarker { marker: String, message: String },
}

/// Operators in match order: longer operators must be tried first.
const OPERATORS: &[&str] = &["===", "~=", "==", "!=", ">=", "<=", ">", "<", "^", "~", "="];

/// A single PEP 440 clause, such as `>=1.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    operator: &'static str,
    version: String,
}

impl Specifier {
    fn new(operator: &'static str, version: impl Into<String>) -> Self {
        Self {
            operator,
            version: version.into(),
        }
    }

    /// Render the clause as a marker expression on the running interpreter.
    ///
    /// Three-component versions compare against `python_full_version`, shorter
    /// ones against `python_version`.
    fn to_python_marker(&self) -> String {
        if let Some(prefix) = self.version.strip_suffix(".*") {
            return format!("python_version {} '{prefix}'", self.operator);
        }
        let variable = if release(&self.version).len() >= 3 {
            "python_full_version"
        } else {
            "python_version"
        };
        format!("{variable} {} '{}'", self.operator, self.version)
    }

    /// The versions the clause admits, for clauses that bound a plain range.
    ///
    /// Wildcards, `~=` and `===` have no range form here.
    fn to_range(&self) -> Option<Ranges<Version>> {
        let version = Version::from_str(&self.version).ok()?;
        let range = match self.operator {
            ">=" => Ranges::higher_than(version),
            ">" => Ranges::strictly_higher_than(version),
            "<=" => Ranges::lower_than(version),
            "<" => Ranges::strictly_lower_than(version),
            "==" => Ranges::singleton(version),
            "!=" => Ranges::singleton(version).complement(),
            _ => return None,
        };
        Some(range)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

/// Normalize a package name per PEP 503.
pub fn normalize_name(name: &str) -> Result<String, InvalidNameError> {
    Ok(PackageName::from_str(name.trim())?.to_string())
}

/// Normalize an extra name.
pub fn normalize_extra(extra: &str) -> Result<String, InvalidNameError> {
    Ok(ExtraName::from_str(extra.trim())?.to_string())
}

/// Extract the package name from a requirement-like string such as
/// `requests[security]>=2.0`.
pub fn requirement_name(requirement: &str) -> &str {
    let requirement = requirement.trim();
    let end = requirement
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(requirement.len());
    &requirement[..end]
}

/// Parse a single Poetry constraint, without `||` alternatives, into PEP 440
/// clauses.
///
/// `*` and the empty string mean "any version" and yield no clauses.
pub fn parse_constraint(constraint: &str) -> Result<Vec<Specifier>, ConstraintError> {
    let constraint = constraint.trim();
    if constraint.contains('|') {
        return Err(ConstraintError::Union(constraint.to_owned()));
    }

    let mut specifiers = Vec::new();
    for clause in clauses(constraint) {
        if clause == "*" {
            continue;
        }
        let (operator, version) = split_operator(&clause);
        let version = version.trim();
        if version == "*" && matches!(operator, "" | "=" | "==") {
            continue;
        }
        let base = version.strip_suffix(".*").unwrap_or(version);
        if Version::from_str(base).is_err() {
            return Err(ConstraintError::InvalidVersion(clause.clone()));
        }
        match operator {
            "^" => {
                let upper = bump(version, caret_index(version)?)?;
                specifiers.push(Specifier::new(">=", version));
                specifiers.push(Specifier::new("<", upper));
            }
            "~" => {
                let parts = release(version);
                if parts.is_empty() {
                    return Err(ConstraintError::InvalidVersion(version.to_owned()));
                }
                let index = usize::from(parts.len() > 1);
                specifiers.push(Specifier::new(">=", version));
                specifiers.push(Specifier::new("<", bump(version, index)?));
            }
            "" | "=" | "==" => specifiers.push(Specifier::new("==", version)),
            operator => specifiers.push(Specifier::new(operator, version)),
        }
    }
    Ok(specifiers)
}

/// Render a Poetry constraint as a comma-separated PEP 440 specifier set.
///
/// The alternatives of a union are merged when they overlap or touch, so
/// `^1.10 || ^2.0` becomes `>=1.10,<3.0`. A union that leaves a gap is an
/// error.
pub fn to_pep440(constraint: &str) -> Result<String, ConstraintError> {
    let branches: Vec<&str> = split_union(constraint).collect();
    match branches.as_slice() {
        [] => Ok(String::new()),
        [branch] => Ok(join_specifiers(&parse_constraint(branch)?)),
        branches => merge_union(constraint, branches),
    }
}

/// Render a Poetry `python` restriction as a marker.
///
/// Unions are allowed here since markers can express disjunctions.
pub fn python_marker(constraint: &str) -> Result<MarkerTree, ConstraintError> {
    any_of(split_union(constraint).map(|branch| -> Result<MarkerTree, ConstraintError> {
        let mut conjunction = MarkerTree::TRUE;
        for specifier in parse_constraint(branch)? {
            conjunction.and(parse_marker(&specifier.to_python_marker())?);
        }
        Ok(conjunction)
    }))
}

/// Render a Poetry `platform` restriction as a `sys_platform` marker.
pub fn platform_marker(platform: &str) -> Result<MarkerTree, ConstraintError> {
    any_of(
        split_union(platform).map(|platform| parse_marker(&format!("sys_platform == '{platform}'"))),
    )
}

/// Parse a PEP 508 marker expression.
pub fn parse_marker(marker: &str) -> Result<MarkerTree, ConstraintError> {
    MarkerTree::from_str(marker).map_err(|err| ConstraintError::InvalidMarker {
        marker: marker.to_owned(),
        message: err.to_string(),
    })
}

/// Assemble a PEP 508 requirement from its parts.
pub fn format_requirement(
    name: &str,
    extras: &[String],
    specifiers: &str,
    marker: MarkerTree,
) -> String {
    let mut requirement = String::from(name);
    if !extras.is_empty() {
        requirement.push('[');
        requirement.push_str(&extras.join(","));
        requirement.push(']');
    }
    requirement.push_str(specifiers);
    if let Some(marker) = marker.try_to_string() {
        requirement.push_str("; ");
        requirement.push_str(&marker);
    }
    requirement
}

/// The disjunction of `alternatives`; no alternatives at all means any
/// environment.
fn any_of(
    alternatives: impl Iterator<Item = Result<MarkerTree, ConstraintError>>,
) -> Result<MarkerTree, ConstraintError> {
    let mut alternatives = alternatives.peekable();
    if alternatives.peek().is_none() {
        return Ok(MarkerTree::TRUE);
    }
    let mut marker = MarkerTree::FALSE;
    for alternative in alternatives {
        marker.or(alternative?);
    }
    Ok(marker)
}

/// Merge the alternatives of a union into one specifier set.
fn merge_union(constraint: &str, branches: &[&str]) -> Result<String, ConstraintError> {
    let union_error = || ConstraintError::Union(constraint.to_owned());

    let mut merged = Ranges::empty();
    for branch in branches {
        let mut range = Ranges::full();
        for specifier in parse_constraint(branch)? {
            range = range.intersection(&specifier.to_range().ok_or_else(union_error)?);
        }
        merged = merged.union(&range);
    }

    let mut segments = merged.iter();
    let (Some((lower, upper)), None) = (segments.next(), segments.next()) else {
        return Err(union_error());
    };
    Ok(join_specifiers(&segment_specifiers(lower, upper)))
}

fn segment_specifiers(lower: &Bound<Version>, upper: &Bound<Version>) -> Vec<Specifier> {
    if let (Bound::Included(low), Bound::Included(high)) = (lower, upper) {
        if low == high {
            return vec![Specifier::new("==", low.to_string())];
        }
    }
    let mut specifiers = Vec::new();
    match lower {
        Bound::Included(version) => specifiers.push(Specifier::new(">=", version.to_string())),
        Bound::Excluded(version) => specifiers.push(Specifier::new(">", version.to_string())),
        Bound::Unbounded => {}
    }
    match upper {
        Bound::Included(version) => specifiers.push(Specifier::new("<=", version.to_string())),
        Bound::Excluded(version) => specifiers.push(Specifier::new("<", version.to_string())),
        Bound::Unbounded => {}
    }
    specifiers
}

fn join_specifiers(specifiers: &[Specifier]) -> String {
    specifiers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn split_union(constraint: &str) -> impl Iterator<Item = &str> {
    constraint
        .split("||")
        .flat_map(|part| part.split('|'))
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// Split a constraint into clauses, gluing detached operators (`>= 1.0`) back
/// onto their versions.
fn clauses(constraint: &str) -> Vec<String> {
    let mut clauses: Vec<String> = Vec::new();
    let mut pending: Option<&str> = None;
    for token in constraint.split([',', ' ', '\t']).filter(|t| !t.is_empty()) {
        if let Some(operator) = pending.take() {
            clauses.push(format!("{operator}{token}"));
        } else if OPERATORS.contains(&token) {
            pending = Some(token);
        } else {
            clauses.push(token.to_owned());
        }
    }
    if let Some(operator) = pending {
        clauses.push(operator.to_owned());
    }
    clauses
}

fn split_operator(clause: &str) -> (&'static str, &str) {
    for operator in OPERATORS {
        if let Some(version) = clause.strip_prefix(operator) {
            return (operator, version);
        }
    }
    ("", clause)
}

/// The numeric release components of a version (`1.2.3rc1` -> `[1, 2, 3]`).
fn release(version: &str) -> Vec<u64> {
    let end = version
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(version.len());
    version[..end]
        .split('.')
        .map_while(|part| part.parse().ok())
        .collect()
}

/// Index of the component a caret constraint may not change: the leftmost
/// non-zero one, or the last one given.
fn caret_index(version: &str) -> Result<usize, ConstraintError> {
    let parts = release(version);
    let index = match parts.as_slice() {
        [] => return Err(ConstraintError::InvalidVersion(version.to_owned())),
        [major, ..] if *major > 0 => 0,
        [_] => 0,
        [_, minor, ..] if *minor > 0 => 1,
        [_, _] => 1,
        _ => 2,
    };
    Ok(index)
}

/// Increment the release component at `index` and zero the ones after it,
/// keeping the precision of the input (at most three components).
fn bump(version: &str, index: usize) -> Result<String, ConstraintError> {
    let parts = release(version);
    if parts.is_empty() {
        return Err(ConstraintError::InvalidVersion(version.to_owned()));
    }
    let precision = parts.len().min(3).max(index + 1);
    let bumped = (0..precision)
        .map(|position| match position.cmp(&index) {
            std::cmp::Ordering::Less => parts.get(position).copied().unwrap_or(0),
            std::cmp::Ordering::Equal => parts.get(position).copied().unwrap_or(0) + 1,
            std::cmp::Ordering::Greater => 0,
        })
        .map(|part| part.to_string())
        .collect::<Vec<_>>();
    Ok(bumped.join("."))
}
