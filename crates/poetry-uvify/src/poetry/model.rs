//! Data model for Poetry projects.
//!
//! [`PoetrySection`] mirrors the `[tool.poetry]` TOML schema and is filled in
//! by serde. [`PoetryPackage`] is the resolved view the converter works on:
//! dependencies grouped by name, extras pointing at their member
//! dependencies, and the python constraint split out of the main group.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use toml_edit::DocumentMut;
use tracing::{debug, warn};
use uv_pep508::MarkerTree;

use crate::poetry::convert::{ConvertError, MAIN_GROUP};
use crate::poetry::requirement::{
    self, format_requirement, normalize_extra, normalize_name, parse_marker, platform_marker,
    python_marker, requirement_name,
};

/// Name of the legacy dev-dependencies group.
const DEV_GROUP: &str = "dev";

/// Errors raised while loading a Poetry project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to parse `pyproject.toml`")]
    Toml(#[from] toml_edit::TomlError),
    #[error("failed to read the `[tool.poetry]` table")]
    Deserialize(#[from] toml_edit::de::Error),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// A `pyproject.toml` holding a Poetry project.
#[derive(Debug, Clone)]
pub struct PoetryProject {
    /// Path to the `pyproject.toml`.
    pub path: PathBuf,
    /// The format-preserving document.
    pub document: DocumentMut,
    /// The package described by `[tool.poetry]`.
    pub package: PoetryPackage,
}

impl PoetryProject {
    /// Load a Poetry project from the given `pyproject.toml`.
    pub fn from_path(path: &Path) -> Result<Self, ProjectError> {
        let content = fs_err::read_to_string(path)?;
        Self::from_string(path.to_path_buf(), &content)
    }

    /// Parse a Poetry project from the contents of a `pyproject.toml`.
    pub fn from_string(path: PathBuf, content: &str) -> Result<Self, ProjectError> {
        let document = content.parse::<DocumentMut>()?;
        let pyproject: PyProjectToml = toml_edit::de::from_str(content)?;
        let section = pyproject
            .tool
            .and_then(|tool| tool.poetry)
            .ok_or(ConvertError::MissingSection("tool.poetry"))?;
        let package = PoetryPackage::from_section(section)?;
        debug!(
            "Loaded `{}` with {} dependency group(s) and {} extra(s)",
            package.name,
            package.dependency_groups.len(),
            package.extras.len()
        );
        Ok(Self {
            path,
            document,
            package,
        })
    }

    /// The directory containing the `pyproject.toml`.
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}

#[derive(Debug, Deserialize)]
struct PyProjectToml {
    tool: Option<Tool>,
}

#[derive(Debug, Deserialize)]
struct Tool {
    poetry: Option<PoetrySection>,
}

/// The `[tool.poetry]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PoetrySection {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub description: String,
    pub readme: Option<Readme>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub maintainers: Vec<String>,

    /// The main group, including the `python` constraint.
    #[serde(default)]
    pub dependencies: IndexMap<String, DependencySpec>,

    /// Legacy spelling of `[tool.poetry.group.dev.dependencies]`.
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, DependencySpec>,

    #[serde(default)]
    pub group: IndexMap<String, GroupSection>,

    /// Extra name to the names of the dependencies it enables.
    #[serde(default)]
    pub extras: IndexMap<String, Vec<String>>,
}

/// A `readme` entry: Poetry accepts one path or a list of paths.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Readme {
    Single(PathBuf),
    Multiple(Vec<PathBuf>),
}

/// A `[tool.poetry.group.<name>]` table.
#[derive(Debug, Default, Deserialize)]
pub struct GroupSection {
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub dependencies: IndexMap<String, DependencySpec>,
}

/// A dependency declaration.
///
/// Poetry dependencies are a version string (`"^2.0"`), a table with extended
/// fields, or a list of such tables with one entry per environment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// `requests = "^2.0"`.
    Simple(String),

    /// `requests = { version = "^2.0", extras = ["socks"] }`.
    Detailed(DependencyDetail),

    /// `numpy = [{ version = "<1.25", python = "<3.9" }, { version = "^1.25", python = ">=3.9" }]`.
    Multiple(Vec<DependencyDetail>),
}

/// Extended dependency fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyDetail {
    pub version: Option<String>,
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub optional: bool,
    pub python: Option<String>,
    pub platform: Option<String>,
    pub markers: Option<String>,

    /// Name of a `[[tool.poetry.source]]` to install from.
    pub source: Option<String>,

    pub git: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub rev: Option<String>,
    pub subdirectory: Option<String>,

    pub path: Option<String>,
    #[serde(default)]
    pub develop: bool,

    pub url: Option<String>,
}

/// A git branch, tag or commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitReference {
    Branch(String),
    Tag(String),
    Rev(String),
}

/// Where a dependency is installed from, when it is not the default index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// A named package index.
    Index(String),
    Git {
        url: String,
        reference: Option<GitReference>,
        subdirectory: Option<String>,
    },
    Path {
        path: String,
        editable: bool,
    },
    Url(String),
}

/// A single resolved dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// The name as written in `pyproject.toml`.
    pub pretty_name: String,
    /// The PEP 503 normalized name.
    pub name: String,
    pub constraint: String,
    pub extras: Vec<String>,
    pub optional: bool,
    pub python: Option<String>,
    pub platform: Option<String>,
    pub markers: Option<String>,
    pub source: Option<DependencySource>,
}

impl Dependency {
    /// Expand a declaration into dependencies; lists of tables produce one
    /// dependency per entry.
    fn from_spec(pretty_name: &str, spec: DependencySpec) -> Result<Vec<Self>, ConvertError> {
        match spec {
            DependencySpec::Simple(constraint) => Ok(vec![Self {
                pretty_name: pretty_name.to_owned(),
                name: package_name(pretty_name)?,
                constraint,
                extras: Vec::new(),
                optional: false,
                python: None,
                platform: None,
                markers: None,
                source: None,
            }]),
            DependencySpec::Detailed(detail) => Ok(vec![Self::from_detail(pretty_name, detail)?]),
            DependencySpec::Multiple(details) => details
                .into_iter()
                .map(|detail| Self::from_detail(pretty_name, detail))
                .collect(),
        }
    }

    fn from_detail(pretty_name: &str, detail: DependencyDetail) -> Result<Self, ConvertError> {
        let source = if let Some(url) = detail.git {
            let reference = detail
                .branch
                .map(GitReference::Branch)
                .or(detail.tag.map(GitReference::Tag))
                .or(detail.rev.map(GitReference::Rev));
            Some(DependencySource::Git {
                url,
                reference,
                subdirectory: detail.subdirectory,
            })
        } else if let Some(path) = detail.path {
            Some(DependencySource::Path {
                path,
                editable: detail.develop,
            })
        } else if let Some(url) = detail.url {
            Some(DependencySource::Url(url))
        } else {
            detail.source.map(DependencySource::Index)
        };

        Ok(Self {
            pretty_name: pretty_name.to_owned(),
            name: package_name(pretty_name)?,
            constraint: detail.version.unwrap_or_else(|| "*".to_owned()),
            extras: detail
                .extras
                .iter()
                .map(|extra| {
                    normalize_extra(extra).map_err(|source| ConvertError::InvalidName {
                        name: extra.clone(),
                        source,
                    })
                })
                .collect::<Result<_, _>>()?,
            optional: detail.optional,
            python: detail.python,
            platform: detail.platform,
            markers: detail.markers,
            source,
        })
    }

    /// Render the dependency as a PEP 508 requirement.
    ///
    /// Git, path and URL dependencies carry no version here; their location is
    /// emitted separately as a uv source.
    pub fn to_pep508(&self) -> Result<String, ConvertError> {
        let constraint_error = |source| ConvertError::Constraint {
            name: self.pretty_name.clone(),
            source,
        };

        let specifiers = match self.source {
            None | Some(DependencySource::Index(_)) => {
                requirement::to_pep440(&self.constraint).map_err(constraint_error)?
            }
            Some(_) => String::new(),
        };

        let mut marker = MarkerTree::TRUE;
        if let Some(python) = &self.python {
            marker.and(python_marker(python).map_err(constraint_error)?);
        }
        if let Some(platform) = &self.platform {
            marker.and(platform_marker(platform).map_err(constraint_error)?);
        }
        if let Some(markers) = &self.markers {
            marker.and(parse_marker(markers).map_err(constraint_error)?);
        }

        Ok(format_requirement(
            &self.pretty_name,
            &self.extras,
            &specifiers,
            marker,
        ))
    }
}

/// A Poetry package, resolved from `[tool.poetry]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoetryPackage {
    pub name: String,
    pub version: String,
    pub description: String,
    /// The `python` entry of the main group, if any.
    pub python_constraint: Option<String>,
    /// Relative to the project root.
    pub readme: Option<PathBuf>,
    pub authors: Vec<String>,
    pub maintainers: Vec<String>,
    /// Group name to dependencies. The main group is always present and first.
    pub dependency_groups: IndexMap<String, Vec<Dependency>>,
    /// Normalized extra name to the main group dependencies it enables.
    pub extras: IndexMap<String, Vec<Dependency>>,
}

impl PoetryPackage {
    /// Resolve a deserialized `[tool.poetry]` table.
    pub fn from_section(section: PoetrySection) -> Result<Self, ConvertError> {
        let name = package_name(&section.name.ok_or(ConvertError::MissingField("name"))?)?;
        let version = section
            .version
            .ok_or(ConvertError::MissingField("version"))?;

        let mut python_constraint = None;
        let mut main = Vec::new();
        for (pretty_name, spec) in section.dependencies {
            if pretty_name.eq_ignore_ascii_case("python") {
                if let DependencySpec::Simple(constraint) = spec {
                    python_constraint = Some(constraint);
                } else {
                    warn!("Ignoring non-string `python` constraint in `[tool.poetry.dependencies]`");
                }
                continue;
            }
            main.extend(Dependency::from_spec(&pretty_name, spec)?);
        }

        let mut dependency_groups = IndexMap::new();
        dependency_groups.insert(MAIN_GROUP.to_owned(), main);
        for (group_name, group) in section.group {
            if group.optional {
                debug!("Group `{group_name}` is optional in Poetry; converting it as a regular group");
            }
            let dependencies = dependency_groups.entry(group_name).or_insert_with(Vec::new);
            for (pretty_name, spec) in group.dependencies {
                dependencies.extend(Dependency::from_spec(&pretty_name, spec)?);
            }
        }
        if !section.dev_dependencies.is_empty() {
            let dependencies = dependency_groups
                .entry(DEV_GROUP.to_owned())
                .or_insert_with(Vec::new);
            for (pretty_name, spec) in section.dev_dependencies {
                dependencies.extend(Dependency::from_spec(&pretty_name, spec)?);
            }
        }

        let extras = resolve_extras(section.extras, &dependency_groups[MAIN_GROUP])?;

        let readme = section.readme.and_then(|readme| match readme {
            Readme::Single(path) => Some(path),
            Readme::Multiple(paths) => {
                if paths.len() > 1 {
                    warn!("`[project]` accepts a single readme; using the first of {}", paths.len());
                }
                paths.into_iter().next()
            }
        });

        Ok(Self {
            name,
            version,
            description: section.description,
            python_constraint,
            readme,
            authors: section.authors,
            maintainers: section.maintainers,
            dependency_groups,
            extras,
        })
    }
}

/// Map each extra to the main group dependencies it names.
fn resolve_extras(
    extras: IndexMap<String, Vec<String>>,
    main: &[Dependency],
) -> Result<IndexMap<String, Vec<Dependency>>, ConvertError> {
    let mut resolved = IndexMap::with_capacity(extras.len());
    for (extra, requirements) in extras {
        let mut members = Vec::new();
        for requirement in &requirements {
            let name = package_name(requirement_name(requirement))?;
            let before = members.len();
            members.extend(main.iter().filter(|dep| dep.name == name).cloned());
            if members.len() == before {
                warn!("Extra `{extra}` references `{requirement}`, which is not a main dependency");
            }
        }
        let key = normalize_extra(&extra).map_err(|source| ConvertError::InvalidName {
            name: extra.clone(),
            source,
        })?;
        resolved.insert(key, members);
    }
    Ok(resolved)
}

/// The canonical form of a package name.
fn package_name(name: &str) -> Result<String, ConvertError> {
    normalize_name(name).map_err(|source| ConvertError::InvalidName {
        name: name.to_owned(),
        source,
    })
}
