//! Conversion from `[tool.poetry]` to `[project]`, `[dependency-groups]` and
//! `[tool.uv]`.
//!
//! The [`Uvifier`] reads a loaded [`PoetryProject`] and produces a new
//! document; the project's own document is never modified.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use path_slash::PathExt;
use thiserror::Error;
use toml_edit::{Array, ArrayOfTables, DocumentMut, InlineTable, Item, Table, TableLike, Value, value};
use tracing::{debug, trace, warn};
use url::Url;
use uv_normalize::InvalidNameError;

use crate::poetry::model::{Dependency, DependencySource, GitReference, PoetryPackage, PoetryProject};
use crate::poetry::person::parse_person;
use crate::poetry::requirement::{self, ConstraintError};

/// The group holding `[tool.poetry.dependencies]`.
pub const MAIN_GROUP: &str = "main";

/// `requires-python` for packages that accept any interpreter.
const ANY_PYTHON: &str = "*";

/// Errors raised while converting a Poetry project.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("`pyproject.toml` has no `[{0}]` table")]
    MissingSection(&'static str),
    #[error("`[tool.poetry]` is missing the required `{0}` field")]
    MissingField(&'static str),
    #[error("expected a person entry of the form `Name <email>`, found `{0}`")]
    MalformedPerson(String),
    #[error("`{name}` is not a valid name")]
    InvalidName {
        name: String,
        #[source]
        source: InvalidNameError,
    },
    #[error("failed to convert the version constraint of `{name}`")]
    Constraint {
        name: String,
        #[source]
        source: ConstraintError,
    },
}

/// A dependency rendered for a group: its normalized name and PEP 508 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRequirement {
    pub name: String,
    pub requirement: String,
}

/// Group name to the rendered requirements of that group, in declaration order.
pub type DependencyGroups = IndexMap<String, Vec<GroupRequirement>>;

/// Normalized dependency name to the location it must be installed from.
pub type PackageSources = IndexMap<String, DependencySource>;

/// Converts a Poetry project into PEP 621 metadata and uv configuration.
#[derive(Debug, Clone, Copy)]
pub struct Uvifier<'a> {
    project: &'a PoetryProject,
}

impl<'a> Uvifier<'a> {
    pub fn new(project: &'a PoetryProject) -> Self {
        Self { project }
    }

    fn package(&self) -> &'a PoetryPackage {
        &self.project.package
    }

    /// The raw `[tool.poetry]` table of the source document.
    fn local_config(&self) -> Option<&'a dyn TableLike> {
        self.project
            .document
            .get("tool")?
            .get("poetry")?
            .as_table_like()
    }

    /// Render every dependency group, collecting the non-default sources of
    /// the dependencies along the way.
    pub fn group_dependencies(&self) -> Result<(DependencyGroups, PackageSources), ConvertError> {
        let mut groups = DependencyGroups::new();
        let mut sources = PackageSources::new();
        for (group_name, dependencies) in &self.package().dependency_groups {
            let mut requirements = Vec::with_capacity(dependencies.len());
            for dependency in dependencies {
                if let Some(source) = &dependency.source {
                    sources.insert(dependency.name.clone(), source.clone());
                }
                requirements.push(GroupRequirement {
                    name: dependency.name.clone(),
                    requirement: dependency.to_pep508()?,
                });
            }
            trace!("Group `{group_name}` has {} requirement(s)", requirements.len());
            groups.insert(group_name.clone(), requirements);
        }
        Ok((groups, sources))
    }

    /// The package's extras, unchanged.
    pub fn extra_groups(&self) -> &'a IndexMap<String, Vec<Dependency>> {
        &self.package().extras
    }

    /// Build the `[project]` table.
    ///
    /// The table still contains `dependency-groups`, which [`Uvifier::eject`]
    /// moves to the top level. Optional keys are only present when their data
    /// is.
    pub fn build_project_fragment(&self) -> Result<(Table, PackageSources), ConvertError> {
        let package = self.package();
        let (mut groups, sources) = self.group_dependencies()?;
        let extras = self.extra_groups();

        let main = groups.shift_remove(MAIN_GROUP).unwrap_or_default();
        let extra_names: HashSet<&str> = extras
            .values()
            .flatten()
            .map(|dependency| dependency.name.as_str())
            .collect();

        let mut project = Table::new();
        project.insert("name", value(package.name.as_str()));
        project.insert("version", value(package.version.as_str()));
        project.insert("description", value(package.description.as_str()));
        project.insert("requires-python", value(self.requires_python()?));
        project.insert(
            "dependencies",
            value(multiline_array(
                main.into_iter()
                    .filter(|entry| !extra_names.contains(entry.name.as_str()))
                    .map(|entry| entry.requirement),
            )),
        );

        if let Some(readme) = &package.readme {
            let readme = relative_readme(self.project.root(), readme);
            project.insert("readme", value(readme.to_slash_lossy().as_ref()));
        }

        for (key, entries) in [("authors", &package.authors), ("maintainers", &package.maintainers)] {
            if entries.is_empty() {
                continue;
            }
            let mut people = Array::new();
            for entry in entries {
                people.push(parse_person(entry)?.to_inline_table());
            }
            project.insert(key, value(people));
        }

        if !groups.is_empty() {
            let mut dependency_groups = Table::new();
            for (group_name, requirements) in groups {
                dependency_groups.insert(
                    &group_name,
                    value(multiline_array(
                        requirements.into_iter().map(|entry| entry.requirement),
                    )),
                );
            }
            project.insert("dependency-groups", Item::Table(dependency_groups));
        }

        if !extras.is_empty() {
            let mut optional_dependencies = Table::new();
            for (extra, dependencies) in extras {
                let requirements = dependencies
                    .iter()
                    .map(Dependency::to_pep508)
                    .collect::<Result<Vec<_>, _>>()?;
                optional_dependencies.insert(extra, value(multiline_array(requirements)));
            }
            project.insert("optional-dependencies", Item::Table(optional_dependencies));
        }

        if let Some(scripts) = self
            .local_config()
            .and_then(|config| config.get("scripts"))
            .and_then(Item::as_table_like)
            .filter(|scripts| !scripts.is_empty())
        {
            project.insert("scripts", Item::Table(detach_table(scripts)));
        }

        Ok((project, sources))
    }

    /// The `requires-python` value: the rendered `python` constraint, or `*`
    /// when the package does not restrict the interpreter.
    fn requires_python(&self) -> Result<String, ConvertError> {
        let Some(constraint) = self.package().python_constraint.as_deref() else {
            warn!("`[tool.poetry.dependencies]` has no `python` entry; writing `requires-python = \"*\"`");
            return Ok(ANY_PYTHON.to_owned());
        };
        let requires_python =
            requirement::to_pep440(constraint).map_err(|source| ConvertError::Constraint {
                name: "python".to_owned(),
                source,
            })?;
        if requires_python.is_empty() {
            warn!("`python = \"{constraint}\"` allows any version; writing `requires-python = \"*\"`");
            return Ok(ANY_PYTHON.to_owned());
        }
        Ok(requires_python)
    }

    /// Build the `[[tool.uv.index]]` entries from `[[tool.poetry.source]]`.
    ///
    /// Entries are copied, `priority` is dropped and entries without a `url`
    /// are skipped. Poetry's `explicit` and `default` priorities become uv's
    /// `explicit = true` and `default = true`.
    pub fn build_index_fragment(&self) -> Vec<Table> {
        self.poetry_sources()
            .into_iter()
            .filter_map(|mut index| {
                let priority = index.remove("priority");
                let Some(url) = index
                    .get("url")
                    .and_then(Item::as_str)
                    .filter(|url| !url.is_empty())
                else {
                    debug!("Skipping source without a `url`: {}", index.to_string().trim());
                    return None;
                };
                if let Err(err) = Url::parse(url) {
                    warn!("Source `{url}` is not a valid URL ({err}); copying it unchanged");
                }
                match priority.as_ref().and_then(Item::as_str) {
                    Some("explicit") => {
                        index.insert("explicit", value(true));
                    }
                    Some("default") => {
                        index.insert("default", value(true));
                    }
                    _ => {}
                }
                Some(index)
            })
            .collect()
    }

    /// Copies of the `tool.poetry.source` entries, in either the array of
    /// tables or the inline array spelling.
    fn poetry_sources(&self) -> Vec<Table> {
        let Some(source) = self.local_config().and_then(|config| config.get("source")) else {
            return Vec::new();
        };
        match source {
            Item::ArrayOfTables(tables) => tables.iter().map(|table| detach_table(table)).collect(),
            Item::Value(Value::Array(array)) => array
                .iter()
                .filter_map(Value::as_inline_table)
                .map(|table| detach_table(table))
                .collect(),
            _ => {
                warn!("Ignoring `tool.poetry.source`, which is not an array of tables");
                Vec::new()
            }
        }
    }

    /// Produce the converted document.
    ///
    /// `[tool.poetry]` and `[build-system]` are removed, `[project]` and
    /// `[dependency-groups]` are added, and `[tool.uv]` receives `index` and
    /// `sources` when there are any.
    pub fn eject(&self) -> Result<DocumentMut, ConvertError> {
        let mut document = self.project.document.clone();

        document
            .get_mut("tool")
            .and_then(Item::as_table_like_mut)
            .and_then(|tool| tool.remove("poetry"))
            .ok_or(ConvertError::MissingSection("tool.poetry"))?;
        document
            .remove("build-system")
            .ok_or(ConvertError::MissingSection("build-system"))?;

        let (mut project, package_sources) = self.build_project_fragment()?;
        let dependency_groups = project.remove("dependency-groups");
        document.insert("project", Item::Table(project));
        if let Some(dependency_groups) = dependency_groups {
            document.insert("dependency-groups", dependency_groups);
        }

        let mut uv = Table::new();
        uv.set_implicit(true);
        let indexes = self.build_index_fragment();
        if !indexes.is_empty() {
            let mut index = ArrayOfTables::new();
            for table in indexes {
                index.push(table);
            }
            uv.insert("index", Item::ArrayOfTables(index));
        }
        if !package_sources.is_empty() {
            let mut sources = Table::new();
            for (name, source) in &package_sources {
                sources.insert(name, value(source.to_inline_table()));
            }
            uv.insert("sources", Item::Table(sources));
        }

        if let Some(tool) = document.get_mut("tool").and_then(Item::as_table_like_mut) {
            if !uv.is_empty() {
                if tool.contains_key("uv") {
                    warn!("Replacing the existing `[tool.uv]` table");
                }
                tool.insert("uv", Item::Table(uv));
            }
        }
        if document
            .get("tool")
            .and_then(Item::as_table_like)
            .is_some_and(|tool| tool.is_empty())
        {
            document.remove("tool");
        }

        Ok(document)
    }
}

impl DependencySource {
    /// Render as a `[tool.uv.sources]` entry.
    pub fn to_inline_table(&self) -> InlineTable {
        let mut table = InlineTable::new();
        match self {
            Self::Index(index) => {
                table.insert("index", Value::from(index.as_str()));
            }
            Self::Git {
                url,
                reference,
                subdirectory,
            } => {
                table.insert("git", Value::from(url.as_str()));
                match reference {
                    Some(GitReference::Branch(branch)) => {
                        table.insert("branch", Value::from(branch.as_str()));
                    }
                    Some(GitReference::Tag(tag)) => {
                        table.insert("tag", Value::from(tag.as_str()));
                    }
                    Some(GitReference::Rev(rev)) => {
                        table.insert("rev", Value::from(rev.as_str()));
                    }
                    None => {}
                }
                if let Some(subdirectory) = subdirectory {
                    table.insert("subdirectory", Value::from(subdirectory.as_str()));
                }
            }
            Self::Path { path, editable } => {
                table.insert("path", Value::from(path.as_str()));
                if *editable {
                    table.insert("editable", Value::from(true));
                }
            }
            Self::Url(url) => {
                table.insert("url", Value::from(url.as_str()));
            }
        }
        table
    }
}

/// The readme path relative to the project root, as Poetry resolves it.
fn relative_readme(root: &Path, readme: &Path) -> PathBuf {
    let absolute = root.join(readme);
    let relative = absolute.strip_prefix(root).unwrap_or_else(|_| {
        warn!("Readme `{}` is outside the project root", readme.display());
        absolute.as_path()
    });
    relative
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

/// An array with one element per line, as uv writes dependency lists.
fn multiline_array<I, V>(items: I) -> Array
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let mut array = Array::new();
    for item in items {
        let mut item = item.into();
        item.decor_mut().set_prefix("\n    ");
        array.push_formatted(item);
    }
    if !array.is_empty() {
        array.set_trailing_comma(true);
        array.set_trailing("\n");
    }
    array
}

/// Copy a table's entries into a new standard table, detached from the
/// position and headers of the source document.
fn detach_table(source: &dyn TableLike) -> Table {
    let mut table = Table::new();
    for (key, item) in source.iter() {
        let item = match item {
            Item::Table(nested) => Item::Value(Value::InlineTable(nested.clone().into_inline_table())),
            item => item.clone(),
        };
        table.insert(key, item);
    }
    table
}
