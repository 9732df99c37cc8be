//! Poetry project parsing and conversion to PEP 621 and uv configuration.
//!
//! ## Architecture
//!
//! A [`PoetryProject`] is loaded from `pyproject.toml`, then
//! [`Uvifier::eject`] produces the converted document:
//!
//! - `[tool.poetry]` name, version, description, readme, authors, maintainers
//!   -> `[project]`
//! - `[tool.poetry.dependencies]` -> `project.dependencies` and
//!   `requires-python`
//! - `[tool.poetry.group.<name>.dependencies]` -> `[dependency-groups]`
//! - `[tool.poetry.extras]` -> `[project.optional-dependencies]`
//! - `[tool.poetry.scripts]` -> `[project.scripts]`
//! - `[[tool.poetry.source]]` -> `[[tool.uv.index]]`
//! - dependencies pinned to a source, git, path or URL -> `[tool.uv.sources]`
//!
//! `[tool.poetry]` and `[build-system]` are removed; every other table is left
//! as written.

pub mod convert;
pub mod discovery;
pub mod model;
pub mod person;
pub mod requirement;
pub mod writer;

pub use convert::{ConvertError, Uvifier};
pub use discovery::find_pyproject;
pub use model::{PoetryPackage, PoetryProject, ProjectError};
pub use person::{Person, parse_person};
