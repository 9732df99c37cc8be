//! Tests for loading Poetry projects through the public library API.
//!
//! These validate that the fixtures parse and that the resolved package
//! matches what the conversion relies on.

use poetry_uvify::poetry::model::DependencySource;
use poetry_uvify::poetry::{PoetryProject, Uvifier};

use crate::common::fixture;

fn load(name: &str) -> PoetryProject {
    PoetryProject::from_path(&fixture(name).join("pyproject.toml"))
        .unwrap_or_else(|err| panic!("Failed to load {name}: {err}"))
}

#[test]
fn parse_minimal_project() {
    let project = load("minimal");
    let package = &project.package;

    assert_eq!(package.name, "demo");
    assert_eq!(package.version, "0.1.0");
    assert_eq!(package.python_constraint.as_deref(), Some("^3.9"));
    assert_eq!(package.dependency_groups.len(), 1);
    assert_eq!(package.dependency_groups["main"].len(), 1);
    assert!(package.extras.is_empty());
    assert_eq!(project.root(), fixture("minimal"));
}

#[test]
fn parse_full_project() {
    let project = load("full");
    let package = &project.package;

    let groups: Vec<_> = package.dependency_groups.keys().map(String::as_str).collect();
    assert_eq!(groups, ["main", "test", "docs"]);
    assert_eq!(package.authors.len(), 2);
    assert_eq!(package.extras["postgres"].len(), 1);
    assert_eq!(package.extras["postgres"][0].name, "psycopg");

    let sqlalchemy = &package.dependency_groups["main"][1];
    assert_eq!(sqlalchemy.pretty_name, "SQLAlchemy");
    assert_eq!(sqlalchemy.name, "sqlalchemy");
    assert_eq!(sqlalchemy.extras, ["asyncio"]);
}

#[test]
fn group_dependencies_collects_sources() {
    let project = load("full");
    let (groups, sources) = Uvifier::new(&project).group_dependencies().unwrap();

    assert_eq!(groups["main"].len(), 5);
    assert_eq!(sources.len(), 1);
    assert_eq!(
        sources["internal-auth"],
        DependencySource::Index("internal".to_owned())
    );
    // Every sourced dependency comes from a group.
    for name in sources.keys() {
        assert!(
            groups
                .values()
                .flatten()
                .any(|requirement| &requirement.name == name)
        );
    }
}

#[test]
fn extras_are_returned_unchanged() {
    let project = load("full");
    let uvifier = Uvifier::new(&project);

    assert_eq!(uvifier.extra_groups(), &project.package.extras);
}
