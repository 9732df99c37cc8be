//! Author and maintainer entries.

use toml_edit::{InlineTable, Value};

use crate::poetry::convert::ConvertError;

/// A PEP 621 author or maintainer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: String,
}

impl Person {
    /// Render as `{ name = "...", email = "..." }`.
    pub fn to_inline_table(&self) -> InlineTable {
        let mut table = InlineTable::new();
        table.insert("name", Value::from(self.name.as_str()));
        table.insert("email", Value::from(self.email.as_str()));
        table
    }
}

/// Split a Poetry person entry, `"John Smith <johnsmith@example.org>"`, into
/// its name and email.
///
/// The name keeps everything before `<` verbatim, including the space that
/// separates it from the email.
pub fn parse_person(entry: &str) -> Result<Person, ConvertError> {
    let mut parts = entry.split('<');
    let (Some(name), Some(email), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ConvertError::MalformedPerson(entry.to_owned()));
    };
    Ok(Person {
        name: name.to_owned(),
        email: email.replace('>', ""),
    })
}
