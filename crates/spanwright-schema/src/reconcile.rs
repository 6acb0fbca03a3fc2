//! Fixture table-name reconciliation.
//!
//! Fixture files name tables however their authors like (`user_profiles`,
//! `USERPROFILES`, `UserProfiles`). These helpers map such names onto the
//! table names actually declared in the schema.

/// Resolve `name` against `available` table names.
///
/// Tried in order: exact match, case-insensitive match, the snake_case →
/// PascalCase conversion exactly, then that conversion case-insensitively.
/// Unresolved names come back unchanged; callers detect them by looking the
/// result up in the schema.
pub fn convert_table_name<S: AsRef<str>>(name: &str, available: &[S]) -> String {
    if let Some(found) = find_exact(name, available) {
        return found.to_string();
    }
    if let Some(found) = find_case_insensitive(name, available) {
        return found.to_string();
    }

    let pascal = snake_to_pascal_case(name);
    if let Some(found) = find_exact(&pascal, available) {
        return found.to_string();
    }
    if let Some(found) = find_case_insensitive(&pascal, available) {
        return found.to_string();
    }

    name.to_string()
}

/// `user_profiles` → `UserProfiles`.
///
/// Each `_`-separated segment gets an upper-case first letter and a
/// lower-case remainder; empty segments vanish.
pub fn snake_to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

fn find_exact<'a, S: AsRef<str>>(name: &str, available: &'a [S]) -> Option<&'a str> {
    available
        .iter()
        .map(AsRef::as_ref)
        .find(|table| *table == name)
}

fn find_case_insensitive<'a, S: AsRef<str>>(name: &str, available: &'a [S]) -> Option<&'a str> {
    let lower = name.to_lowercase();
    available
        .iter()
        .map(AsRef::as_ref)
        .find(|table| table.to_lowercase() == lower)
}
