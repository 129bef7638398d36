//! Migration file name parsing.
//!
//! Format on disk: `<version>_<name>.up.sql` / `<version>_<name>.down.sql`.
//! The version token is everything before the first underscore, parsed as a
//! decimal integer. A file ending in `.up.sql` is an up unit; any other
//! `.sql` file is a down unit; everything else is not a migration at all.

use crate::catalog::Direction;
use crate::error::{MigrateError, MigrateResult};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";
const SQL_SUFFIX: &str = ".sql";

/// Parsed metadata from a single file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedName {
    pub version: i64,
    pub name: String,
    pub direction: Direction,
}

/// Parse one directory entry name. `Ok(None)` means the file is not a
/// recognized migration (wrong extension) and should be skipped; a bad
/// version token on a recognized file is a hard `MalformedUnitName`.
pub(crate) fn parse_unit_name(file_name: &str) -> MigrateResult<Option<ParsedName>> {
    let (stem, direction) = if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
        (stem, Direction::Up)
    } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
        (stem, Direction::Down)
    } else if let Some(stem) = file_name.strip_suffix(SQL_SUFFIX) {
        (stem, Direction::Down)
    } else {
        return Ok(None);
    };

    let (token, name) = stem.split_once('_').ok_or_else(|| malformed(
        file_name,
        "expected '<version>_<name>' before the extension",
    ))?;

    let version: i64 = token
        .parse()
        .map_err(|_| malformed(file_name, "version token is not a decimal integer"))?;
    if version < 0 {
        return Err(malformed(file_name, "version token cannot be negative"));
    }

    Ok(Some(ParsedName {
        version,
        name: name.to_string(),
        direction,
    }))
}

fn malformed(file_name: &str, message: &str) -> MigrateError {
    MigrateError::MalformedUnitName {
        file: file_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_up_unit() {
        let parsed = parse_unit_name("20230101_init.up.sql").unwrap().unwrap();
        assert_eq!(parsed.version, 20230101);
        assert_eq!(parsed.name, "init");
        assert_eq!(parsed.direction, Direction::Up);
    }

    #[test]
    fn parses_down_unit() {
        let parsed = parse_unit_name("20230101_init.down.sql").unwrap().unwrap();
        assert_eq!(parsed.version, 20230101);
        assert_eq!(parsed.name, "init");
        assert_eq!(parsed.direction, Direction::Down);
    }

    #[test]
    fn plain_sql_file_is_a_down_unit() {
        let parsed = parse_unit_name("42_cleanup.sql").unwrap().unwrap();
        assert_eq!(parsed.version, 42);
        assert_eq!(parsed.direction, Direction::Down);
    }

    #[test]
    fn multi_underscore_names_keep_the_rest() {
        let parsed = parse_unit_name("20230101120000_add_users_table.up.sql")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.version, 20230101120000);
        assert_eq!(parsed.name, "add_users_table");
    }

    #[test]
    fn non_sql_files_are_ignored() {
        assert!(parse_unit_name("README.md").unwrap().is_none());
        assert!(parse_unit_name("20230101_init.up.sql.bak").unwrap().is_none());
        assert!(parse_unit_name("notes.txt").unwrap().is_none());
    }

    #[test]
    fn non_numeric_version_token_is_malformed() {
        let err = parse_unit_name("abc_foo.up.sql").unwrap_err();
        assert!(matches!(err, MigrateError::MalformedUnitName { .. }));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let err = parse_unit_name("20230101.up.sql").unwrap_err();
        assert!(matches!(err, MigrateError::MalformedUnitName { .. }));
    }

    #[test]
    fn negative_version_is_malformed() {
        let err = parse_unit_name("-5_oops.up.sql").unwrap_err();
        assert!(matches!(err, MigrateError::MalformedUnitName { .. }));
    }
}
