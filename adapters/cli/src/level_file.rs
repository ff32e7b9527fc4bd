use std::{fs, io, path::Path};

use shadow_signal_core::{LevelLayout, LevelValidationError};
use thiserror::Error;

/// Level shipped with the binary, used when no `--level` path is given.
const BUILTIN_LEVEL: &str = include_str!("../levels/test_level.toml");

/// Reasons a level file could not be turned into a layout.
#[derive(Debug, Error)]
pub(crate) enum LevelFileError {
    /// The file could not be read.
    #[error("failed to read level file: {0}")]
    Io(#[from] io::Error),
    /// The file is not a valid TOML level description.
    #[error("failed to parse level file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The level parsed but cannot be simulated.
    #[error("level is invalid: {0}")]
    Invalid(#[from] LevelValidationError),
}

/// Reads and validates the level stored at `path`.
pub(crate) fn load(path: &Path) -> Result<LevelLayout, LevelFileError> {
    let source = fs::read_to_string(path)?;
    parse(&source)
}

/// Parses and validates the level bundled with the binary.
pub(crate) fn builtin() -> Result<LevelLayout, LevelFileError> {
    parse(BUILTIN_LEVEL)
}

fn parse(source: &str) -> Result<LevelLayout, LevelFileError> {
    let layout: LevelLayout = toml::from_str(source)?;
    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_level_matches_test_level() {
        let layout = builtin().expect("builtin level parses");
        assert_eq!(layout, LevelLayout::test_level());
    }

    #[test]
    fn duplicate_guard_names_are_invalid() {
        let source = r#"
            name = "Twins"
            width = 200.0
            height = 200.0
            player_spawn = { x = 10.0, y = 10.0, w = 22.0, h = 22.0 }

            [[guards]]
            name = "A"
            rect = { x = 100.0, y = 100.0, w = 28.0, h = 28.0 }

            [[guards]]
            name = "A"
            rect = { x = 150.0, y = 100.0, w = 28.0, h = 28.0 }
        "#;

        assert!(matches!(
            parse(source),
            Err(LevelFileError::Invalid(LevelValidationError::DuplicateGuardName { .. }))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            parse("name = "),
            Err(LevelFileError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load(Path::new("does/not/exist.toml")),
            Err(LevelFileError::Io(_))
        ));
    }
}
