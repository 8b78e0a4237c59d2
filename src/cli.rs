//! Command-line options

use std::fmt;

use crate::level::Level;
use crate::settings::Settings;

pub const USAGE: &str = "\
USAGE: tint [-h] [-l level] [-n] [-d] [-b char] [-s]
  -h           Show this help message
  -l <level>   Specify the starting level (1-9)
  -n           Draw next shape
  -d           Draw vertical dotted lines
  -b <char>    Use this character to draw blocks instead of spaces
  -s           Draw shadow of shape";

/// Options given on the command line. Unset options leave the settings file alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub level: Option<Level>,
    pub show_next: bool,
    pub dotted_lines: bool,
    pub block_char: Option<char>,
    pub shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Help was requested, or an option was unknown or missing its value
    Usage { invalid: Option<String> },
    LevelOutOfRange,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage { invalid: Some(arg) } => {
                write!(f, "Invalid option -- {arg}\n{USAGE}")
            }
            CliError::Usage { invalid: None } => f.write_str(USAGE),
            CliError::LevelOutOfRange => write!(
                f,
                "You must specify a level between {} and {}",
                Level::MIN,
                Level::MAX
            ),
        }
    }
}

impl std::error::Error for CliError {}

impl Options {
    /// Parse arguments, program name excluded
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let usage = || CliError::Usage { invalid: None };
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" => return Err(usage()),
                "-l" => {
                    let value = args.next().ok_or_else(usage)?;
                    let number = parse_number(&value).ok_or_else(usage)?;
                    let level = u32::try_from(number)
                        .ok()
                        .and_then(Level::new)
                        .ok_or(CliError::LevelOutOfRange)?;
                    options.level = Some(level);
                }
                "-n" => options.show_next = true,
                "-d" => options.dotted_lines = true,
                "-b" => {
                    let value = args.next().ok_or_else(usage)?;
                    options.block_char = Some(value.chars().next().ok_or_else(usage)?);
                }
                "-s" => options.shadow = true,
                _ => return Err(CliError::Usage { invalid: Some(arg) }),
            }
        }

        Ok(options)
    }

    /// Layer these options over the settings file
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(level) = self.level {
            settings.game.level = Some(level.get());
        }
        settings.game.show_next |= self.show_next;
        settings.game.dotted_lines |= self.dotted_lines;
        settings.game.shadow |= self.shadow;
        if let Some(block_char) = self.block_char {
            settings.visual.block_char = block_char;
        }
    }
}

/// Parse a whole-string integer; surrounding whitespace is not allowed
pub fn parse_number(text: &str) -> Option<i64> {
    text.parse().ok()
}

/// Parse a level typed at the startup prompt
pub fn parse_level(text: &str) -> Option<Level> {
    parse_number(text.trim_end_matches(['\r', '\n']))
        .and_then(|number| u32::try_from(number).ok())
        .and_then(Level::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, CliError> {
        Options::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(parse(&[]), Ok(Options::default()));
    }

    #[test]
    fn test_all_options() {
        let options = parse(&["-l", "5", "-n", "-d", "-b", "#x", "-s"]).expect("valid");
        assert_eq!(options.level, Level::new(5));
        assert!(options.show_next);
        assert!(options.dotted_lines);
        assert_eq!(options.block_char, Some('#'));
        assert!(options.shadow);
    }

    #[test]
    fn test_level_out_of_range() {
        assert_eq!(parse(&["-l", "0"]), Err(CliError::LevelOutOfRange));
        assert_eq!(parse(&["-l", "10"]), Err(CliError::LevelOutOfRange));
        assert_eq!(parse(&["-l", "-3"]), Err(CliError::LevelOutOfRange));
        assert_eq!(
            CliError::LevelOutOfRange.to_string(),
            "You must specify a level between 1 and 9"
        );
    }

    #[test]
    fn test_level_needs_a_number() {
        assert_eq!(parse(&["-l"]), Err(CliError::Usage { invalid: None }));
        assert_eq!(parse(&["-l", "fast"]), Err(CliError::Usage { invalid: None }));
        assert_eq!(parse(&["-b", ""]), Err(CliError::Usage { invalid: None }));
    }

    #[test]
    fn test_invalid_option() {
        let err = parse(&["-n", "-x"]).expect_err("invalid");
        assert_eq!(err, CliError::Usage { invalid: Some("-x".into()) });
        assert!(err.to_string().starts_with("Invalid option -- -x\nUSAGE: tint"));
        assert_eq!(parse(&["-h"]), Err(CliError::Usage { invalid: None }));
    }

    #[test]
    fn test_apply_overrides_settings() {
        let mut settings = Settings::default();
        settings.game.dotted_lines = true;
        let options = parse(&["-l", "7", "-b", "@"]).expect("valid");
        options.apply(&mut settings);
        assert_eq!(settings.game.level, Some(7));
        assert_eq!(settings.visual.block_char, '@');
        // Flags only ever switch assists on
        assert!(settings.game.dotted_lines);
        assert!(!settings.game.show_next);
    }

    #[test]
    fn test_prompt_level() {
        assert_eq!(parse_level("3\n"), Level::new(3));
        assert_eq!(parse_level("9"), Level::new(9));
        assert_eq!(parse_level("12\n"), None);
        assert_eq!(parse_level("\n"), None);
        assert_eq!(parse_level(" 4\n"), None);
    }
}
