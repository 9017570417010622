//! Self-describing device configuration options
//!
//! Each device exposes a small fixed set of named options. An option value
//! is a tagged variant (bounded integer, boolean, enumerated string, or free
//! string) mutated through a uniform string parse/format contract so the
//! console and persistence layers never need device-specific knowledge.

use crate::error::OptionError;

/// Maximum serialized size of a device's full option set
pub const MAX_OPTION_BYTES: usize = 32;

/// A typed option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Unsigned integer constrained to an inclusive range
    Uint {
        /// Minimum accepted value
        min: u32,
        /// Maximum accepted value
        max: u32,
        /// Current value
        value: u32,
    },
    /// Boolean flag
    Bool(bool),
    /// One of a fixed set of candidate strings
    Enum {
        /// Candidate values
        choices: &'static [&'static str],
        /// Index of the current selection
        selected: u8,
    },
    /// Free-form string
    Text(String),
}

/// A named, described, typed configuration value owned by a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOption {
    /// Option identifier (e.g. "baud_rate")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Current typed value
    pub value: OptionValue,
}

impl DeviceOption {
    /// Create a range-bounded integer option
    pub fn uint(
        name: &'static str,
        description: &'static str,
        min: u32,
        max: u32,
        value: u32,
    ) -> Self {
        Self {
            name,
            description,
            value: OptionValue::Uint { min, max, value },
        }
    }

    /// Create a boolean option
    pub fn boolean(name: &'static str, description: &'static str, value: bool) -> Self {
        Self {
            name,
            description,
            value: OptionValue::Bool(value),
        }
    }

    /// Create an enumerated option selecting `choices[selected]`
    pub fn enumerated(
        name: &'static str,
        description: &'static str,
        choices: &'static [&'static str],
        selected: u8,
    ) -> Self {
        Self {
            name,
            description,
            value: OptionValue::Enum { choices, selected },
        }
    }

    /// Create a free-form string option
    pub fn text(name: &'static str, description: &'static str, value: &str) -> Self {
        Self {
            name,
            description,
            value: OptionValue::Text(value.to_string()),
        }
    }

    /// Format the current value as a string
    pub fn format(&self) -> String {
        match &self.value {
            OptionValue::Uint { value, .. } => value.to_string(),
            OptionValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            OptionValue::Enum { choices, selected } => choices
                .get(*selected as usize)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "?".to_string()),
            OptionValue::Text(s) => s.clone(),
        }
    }

    /// Parse a string and update the value, rejecting anything that does not
    /// fit the variant's constraints
    pub fn parse_set(&mut self, input: &str) -> Result<(), OptionError> {
        let reject = || OptionError::InvalidValue {
            name: self.name.to_string(),
            value: input.to_string(),
        };

        match &mut self.value {
            OptionValue::Uint { min, max, value } => {
                let parsed = input.parse::<u32>().map_err(|_| reject())?;
                if parsed < *min || parsed > *max {
                    return Err(reject());
                }
                *value = parsed;
                Ok(())
            }
            OptionValue::Bool(b) => {
                if input.eq_ignore_ascii_case("true") || input == "1" {
                    *b = true;
                    Ok(())
                } else if input.eq_ignore_ascii_case("false") || input == "0" {
                    *b = false;
                    Ok(())
                } else {
                    Err(reject())
                }
            }
            OptionValue::Enum { choices, selected } => {
                match choices
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(input))
                {
                    Some(index) => {
                        *selected = index as u8;
                        Ok(())
                    }
                    None => Err(reject()),
                }
            }
            OptionValue::Text(s) => {
                *s = input.to_string();
                Ok(())
            }
        }
    }

    /// Current integer value, if this is a `Uint` option
    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            OptionValue::Uint { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Current flag, if this is a `Bool` option
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            OptionValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Current selection index, if this is an `Enum` option
    pub fn selected_index(&self) -> Option<u8> {
        match self.value {
            OptionValue::Enum { selected, .. } => Some(selected),
            _ => None,
        }
    }
}

/// Find an option by name, case-insensitively
pub fn find_option<'a>(options: &'a [DeviceOption], name: &str) -> Option<&'a DeviceOption> {
    options.iter().find(|o| o.name.eq_ignore_ascii_case(name))
}

/// Find an option mutably by name, case-insensitively
pub fn find_option_mut<'a>(
    options: &'a mut [DeviceOption],
    name: &str,
) -> Option<&'a mut DeviceOption> {
    options
        .iter_mut()
        .find(|o| o.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEEDS: &[&str] = &["1200", "4800", "9600"];

    #[test]
    fn test_uint_parse_and_range() {
        let mut opt = DeviceOption::uint("az_speed", "Azimuth speed", 1, 10, 2);
        assert_eq!(opt.format(), "2");

        opt.parse_set("7").unwrap();
        assert_eq!(opt.as_u32(), Some(7));

        assert!(opt.parse_set("0").is_err());
        assert!(opt.parse_set("11").is_err());
        assert!(opt.parse_set("fast").is_err());
        assert_eq!(opt.as_u32(), Some(7));
    }

    #[test]
    fn test_bool_accepts_word_and_digit() {
        let mut opt = DeviceOption::boolean("echo", "Echo traffic", false);
        opt.parse_set("TRUE").unwrap();
        assert_eq!(opt.as_bool(), Some(true));
        opt.parse_set("0").unwrap();
        assert_eq!(opt.as_bool(), Some(false));
        assert!(opt.parse_set("yes").is_err());
    }

    #[test]
    fn test_enum_case_insensitive_match() {
        let mut opt = DeviceOption::enumerated("baud_rate", "Baud rate", SPEEDS, 2);
        assert_eq!(opt.format(), "9600");

        opt.parse_set("1200").unwrap();
        assert_eq!(opt.selected_index(), Some(0));

        assert!(opt.parse_set("115200").is_err());
        assert_eq!(opt.selected_index(), Some(0));
    }

    #[test]
    fn test_text_accepts_anything() {
        let mut opt = DeviceOption::text("callsign", "Station callsign", "N0CALL");
        opt.parse_set("K6ABC").unwrap();
        assert_eq!(opt.format(), "K6ABC");
    }

    #[test]
    fn test_find_option_case_insensitive() {
        let options = [
            DeviceOption::boolean("echo", "Echo", false),
            DeviceOption::enumerated("baud_rate", "Baud", SPEEDS, 0),
        ];
        assert!(find_option(&options, "BAUD_RATE").is_some());
        assert!(find_option(&options, "missing").is_none());
    }
}
