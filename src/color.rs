//! ANSI color table for console sinks.
//!
//! Follows a `color_name_to_code`-style name-to-ANSI-SGR-code mapping.

use crate::level::Level;

/// Maps a color name (case-insensitive) or a pass-through numeric ANSI code
/// to the ANSI SGR code used to colorize console output.
pub fn color_name_to_code(color: &str) -> &str {
    match color.to_uppercase().as_str() {
        "BLACK" => "30",
        "RED" => "31",
        "GREEN" => "32",
        "YELLOW" => "33",
        "BLUE" => "34",
        "MAGENTA" => "35",
        "CYAN" => "36",
        "WHITE" => "37",
        "BRIGHT_BLACK" | "GRAY" | "GREY" => "90",
        "BRIGHT_RED" => "91",
        "BRIGHT_GREEN" => "92",
        "BRIGHT_YELLOW" => "93",
        "BRIGHT_BLUE" => "94",
        "BRIGHT_MAGENTA" => "95",
        "BRIGHT_CYAN" => "96",
        "BRIGHT_WHITE" => "97",
        _ => color,
    }
}

/// Default per-level color name, matching a typical `level_colors` default map.
pub fn default_color_for(level: Level) -> &'static str {
    match level {
        Level::Trace => "CYAN",
        Level::Debug => "MAGENTA",
        Level::Info => "GREEN",
        Level::Warn => "YELLOW",
        Level::Err => "RED",
        Level::Critical => "BRIGHT_RED",
        Level::Off => "WHITE",
    }
}

/// Wraps `text` in the ANSI escape sequence for `color_name`, resetting after.
pub fn colorize(text: &str, color_name: &str) -> String {
    format!("\x1b[{}m{}\x1b[0m", color_name_to_code(color_name), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_resolve_case_insensitively() {
        assert_eq!(color_name_to_code("red"), "31");
        assert_eq!(color_name_to_code("BRIGHT_RED"), "91");
        assert_eq!(color_name_to_code("gray"), "90");
    }

    #[test]
    fn numeric_and_unknown_codes_pass_through() {
        assert_eq!(color_name_to_code("42"), "42");
        assert_eq!(color_name_to_code("mystery"), "mystery");
    }

    #[test]
    fn colorize_wraps_and_resets() {
        let out = colorize("hi", "RED");
        assert_eq!(out, "\x1b[31mhi\x1b[0m");
    }

    #[test]
    fn every_level_has_a_default_color() {
        for level in
            [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Err, Level::Critical]
        {
            assert!(!default_color_for(level).is_empty());
        }
    }
}
