//! Legacy formatting codes (`§` followed by a style character).

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Section sign that introduces a formatting code.
pub const SECTION: char = '§';

lazy_static! {
    static ref FORMAT_CODE: Regex = Regex::new(r"§([0-9a-fk-orA-FK-OR])").unwrap();
}

/// Remove every formatting code.
///
/// Removal repeats until nothing matches, so sequences such as `§§aa`
/// (which expose a new code once the inner one is gone) are fully cleaned.
pub fn strip_codes(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = FORMAT_CODE.replace_all(&current, "").into_owned();
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

/// Replace formatting codes with ANSI escapes.
pub fn render_ansi(text: &str) -> String {
    let mut touched = false;
    let rendered = FORMAT_CODE.replace_all(text, |caps: &Captures<'_>| {
        touched = true;
        let code = caps[1].chars().next().unwrap_or('r').to_ascii_lowercase();
        ansi_for(code).to_string()
    });
    if touched {
        format!("{rendered}\x1b[0m")
    } else {
        rendered.into_owned()
    }
}

fn ansi_for(code: char) -> &'static str {
    match code {
        '0' => "\x1b[30m",
        '1' => "\x1b[34m",
        '2' => "\x1b[32m",
        '3' => "\x1b[36m",
        '4' => "\x1b[31m",
        '5' => "\x1b[35m",
        '6' => "\x1b[33m",
        '7' => "\x1b[37m",
        '8' => "\x1b[90m",
        '9' => "\x1b[94m",
        'a' => "\x1b[92m",
        'b' => "\x1b[96m",
        'c' => "\x1b[91m",
        'd' => "\x1b[95m",
        'e' => "\x1b[93m",
        'f' => "\x1b[97m",
        'l' => "\x1b[1m",
        'm' => "\x1b[9m",
        'n' => "\x1b[4m",
        'o' => "\x1b[3m",
        'r' => "\x1b[0m",
        // Obfuscated text has no terminal equivalent
        _ => "",
    }
}

/// Formatting code for a structured-text color name.
pub fn color_code(name: &str) -> Option<char> {
    let code = match name {
        "black" => '0',
        "dark_blue" => '1',
        "dark_green" => '2',
        "dark_aqua" => '3',
        "dark_red" => '4',
        "dark_purple" => '5',
        "gold" => '6',
        "gray" => '7',
        "dark_gray" => '8',
        "blue" => '9',
        "green" => 'a',
        "aqua" => 'b',
        "red" => 'c',
        "light_purple" => 'd',
        "yellow" => 'e',
        "white" => 'f',
        "reset" => 'r',
        _ => return None,
    };
    Some(code)
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_codes() {
        assert_eq!(strip_codes("§aHello §lWorld§r"), "Hello World");
        assert_eq!(strip_codes("no codes"), "no codes");
        // Unknown style characters stay
        assert_eq!(strip_codes("§zkept"), "§zkept");
    }

    #[test]
    fn test_strip_nested_sequence() {
        assert_eq!(strip_codes("§§aa"), "");
        assert_eq!(strip_codes(&strip_codes("x§§§bbb")), strip_codes("x§§§bbb"));
    }

    #[test]
    fn test_render_ansi() {
        assert_eq!(render_ansi("§cRed"), "\x1b[91mRed\x1b[0m");
        assert_eq!(render_ansi("plain"), "plain");
        assert_eq!(render_ansi("§kx"), "x\x1b[0m");
    }

    #[test]
    fn test_color_code() {
        assert_eq!(color_code("gold"), Some('6'));
        assert_eq!(color_code("#ff0000"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\t c  "), "a b c");
        assert_eq!(collapse_whitespace("\n"), "");
    }
}
