use clap::builder::styling::{AnsiColor, Effects, Style, Styles};
use std::{
    fmt::Write,
    io::{self, IsTerminal},
    sync::LazyLock,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Whether stdout is an interactive terminal that understands ANSI escapes.
static IS_ANSI_TERMINAL: LazyLock<bool> = LazyLock::new(|| {
    io::stdout().is_terminal() && std::env::var("TERM").map_or(true, |term| term != "dumb")
});

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A trait for applying Styles defined in [`styles`] to text.
///
/// Nothing is applied when stdout is not an ANSI terminal.
pub trait AnsiStyles {
    /// Apply header style to text
    fn header(&self) -> String;

    /// Apply literal style to text
    fn literal(&self) -> String;

    /// Apply placeholder style to text
    fn placeholder(&self) -> String;

    /// Apply valid style to text
    fn valid(&self) -> String;

    /// Apply invalid style to text
    fn invalid(&self) -> String;
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns a `Styles` object with the default styles for the CLI.
pub fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
        .valid(AnsiColor::Green.on_default() | Effects::BOLD)
        .invalid(AnsiColor::Red.on_default() | Effects::BOLD)
}

fn apply_style(text: &str, style: &Style) -> String {
    paint(text, style, *IS_ANSI_TERMINAL)
}

fn paint(text: &str, style: &Style, colored: bool) -> String {
    if !colored {
        return text.to_string();
    }

    let mut styled = String::with_capacity(text.len() + 20);
    let _ = write!(styled, "{}", style);
    styled.push_str(text);
    let _ = write!(styled, "{}", style.render_reset());
    styled
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<T> AnsiStyles for T
where
    T: AsRef<str> + ?Sized,
{
    fn header(&self) -> String {
        apply_style(self.as_ref(), styles().get_header())
    }

    fn literal(&self) -> String {
        apply_style(self.as_ref(), styles().get_literal())
    }

    fn placeholder(&self) -> String {
        apply_style(self.as_ref(), styles().get_placeholder())
    }

    fn valid(&self) -> String {
        apply_style(self.as_ref(), styles().get_valid())
    }

    fn invalid(&self) -> String {
        apply_style(self.as_ref(), styles().get_invalid())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_plain_leaves_text_untouched() {
        let style = styles();
        assert_eq!(paint("slice", style.get_header(), false), "slice");
        assert_eq!(paint("", style.get_error(), false), "");
    }

    #[test]
    fn test_paint_colored_wraps_text() {
        let style = styles();

        let header = paint("slice", style.get_header(), true);
        assert!(header.contains("\x1b[1m"));
        assert!(header.contains("\x1b[33m"));
        assert!(header.contains("slice"));
        assert!(header.ends_with("\x1b[0m"));

        let invalid = paint("测试", style.get_invalid(), true);
        assert!(invalid.starts_with("\x1b["));
        assert!(invalid.contains("\x1b[31m"));
        assert!(invalid.contains("测试"));
    }
}
