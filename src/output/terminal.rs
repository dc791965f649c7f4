pub mod colors {
    pub const GREY: u8 = 102;      // #7D7D7D - Punctuation, secondary
    pub const AQUA: u8 = 109;      // #7A9EB5 - Numbers, info
    pub const ORANGE: u8 = 208;    // #F2913D - Warnings, PUT/PATCH
    pub const RED: u8 = 167;       // #E34F45 - Errors, DELETE
    pub const BLUE: u8 = 68;       // #426BD1 - Names, labels
    pub const GREEN: u8 = 71;      // #63C27A - Success, GET
    pub const YELLOW: u8 = 185;    // #CCCC3D - POST
    pub const WHITE: u8 = 250;     // Primary text
}

/// ANSI escape code constants
pub const RESET: &str = "\x1b[0m";

/// Generate foreground color escape code
#[inline]
pub fn fg(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

/// Generate bold foreground color escape code
#[inline]
pub fn bold_fg(color: u8) -> String {
    format!("\x1b[1;38;5;{}m", color)
}

/// Colorize text with a foreground color
#[inline]
pub fn colorize(text: &str, color: u8) -> String {
    format!("{}{}{}", fg(color), text, RESET)
}

/// Colorize text with bold foreground color
#[inline]
pub fn bold(text: &str, color: u8) -> String {
    format!("{}{}{}", bold_fg(color), text, RESET)
}

/// Whether stdout is an interactive terminal
pub fn stdout_is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Applies colors only when enabled, so the same formatting code serves
/// terminals and pipes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colors on when stdout is a terminal
    pub fn for_stdout() -> Self {
        Self::new(stdout_is_tty())
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, text: &str, color: u8, strong: bool) -> String {
        match (self.enabled, strong) {
            (false, _) => text.to_string(),
            (true, false) => colorize(text, color),
            (true, true) => bold(text, color),
        }
    }

    /// Success message (bold green)
    pub fn success(&self, text: &str) -> String {
        self.paint(text, colors::GREEN, true)
    }

    /// Error message (bold red)
    pub fn error(&self, text: &str) -> String {
        self.paint(text, colors::RED, true)
    }

    /// Warning message (bold orange)
    pub fn warning(&self, text: &str) -> String {
        self.paint(text, colors::ORANGE, true)
    }

    /// Label/name (blue)
    pub fn label(&self, text: &str) -> String {
        self.paint(text, colors::BLUE, false)
    }

    /// Number (aqua)
    pub fn number(&self, text: &str) -> String {
        self.paint(text, colors::AQUA, false)
    }

    /// Secondary/muted text (grey)
    pub fn muted(&self, text: &str) -> String {
        self.paint(text, colors::GREY, false)
    }

    pub fn title(&self, text: &str) -> String {
        self.paint(text, colors::WHITE, true)
    }

    pub fn method(&self, method: &str) -> String {
        self.paint(method, protocol::http_method_color(method), true)
    }

    pub fn status(&self, code: u16) -> String {
        self.paint(&code.to_string(), protocol::http_status_color(code), true)
    }
}

/// Protocol-specific colors
pub mod protocol {
    use super::colors;

    /// HTTP status code color
    pub fn http_status_color(code: u16) -> u8 {
        match code / 100 {
            1 => colors::AQUA,   // Informational
            2 => colors::GREEN,  // Success
            3 => colors::YELLOW, // Redirect
            4 => colors::ORANGE, // Client error
            5 => colors::RED,    // Server error
            _ => colors::GREY,
        }
    }

    /// HTTP method color
    pub fn http_method_color(method: &str) -> u8 {
        match method.to_uppercase().as_str() {
            "GET" => colors::GREEN,
            "POST" => colors::YELLOW,
            "PUT" | "PATCH" => colors::ORANGE,
            "DELETE" => colors::RED,
            _ => colors::GREY,
        }
    }
}
