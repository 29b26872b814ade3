/// Statement colors. The numeric value is the ANSI color offset (30 + n / 90 + n).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red = 1,
    Green = 2,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
}

impl Color {
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
        }
    }
}

/// ANSI escape sequences for one statement color
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub text: String,   // Normal foreground for the statement body
    pub bright: String, // Bright foreground for bound values
    pub reset: String,
}

impl ColorScheme {
    pub fn new(color: Color, use_colors: bool) -> Self {
        if use_colors {
            let offset = color as u8;
            Self {
                text: format!("\x1b[{}m", 30 + offset),
                bright: format!("\x1b[{}m", 90 + offset),
                reset: "\x1b[0m".to_string(),
            }
        } else {
            // All empty strings for no-color mode
            Self {
                text: String::new(),
                bright: String::new(),
                reset: String::new(),
            }
        }
    }
}
