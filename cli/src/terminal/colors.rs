use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const IPV4_ADDR: Color = Color::BrightBlue;
pub const MODEL: Color = Color::BrightMagenta;
pub const GOOD: Color = Color::Green;
pub const BAD: Color = Color::Red;
pub const CAUTION: Color = Color::Yellow;
