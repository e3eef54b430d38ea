use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;
pub const URL: Color = Color::Cyan;
pub const CREDENTIAL: Color = Color::BrightRed;
pub const VENDOR: Color = Color::Magenta;
