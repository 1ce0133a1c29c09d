// Centralized colors - edit this file to change the look

use ratatui::style::Color;

use moodlens_core::models::mood;

/// Primary text - off-white for readability
pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);

/// Secondary/muted text
pub const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);

/// Dimmed text for hints and placeholders
pub const TEXT_DIM: Color = Color::Rgb(90, 90, 90);

/// Interactive elements and focus
pub const ACCENT_PRIMARY: Color = Color::Rgb(86, 156, 214);

/// The product's yellow - chart bars and the signed-in badge
pub const ACCENT_BRAND: Color = Color::Rgb(250, 204, 21);

/// Errors and the unavailable state
pub const ACCENT_ERROR: Color = Color::Rgb(244, 112, 112);

/// Focused input border
pub const BORDER_ACTIVE: Color = Color::Rgb(100, 100, 100);

/// Inactive border
pub const BORDER_INACTIVE: Color = Color::Rgb(60, 60, 60);

/// Terminal color for a canonical mood, falling back to the default palette
/// color for unknown moods.
pub fn mood_color(canonical: &str) -> Color {
    let (r, g, b) = mood::mood_color(canonical);
    Color::Rgb(r, g, b)
}
