/// The fixed palette of known moods, in the order the feed filter cycles
/// through them.
pub const KNOWN_MOODS: [&str; 8] = [
    "sadness",
    "anger",
    "love",
    "fear",
    "disgust",
    "surprise",
    "joy",
    "happiness",
];

/// Chart/card color for moods outside the known palette.
pub const DEFAULT_MOOD_COLOR: (u8, u8, u8) = (0xFF, 0xFF, 0xFF);

/// RGB color for a canonical mood. Unknown moods keep their string but
/// render with [`DEFAULT_MOOD_COLOR`].
pub fn mood_color(canonical: &str) -> (u8, u8, u8) {
    match canonical {
        "sadness" => (0x93, 0xC5, 0xFD),
        "anger" => (0xFC, 0xA5, 0xA5),
        "love" => (0xF9, 0xA8, 0xD4),
        "fear" => (0xD8, 0xB4, 0xFE),
        "disgust" => (0x86, 0xEF, 0xAC),
        "surprise" => (0xF9, 0xE8, 0x8C),
        "joy" | "happiness" => (0xE9, 0x92, 0x2B),
        _ => DEFAULT_MOOD_COLOR,
    }
}

/// Feed filter: everything, or one known mood. Filtering is a derived view;
/// it never touches the subscribed record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoodFilter {
    #[default]
    All,
    Mood(&'static str),
}

impl MoodFilter {
    pub fn label(&self) -> &'static str {
        match self {
            MoodFilter::All => "all",
            MoodFilter::Mood(mood) => mood,
        }
    }

    /// Advance the filter selector: All, then each known mood, then back.
    pub fn cycle_next(&self) -> MoodFilter {
        match self {
            MoodFilter::All => MoodFilter::Mood(KNOWN_MOODS[0]),
            MoodFilter::Mood(current) => {
                let position = KNOWN_MOODS.iter().position(|m| m == current);
                match position {
                    Some(i) if i + 1 < KNOWN_MOODS.len() => MoodFilter::Mood(KNOWN_MOODS[i + 1]),
                    _ => MoodFilter::All,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_moods_have_palette_colors() {
        for mood in KNOWN_MOODS {
            assert_ne!(mood_color(mood), DEFAULT_MOOD_COLOR, "{mood}");
        }
        assert_eq!(mood_color("melancholy"), DEFAULT_MOOD_COLOR);
        assert_eq!(mood_color(""), DEFAULT_MOOD_COLOR);
    }

    #[test]
    fn joy_and_happiness_share_a_color() {
        assert_eq!(mood_color("joy"), mood_color("happiness"));
    }

    #[test]
    fn filter_cycles_through_all_moods_and_wraps() {
        let mut filter = MoodFilter::All;
        let mut seen = Vec::new();
        loop {
            filter = filter.cycle_next();
            if filter == MoodFilter::All {
                break;
            }
            seen.push(filter.label());
        }
        assert_eq!(seen, KNOWN_MOODS.to_vec());
    }
}
