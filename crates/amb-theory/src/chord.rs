//! Chord qualities and member intervals.

/// Chord quality attached to a circle station.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChordType {
    #[default]
    Major,
    Minor,
    Diminished,
    Dominant7,
    Minor7,
    Diminished7,
}

impl ChordType {
    /// Semitone intervals of the chord members above the root.
    pub fn intervals(self) -> &'static [i16] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Diminished7 => &[0, 3, 6, 9],
        }
    }

    /// Number of chord members (3 for triads, 4 for sevenths).
    pub fn member_count(self) -> usize {
        self.intervals().len()
    }

    pub fn has_seventh(self) -> bool {
        self.member_count() == 4
    }

    /// Classify a triad from its third/fifth semitone offsets.
    pub fn from_triad(third: i16, fifth: i16) -> Self {
        match (third, fifth) {
            (4, _) => ChordType::Major,
            (3, 7) => ChordType::Minor,
            _ => ChordType::Diminished,
        }
    }

    /// Apply a seventh-promotion policy for the triad on `degree`.
    ///
    /// Minor and diminished triads take their sevenths under `All`; a major
    /// triad is only promoted (to a dominant seventh) when it sits on the
    /// fifth degree. Plain major triads elsewhere are never promoted.
    pub fn promote(self, degree: u8, style: SeventhStyle) -> Self {
        match (style, self) {
            (SeventhStyle::None, chord) => chord,
            (SeventhStyle::DominantOnly, ChordType::Major) if degree == 5 => ChordType::Dominant7,
            (SeventhStyle::DominantOnly, chord) => chord,
            (SeventhStyle::All, ChordType::Major) if degree == 5 => ChordType::Dominant7,
            (SeventhStyle::All, ChordType::Major) => ChordType::Major,
            (SeventhStyle::All, ChordType::Minor) => ChordType::Minor7,
            (SeventhStyle::All, ChordType::Diminished) => ChordType::Diminished7,
            (_, chord) => chord,
        }
    }
}

/// Seventh-chord policy for the harmony voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeventhStyle {
    #[default]
    None,
    /// Only the dominant (V) degree takes a seventh.
    DominantOnly,
    /// Every seventh-capable degree takes one.
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triad_classification() {
        assert_eq!(ChordType::from_triad(4, 7), ChordType::Major);
        assert_eq!(ChordType::from_triad(3, 7), ChordType::Minor);
        assert_eq!(ChordType::from_triad(3, 6), ChordType::Diminished);
    }

    #[test]
    fn member_counts() {
        assert_eq!(ChordType::Major.member_count(), 3);
        assert_eq!(ChordType::Dominant7.member_count(), 4);
        assert!(!ChordType::Minor.has_seventh());
        assert!(ChordType::Diminished7.has_seventh());
    }

    #[test]
    fn all_sevenths_promotes_minor_and_diminished() {
        assert_eq!(
            ChordType::Minor.promote(2, SeventhStyle::All),
            ChordType::Minor7
        );
        assert_eq!(
            ChordType::Diminished.promote(7, SeventhStyle::All),
            ChordType::Diminished7
        );
    }

    #[test]
    fn major_only_promotes_on_the_dominant() {
        assert_eq!(
            ChordType::Major.promote(1, SeventhStyle::All),
            ChordType::Major
        );
        assert_eq!(
            ChordType::Major.promote(5, SeventhStyle::All),
            ChordType::Dominant7
        );
        assert_eq!(
            ChordType::Major.promote(5, SeventhStyle::DominantOnly),
            ChordType::Dominant7
        );
        assert_eq!(
            ChordType::Major.promote(4, SeventhStyle::DominantOnly),
            ChordType::Major
        );
    }

    #[test]
    fn none_style_changes_nothing() {
        for chord in [ChordType::Major, ChordType::Minor, ChordType::Diminished] {
            assert_eq!(chord.promote(5, SeventhStyle::None), chord);
        }
    }
}
