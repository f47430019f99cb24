//! Circle-of-fifths layout and the degree semicircle.
//!
//! Twelve stations a fifth apart, with the seven diatonic degrees occupying
//! seven consecutive stations starting one station counter-clockwise of the
//! root (the subdominant). The reverse map from scale degree to station —
//! the "semicircle" — is what the harmony selector uses to turn a degree
//! into a chord root and quality. Rebuilt whenever root key or mode changes.

use crate::chord::ChordType;
use crate::note::PITCH_CLASSES;
use crate::scale::Mode;

/// Number of harmonic degrees.
pub const DEGREE_COUNT: usize = 7;

/// Degrees in circle order, clockwise from the station left of the root:
/// IV, I, V, ii, vi, iii, vii.
static DEGREES_IN_CIRCLE_ORDER: [u8; DEGREE_COUNT] = [4, 1, 5, 2, 6, 3, 7];

/// One station on the circle.
#[derive(Clone, Copy, Debug)]
pub struct Station {
    /// Pitch class of the station's chord root.
    pub pitch_class: u8,
    /// Triad quality at this station in the current mode.
    pub triad: ChordType,
    /// Scale degree (1-7) if the station is diatonic, else None.
    pub degree: Option<u8>,
}

/// The circle layout for one root key + mode.
#[derive(Clone, Debug)]
pub struct CircleOfFifths {
    stations: [Station; PITCH_CLASSES],
    /// Degree (1-7, as index 0-6) to station index.
    semicircle: [usize; DEGREE_COUNT],
}

impl CircleOfFifths {
    /// Build the layout. Station 0 carries the root key.
    pub fn build(root: u8, mode: Mode) -> Self {
        let root = root % PITCH_CLASSES as u8;
        let mut stations = [Station {
            pitch_class: 0,
            triad: ChordType::Major,
            degree: None,
        }; PITCH_CLASSES];
        for (i, station) in stations.iter_mut().enumerate() {
            station.pitch_class = ((root as usize + 7 * i) % PITCH_CLASSES) as u8;
        }

        let mut semicircle = [0usize; DEGREE_COUNT];
        for (slot, degree) in DEGREES_IN_CIRCLE_ORDER.iter().copied().enumerate() {
            // Slot 0 sits one station counter-clockwise of the root.
            let station_index = (slot + PITCH_CLASSES - 1) % PITCH_CLASSES;
            stations[station_index].degree = Some(degree);
            stations[station_index].triad = diatonic_triad(mode, degree);
            semicircle[degree as usize - 1] = station_index;
        }

        Self {
            stations,
            semicircle,
        }
    }

    pub fn station(&self, index: usize) -> &Station {
        &self.stations[index % PITCH_CLASSES]
    }

    /// Station index for a 1-based scale degree (clamped).
    pub fn station_for_degree(&self, degree: u8) -> usize {
        self.semicircle[(degree.clamp(1, DEGREE_COUNT as u8) - 1) as usize]
    }

    /// Chord root pitch class for a 1-based scale degree.
    pub fn degree_root(&self, degree: u8) -> u8 {
        self.station(self.station_for_degree(degree)).pitch_class
    }
}

/// Triad quality of a 1-based degree in a mode, by stacking scale thirds.
pub fn diatonic_triad(mode: Mode, degree: u8) -> ChordType {
    let d = (degree.clamp(1, 7) - 1) as usize;
    let offset = |k: usize| -> i16 {
        let wraps = ((d + k) / 7) as i16;
        mode.degree_offset(((d + k) % 7) as u8 + 1) + wraps * 12 - mode.degree_offset(d as u8 + 1)
    };
    ChordType::from_triad(offset(2), offset(4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_degree_roots() {
        let circle = CircleOfFifths::build(0, Mode::Ionian);
        assert_eq!(circle.degree_root(1), 0); // C
        assert_eq!(circle.degree_root(2), 2); // D
        assert_eq!(circle.degree_root(4), 5); // F
        assert_eq!(circle.degree_root(5), 7); // G
        assert_eq!(circle.degree_root(7), 11); // B
    }

    #[test]
    fn c_major_triad_qualities() {
        let circle = CircleOfFifths::build(0, Mode::Ionian);
        let quality = |d| circle.station(circle.station_for_degree(d)).triad;
        assert_eq!(quality(1), ChordType::Major);
        assert_eq!(quality(2), ChordType::Minor);
        assert_eq!(quality(3), ChordType::Minor);
        assert_eq!(quality(4), ChordType::Major);
        assert_eq!(quality(5), ChordType::Major);
        assert_eq!(quality(6), ChordType::Minor);
        assert_eq!(quality(7), ChordType::Diminished);
    }

    #[test]
    fn aeolian_triad_qualities() {
        assert_eq!(diatonic_triad(Mode::Aeolian, 1), ChordType::Minor);
        assert_eq!(diatonic_triad(Mode::Aeolian, 2), ChordType::Diminished);
        assert_eq!(diatonic_triad(Mode::Aeolian, 3), ChordType::Major);
        assert_eq!(diatonic_triad(Mode::Aeolian, 6), ChordType::Major);
    }

    #[test]
    fn degrees_occupy_consecutive_stations() {
        let circle = CircleOfFifths::build(0, Mode::Ionian);
        // IV sits at station 11, then I, V, ii, vi, iii, vii clockwise.
        assert_eq!(circle.station_for_degree(4), 11);
        assert_eq!(circle.station_for_degree(1), 0);
        assert_eq!(circle.station_for_degree(5), 1);
        assert_eq!(circle.station_for_degree(2), 2);
        assert_eq!(circle.station_for_degree(6), 3);
        assert_eq!(circle.station_for_degree(3), 4);
        assert_eq!(circle.station_for_degree(7), 5);
    }

    #[test]
    fn station_roots_ascend_by_fifths() {
        let circle = CircleOfFifths::build(0, Mode::Ionian);
        assert_eq!(circle.station(0).pitch_class, 0); // C
        assert_eq!(circle.station(1).pitch_class, 7); // G
        assert_eq!(circle.station(2).pitch_class, 2); // D
        assert_eq!(circle.station(11).pitch_class, 5); // F
    }

    #[test]
    fn rebuild_with_new_root_moves_every_station() {
        let circle = CircleOfFifths::build(7, Mode::Ionian);
        assert_eq!(circle.degree_root(1), 7); // G
        assert_eq!(circle.degree_root(5), 2); // D
        assert_eq!(circle.degree_root(4), 0); // C
    }

    #[test]
    fn out_of_range_degree_clamps() {
        let circle = CircleOfFifths::build(0, Mode::Ionian);
        assert_eq!(circle.station_for_degree(0), circle.station_for_degree(1));
        assert_eq!(circle.station_for_degree(99), circle.station_for_degree(7));
    }
}
