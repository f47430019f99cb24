//! Markov-chain harmony step selection.
//!
//! Each style is a 7x7 row-stochastic matrix over scale degrees: row = the
//! previously selected degree (1-7), column = the candidate next degree.
//! Selection walks the row's cumulative partitions in increasing order and
//! picks the unique slot whose partition contains the random draw.

/// Named transition-matrix styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkovStyle {
    BachI,
    BachII,
    MozartI,
    MozartII,
    Palestrina,
    Beethoven,
    Traditional,
    FolkCadence,
}

type Matrix = [[f32; 7]; 7];

static BACH_I: Matrix = [
    [0.10, 0.15, 0.05, 0.25, 0.25, 0.15, 0.05],
    [0.05, 0.05, 0.05, 0.05, 0.60, 0.10, 0.10],
    [0.05, 0.10, 0.05, 0.25, 0.10, 0.40, 0.05],
    [0.20, 0.15, 0.05, 0.05, 0.40, 0.05, 0.10],
    [0.55, 0.05, 0.05, 0.10, 0.10, 0.10, 0.05],
    [0.10, 0.30, 0.10, 0.20, 0.15, 0.10, 0.05],
    [0.50, 0.05, 0.10, 0.05, 0.15, 0.10, 0.05],
];

static BACH_II: Matrix = [
    [0.05, 0.20, 0.05, 0.20, 0.30, 0.15, 0.05],
    [0.10, 0.05, 0.05, 0.10, 0.50, 0.10, 0.10],
    [0.05, 0.15, 0.05, 0.30, 0.05, 0.35, 0.05],
    [0.15, 0.20, 0.05, 0.05, 0.35, 0.05, 0.15],
    [0.45, 0.05, 0.05, 0.05, 0.10, 0.25, 0.05],
    [0.05, 0.35, 0.05, 0.25, 0.10, 0.15, 0.05],
    [0.40, 0.05, 0.15, 0.05, 0.20, 0.10, 0.05],
];

static MOZART_I: Matrix = [
    [0.15, 0.10, 0.05, 0.30, 0.30, 0.05, 0.05],
    [0.10, 0.05, 0.05, 0.05, 0.65, 0.05, 0.05],
    [0.10, 0.10, 0.05, 0.30, 0.20, 0.20, 0.05],
    [0.25, 0.10, 0.05, 0.05, 0.45, 0.05, 0.05],
    [0.65, 0.05, 0.05, 0.05, 0.10, 0.05, 0.05],
    [0.10, 0.25, 0.05, 0.25, 0.25, 0.05, 0.05],
    [0.55, 0.05, 0.05, 0.05, 0.20, 0.05, 0.05],
];

static MOZART_II: Matrix = [
    [0.10, 0.15, 0.05, 0.25, 0.35, 0.05, 0.05],
    [0.05, 0.05, 0.05, 0.10, 0.60, 0.10, 0.05],
    [0.05, 0.10, 0.05, 0.35, 0.15, 0.25, 0.05],
    [0.20, 0.15, 0.05, 0.05, 0.40, 0.05, 0.10],
    [0.60, 0.05, 0.05, 0.10, 0.05, 0.10, 0.05],
    [0.05, 0.30, 0.05, 0.30, 0.20, 0.05, 0.05],
    [0.45, 0.05, 0.10, 0.05, 0.25, 0.05, 0.05],
];

static PALESTRINA: Matrix = [
    [0.10, 0.15, 0.15, 0.20, 0.20, 0.15, 0.05],
    [0.15, 0.10, 0.15, 0.15, 0.20, 0.15, 0.10],
    [0.15, 0.15, 0.10, 0.20, 0.15, 0.15, 0.10],
    [0.20, 0.10, 0.15, 0.10, 0.20, 0.15, 0.10],
    [0.25, 0.10, 0.10, 0.20, 0.10, 0.15, 0.10],
    [0.15, 0.15, 0.15, 0.15, 0.15, 0.10, 0.15],
    [0.20, 0.10, 0.15, 0.10, 0.20, 0.15, 0.10],
];

static BEETHOVEN: Matrix = [
    [0.10, 0.10, 0.10, 0.20, 0.25, 0.20, 0.05],
    [0.10, 0.05, 0.10, 0.05, 0.50, 0.10, 0.10],
    [0.10, 0.10, 0.05, 0.20, 0.15, 0.35, 0.05],
    [0.20, 0.10, 0.05, 0.10, 0.35, 0.10, 0.10],
    [0.45, 0.05, 0.05, 0.05, 0.15, 0.20, 0.05],
    [0.10, 0.20, 0.10, 0.25, 0.20, 0.05, 0.10],
    [0.45, 0.05, 0.10, 0.05, 0.15, 0.15, 0.05],
];

static TRADITIONAL: Matrix = [
    [0.20, 0.05, 0.05, 0.30, 0.30, 0.05, 0.05],
    [0.10, 0.10, 0.05, 0.10, 0.55, 0.05, 0.05],
    [0.10, 0.05, 0.10, 0.30, 0.15, 0.25, 0.05],
    [0.30, 0.05, 0.05, 0.10, 0.40, 0.05, 0.05],
    [0.60, 0.05, 0.05, 0.10, 0.10, 0.05, 0.05],
    [0.15, 0.20, 0.05, 0.25, 0.25, 0.05, 0.05],
    [0.50, 0.05, 0.05, 0.10, 0.20, 0.05, 0.05],
];

static FOLK_CADENCE: Matrix = [
    [0.20, 0.02, 0.02, 0.38, 0.34, 0.02, 0.02],
    [0.30, 0.02, 0.02, 0.30, 0.30, 0.04, 0.02],
    [0.30, 0.02, 0.02, 0.30, 0.30, 0.04, 0.02],
    [0.35, 0.02, 0.02, 0.15, 0.40, 0.04, 0.02],
    [0.55, 0.02, 0.02, 0.25, 0.10, 0.04, 0.02],
    [0.30, 0.02, 0.02, 0.30, 0.30, 0.04, 0.02],
    [0.40, 0.02, 0.02, 0.25, 0.25, 0.04, 0.02],
];

impl MarkovStyle {
    pub fn matrix(self) -> &'static Matrix {
        match self {
            MarkovStyle::BachI => &BACH_I,
            MarkovStyle::BachII => &BACH_II,
            MarkovStyle::MozartI => &MOZART_I,
            MarkovStyle::MozartII => &MOZART_II,
            MarkovStyle::Palestrina => &PALESTRINA,
            MarkovStyle::Beethoven => &BEETHOVEN,
            MarkovStyle::Traditional => &TRADITIONAL,
            MarkovStyle::FolkCadence => &FOLK_CADENCE,
        }
    }

    pub const ALL: [MarkovStyle; 8] = [
        MarkovStyle::BachI,
        MarkovStyle::BachII,
        MarkovStyle::MozartI,
        MarkovStyle::MozartII,
        MarkovStyle::Palestrina,
        MarkovStyle::Beethoven,
        MarkovStyle::Traditional,
        MarkovStyle::FolkCadence,
    ];
}

/// Select the next harmony step (0-based) for `style`.
///
/// `prior` is the previously selected step, or -1 when undefined — an
/// undefined prior always yields step 0 regardless of the draw. Otherwise
/// the result is the unique i with cumulative[i-1] < r <= cumulative[i]
/// over the prior step's row; a draw that lands in no partition (r = 0)
/// falls back to step 0.
pub fn select_step(style: MarkovStyle, prior: i8, r: f32) -> u8 {
    if prior < 0 {
        return 0;
    }
    let row = &style.matrix()[prior as usize % 7];
    let mut bottom = 0.0f32;
    for (i, p) in row.iter().enumerate() {
        let top = bottom + p;
        if r > bottom && r <= top {
            return i as u8;
        }
        bottom = top;
    }
    // A draw past the accumulated total (float rounding on the last
    // partition) belongs to the final slot; anything else is the r = 0 case.
    if r > bottom {
        6
    } else {
        0
    }
}
