use crate::{util::sigmoid, Error, Result};

/// Drawn positions scored beyond this many centipawns are treated as mislabelled.
pub const DRAWN_SCORE_LIMIT: f32 = 300.0;

const FIELDS: usize = 12;

/// One line of a dataset file:
///
/// ```text
/// 8/8/8/8/6p1/5nk1/p7/3RrK2 w - - 3 169 -1124 d1e1 n - - 0.0
/// board stm castling ep game ply score move noisy incheck givescheck wdl
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionRecord<'a> {
    pub board: &'a str,
    pub stm: &'a str,
    pub castling: &'a str,
    pub en_passant: &'a str,
    pub game: &'a str,
    pub ply: &'a str,
    pub score: f32,
    pub mov: &'a str,
    pub noisy: bool,
    pub in_check: bool,
    pub gives_check: bool,
    pub wdl: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Noisy,
    InCheck,
    GivesCheck,
    Promotion,
    DrawnButDecisive,
}

impl<'a> PositionRecord<'a> {
    pub fn parse(line: &'a str) -> Result<Self> {
        let mut parts = [""; FIELDS];
        let mut fields = 0;

        for part in line.split_whitespace() {
            if fields < FIELDS {
                parts[fields] = part;
            }
            fields += 1;
        }

        if fields != FIELDS {
            return Err(Error::malformed(line, fields));
        }

        let number = |s: &str| s.parse::<f32>().map_err(|_| Error::malformed(line, fields));

        Ok(Self {
            board: parts[0],
            stm: parts[1],
            castling: parts[2],
            en_passant: parts[3],
            game: parts[4],
            ply: parts[5],
            score: number(parts[6])?,
            mov: parts[7],
            noisy: parts[8] == "n",
            in_check: parts[9] == "c",
            gives_check: parts[10] == "g",
            wdl: number(parts[11])?,
        })
    }

    /// First filter rule that rejects this position, if any.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.noisy {
            Some(SkipReason::Noisy)
        } else if self.in_check {
            Some(SkipReason::InCheck)
        } else if self.gives_check {
            Some(SkipReason::GivesCheck)
        } else if self.mov.len() == 5 {
            Some(SkipReason::Promotion)
        } else if self.wdl == 0.5 && self.score.abs() > DRAWN_SCORE_LIMIT {
            Some(SkipReason::DrawnButDecisive)
        } else {
            None
        }
    }

    pub fn should_skip(&self) -> bool {
        self.skip_reason().is_some()
    }

    pub fn target(&self, interp: f32, scale: f32) -> f32 {
        lerp(self.score, self.wdl, interp, scale)
    }
}

/// Blends the score's win probability towards the game outcome by `t`.
pub fn lerp(eval: f32, wdl: f32, t: f32, scale: f32) -> f32 {
    let sg = sigmoid(eval, scale);
    sg + (wdl - sg) * t
}
