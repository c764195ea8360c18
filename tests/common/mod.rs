#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

pub const BOARDS: [&str; 7] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
    "4k3/8/8/8/8/8/8/4K3",
    "r3k2r/8/8/8/8/8/8/R3K2R",
    "4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3",
    "2kr4/ppp5/8/8/3Q4/8/5PPP/6K1",
    "8/8/4k3/8/2N5/8/4K3/8",
    "6k1/5ppp/8/8/8/8/5PPP/1R4K1",
];

pub fn record(board: &str, score: i32, wdl: f32) -> String {
    format!("{board} w - - 1 1 {score} e2e4 - - - {wdl:.1}")
}

/// Seven trainable records followed by one noisy record.
pub fn dataset_lines() -> Vec<String> {
    let outcomes = [(25, 0.5), (-40, 0.5), (150, 1.0), (-220, 0.0), (600, 1.0), (10, 0.5), (-90, 0.0)];

    let mut lines = BOARDS
        .iter()
        .zip(outcomes)
        .map(|(board, (score, wdl))| record(board, score, wdl))
        .collect::<Vec<_>>();

    lines.push(format!("{} w - - 1 1 35 e2e4 n - - 1.0", BOARDS[0]));
    lines
}

pub fn write_lines(path: &Path, lines: &[String]) -> PathBuf {
    let mut file = File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path.to_path_buf()
}

pub fn sorted_lines(path: &Path) -> Vec<String> {
    let mut lines = fs::read_to_string(path).unwrap().lines().map(str::to_string).collect::<Vec<_>>();
    lines.sort();
    lines
}
