use std::{path::PathBuf, time::Instant};

use anyhow::Context;
use nnue_trainer::{Chess768, PositionRecord, SkipReason, TextDataLoader};
use structopt::StructOpt;

const REASONS: [(SkipReason, &str); 5] = [
    (SkipReason::Noisy, "Noisy move"),
    (SkipReason::InCheck, "Side to move in check"),
    (SkipReason::GivesCheck, "Move gives check"),
    (SkipReason::Promotion, "Promotion"),
    (SkipReason::DrawnButDecisive, "Drawn with decisive score"),
];

#[derive(StructOpt)]
pub struct ValidateOptions {
    #[structopt(required = true, short, long)]
    input: Vec<PathBuf>,
}

impl ValidateOptions {
    pub fn run(&self) -> anyhow::Result<()> {
        let loader = TextDataLoader::new(&self.input);
        log::info!("validating {} files", self.input.len());

        let timer = Instant::now();
        let mut total = 0u64;
        let mut eligible = 0u64;
        let mut malformed = 0u64;
        let mut invalid = 0u64;
        let mut skipped = [0u64; REASONS.len()];
        let mut results = [0u64; 3];
        let mut first_malformed = None;
        let mut first_invalid = None;

        for line in loader.lines() {
            let line = line.with_context(|| "Failed to read data.")?;
            total += 1;

            let pos = match PositionRecord::parse(&line) {
                Ok(pos) => pos,
                Err(err) => {
                    malformed += 1;
                    first_malformed.get_or_insert(err.to_string());
                    continue;
                }
            };

            results[outcome_index(pos.wdl)] += 1;

            if let Some(reason) = pos.skip_reason() {
                let idx = REASONS.iter().position(|(r, _)| *r == reason).unwrap_or_default();
                skipped[idx] += 1;
                continue;
            }

            match Chess768::encode(pos.board) {
                Ok(_) => eligible += 1,
                Err(err) => {
                    invalid += 1;
                    first_invalid.get_or_insert(err.to_string());
                }
            }

            if total % 10_000_000 == 0 {
                println!("Checked {total} Positions");
            }
        }

        println!();
        println!("SUMMARY:");
        println!("Checked {total} Positions in {:.2} seconds", timer.elapsed().as_secs_f32());
        println!("Trainable positions: {eligible}");

        let parsed = results.iter().sum::<u64>().max(1);
        let [l, d, w] = results.map(|count| count * 100 / parsed);
        println!("Wins: {w}%, Draws: {d}%, Losses: {l}%");

        println!();
        println!("FILTERED:");
        for (&count, (_, msg)) in skipped.iter().zip(REASONS.iter()) {
            println!("{msg: <35} : {count}");
        }

        if malformed + invalid > 0 {
            println!();
            println!("ERRORS:");
            println!("{: <35} : {malformed}", "Malformed records");
            println!("{: <35} : {invalid}", "Invalid boards");

            if let Some(err) = first_malformed {
                println!("First malformed record: {err}");
            }

            if let Some(err) = first_invalid {
                println!("First invalid board: {err}");
            }

            anyhow::bail!("Found {} unusable records.", malformed + invalid);
        }

        println!("No invalid positions!");
        Ok(())
    }
}

/// Buckets an outcome as loss, draw or win.
fn outcome_index(wdl: f32) -> usize {
    if wdl < 0.25 {
        0
    } else if wdl > 0.75 {
        2
    } else {
        1
    }
}
