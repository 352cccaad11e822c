//! Random-throw simulation runner.
//!
//! Plays many seeded matches where every dart is drawn uniformly from the
//! board catalog. Used to soak-test the engines (every match must terminate
//! or hit the turn cap, and a seed always reproduces the same match) and to
//! gather rough outcome statistics per seat.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::engine::dart::{Dart, DART_CATALOG, MAX_DARTS_PER_TURN};
use crate::engine::error::DartsError;
use crate::engine::models::*;
use crate::engine::orchestrator::TurnOrchestrator;
use crate::engine::plugin::VariantEngine;

#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub num_matches: usize,
    pub num_players: usize,
    pub base_seed: u64,
    /// Matches still running after this many turns are counted as unfinished.
    pub max_turns: usize,
    /// Probability that a dart misses the board entirely.
    pub miss_rate: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_matches: 100,
            num_players: 2,
            base_seed: 42,
            max_turns: 10_000,
            miss_rate: 0.1,
        }
    }
}

/// Outcome of one simulated match.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedMatch {
    pub seed: u64,
    pub verdict: Verdict,
    pub winner_seats: Vec<usize>,
    pub turns: usize,
    pub darts: u32,
    pub duration_ms: f64,
}

/// Aggregated results from a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub variant: String,
    pub num_matches: usize,
    pub wins_by_seat: Vec<usize>,
    pub instant_wins: usize,
    pub shared_victories: usize,
    pub unfinished: usize,
    pub darts_per_match: Vec<u32>,
    pub match_durations_ms: Vec<f64>,
}

impl SimulationReport {
    pub fn win_rate(&self, seat: usize) -> f64 {
        *self.wins_by_seat.get(seat).unwrap_or(&0) as f64 / self.num_matches.max(1) as f64
    }

    pub fn avg_darts(&self) -> f64 {
        if self.darts_per_match.is_empty() {
            return 0.0;
        }
        self.darts_per_match.iter().map(|&d| d as f64).sum::<f64>() / self.darts_per_match.len() as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("{} simulation ({} matches)", self.variant, self.num_matches)];
        lines.push("=".repeat(60));
        for (seat, wins) in self.wins_by_seat.iter().enumerate() {
            lines.push(format!(
                "  seat {:>2}: {:5} wins ({:5.1}%)",
                seat,
                wins,
                self.win_rate(seat) * 100.0
            ));
        }
        lines.push(format!("  instant wins: {}", self.instant_wins));
        lines.push(format!("  shared victories: {}", self.shared_victories));
        lines.push(format!("  unfinished: {}", self.unfinished));
        lines.push(format!("  avg darts per match: {:.1}", self.avg_darts()));
        if !self.match_durations_ms.is_empty() {
            let total_ms: f64 = self.match_durations_ms.iter().sum();
            lines.push(format!(
                "  avg match: {:.3}ms  |  total: {:.1}s",
                total_ms / self.match_durations_ms.len() as f64,
                total_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

pub fn simulation_roster(num_players: usize) -> Vec<MatchPlayer> {
    (0..num_players)
        .map(|i| MatchPlayer::new(format!("p{i}"), format!("Seat {i}"), i as u32))
        .collect()
}

pub fn random_dart<R: Rng>(rng: &mut R, miss_rate: f64) -> Dart {
    if rng.gen_bool(miss_rate.clamp(0.0, 1.0)) {
        return Dart::Miss;
    }
    // Index 0 of the catalog is the miss; draw from the hits only.
    DART_CATALOG[1..].choose(rng).copied().unwrap_or(Dart::Miss)
}

/// Play one seeded match to completion or to the turn cap.
pub fn play_one_match<V: VariantEngine>(
    engine: V,
    roster: Vec<MatchPlayer>,
    seed: u64,
    max_turns: usize,
    miss_rate: f64,
) -> Result<SimulatedMatch, DartsError> {
    let t0 = Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut orchestrator = TurnOrchestrator::new(engine, roster)?;

    let mut turns = 0;
    let mut darts = 0u32;
    while !orchestrator.is_over() && turns < max_turns {
        let thrown: Vec<Dart> = (0..MAX_DARTS_PER_TURN)
            .map(|_| random_dart(&mut rng, miss_rate))
            .collect();
        orchestrator.submit_darts(&thrown)?;
        darts += thrown.len() as u32;
        turns += 1;
    }

    let verdict = orchestrator.verdict().clone();
    let winners = verdict.winners();
    let winner_seats = orchestrator
        .roster()
        .iter()
        .enumerate()
        .filter(|(_, p)| winners.contains(&p.id))
        .map(|(seat, _)| seat)
        .collect();

    Ok(SimulatedMatch {
        seed,
        verdict,
        winner_seats,
        turns,
        darts,
        duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Run `params.num_matches` seeded matches in parallel and aggregate them.
pub fn run_simulations<V>(engine: &V, params: &SimulationParams) -> Result<SimulationReport, DartsError>
where
    V: VariantEngine + Clone,
{
    let roster = simulation_roster(params.num_players);
    let matches: Vec<SimulatedMatch> = (0..params.num_matches)
        .into_par_iter()
        .map(|i| {
            play_one_match(
                engine.clone(),
                roster.clone(),
                params.base_seed + i as u64,
                params.max_turns,
                params.miss_rate,
            )
        })
        .collect::<Result<Vec<_>, DartsError>>()?;

    let mut report = SimulationReport {
        variant: engine.display_name().to_string(),
        num_matches: params.num_matches,
        wins_by_seat: vec![0; params.num_players],
        instant_wins: 0,
        shared_victories: 0,
        unfinished: 0,
        darts_per_match: Vec::with_capacity(matches.len()),
        match_durations_ms: Vec::with_capacity(matches.len()),
    };
    for m in &matches {
        match &m.verdict {
            Verdict::Continue => report.unfinished += 1,
            Verdict::ShanghaiInstantWin(_) => report.instant_wins += 1,
            Verdict::SharedVictory(_) => report.shared_victories += 1,
            Verdict::Winner(_) => {}
        }
        if !matches!(m.verdict, Verdict::SharedVictory(_)) {
            for &seat in &m.winner_seats {
                report.wins_by_seat[seat] += 1;
            }
        }
        report.darts_per_match.push(m.darts);
        report.match_durations_ms.push(m.duration_ms);
    }
    tracing::debug!(
        variant = %report.variant,
        matches = report.num_matches,
        unfinished = report.unfinished,
        "simulation finished"
    );
    Ok(report)
}
