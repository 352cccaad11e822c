//! ShanghaiEngine — implements VariantEngine for Shanghai.

use crate::engine::dart::Dart;
use crate::engine::error::DartsError;
use crate::engine::models::*;
use crate::engine::plugin::{validate_darts, VariantEngine};

use super::scoring::tally_turn;
use super::types::*;

#[derive(Debug, Clone)]
pub struct ShanghaiEngine {
    config: ShanghaiConfig,
}

impl ShanghaiEngine {
    pub fn new(config: ShanghaiConfig) -> Result<Self, DartsError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Highest total wins; ties are settled by an ordered walk over the roster.
    fn final_verdict(&self, state: &ShanghaiState, roster: &[MatchPlayer]) -> Verdict {
        let mut ordered: Vec<&MatchPlayer> = roster.iter().collect();
        ordered.sort_by_key(|p| p.order);

        let total = |p: &MatchPlayer| state.players.get(&p.id).map_or(0, |s| s.total_score);
        let Some(best) = ordered.iter().map(|p| total(p)).max() else {
            return Verdict::Continue;
        };
        let leaders: Vec<PlayerId> = ordered
            .iter()
            .filter(|p| total(p) == best)
            .map(|p| p.id.clone())
            .collect();

        match (self.config.tie_break, leaders.as_slice()) {
            (_, [only]) => Verdict::Winner(only.clone()),
            (TieBreak::RosterOrder, [first, ..]) => Verdict::Winner(first.clone()),
            (TieBreak::SharedVictory, _) => Verdict::SharedVictory(leaders),
            (TieBreak::RosterOrder, []) => Verdict::Continue,
        }
    }
}

impl Default for ShanghaiEngine {
    fn default() -> Self {
        Self {
            config: ShanghaiConfig::default(),
        }
    }
}

impl VariantEngine for ShanghaiEngine {
    type State = ShanghaiState;

    fn variant_id(&self) -> &str {
        "shanghai"
    }
    fn display_name(&self) -> &str {
        "Shanghai"
    }
    fn description(&self) -> &str {
        "Each round targets the next number. Only hits on the target score. \
         Single, double and triple of the target in one turn wins on the spot."
    }

    fn create_initial_state(&self, roster: &[MatchPlayer]) -> ShanghaiState {
        ShanghaiState {
            players: roster
                .iter()
                .map(|p| (p.id.clone(), ShanghaiPlayerState::default()))
                .collect(),
            shanghai_by: None,
        }
    }

    fn apply_turn(
        &self,
        state: &ShanghaiState,
        ctx: &TurnContext,
        darts: &[Dart],
    ) -> Result<TurnTransition<ShanghaiState>, DartsError> {
        validate_darts(darts)?;
        let target = self.config.target_for_round(ctx.round).ok_or_else(|| {
            DartsError::StateCorrupted(format!(
                "round {} is past the final round {}",
                ctx.round,
                self.config.round_count - 1
            ))
        })?;
        if let Some(winner) = &state.shanghai_by {
            return Err(DartsError::StateCorrupted(format!(
                "match was already won by `{winner}`"
            )));
        }

        let mut next = state.clone();
        let player = next.players.get_mut(&ctx.player_id).ok_or_else(|| {
            DartsError::StateCorrupted(format!("player `{}` has no shanghai state", ctx.player_id))
        })?;

        let tally = tally_turn(target, darts);
        player.total_score += tally.score;
        *player.round_scores.entry(ctx.round).or_insert(0) += tally.score;

        let mut events = Vec::new();
        if tally.score > 0 {
            events.push(TurnEvent::TargetHit {
                player_id: ctx.player_id.clone(),
                target,
                score: tally.score,
            });
        }
        if tally.is_shanghai() {
            next.shanghai_by = Some(ctx.player_id.clone());
            events.push(TurnEvent::Shanghai {
                player_id: ctx.player_id.clone(),
                target,
            });
        }

        Ok(TurnTransition { state: next, events })
    }

    fn evaluate(&self, state: &ShanghaiState, ctx: &TurnContext, roster: &[MatchPlayer]) -> Verdict {
        if state.shanghai_by.as_deref() == Some(ctx.player_id.as_str()) {
            return Verdict::ShanghaiInstantWin(ctx.player_id.clone());
        }
        if ctx.closes_round && ctx.round + 1 >= self.config.round_count {
            return self.final_verdict(state, roster);
        }
        Verdict::Continue
    }

    fn score(&self, state: &ShanghaiState, player_id: &str) -> i64 {
        state.players.get(player_id).map_or(0, |p| p.total_score as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<MatchPlayer> {
        vec![
            MatchPlayer::new("a", "Alice", 0),
            MatchPlayer::new("b", "Bob", 1),
            MatchPlayer::new("c", "Cleo", 2),
        ]
    }

    fn engine(start: u8, rounds: u32, tie_break: TieBreak) -> ShanghaiEngine {
        ShanghaiEngine::new(ShanghaiConfig {
            start_number: start,
            round_count: rounds,
            tie_break,
        })
        .unwrap()
    }

    fn ctx(player: &str, seat: usize, round: u32) -> TurnContext {
        TurnContext {
            player_id: player.into(),
            seat,
            round,
            closes_round: seat == 2,
        }
    }

    fn with_totals(totals: [u32; 3]) -> ShanghaiState {
        let mut state = engine(1, 3, TieBreak::RosterOrder).create_initial_state(&roster());
        for (id, total) in ["a", "b", "c"].iter().zip(totals) {
            state.players.get_mut(*id).unwrap().total_score = total;
        }
        state
    }

    #[test]
    fn test_config_validation() {
        assert!(ShanghaiEngine::new(ShanghaiConfig { start_number: 0, ..Default::default() }).is_err());
        assert!(ShanghaiEngine::new(ShanghaiConfig { round_count: 0, ..Default::default() }).is_err());
        assert!(ShanghaiEngine::new(ShanghaiConfig { start_number: 15, round_count: 7, ..Default::default() }).is_err());
        assert!(ShanghaiEngine::new(ShanghaiConfig { start_number: 14, round_count: 7, ..Default::default() }).is_ok());
        assert_eq!(ShanghaiConfig::default().target_list(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(matches!(
            ShanghaiEngine::new(ShanghaiConfig { start_number: 2, round_count: u32::MAX, ..Default::default() }),
            Err(DartsError::InvalidSetup(_))
        ));
        assert!(ShanghaiEngine::new(ShanghaiConfig { start_number: 255, round_count: u32::MAX, ..Default::default() }).is_err());
    }

    #[test]
    fn test_target_for_round_never_wraps() {
        let huge = ShanghaiConfig { start_number: 250, round_count: u32::MAX, ..Default::default() };
        assert_eq!(huge.target_for_round(5), Some(255));
        assert_eq!(huge.target_for_round(10), None);
        assert_eq!(huge.target_for_round(300), None);
        assert_eq!(ShanghaiConfig::default().target_for_round(7), None);
    }

    #[test]
    fn test_instant_win_round_zero() {
        let eng = engine(1, 3, TieBreak::RosterOrder);
        let state = eng.create_initial_state(&roster());
        let c = ctx("a", 0, 0);
        let t = eng
            .apply_turn(&state, &c, &[Dart::single(1), Dart::double(1), Dart::triple(1)])
            .unwrap();
        assert_eq!(t.state.shanghai_by.as_deref(), Some("a"));
        assert_eq!(eng.evaluate(&t.state, &c, &roster()), Verdict::ShanghaiInstantWin("a".into()));
        assert!(t.events.contains(&TurnEvent::Shanghai { player_id: "a".into(), target: 1 }));
    }

    #[test]
    fn test_instant_win_ignores_scores() {
        let eng = engine(1, 3, TieBreak::RosterOrder);
        let mut state = with_totals([0, 500, 0]);
        state.players.get_mut("a").unwrap().total_score = 0;
        let c = ctx("a", 0, 2);
        let t = eng
            .apply_turn(&state, &c, &[Dart::triple(3), Dart::double(3), Dart::single(3)])
            .unwrap();
        assert_eq!(eng.evaluate(&t.state, &c, &roster()), Verdict::ShanghaiInstantWin("a".into()));
    }

    #[test]
    fn test_wrong_number_shanghai_does_not_count() {
        let eng = engine(1, 3, TieBreak::RosterOrder);
        let state = eng.create_initial_state(&roster());
        let c = ctx("a", 0, 1);
        let t = eng
            .apply_turn(&state, &c, &[Dart::single(1), Dart::double(1), Dart::triple(1)])
            .unwrap();
        assert_eq!(t.state.players["a"].total_score, 0);
        assert!(t.state.shanghai_by.is_none());
        assert_eq!(eng.evaluate(&t.state, &c, &roster()), Verdict::Continue);
    }

    #[test]
    fn test_round_scores_recorded() {
        let eng = engine(5, 3, TieBreak::RosterOrder);
        let state = eng.create_initial_state(&roster());
        let t = eng
            .apply_turn(&state, &ctx("b", 1, 0), &[Dart::triple(5), Dart::single(6), Dart::Miss])
            .unwrap();
        assert_eq!(t.state.players["b"].total_score, 15);
        assert_eq!(t.state.players["b"].round_scores[&0], 15);
    }

    #[test]
    fn test_round_past_end_is_fatal() {
        let eng = engine(1, 3, TieBreak::RosterOrder);
        let state = eng.create_initial_state(&roster());
        let err = eng.apply_turn(&state, &ctx("a", 0, 3), &[Dart::Miss]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_final_round_highest_total_wins() {
        let eng = engine(1, 3, TieBreak::RosterOrder);
        let state = with_totals([10, 30, 20]);
        assert_eq!(eng.evaluate(&state, &ctx("c", 2, 2), &roster()), Verdict::Winner("b".into()));
        // Not the last thrower of the round: keep going.
        assert_eq!(eng.evaluate(&state, &ctx("b", 1, 2), &roster()), Verdict::Continue);
        // Not the last round.
        assert_eq!(eng.evaluate(&state, &ctx("c", 2, 1), &roster()), Verdict::Continue);
    }

    #[test]
    fn test_tie_break_roster_order() {
        let eng = engine(1, 3, TieBreak::RosterOrder);
        let state = with_totals([10, 30, 30]);
        assert_eq!(eng.evaluate(&state, &ctx("c", 2, 2), &roster()), Verdict::Winner("b".into()));

        // Order wins over the roster's slice position.
        let reordered = vec![
            MatchPlayer::new("c", "Cleo", 0),
            MatchPlayer::new("b", "Bob", 4),
            MatchPlayer::new("a", "Alice", 9),
        ];
        assert_eq!(eng.evaluate(&state, &ctx("a", 2, 2), &reordered), Verdict::Winner("c".into()));
    }

    #[test]
    fn test_tie_break_shared_victory() {
        let eng = engine(1, 3, TieBreak::SharedVictory);
        let state = with_totals([30, 10, 30]);
        assert_eq!(
            eng.evaluate(&state, &ctx("c", 2, 2), &roster()),
            Verdict::SharedVictory(vec!["a".into(), "c".into()])
        );
        let state = with_totals([30, 10, 20]);
        assert_eq!(eng.evaluate(&state, &ctx("c", 2, 2), &roster()), Verdict::Winner("a".into()));
    }

    #[test]
    fn test_default_tie_break_constant() {
        assert_eq!(TieBreak::default(), SHANGHAI_TIE_BREAK);
        assert_eq!(ShanghaiConfig::default().tie_break, TieBreak::RosterOrder);
    }
}
