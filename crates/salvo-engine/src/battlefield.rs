//! Coordinator-owned game state and the per-tick combat rules.
//!
//! [`Battlefield`] is the single source of truth for which invaders are
//! alive. It never touches the fabric: the coordinator feeds it inbound
//! messages and forwards the kills it reports, which keeps every rule
//! synchronously testable with injected dice.

use salvo_arena::{ArenaError, SlotArena};
use salvo_core::{Dice, InvaderRecord, InvaderStatus, Message, Rank};
use salvo_space::{GridCoord, GridTopology};
use tracing::{debug, info, warn};

use crate::metrics::GameMetrics;
use crate::rules::{self, CombatOutcome, DRAW_RANGE};

/// Who fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shooter {
    /// The coordinator's player.
    Defender,
    /// An invader, by rank.
    Invader(Rank),
}

/// A projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    /// Column the projectile travels along.
    pub column: u32,
    /// Row of the targeted invader; `None` for shots at the defender.
    pub target_row: Option<u32>,
    /// Ticks until impact.
    pub ticks_remaining: u32,
    /// Who fired it.
    pub source: Shooter,
}

/// What the movement heuristic did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerMove {
    /// Stepped one column left.
    Left,
    /// Stepped one column right.
    Right,
    /// A target exists but no step was taken.
    Stay,
    /// No active invader is left.
    NoTarget,
}

/// Invader grid, player position and both projectile pools.
#[derive(Clone, Debug)]
pub struct Battlefield {
    topology: GridTopology,
    invaders: Vec<InvaderRecord>,
    player_col: u32,
    player_shots: SlotArena<Projectile>,
    invader_shots: SlotArena<Projectile>,
    live: usize,
    terminate_acks: usize,
    metrics: GameMetrics,
}

impl Battlefield {
    /// A fresh battlefield: every invader active, player in column 0,
    /// both pools empty with `pool_capacity` slots each.
    ///
    /// # Errors
    ///
    /// [`ArenaError::ZeroCapacity`] if `pool_capacity` is 0.
    pub fn new(topology: GridTopology, pool_capacity: usize) -> Result<Self, ArenaError> {
        let cells = topology.cell_count();
        Ok(Self {
            invaders: vec![InvaderRecord::default(); cells],
            player_col: 0,
            player_shots: SlotArena::new(pool_capacity)?,
            invader_shots: SlotArena::new(pool_capacity)?,
            live: cells,
            terminate_acks: 0,
            metrics: GameMetrics::default(),
            topology,
        })
    }

    /// The grid layout.
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// Invader records in rank order.
    pub fn invaders(&self) -> &[InvaderRecord] {
        &self.invaders
    }

    /// Status of `rank`; ranks outside the grid read as terminated.
    pub fn status(&self, rank: Rank) -> InvaderStatus {
        self.invaders
            .get(rank.index())
            .map_or(InvaderStatus::Terminated, |r| r.status)
    }

    /// The player's column.
    pub fn player_col(&self) -> u32 {
        self.player_col
    }

    /// Invaders still active.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Terminate acknowledgements received so far.
    pub fn terminate_acks(&self) -> usize {
        self.terminate_acks
    }

    /// Counters collected so far.
    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    /// Mutable counters, for the coordinator's own bookkeeping.
    pub fn metrics_mut(&mut self) -> &mut GameMetrics {
        &mut self.metrics
    }

    /// Player projectiles in flight, in slot order.
    pub fn player_projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.player_shots.iter().map(|(_, p)| p)
    }

    /// Invader projectiles in flight, in slot order.
    pub fn invader_projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.invader_shots.iter().map(|(_, p)| p)
    }

    /// Place the player in `col`, clamped to the grid.
    pub fn set_player_col(&mut self, col: u32) {
        self.player_col = col.min(self.topology.cols().saturating_sub(1));
    }

    // ── Movement and fire ───────────────────────────────────────

    /// Row of the active invader nearest the defender in `col`.
    fn front_active(&self, col: u32) -> Option<u32> {
        let rank = self
            .topology
            .column_bottom_up(col)
            .into_iter()
            .find(|&r| self.status(r).is_active())?;
        self.topology.coord(rank).ok().map(|c| c.row)
    }

    /// The invader the player should move towards.
    ///
    /// Only the front-most active invader of each column is a candidate.
    /// A candidate in a strictly lower row (nearer the defender) wins; on
    /// equal rows the one horizontally nearer the player wins, and the
    /// leftmost of equally near candidates is kept.
    pub fn select_target(&self) -> Option<GridCoord> {
        let mut best: Option<GridCoord> = None;
        for col in 0..self.topology.cols() {
            let Some(row) = self.front_active(col) else {
                continue;
            };
            let better = match best {
                None => true,
                Some(b) => {
                    row > b.row
                        || (row == b.row
                            && col.abs_diff(self.player_col) < b.col.abs_diff(self.player_col))
                }
            };
            if better {
                best = Some(GridCoord { row, col });
            }
        }
        best
    }

    /// Step the player one column towards the selected target.
    pub fn advance_player(&mut self) -> PlayerMove {
        let Some(target) = self.select_target() else {
            return PlayerMove::NoTarget;
        };
        let last = self.topology.cols().saturating_sub(1);
        if target.col > self.player_col && self.player_col < last {
            self.player_col += 1;
            PlayerMove::Right
        } else if target.col < self.player_col && self.player_col > 0 {
            self.player_col -= 1;
            PlayerMove::Left
        } else {
            PlayerMove::Stay
        }
    }

    /// Fire at the front-most active invader in the player's column.
    ///
    /// Returns the targeted cell, or `None` if the column is clear or the
    /// pool is full.
    pub fn auto_fire(&mut self) -> Option<GridCoord> {
        let col = self.player_col;
        let row = self.front_active(col)?;
        let shot = Projectile {
            column: col,
            target_row: Some(row),
            ticks_remaining: rules::travel_time(self.topology.rows(), row),
            source: Shooter::Defender,
        };
        match self.player_shots.allocate(shot) {
            Ok(_) => {
                self.metrics.player_shots += 1;
                info!(row, col, eta = shot.ticks_remaining, "player fires");
                Some(GridCoord { row, col })
            }
            Err(_) => {
                self.metrics.dropped_player_shots += 1;
                debug!(row, col, "player projectile pool full, shot dropped");
                None
            }
        }
    }

    // ── Inbound messages ────────────────────────────────────────

    /// Apply one message from `source`.
    pub fn apply(&mut self, source: Rank, msg: Message) {
        let Some(record) = self.invaders.get_mut(source.index()) else {
            warn!(%source, "message from unknown rank discarded");
            return;
        };
        match msg {
            Message::Report { value } => {
                if record.status.is_active() {
                    record.last_value = value;
                }
            }
            Message::Disable { value } => {
                if record.status == InvaderStatus::Terminated {
                    return;
                }
                if record.status.is_active() {
                    // Unsolicited; keep the live count consistent with the grid.
                    self.live -= 1;
                    warn!(%source, "invader reported itself disabled");
                }
                record.status = InvaderStatus::Disabled;
                record.last_value = value;
            }
            Message::Terminate { .. } => {
                if record.status != InvaderStatus::Terminated {
                    if record.status.is_active() {
                        self.live -= 1;
                    }
                    record.status = InvaderStatus::Terminated;
                    self.terminate_acks += 1;
                }
            }
            Message::FireAtDefender {
                travel_time,
                column,
            } => {
                let Ok(column) = u32::try_from(column) else {
                    self.metrics.rejected_frames += 1;
                    warn!(%source, column, "fire at negative column discarded");
                    return;
                };
                let shot = Projectile {
                    column,
                    target_row: None,
                    ticks_remaining: u32::try_from(travel_time).unwrap_or(0),
                    source: Shooter::Invader(source),
                };
                match self.invader_shots.allocate(shot) {
                    Ok(_) => {
                        self.metrics.invader_shots += 1;
                        info!(%source, column, eta = shot.ticks_remaining, "invader fires");
                    }
                    Err(_) => {
                        self.metrics.dropped_invader_shots += 1;
                        debug!(%source, "invader projectile pool full, shot dropped");
                    }
                }
            }
        }
    }

    // ── Resolution ──────────────────────────────────────────────

    fn kill(&mut self, row: u32, col: u32) -> Option<Rank> {
        let rank = self.topology.rank_at(row, col)?;
        let record = self.invaders.get_mut(rank.index())?;
        if !record.status.is_active() {
            return None;
        }
        record.status = InvaderStatus::Disabled;
        self.live -= 1;
        self.metrics.hits += 1;
        Some(rank)
    }

    /// Count down player projectiles and resolve those that land.
    ///
    /// A landing projectile whose target is still active draws once from
    /// `dice` to pick a [`CombatOutcome`]. Returns the ranks destroyed
    /// this tick; each must be sent a kill notification.
    pub fn resolve_player_shots<D: Dice + ?Sized>(&mut self, dice: &mut D) -> Vec<Rank> {
        let mut killed = Vec::new();
        for id in self.player_shots.occupied_ids() {
            let Some(shot) = self.player_shots.get_mut(id) else {
                continue;
            };
            shot.ticks_remaining = shot.ticks_remaining.saturating_sub(1);
            if shot.ticks_remaining > 0 {
                continue;
            }
            let shot = *shot;
            self.player_shots.release(id);

            let (Some(row), col) = (shot.target_row, shot.column) else {
                continue;
            };
            let target_alive = self
                .topology
                .rank_at(row, col)
                .is_some_and(|r| self.status(r).is_active());
            if !target_alive {
                continue;
            }

            let outcome = CombatOutcome::from_draw(dice.roll(DRAW_RANGE));
            let hit = outcome.column_offset().and_then(|dc| {
                let c = u32::try_from(i64::from(col) + dc).ok()?;
                self.kill(row, c)
            });
            match (outcome, hit) {
                (CombatOutcome::Blocked, _) => info!(row, col, "blocked, shield holds"),
                (CombatOutcome::DirectHit, Some(_)) => info!(row, col, "direct hit, invader destroyed"),
                (o, Some(r)) => info!(?o, %r, "deflected, neighbour destroyed"),
                (o, None) => info!(?o, row, col, "deflected, no target"),
            }
            killed.extend(hit);
        }
        killed
    }

    /// Count down invader projectiles; returns whether one landed on the
    /// player's column this tick.
    pub fn resolve_invader_shots(&mut self) -> bool {
        let mut player_hit = false;
        for id in self.invader_shots.occupied_ids() {
            let Some(shot) = self.invader_shots.get_mut(id) else {
                continue;
            };
            shot.ticks_remaining = shot.ticks_remaining.saturating_sub(1);
            if shot.ticks_remaining > 0 {
                continue;
            }
            let column = shot.column;
            self.invader_shots.release(id);
            if column == self.player_col {
                player_hit = true;
                info!(column, "player hit");
            } else {
                info!(column, player = self.player_col, "invader shot missed");
            }
        }
        player_hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use salvo_space::{EdgeBehavior, GridShape};

    struct Script(Vec<u32>);

    impl Dice for Script {
        fn roll(&mut self, _upper: u32) -> u32 {
            self.0.remove(0)
        }
    }

    fn field(rows: u32, cols: u32) -> Battlefield {
        let topo = GridTopology::new(
            rows * cols,
            GridShape::Explicit { rows, cols },
            EdgeBehavior::Absorb,
        )
        .unwrap();
        Battlefield::new(topo, 4).unwrap()
    }

    fn set(bf: &mut Battlefield, row: u32, col: u32, status: InvaderStatus) {
        let rank = bf.topology.rank_at(row, col).unwrap();
        let was_active = bf.invaders[rank.index()].status.is_active();
        bf.invaders[rank.index()].status = status;
        if was_active && !status.is_active() {
            bf.live -= 1;
        }
    }

    #[test]
    fn lower_row_beats_nearer_column() {
        let mut bf = field(3, 3);
        bf.set_player_col(0);
        // Column 0 front row dead; column 2 front row alive.
        set(&mut bf, 2, 0, InvaderStatus::Disabled);
        set(&mut bf, 2, 1, InvaderStatus::Disabled);
        assert_eq!(bf.select_target(), Some(GridCoord { row: 2, col: 2 }));
    }

    #[test]
    fn equal_rows_prefer_nearest_then_leftmost() {
        let mut bf = field(2, 5);
        bf.set_player_col(2);
        set(&mut bf, 1, 2, InvaderStatus::Disabled);
        // Columns 1 and 3 tie at distance 1; leftmost wins.
        assert_eq!(bf.select_target(), Some(GridCoord { row: 1, col: 1 }));
    }

    #[test]
    fn player_walks_and_stops_at_target() {
        let mut bf = field(1, 4);
        for c in 0..3 {
            set(&mut bf, 0, c, InvaderStatus::Disabled);
        }
        assert_eq!(bf.advance_player(), PlayerMove::Right);
        assert_eq!(bf.advance_player(), PlayerMove::Right);
        assert_eq!(bf.advance_player(), PlayerMove::Right);
        assert_eq!(bf.player_col(), 3);
        assert_eq!(bf.advance_player(), PlayerMove::Stay);
        set(&mut bf, 0, 3, InvaderStatus::Disabled);
        assert_eq!(bf.advance_player(), PlayerMove::NoTarget);
        assert_eq!(bf.player_col(), 3);
    }

    #[test]
    fn auto_fire_targets_front_active_and_respects_pool() {
        let mut bf = field(3, 1);
        set(&mut bf, 2, 0, InvaderStatus::Disabled);
        assert_eq!(bf.auto_fire(), Some(GridCoord { row: 1, col: 0 }));
        let shot = *bf.player_projectiles().next().unwrap();
        assert_eq!(shot.ticks_remaining, 3);
        assert_eq!(shot.target_row, Some(1));
        for _ in 0..3 {
            bf.auto_fire();
        }
        assert_eq!(bf.auto_fire(), None);
        assert_eq!(bf.metrics().player_shots, 4);
        assert_eq!(bf.metrics().dropped_player_shots, 1);
    }

    #[test]
    fn front_active_scans_column_from_the_defender_up() {
        let mut bf = field(4, 2);
        set(&mut bf, 3, 1, InvaderStatus::Disabled);
        set(&mut bf, 2, 1, InvaderStatus::Terminated);
        assert_eq!(bf.front_active(0), Some(3));
        assert_eq!(bf.front_active(1), Some(1));
        set(&mut bf, 1, 1, InvaderStatus::Disabled);
        set(&mut bf, 0, 1, InvaderStatus::Disabled);
        assert_eq!(bf.front_active(1), None);
        assert_eq!(bf.front_active(2), None);
    }

    #[test]
    fn direct_hit_destroys_target_after_flight() {
        let mut bf = field(1, 1);
        bf.auto_fire();
        let mut dice = Script(vec![99]);
        assert!(bf.resolve_player_shots(&mut dice).is_empty());
        assert_eq!(bf.resolve_player_shots(&mut dice), vec![Rank(0)]);
        assert_eq!(bf.live(), 0);
        assert_eq!(bf.metrics().hits, 1);
        assert_eq!(bf.player_projectiles().count(), 0);
    }

    #[test]
    fn deflections_only_hit_active_neighbours() {
        let mut bf = field(1, 3);
        bf.set_player_col(1);
        bf.auto_fire();
        bf.auto_fire();
        bf.auto_fire();
        set(&mut bf, 0, 2, InvaderStatus::Disabled);
        // Left deflection kills (0,0); right deflection finds (0,2) dead;
        // the third shot is blocked.
        let mut dice = Script(vec![0, 20, 40]);
        bf.resolve_player_shots(&mut dice);
        let killed = bf.resolve_player_shots(&mut dice);
        assert_eq!(killed, vec![Rank(0)]);
        assert_eq!(bf.status(Rank(1)), InvaderStatus::Active);
        assert_eq!(bf.metrics().hits, 1);
    }

    #[test]
    fn deflection_off_grid_is_a_miss() {
        let mut bf = field(1, 2);
        bf.auto_fire();
        let mut dice = Script(vec![5]);
        bf.resolve_player_shots(&mut dice);
        assert!(bf.resolve_player_shots(&mut dice).is_empty());
        assert_eq!(bf.live(), 2);
    }

    #[test]
    fn dead_target_is_not_resolved_again() {
        let mut bf = field(1, 1);
        bf.auto_fire();
        bf.auto_fire();
        // Only one draw is scripted: the second shot must not roll.
        let mut dice = Script(vec![99]);
        bf.resolve_player_shots(&mut dice);
        assert_eq!(bf.resolve_player_shots(&mut dice), vec![Rank(0)]);
        assert_eq!(bf.metrics().hits, 1);
    }

    #[test]
    fn apply_report_only_while_active() {
        let mut bf = field(1, 2);
        bf.apply(Rank(0), Message::Report { value: 17 });
        assert_eq!(bf.invaders()[0].last_value, 17);
        set(&mut bf, 0, 1, InvaderStatus::Disabled);
        bf.apply(Rank(1), Message::Report { value: 9 });
        assert_eq!(bf.invaders()[1].last_value, 0);
    }

    #[test]
    fn disable_ack_records_value_but_never_revives_or_downgrades() {
        let mut bf = field(1, 2);
        set(&mut bf, 0, 0, InvaderStatus::Disabled);
        bf.apply(Rank(0), Message::disable_ack());
        assert_eq!(bf.invaders()[0].status, InvaderStatus::Disabled);
        assert_eq!(bf.invaders()[0].last_value, 2);
        bf.apply(Rank(1), Message::terminate());
        bf.apply(Rank(1), Message::disable_ack());
        assert_eq!(bf.invaders()[1].status, InvaderStatus::Terminated);
    }

    #[test]
    fn terminate_acks_count_once_per_rank() {
        let mut bf = field(1, 2);
        bf.apply(Rank(0), Message::terminate());
        bf.apply(Rank(0), Message::terminate());
        assert_eq!(bf.terminate_acks(), 1);
        bf.apply(Rank(1), Message::terminate());
        assert_eq!(bf.terminate_acks(), 2);
        assert_eq!(bf.live(), 0);
    }

    #[test]
    fn invader_shot_lands_on_player_column() {
        let mut bf = field(2, 3);
        bf.set_player_col(1);
        bf.apply(
            Rank(4),
            Message::FireAtDefender {
                travel_time: 2,
                column: 1,
            },
        );
        bf.apply(
            Rank(5),
            Message::FireAtDefender {
                travel_time: 1,
                column: 2,
            },
        );
        assert!(!bf.resolve_invader_shots());
        assert_eq!(bf.invader_projectiles().count(), 1);
        assert!(bf.resolve_invader_shots());
        assert_eq!(bf.invader_projectiles().count(), 0);
        assert_eq!(bf.metrics().invader_shots, 2);
    }

    #[test]
    fn invalid_fire_column_is_rejected() {
        let mut bf = field(1, 1);
        bf.apply(
            Rank(0),
            Message::FireAtDefender {
                travel_time: 2,
                column: -1,
            },
        );
        assert_eq!(bf.invader_projectiles().count(), 0);
        assert_eq!(bf.metrics().rejected_frames, 1);
    }

    fn arb_field() -> impl Strategy<Value = (u32, u32, Vec<bool>, u32)> {
        (1u32..6, 1u32..6).prop_flat_map(|(rows, cols)| {
            (
                Just(rows),
                Just(cols),
                prop::collection::vec(any::<bool>(), (rows * cols) as usize),
                0..cols,
            )
        })
    }

    fn build((rows, cols, alive, player): &(u32, u32, Vec<bool>, u32)) -> Battlefield {
        let mut bf = field(*rows, *cols);
        for (i, a) in alive.iter().enumerate() {
            if !a {
                set(&mut bf, i as u32 / cols, i as u32 % cols, InvaderStatus::Disabled);
            }
        }
        bf.set_player_col(*player);
        bf
    }

    proptest! {
        #[test]
        fn chosen_target_is_unbeaten(case in arb_field()) {
            let bf = build(&case);
            let active: Vec<GridCoord> = bf
                .topology()
                .ranks()
                .filter(|r| bf.status(*r).is_active())
                .map(|r| bf.topology().coord(r).unwrap())
                .collect();
            match bf.select_target() {
                None => prop_assert!(active.is_empty()),
                Some(t) => {
                    prop_assert!(active.contains(&t));
                    let p = bf.player_col();
                    for a in &active {
                        prop_assert!(a.row <= t.row);
                        if a.row == t.row {
                            let (da, dt) = (a.col.abs_diff(p), t.col.abs_diff(p));
                            prop_assert!(da > dt || (da == dt && a.col >= t.col));
                        }
                    }
                }
            }
        }

        #[test]
        fn selection_is_idempotent(case in arb_field()) {
            let bf = build(&case);
            prop_assert_eq!(bf.select_target(), bf.select_target());
        }

        #[test]
        fn movement_is_one_step_and_in_bounds(case in arb_field()) {
            let mut bf = build(&case);
            let before = bf.player_col();
            bf.advance_player();
            prop_assert!(bf.player_col() < case.1);
            prop_assert!(bf.player_col().abs_diff(before) <= 1);
        }
    }
}
