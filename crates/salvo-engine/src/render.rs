//! Console rendering of the battlefield.
//!
//! Every function returns a `String`; the coordinator decides whether and
//! where to print it.

use std::fmt::Write;

use salvo_space::GridTopology;

use crate::battlefield::Battlefield;
use crate::coordinator::Outcome;
use crate::metrics::GameMetrics;

const RULE: &str = "========================================";
const PLAYER_CELL: &str = "^PLAYER^";
const EMPTY_CELL: &str = "________";

/// Opening banner with the grid size.
pub fn banner(topology: &GridTopology, player_col: u32) -> String {
    format!(
        "{RULE}\n   SPACE INVADERS SIMULATION START\n{RULE}\n\
         Grid: {} rows x {} columns = {} invaders\n\
         Player starts at Column {player_col}\n",
        topology.rows(),
        topology.cols(),
        topology.cell_count(),
    )
}

/// Invader grid as `(row,col)S:value` cells followed by the player row.
pub fn grid(field: &Battlefield) -> String {
    let topo = field.topology();
    let mut out = String::new();
    for row in 0..topo.rows() {
        for col in 0..topo.cols() {
            if let Some(rank) = topo.rank_at(row, col) {
                let rec = field.invaders()[rank.index()];
                let _ = write!(out, "({row},{col}){}:{}\t", rec.status, rec.last_value);
            }
        }
        out.push('\n');
    }
    for col in 0..topo.cols() {
        let cell = if col == field.player_col() {
            PLAYER_CELL
        } else {
            EMPTY_CELL
        };
        out.push_str(cell);
        out.push('\t');
    }
    out.push('\n');
    out
}

/// Listing of every projectile in flight; empty when the sky is clear.
pub fn projectiles(field: &Battlefield) -> String {
    let mut out = String::new();
    for p in field.player_projectiles() {
        let row = p.target_row.unwrap_or(0);
        let _ = writeln!(out, "  ^ Player -> ({row},{}) [{}t]", p.column, p.ticks_remaining);
    }
    for p in field.invader_projectiles() {
        let _ = writeln!(out, "  v Invader col {} [{}t]", p.column, p.ticks_remaining);
    }
    if out.is_empty() {
        return out;
    }
    format!("Projectiles in flight:\n{out}")
}

/// Full per-tick frame: grid, projectiles and the remaining count.
pub fn frame(field: &Battlefield) -> String {
    format!(
        "{}{}Invaders remaining: {}\n",
        grid(field),
        projectiles(field),
        field.live()
    )
}

/// Outcome announcement.
pub fn outcome(outcome: Outcome) -> String {
    let line = match outcome {
        Outcome::Victory => "  ALL INVADERS DESTROYED! YOU WIN!",
        Outcome::Defeat => "  PLAYER HIT! GAME OVER - YOU LOSE!",
    };
    format!("{RULE}\n{line}\n{RULE}\n")
}

/// One-line end-of-game summary.
pub fn summary(outcome: Outcome, metrics: &GameMetrics) -> String {
    format!(
        "{outcome:?} after {} ticks | player shots {} | invader shots {} | hits {} | \
         mean tick {} us",
        metrics.ticks,
        metrics.player_shots,
        metrics.invader_shots,
        metrics.hits,
        metrics.mean_tick_us(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use salvo_core::{InvaderStatus, Message, Rank};
    use salvo_space::{EdgeBehavior, GridShape};

    fn field() -> Battlefield {
        let topo =
            GridTopology::new(4, GridShape::Explicit { rows: 2, cols: 2 }, EdgeBehavior::Absorb)
                .unwrap();
        Battlefield::new(topo, 8).unwrap()
    }

    #[test]
    fn grid_shows_status_value_and_player() {
        let mut bf = field();
        bf.apply(Rank(1), Message::Report { value: 12 });
        bf.apply(Rank(2), Message::terminate());
        bf.set_player_col(1);
        let g = grid(&bf);
        let lines: Vec<&str> = g.lines().collect();
        assert_eq!(lines[0], "(0,0)A:0\t(0,1)A:12\t");
        assert_eq!(lines[1], "(1,0)X:0\t(1,1)A:0\t");
        assert_eq!(lines[2], "________\t^PLAYER^\t");
        assert_eq!(bf.status(Rank(2)), InvaderStatus::Terminated);
    }

    #[test]
    fn projectile_listing() {
        let mut bf = field();
        assert_eq!(projectiles(&bf), "");
        bf.auto_fire();
        bf.apply(
            Rank(3),
            Message::FireAtDefender {
                travel_time: 2,
                column: 1,
            },
        );
        let p = projectiles(&bf);
        assert!(p.starts_with("Projectiles in flight:\n"));
        assert!(p.contains("^ Player -> (1,0) [2t]"));
        assert!(p.contains("v Invader col 1 [2t]"));
    }

    #[test]
    fn frame_ends_with_remaining_count() {
        let bf = field();
        assert!(frame(&bf).ends_with("Invaders remaining: 4\n"));
    }

    #[test]
    fn summary_mentions_outcome_and_hits() {
        let m = GameMetrics {
            ticks: 3,
            hits: 1,
            ..GameMetrics::default()
        };
        let s = summary(Outcome::Victory, &m);
        assert!(s.starts_with("Victory after 3 ticks"));
        assert!(s.contains("hits 1"));
    }
}
