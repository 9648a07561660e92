//! Edge (boundary) behaviour for the invader grid.

/// How the grid handles neighbours at its edges.
///
/// # Examples
///
/// ```
/// use salvo_space::{EdgeBehavior, GridShape, GridTopology, Direction};
/// use salvo_core::Rank;
///
/// // Absorb: the top-left corner has no neighbour above it.
/// let grid = GridTopology::new(9, GridShape::Auto, EdgeBehavior::Absorb).unwrap();
/// assert_eq!(grid.neighbour(Rank(0), Direction::Up), None);
///
/// // Wrap: the same shift lands on the bottom row.
/// let torus = GridTopology::new(9, GridShape::Auto, EdgeBehavior::Wrap).unwrap();
/// assert_eq!(torus.neighbour(Rank(0), Direction::Up), Some(Rank(6)));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Out-of-bounds neighbour is absent (bounded battlefield).
    #[default]
    Absorb,
    /// Out-of-bounds neighbour wraps to the opposite side (periodic).
    Wrap,
}

/// Resolve a single axis value under the given edge behaviour.
/// Returns `None` for an out-of-bounds value under `Absorb`.
pub(crate) fn resolve_axis(val: i64, len: u32, edge: EdgeBehavior) -> Option<u32> {
    let n = i64::from(len);
    if (0..n).contains(&val) {
        return Some(val as u32);
    }
    match edge {
        EdgeBehavior::Absorb => None,
        EdgeBehavior::Wrap => Some((((val % n) + n) % n) as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_drops_out_of_range() {
        assert_eq!(resolve_axis(-1, 4, EdgeBehavior::Absorb), None);
        assert_eq!(resolve_axis(4, 4, EdgeBehavior::Absorb), None);
        assert_eq!(resolve_axis(3, 4, EdgeBehavior::Absorb), Some(3));
    }

    #[test]
    fn wrap_is_periodic() {
        assert_eq!(resolve_axis(-1, 4, EdgeBehavior::Wrap), Some(3));
        assert_eq!(resolve_axis(4, 4, EdgeBehavior::Wrap), Some(0));
    }
}
