//! Display-order computation for reorderable lists (API keys, model
//! implementations).
//!
//! The gateway expects a full `{id: index}` map covering every item in the
//! list, not just the two that swapped. The map is always a bijection from
//! the item ids onto `{0..N-1}`; moving past either end is a no-op.

use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Compute the full order map after moving `moved` one step in `direction`.
/// `ids` must be in current display order. Returns `None` when the move is a
/// no-op (unknown id, or already at the edge).
pub fn build_order_map(
    ids: &[Uuid],
    moved: Uuid,
    direction: MoveDirection,
) -> Option<HashMap<Uuid, usize>> {
    let position = ids.iter().position(|id| *id == moved)?;
    let target = match direction {
        MoveDirection::Up => position.checked_sub(1)?,
        MoveDirection::Down => {
            if position + 1 >= ids.len() {
                return None;
            }
            position + 1
        }
    };

    let mut order = Vec::from(ids);
    order.swap(position, target);

    Some(order.into_iter().enumerate().map(|(index, id)| (id, index)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n)
            .map(|i| format!("00000000-0000-0000-0000-{:012}", i + 1).parse().unwrap())
            .collect()
    }

    #[test]
    fn test_move_down_swaps_neighbors() {
        let ids = ids(3);
        let map = build_order_map(&ids, ids[0], MoveDirection::Down).unwrap();
        assert_eq!(map[&ids[0]], 1);
        assert_eq!(map[&ids[1]], 0);
        assert_eq!(map[&ids[2]], 2);
    }

    #[test]
    fn test_map_is_a_bijection() {
        let ids = ids(5);
        let map = build_order_map(&ids, ids[2], MoveDirection::Up).unwrap();

        assert_eq!(map.len(), ids.len());
        let mut indices: Vec<usize> = map.values().copied().collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..ids.len()).collect::<Vec<_>>());
        for id in &ids {
            assert!(map.contains_key(id));
        }
    }

    #[test]
    fn test_edge_moves_are_noops() {
        let ids = ids(3);
        assert!(build_order_map(&ids, ids[0], MoveDirection::Up).is_none());
        assert!(build_order_map(&ids, ids[2], MoveDirection::Down).is_none());
    }

    #[test]
    fn test_unknown_id_is_a_noop() {
        let ids = ids(2);
        let stranger = "ffffffff-0000-0000-0000-000000000000".parse().unwrap();
        assert!(build_order_map(&ids, stranger, MoveDirection::Down).is_none());
    }
}
