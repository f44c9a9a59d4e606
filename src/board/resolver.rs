//! Pure reorder functions.
//!
//! Each function takes the current order and returns a new one; inputs are
//! never mutated. Destination indices are clamped: a negative index lands at
//! the front and an index past the end appends.

use super::StaleMoveError;

/// Clamp a destination index into `0..=len`.
///
pub fn clamp_index(dest_index: i64, len: usize) -> usize {
    if dest_index < 0 {
        0
    } else {
        (dest_index as usize).min(len)
    }
}

/// Remove `moved_id` and reinsert it at the clamped index of the remaining
/// sequence.
///
fn move_within(
    order: &[String],
    moved_id: &str,
    dest_index: i64,
    expected_in: &str,
) -> Result<Vec<String>, StaleMoveError> {
    let from = order
        .iter()
        .position(|id| id == moved_id)
        .ok_or_else(|| StaleMoveError::new(moved_id, expected_in))?;
    let mut result = order.to_vec();
    let moved = result.remove(from);
    let to = clamp_index(dest_index, result.len());
    result.insert(to, moved);
    Ok(result)
}

/// Return the column order with `moved_id` at `dest_index`.
///
pub fn move_column(
    column_order: &[String],
    moved_id: &str,
    dest_index: i64,
) -> Result<Vec<String>, StaleMoveError> {
    move_within(column_order, moved_id, dest_index, "the column order")
}

/// Return the column's task ids with `moved_id` at `dest_index`.
///
pub fn move_task_within_column(
    task_ids: &[String],
    moved_id: &str,
    dest_index: i64,
) -> Result<Vec<String>, StaleMoveError> {
    move_within(task_ids, moved_id, dest_index, "its column")
}

/// Move a task between two columns. Returns the new source and destination
/// lists; the task ends up in the destination only.
///
pub fn move_task_across_columns(
    source_task_ids: &[String],
    dest_task_ids: &[String],
    moved_id: &str,
    dest_index: i64,
) -> Result<(Vec<String>, Vec<String>), StaleMoveError> {
    if !source_task_ids.iter().any(|id| id == moved_id) {
        return Err(StaleMoveError::new(moved_id, "the source column"));
    }
    let new_source: Vec<String> = source_task_ids
        .iter()
        .filter(|id| *id != moved_id)
        .cloned()
        .collect();
    let mut new_dest: Vec<String> = dest_task_ids
        .iter()
        .filter(|id| *id != moved_id)
        .cloned()
        .collect();
    let to = clamp_index(dest_index, new_dest.len());
    new_dest.insert(to, moved_id.to_owned());
    Ok((new_source, new_dest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn move_column_to_front() {
        let order = ids(&["c1", "c2", "c3"]);
        let result = move_column(&order, "c3", 0).unwrap();
        assert_eq!(result, ids(&["c3", "c1", "c2"]));
        assert_eq!(order, ids(&["c1", "c2", "c3"]));
    }

    #[test]
    fn move_column_is_a_permutation_with_moved_id_at_clamped_index() {
        let order = ids(&["a", "b", "c", "d", "e"]);
        for moved in &order {
            for dest in -3i64..9 {
                let result = move_column(&order, moved, dest).unwrap();
                let before: BTreeSet<_> = order.iter().collect();
                let after: BTreeSet<_> = result.iter().collect();
                assert_eq!(before, after);
                assert_eq!(result.len(), order.len());
                let expected = clamp_index(dest, order.len() - 1);
                assert_eq!(&result[expected], moved, "moved {} to {}", moved, dest);
            }
        }
    }

    #[test]
    fn move_within_column_clamps_both_ways() {
        let tasks = ids(&["t1", "t2", "t3"]);
        assert_eq!(
            move_task_within_column(&tasks, "t2", -5).unwrap(),
            ids(&["t2", "t1", "t3"])
        );
        assert_eq!(
            move_task_within_column(&tasks, "t2", 99).unwrap(),
            ids(&["t1", "t3", "t2"])
        );
        assert_eq!(
            move_task_within_column(&tasks, "t1", 1).unwrap(),
            ids(&["t2", "t1", "t3"])
        );
    }

    #[test]
    fn cross_column_move_into_empty_column() {
        let source = ids(&["t1", "t2"]);
        let dest: Vec<String> = vec![];
        let (new_source, new_dest) = move_task_across_columns(&source, &dest, "t1", 0).unwrap();
        assert_eq!(new_source, ids(&["t2"]));
        assert_eq!(new_dest, ids(&["t1"]));
    }

    #[test]
    fn cross_column_move_conserves_ids_and_single_membership() {
        let source = ids(&["t1", "t2", "t3"]);
        let dest = ids(&["u1", "u2"]);
        for moved in &source {
            for dest_index in -2i64..6 {
                let (new_source, new_dest) =
                    move_task_across_columns(&source, &dest, moved, dest_index).unwrap();
                let before: BTreeSet<_> = source.iter().chain(dest.iter()).collect();
                let after: BTreeSet<_> = new_source.iter().chain(new_dest.iter()).collect();
                assert_eq!(before, after);
                assert_eq!(new_source.len() + new_dest.len(), 5);
                assert!(!new_source.contains(moved));
                assert_eq!(new_dest.iter().filter(|id| *id == moved).count(), 1);
                assert_eq!(
                    new_dest.iter().position(|id| id == moved).unwrap(),
                    clamp_index(dest_index, dest.len())
                );
            }
        }
    }

    #[test]
    fn cross_column_negative_index_lands_first_and_past_end_appends() {
        let source = ids(&["t1"]);
        let dest = ids(&["u1", "u2"]);
        let (_, front) = move_task_across_columns(&source, &dest, "t1", -1).unwrap();
        assert_eq!(front, ids(&["t1", "u1", "u2"]));
        let (_, back) = move_task_across_columns(&source, &dest, "t1", 10).unwrap();
        assert_eq!(back, ids(&["u1", "u2", "t1"]));
    }

    #[test]
    fn missing_moved_id_is_stale() {
        let order = ids(&["c1", "c2"]);
        let error = move_column(&order, "c9", 0).unwrap_err();
        assert_eq!(error.moved_id, "c9");
        assert!(move_task_within_column(&order, "t1", 0).is_err());
        assert!(move_task_across_columns(&order, &[], "t1", 0).is_err());
    }
}
