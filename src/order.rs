//! Preview ordering while an item is held over a slot.

/// Identity order `[0, count)`.
pub fn identity_order(count: usize) -> Vec<usize> {
    (0..count).collect()
}

/// `order` with the entries at `start_index` and `target_index` exchanged.
///
/// This is a pairwise swap, not a list move: items between the two slots
/// keep their places. A target at or past the end (the append sentinel used
/// while the item hovers a foreign zone) swaps with the last entry. An
/// out-of-range start leaves the order untouched.
pub fn preview_order(order: &[usize], start_index: usize, target_index: usize) -> Vec<usize> {
    let mut preview = order.to_vec();
    if preview.is_empty() || start_index >= preview.len() {
        return preview;
    }
    let target_index = target_index.min(preview.len() - 1);
    if start_index != target_index {
        preview.swap(start_index, target_index);
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_two_slots() {
        assert_eq!(
            preview_order(&identity_order(6), 0, 2),
            vec![2, 1, 0, 3, 4, 5]
        );
    }

    #[test]
    fn same_index_is_noop() {
        assert_eq!(preview_order(&identity_order(4), 1, 1), identity_order(4));
    }

    #[test]
    fn applying_twice_restores_order() {
        let base = vec![3, 0, 4, 1, 2];
        for start in 0..base.len() {
            for target in 0..base.len() {
                let once = preview_order(&base, start, target);
                assert_eq!(preview_order(&once, start, target), base);
            }
        }
    }

    #[test]
    fn append_sentinel_swaps_with_last() {
        assert_eq!(preview_order(&identity_order(4), 1, 4), vec![0, 3, 2, 1]);
    }

    #[test]
    fn empty_order_stays_empty() {
        assert!(preview_order(&[], 0, 3).is_empty());
    }
}
