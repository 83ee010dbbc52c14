//! Escalation path resolution over the support-level registry

use crate::contract::SupportLevel;

/// Active level with the smallest sort order strictly above `current_sort_order`
pub fn next_level(levels: &[SupportLevel], current_sort_order: i32) -> Option<&SupportLevel> {
    levels
        .iter()
        .filter(|l| l.is_active && l.sort_order > current_sort_order)
        .min_by_key(|l| l.sort_order)
}

/// Default entry tier: the active level with the lowest sort order
pub fn entry_level(levels: &[SupportLevel]) -> Option<&SupportLevel> {
    levels
        .iter()
        .filter(|l| l.is_active)
        .min_by_key(|l| l.sort_order)
}
