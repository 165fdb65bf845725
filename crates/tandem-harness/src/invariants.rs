//! Structural invariant checks for the session store.
//!
//! Run after every operation in the model-based tests and fuzz targets.
//! The invariants mirror the data-model guarantees: a symmetric pairing
//! table disjoint from a duplicate-free waiting queue, with derived
//! per-participant state agreeing with both.

use std::collections::{HashMap, HashSet};

use tandem_core::{SessionState, SessionStore};

/// Check every structural invariant of the store.
///
/// # Errors
///
/// Returns a description of the first violated invariant.
pub fn check_store_invariants(store: &SessionStore) -> Result<(), String> {
    let pairs: HashMap<_, _> = store.pairings().collect();
    let waiting: Vec<_> = store.waiting().collect();

    // Pairing table is symmetric and never self-referential
    for (&a, &b) in &pairs {
        if a == b {
            return Err(format!("participant {a} is paired with itself"));
        }
        if pairs.get(&b) != Some(&a) {
            return Err(format!("pairing {a} -> {b} has no mirror entry"));
        }
    }

    // Symmetry implies even size; check anyway in case of duplicate keys
    if pairs.len() % 2 != 0 {
        return Err(format!("pairing table has odd size {}", pairs.len()));
    }

    // Waiting queue has no duplicates
    let mut seen = HashSet::new();
    for &w in &waiting {
        if !seen.insert(w) {
            return Err(format!("participant {w} appears twice in the waiting queue"));
        }
    }

    // Queue and table are disjoint
    for &w in &waiting {
        if pairs.contains_key(&w) {
            return Err(format!("participant {w} is both waiting and paired"));
        }
    }

    // Derived state agrees with raw membership
    for (&a, &b) in &pairs {
        if store.state_of(a) != SessionState::Paired(b) {
            return Err(format!("state_of({a}) disagrees with pairing table"));
        }
    }
    for &w in &waiting {
        if store.state_of(w) != SessionState::Waiting {
            return Err(format!("state_of({w}) disagrees with waiting queue"));
        }
    }

    Ok(())
}
