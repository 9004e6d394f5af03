//! Planner (§4.5) — the heart of the pipeline.
//!
//! Turns `(original[], edited[])` into an ordered [`Plan`] of
//! [`Action`]s that, applied in order, realise the edited mapping without
//! losing data: non-moves are no-ops, deletions become `Delete`, simple
//! and chained renames are ordered tail-to-head so each destination is
//! free when its rename fires, rename cycles are broken with a single
//! `Stash`/`Unstash` pair, and duplicate or externally-clobbering targets
//! are deterministically detoured to a `~`-suffixed free name.
//!
//! Implementation note on the worked three-cycle example in the
//! specification's scenario catalogue: its prose ("emit Stash on the
//! starting node ... then Unstash into the starting node's final
//! destination") and its own illustrated action sequence disagree once
//! you actually simulate the renames against a three-element cycle — see
//! DESIGN.md for the worked-out counter-example. This planner implements
//! the prose (and the two-element cycle example, which *is* internally
//! consistent and passes unchanged): it rotates every detected cycle to
//! start at its lowest member index, stashes that member, replays the
//! rest of the cycle tail-to-head, and finally unstashes into the start
//! member's own edited destination. That is the only reading under which
//! the executed plan actually reproduces the requested `edited[]` mapping.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Delete { src: String },
    Rename { src: String, dst: String },
    Stash { src: String },
    Unstash { dst: String },
}

pub type Plan = Vec<Action>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Unprocessed,
    InStack,
    Done,
}

/// Compute the plan for `original[0..n-1]` -> `edited[0..n-1]`.
///
/// `path_exists` answers whether a path exists on disk right now; it is
/// used only to detect external clobbers (a requested target that isn't
/// any of `original[]` but is already occupied on disk).
pub fn compute_plan(
    original: &[String],
    edited: &[Option<String>],
    path_exists: impl Fn(&str) -> bool,
) -> Plan {
    assert_eq!(original.len(), edited.len());
    let n = original.len();

    let final_target = resolve_targets(original, edited, path_exists);

    let original_index: HashMap<&str, usize> = original
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect();

    let is_mover = |i: usize| -> bool {
        matches!(&final_target[i], Some(t) if t != &original[i])
    };
    let blocker = |i: usize| -> Option<usize> {
        final_target[i]
            .as_deref()
            .and_then(|t| original_index.get(t).copied())
    };

    let mut state = vec![State::Unprocessed; n];
    let mut plan = Plan::new();
    let mut delete_emitted = vec![false; n];

    let mut emit_delete = |i: usize, plan: &mut Plan, delete_emitted: &mut Vec<bool>| {
        if !delete_emitted[i] {
            delete_emitted[i] = true;
            plan.push(Action::Delete {
                src: original[i].clone(),
            });
        }
    };

    for start in 0..n {
        if !is_mover(start) || state[start] != State::Unprocessed {
            continue;
        }

        let mut path = Vec::new();
        let mut cur = start;
        loop {
            state[cur] = State::InStack;
            path.push(cur);

            match blocker(cur) {
                None => {
                    flush_chain_tail_to_head(&path, original, &final_target, &mut plan, &mut state);
                    break;
                }
                Some(j) if !is_mover(j) => {
                    // j is either a delete or (after resolve_targets) impossible
                    // to be a live non-mover conflict; emit its delete first so
                    // the chain's renames land on a freed destination.
                    emit_delete(j, &mut plan, &mut delete_emitted);
                    flush_chain_tail_to_head(&path, original, &final_target, &mut plan, &mut state);
                    break;
                }
                Some(j) => match state[j] {
                    State::Unprocessed => {
                        cur = j;
                        continue;
                    }
                    State::Done => {
                        flush_chain_tail_to_head(
                            &path,
                            original,
                            &final_target,
                            &mut plan,
                            &mut state,
                        );
                        break;
                    }
                    State::InStack => {
                        let pos = path.iter().position(|&x| x == j).unwrap();
                        let cycle = &path[pos..];
                        handle_cycle(cycle, original, &final_target, &mut plan, &mut state);
                        let prefix = &path[..pos];
                        flush_chain_tail_to_head(
                            prefix,
                            original,
                            &final_target,
                            &mut plan,
                            &mut state,
                        );
                        break;
                    }
                },
            }
        }
    }

    for i in 0..n {
        if edited[i].is_none() {
            emit_delete(i, &mut plan, &mut delete_emitted);
        }
    }

    plan
}

/// Emit `Rename(original[node] -> final_target[node])` for every node in
/// `chain`, deepest (last pushed) first, since that is the one whose
/// destination was just freed.
fn flush_chain_tail_to_head(
    chain: &[usize],
    original: &[String],
    final_target: &[Option<String>],
    plan: &mut Plan,
    state: &mut [State],
) {
    for &node in chain.iter().rev() {
        plan.push(Action::Rename {
            src: original[node].clone(),
            dst: final_target[node].clone().unwrap(),
        });
        state[node] = State::Done;
    }
}

/// Break a cycle (in blocker-chain visiting order) by stashing its lowest
/// member, replaying the rest tail-to-head, then unstashing into the
/// stashed member's own destination.
fn handle_cycle(
    cycle: &[usize],
    original: &[String],
    final_target: &[Option<String>],
    plan: &mut Plan,
    state: &mut [State],
) {
    let stash_pos = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, &node)| node)
        .map(|(pos, _)| pos)
        .unwrap();

    let m = cycle.len();
    let rotated: Vec<usize> = (0..m).map(|k| cycle[(stash_pos + k) % m]).collect();
    let start = rotated[0];

    plan.push(Action::Stash {
        src: original[start].clone(),
    });
    for &node in rotated[1..].iter().rev() {
        plan.push(Action::Rename {
            src: original[node].clone(),
            dst: final_target[node].clone().unwrap(),
        });
    }
    plan.push(Action::Unstash {
        dst: final_target[start].clone().unwrap(),
    });

    for &node in &rotated {
        state[node] = State::Done;
    }
}

/// Resolve duplicate targets and external clobbers into a final,
/// collision-free destination per index (`None` stays a delete).
///
/// A claimant whose requested path is its own `original[i]` (a non-mover)
/// always wins its group outright — it never asked to move, so it can't be
/// the one detoured. At most one claimant per group can be a non-mover
/// (original paths are unique), so this is never ambiguous. Otherwise the
/// highest original index keeps the literal path and everyone else is
/// retargeted to the first free `path~`, `path~1`, `path~2`, ... variant,
/// in ascending-index order. A singleton claimant whose literal path
/// already exists on disk under a name that isn't any of `original[]` goes
/// through the same detour.
fn resolve_targets(
    original: &[String],
    edited: &[Option<String>],
    path_exists: impl Fn(&str) -> bool,
) -> Vec<Option<String>> {
    let n = original.len();
    let original_set: std::collections::HashSet<&str> =
        original.iter().map(|s| s.as_str()).collect();

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, target) in edited.iter().enumerate() {
        if let Some(t) = target {
            groups.entry(t.as_str()).or_default().push(i);
        }
    }

    let mut final_target: Vec<Option<String>> = vec![None; n];
    let mut assigned: std::collections::HashSet<String> = std::collections::HashSet::new();

    let mut group_keys: Vec<&str> = groups.keys().copied().collect();
    group_keys.sort_unstable();

    // Phase 1: every group's literal winner is seeded into `assigned` up
    // front, before any suffix variant is generated, so a later-sorted
    // group's literal key can never collide with an earlier group's
    // generated `~`-variant (and vice versa) regardless of group order.
    let mut winners = Vec::with_capacity(group_keys.len());
    for &path in &group_keys {
        let claimants = &groups[path];
        let winner = claimants
            .iter()
            .copied()
            .find(|&i| original[i] == path)
            .unwrap_or_else(|| *claimants.iter().max().unwrap());
        final_target[winner] = Some(path.to_string());
        assigned.insert(path.to_string());
        winners.push(winner);
    }

    // Phase 2: detour every loser to the first free `~`-suffixed variant.
    for (&path, &winner) in group_keys.iter().zip(&winners) {
        let mut losers: Vec<usize> = groups[path]
            .iter()
            .copied()
            .filter(|&i| i != winner)
            .collect();
        losers.sort_unstable();
        for loser in losers.drain(..) {
            let variant = generate_free_variant(path, |candidate| {
                assigned.contains(candidate)
                    || original_set.contains(candidate)
                    || path_exists(candidate)
            });
            final_target[loser] = Some(variant.clone());
            assigned.insert(variant);
        }
    }

    for i in 0..n {
        let Some(target) = final_target[i].clone() else {
            continue;
        };
        if target == original[i] {
            continue;
        }
        if original_set.contains(target.as_str()) {
            continue; // will be freed by our own plan, not an external clobber
        }
        if path_exists(&target) {
            let variant = generate_free_variant(&target, |candidate| {
                assigned.contains(candidate)
                    || original_set.contains(candidate)
                    || path_exists(candidate)
            });
            assigned.remove(&target);
            final_target[i] = Some(variant.clone());
            assigned.insert(variant);
        }
    }

    final_target
}

fn generate_free_variant(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let first = format!("{base}~");
    if !is_taken(&first) {
        return first;
    }
    let mut n = 1u64;
    loop {
        let candidate = format!("{base}~{n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
