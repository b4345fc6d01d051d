//! Counterfactual effect estimation
//!
//! Both modes consume the same predicate outcomes and only compare keys
//! present in both arms. An empty intersection is a reported outcome
//! (`None`), not an error: the caller prints a diagnostic and exits clean.

use sabot_core::{Datapoint, EnvironmentKind};
use std::collections::BTreeMap;
use std::fmt;

use crate::predicate::{outcome, EvalError};

/// Tolerance for deciding whether two group expectations differ.
pub const EFFECT_TOLERANCE: f64 = 1e-9;

/// Grouping granularity for group-mean estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Id,
    IdTarget,
}

/// Key of one comparison group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    Id(u64),
    IdTarget(u64, String),
}

impl GroupKey {
    fn of(dp: &Datapoint, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Id => GroupKey::Id(dp.id),
            GroupBy::IdTarget => GroupKey::IdTarget(dp.id, dp.target_agent.trim().to_string()),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            GroupKey::Id(id) | GroupKey::IdTarget(id, _) => *id,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            GroupKey::Id(_) => None,
            GroupKey::IdTarget(_, target) => Some(target),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Id(id) => write!(f, "{id}"),
            GroupKey::IdTarget(id, target) => write!(f, "({id}, {target})"),
        }
    }
}

/// Which arm a sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arm {
    Reference,
    Intervention,
}

impl fmt::Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arm::Reference => write!(f, "ref"),
            Arm::Intervention => write!(f, "int"),
        }
    }
}

/// One evaluated sample, for the per-sample report table.
#[derive(Debug, Clone)]
pub struct SampleRow {
    pub arm: Arm,
    pub id: u64,
    pub run_idx: u32,
    pub seed: u64,
    pub target_agent: String,
    pub y: f64,
}

/// Per-group comparison summary.
#[derive(Debug, Clone)]
pub struct GroupRow {
    pub key: GroupKey,
    pub ref_mean: f64,
    pub int_mean: f64,
    pub effect: f64,
    pub n_ref: usize,
    pub n_int: usize,
}

/// Group-mean estimate over the key intersection.
#[derive(Debug, Clone)]
pub struct GroupReport {
    /// Unweighted mean of per-group effects
    pub effect: f64,
    /// Whether any group's arm expectations differ beyond the tolerance
    pub any_difference: bool,
    pub groups: Vec<GroupRow>,
    pub samples: Vec<SampleRow>,
}

/// One seed-matched pair.
#[derive(Debug, Clone)]
pub struct PairRow {
    pub id: u64,
    pub run_idx: u32,
    pub seed_ref: u64,
    pub seed_int: u64,
    pub target_agent_ref: String,
    pub target_agent_int: String,
    pub y_ref: f64,
    pub y_int: f64,
    pub delta: f64,
}

/// Pairwise estimate over matched `(id, run_idx)` keys.
#[derive(Debug, Clone)]
pub struct PairReport {
    /// Mean of per-pair deltas
    pub effect: f64,
    pub pairs: Vec<PairRow>,
    pub samples: Vec<SampleRow>,
}

fn sample_row(arm: Arm, dp: &Datapoint, y: f64) -> SampleRow {
    SampleRow {
        arm,
        id: dp.id,
        run_idx: dp.run_idx,
        seed: dp.seed,
        target_agent: dp.target_agent.clone(),
        y,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Success rate over one arm (legacy single-file evaluation). `None` when
/// the file holds no datapoints.
pub fn success_rate(
    kind: EnvironmentKind,
    data: &[Datapoint],
) -> Result<Option<(f64, Vec<SampleRow>)>, EvalError> {
    if data.is_empty() {
        return Ok(None);
    }
    let mut samples = Vec::with_capacity(data.len());
    for dp in data {
        let y = outcome(kind, dp)?;
        samples.push(sample_row(Arm::Intervention, dp, y));
    }
    let rate = mean(&samples.iter().map(|s| s.y).collect::<Vec<_>>());
    Ok(Some((rate, samples)))
}

/// Group-mean estimation. `None` when the arms share no group key.
pub fn estimate_grouped(
    kind: EnvironmentKind,
    ref_data: &[Datapoint],
    int_data: &[Datapoint],
    group_by: GroupBy,
) -> Result<Option<GroupReport>, EvalError> {
    let mut samples = Vec::new();
    let mut ref_vals: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for dp in ref_data {
        let y = outcome(kind, dp)?;
        samples.push(sample_row(Arm::Reference, dp, y));
        ref_vals.entry(GroupKey::of(dp, group_by)).or_default().push(y);
    }
    let mut int_vals: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for dp in int_data {
        let y = outcome(kind, dp)?;
        samples.push(sample_row(Arm::Intervention, dp, y));
        int_vals.entry(GroupKey::of(dp, group_by)).or_default().push(y);
    }

    let mut groups = Vec::new();
    let mut any_difference = false;
    for (key, ref_ys) in &ref_vals {
        let int_ys = match int_vals.get(key) {
            Some(v) => v,
            None => continue,
        };
        let ref_mean = mean(ref_ys);
        let int_mean = mean(int_ys);
        if (ref_mean - int_mean).abs() > EFFECT_TOLERANCE {
            any_difference = true;
        }
        groups.push(GroupRow {
            key: key.clone(),
            ref_mean,
            int_mean,
            effect: int_mean - ref_mean,
            n_ref: ref_ys.len(),
            n_int: int_ys.len(),
        });
    }

    if groups.is_empty() {
        return Ok(None);
    }
    let effect = mean(&groups.iter().map(|g| g.effect).collect::<Vec<_>>());
    Ok(Some(GroupReport {
        effect,
        any_difference,
        groups,
        samples,
    }))
}

/// First-wins dedup on `(id, run_idx)`; later duplicates are dropped with
/// a data-quality warning.
fn dedup_pairs(arm: Arm, data: &[Datapoint]) -> BTreeMap<(u64, u32), &Datapoint> {
    let mut map: BTreeMap<(u64, u32), &Datapoint> = BTreeMap::new();
    for dp in data {
        let key = (dp.id, dp.run_idx);
        if map.contains_key(&key) {
            tracing::warn!(%arm, id = dp.id, run_idx = dp.run_idx, "duplicate pair key, keeping first");
            continue;
        }
        map.insert(key, dp);
    }
    map
}

/// Seed-paired estimation. `None` when no `(id, run_idx)` key is shared.
pub fn estimate_pairwise(
    kind: EnvironmentKind,
    ref_data: &[Datapoint],
    int_data: &[Datapoint],
) -> Result<Option<PairReport>, EvalError> {
    let ref_map = dedup_pairs(Arm::Reference, ref_data);
    let int_map = dedup_pairs(Arm::Intervention, int_data);

    let mut pairs = Vec::new();
    let mut samples = Vec::new();
    for (key, dp_ref) in &ref_map {
        let dp_int = match int_map.get(key) {
            Some(dp) => dp,
            None => continue,
        };
        if dp_ref.seed != dp_int.seed {
            // pairing validity rests on shared exogenous randomness
            tracing::warn!(
                id = dp_ref.id,
                run_idx = dp_ref.run_idx,
                seed_ref = dp_ref.seed,
                seed_int = dp_int.seed,
                "matched pair has differing seeds"
            );
        }
        let y_ref = outcome(kind, dp_ref)?;
        let y_int = outcome(kind, dp_int)?;
        samples.push(sample_row(Arm::Reference, dp_ref, y_ref));
        samples.push(sample_row(Arm::Intervention, dp_int, y_int));
        pairs.push(PairRow {
            id: dp_ref.id,
            run_idx: dp_ref.run_idx,
            seed_ref: dp_ref.seed,
            seed_int: dp_int.seed,
            target_agent_ref: dp_ref.target_agent.clone(),
            target_agent_int: dp_int.target_agent.clone(),
            y_ref,
            y_int,
            delta: y_int - y_ref,
        });
    }

    if pairs.is_empty() {
        return Ok(None);
    }
    let effect = mean(&pairs.iter().map(|p| p.delta).collect::<Vec<_>>());
    Ok(Some(PairReport {
        effect,
        pairs,
        samples,
    }))
}
