//! # Sabot Eval
//!
//! Batch evaluation of recorded trajectories: the keyword success
//! predicate, the counterfactual effect estimator (group-mean and
//! seed-paired), and the CSV report writer.

pub mod estimator;
pub mod keywords;
pub mod predicate;
pub mod report;

pub use estimator::{
    estimate_grouped, estimate_pairwise, success_rate, Arm, GroupBy, GroupKey, GroupReport,
    GroupRow, PairReport, PairRow, SampleRow, EFFECT_TOLERANCE,
};
pub use keywords::Clause;
pub use predicate::{evaluate, outcome, EvalError};
pub use report::{samples_path, write_group_report, write_pair_report, write_sample_report};
