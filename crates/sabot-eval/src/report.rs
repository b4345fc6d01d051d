//! CSV report writing
//!
//! Summary tables and a per-sample companion file next to it (the `.csv`
//! suffix becomes `_samples.csv`). Fields containing separators or quotes
//! are quoted with doubled inner quotes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::estimator::{GroupReport, PairReport, SampleRow};
use crate::predicate::EvalError;

fn field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn row(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// The per-sample companion path for a summary path.
pub fn samples_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match name.strip_suffix(".csv") {
        Some(stem) => format!("{stem}_samples.csv"),
        None => format!("{name}_samples.csv"),
    };
    path.with_file_name(name)
}

fn write_samples(path: &Path, samples: &[SampleRow]) -> Result<(), EvalError> {
    let mut out = String::new();
    out.push_str("which,id,run_idx,seed,target_agent,Y\n");
    for s in samples {
        let _ = write!(
            out,
            "{}",
            row(&[
                s.arm.to_string(),
                s.id.to_string(),
                s.run_idx.to_string(),
                s.seed.to_string(),
                s.target_agent.clone(),
                s.y.to_string(),
            ])
        );
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Write the per-group summary plus the per-sample companion file.
pub fn write_group_report(path: &Path, report: &GroupReport) -> Result<(), EvalError> {
    let mut out = String::new();
    out.push_str("key,id,target_agent,ref_mean_Y,int_mean_Y,ase,n_ref_samples,n_int_samples\n");
    for g in &report.groups {
        let _ = write!(
            out,
            "{}",
            row(&[
                g.key.to_string(),
                g.key.id().to_string(),
                g.key.target().unwrap_or("").to_string(),
                g.ref_mean.to_string(),
                g.int_mean.to_string(),
                g.effect.to_string(),
                g.n_ref.to_string(),
                g.n_int.to_string(),
            ])
        );
    }
    std::fs::write(path, out)?;
    write_samples(&samples_path(path), &report.samples)
}

/// Write the per-pair summary plus the per-sample companion file.
pub fn write_pair_report(path: &Path, report: &PairReport) -> Result<(), EvalError> {
    let mut out = String::new();
    out.push_str(
        "id,run_idx,seed_ref,seed_int,target_agent_ref,target_agent_int,Y_ref,Y_int,delta\n",
    );
    for p in &report.pairs {
        let _ = write!(
            out,
            "{}",
            row(&[
                p.id.to_string(),
                p.run_idx.to_string(),
                p.seed_ref.to_string(),
                p.seed_int.to_string(),
                p.target_agent_ref.clone(),
                p.target_agent_int.clone(),
                p.y_ref.to_string(),
                p.y_int.to_string(),
                p.delta.to_string(),
            ])
        );
    }
    std::fs::write(path, out)?;
    write_samples(&samples_path(path), &report.samples)
}

/// Write the per-sample table of one arm (legacy single-file mode).
pub fn write_sample_report(path: &Path, samples: &[SampleRow]) -> Result<(), EvalError> {
    write_samples(path, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{Arm, GroupKey, GroupRow};

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(field("plain"), "plain");
        assert_eq!(field("a,b"), "\"a,b\"");
        assert_eq!(field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn samples_path_replaces_the_suffix() {
        assert_eq!(
            samples_path(Path::new("out/ase.csv")),
            PathBuf::from("out/ase_samples.csv")
        );
        assert_eq!(
            samples_path(Path::new("out/ase")),
            PathBuf::from("out/ase_samples.csv")
        );
    }

    #[test]
    fn group_report_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.csv");
        let report = GroupReport {
            effect: 0.5,
            any_difference: true,
            groups: vec![GroupRow {
                key: GroupKey::IdTarget(3, "CHIEF_EDITOR/EDITOR".to_string()),
                ref_mean: 0.0,
                int_mean: 0.5,
                effect: 0.5,
                n_ref: 2,
                n_int: 2,
            }],
            samples: vec![SampleRow {
                arm: Arm::Reference,
                id: 3,
                run_idx: 0,
                seed: 3000,
                target_agent: "CHIEF_EDITOR/EDITOR".to_string(),
                y: 0.0,
            }],
        };
        write_group_report(&path, &report).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("key,id,target_agent"));
        // the composite key contains a comma and must be quoted
        assert!(written.contains("\"(3, CHIEF_EDITOR/EDITOR)\""));

        let samples = std::fs::read_to_string(samples_path(&path)).unwrap();
        assert!(samples.contains("ref,3,0,3000,CHIEF_EDITOR/EDITOR,0"));
    }
}
