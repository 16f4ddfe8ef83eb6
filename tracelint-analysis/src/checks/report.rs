//! Aggregate validation report.
//!
//! Failures are grouped by object type and check, each group carrying
//! its notice and the ordered instance messages. The terminal error is
//! raised only after the whole pass, with the full report as payload.

use serde::Serialize;

use super::{CheckId, Identity, Outcome};

#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub failures: Vec<ReportGroup>,
    pub warnings: Vec<ReportGroup>,
    /// Checks executed to a verdict.
    pub checks_run: usize,
    /// Checks skipped or degraded, never counted as failures.
    pub inconclusive: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportGroup {
    pub object_type: &'static str,
    pub check: &'static str,
    pub notice: &'static str,
    pub instances: Vec<String>,
}

impl Report {
    pub fn record(&mut self, identity: &Identity, check: CheckId, outcome: &Outcome) {
        match outcome {
            Outcome::Pass => self.checks_run += 1,
            Outcome::Inconclusive => self.inconclusive += 1,
            Outcome::Fail(message) => {
                self.checks_run += 1;
                push_instance(&mut self.failures, identity, check, message);
            }
            Outcome::Warn(message) => {
                self.checks_run += 1;
                push_instance(&mut self.warnings, identity, check, message);
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_failures(&self) -> usize {
        self.failures.iter().map(|g| g.instances.len()).sum()
    }

    /// Succeeds only on an empty failure set; otherwise the report
    /// itself is the error payload.
    pub fn into_result(self) -> Result<Report, ValidationFailed> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(ValidationFailed { report: self })
        }
    }
}

fn push_instance(
    groups: &mut Vec<ReportGroup>,
    identity: &Identity,
    check: CheckId,
    message: &str,
) {
    let object_type = identity.kind();
    let check_name = check.name();
    let index = match groups
        .iter()
        .position(|g| g.object_type == object_type && g.check == check_name)
    {
        Some(index) => index,
        None => {
            groups.push(ReportGroup {
                object_type,
                check: check_name,
                notice: check.notice(),
                instances: Vec::new(),
            });
            groups.len() - 1
        }
    };
    groups[index].instances.push(format!("{identity}: {message}"));
}

/// Terminal error for a run with a non-empty failure set.
#[derive(Debug, thiserror::Error)]
#[error(
    "validation failed: {} instance(s) across {} check group(s)",
    .report.total_failures(),
    .report.failures.len()
)]
pub struct ValidationFailed {
    pub report: Report,
}

#[cfg(test)]
mod tests {
    use tracelint_core::types::AssetId;

    use super::*;

    #[test]
    fn failures_group_by_check_in_first_seen_order() {
        let mut report = Report::default();
        let a = Identity::Asset(AssetId::new("osmosis", "uosmo"));
        let b = Identity::Asset(AssetId::new("juno", "ujuno"));
        report.record(&a, CheckId::UniqueBaseDenom, &Outcome::Fail("dup".into()));
        report.record(&b, CheckId::DenomUnitsValid, &Outcome::Fail("bad".into()));
        report.record(&b, CheckId::UniqueBaseDenom, &Outcome::Fail("dup too".into()));

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].check, "unique_base_denom");
        assert_eq!(report.failures[0].instances.len(), 2);
        assert!(report.failures[0].instances[0].starts_with("osmosis:uosmo"));
        assert_eq!(report.total_failures(), 3);
    }

    #[test]
    fn warnings_do_not_fail_the_run() {
        let mut report = Report::default();
        let id = Identity::Chain("osmosis".into());
        report.record(&id, CheckId::CoinTypeValid, &Outcome::Warn("missing".into()));
        assert!(report.is_clean());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn into_result_fails_with_the_report_as_payload() {
        let mut report = Report::default();
        let id = Identity::Chain("osmosis".into());
        report.record(&id, CheckId::ChainIdValid, &Outcome::Fail("missing".into()));
        let err = report.into_result().unwrap_err();
        assert_eq!(err.report.total_failures(), 1);
        assert!(err.to_string().contains("validation failed"));
    }
}
