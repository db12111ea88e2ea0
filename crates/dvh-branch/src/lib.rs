//! Branch policy (BP): filters and orders the resolved version list per a
//! declarative [`BranchSpec`] (spec §4.3).

use std::collections::HashSet;

use dvh_core::{BranchSpec, BranchType, VersionId, VersionInfo, VersionKind};
use dvh_util::errors::DvhError;

/// The result of applying a [`BranchSpec`] to a resolved version list.
pub struct BranchPlan {
    pub filtered: Vec<VersionInfo>,
    pub start: VersionId,
    pub end: VersionId,
}

/// Apply the five-step filtering/ordering algorithm of spec §4.3.
///
/// `latest_release`/`latest_snapshot` come from the catalogue's `latest`
/// pointers and are used only to derive a default `end` when the branch
/// spec leaves it unset.
pub fn apply(
    versions: &[VersionInfo],
    spec: &BranchSpec,
    latest_release: &VersionId,
    latest_snapshot: &VersionId,
) -> Result<BranchPlan, DvhError> {
    let filtered = filter(versions, spec);

    let start = spec
        .start
        .clone()
        .or_else(|| filtered.first().map(|v| v.id.clone()));

    let end = spec.end.clone().or_else(|| {
        default_end(&filtered, spec.branch_type, latest_release, latest_snapshot)
    });

    match (start, end) {
        (Some(start), Some(end)) => Ok(BranchPlan {
            filtered,
            start,
            end,
        }),
        _ => Err(DvhError::BranchUnderspecified {
            message: "neither start nor end could be derived from the branch spec".to_string(),
        }),
    }
}

fn filter(versions: &[VersionInfo], spec: &BranchSpec) -> Vec<VersionInfo> {
    // Step 1: an exhaustive allowlist overrides include/exclude entirely.
    if let Some(allowlist) = &spec.versions {
        let allowed: HashSet<&str> = allowlist.iter().map(VersionId::as_str).collect();
        return versions
            .iter()
            .filter(|v| allowed.contains(v.id.as_str()))
            .cloned()
            .collect();
    }

    // Step 2: default exclusion set, minus explicit includes.
    let included: HashSet<&str> = spec.include.iter().map(VersionId::as_str).collect();
    let excluded: HashSet<&str> = spec.exclude.iter().map(VersionId::as_str).collect();

    let mut filtered: Vec<VersionInfo> = versions
        .iter()
        .filter(|v| {
            if included.contains(v.id.as_str()) {
                return true;
            }
            let is_special = v.kind == VersionKind::Special;
            let is_declared_unobfuscated_exclusion =
                dvh_manifest::unobfuscated::base_has_declared_exclusion(v.id.base_str())
                    && !v.id.is_unobfuscated_variant();
            let is_explicit_exclude = excluded.contains(v.id.as_str());
            !(is_special || is_declared_unobfuscated_exclusion || is_explicit_exclude)
        })
        .cloned()
        .collect();

    // Step 3: release branches further restrict to release-kind ids.
    if spec.branch_type == BranchType::Release {
        filtered.retain(|v| v.kind == VersionKind::Release);
    }

    filtered
}

fn default_end(
    filtered: &[VersionInfo],
    branch_type: BranchType,
    latest_release: &VersionId,
    latest_snapshot: &VersionId,
) -> Option<VersionId> {
    if branch_type == BranchType::Release {
        return Some(latest_release.clone());
    }

    let release_entry = filtered.iter().find(|v| v.id.as_str() == latest_release.as_str());
    let snapshot_entry = filtered.iter().find(|v| v.id.as_str() == latest_snapshot.as_str());

    match (release_entry, snapshot_entry) {
        (Some(r), Some(s)) => Some(if s.time_released > r.time_released {
            s.id.clone()
        } else {
            r.id.clone()
        }),
        (Some(r), None) => Some(r.id.clone()),
        (None, Some(s)) => Some(s.id.clone()),
        (None, None) => None,
    }
}

/// Slice the filtered list to the inclusive `[start, end]` range by
/// position, the "plan" a resume or fresh run walks version-by-version.
pub fn plan_range(
    filtered: &[VersionInfo],
    start: &VersionId,
    end: &VersionId,
) -> Result<Vec<VersionInfo>, DvhError> {
    let start_idx = filtered
        .iter()
        .position(|v| v.id.as_str() == start.as_str())
        .ok_or_else(|| DvhError::UnknownVersion {
            id: start.as_str().to_string(),
        })?;
    let end_idx = filtered
        .iter()
        .position(|v| v.id.as_str() == end.as_str())
        .ok_or_else(|| DvhError::UnknownVersion {
            id: end.as_str().to_string(),
        })?;

    if start_idx > end_idx {
        return Err(DvhError::BranchMisordered {
            start: start.as_str().to_string(),
            end: end.as_str().to_string(),
        });
    }

    Ok(filtered[start_idx..=end_idx].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn v(id: &str, kind: VersionKind, released: &str) -> VersionInfo {
        VersionInfo {
            id: VersionId::new(id),
            kind,
            manifest_url: format!("https://x/{id}.json"),
            time_created: released.parse::<DateTime<Utc>>().unwrap(),
            time_released: released.parse::<DateTime<Utc>>().unwrap(),
            manifest_hash: None,
            priority: 0,
        }
    }

    fn sample() -> Vec<VersionInfo> {
        vec![
            v("1.14.4", VersionKind::Release, "2019-10-22T00:00:00Z"),
            v("1.15-pre1", VersionKind::Snapshot, "2019-11-27T00:00:00Z"),
            v("1.15", VersionKind::Release, "2019-12-10T00:00:00Z"),
            v("rd-132211", VersionKind::Special, "2009-05-13T00:00:00Z"),
        ]
    }

    #[test]
    fn release_type_excludes_snapshots_and_specials() {
        let spec = BranchSpec::new(BranchType::Release);
        let plan = apply(
            &sample(),
            &spec,
            &VersionId::new("1.15"),
            &VersionId::new("1.15-pre1"),
        )
        .unwrap();
        assert!(plan
            .filtered
            .iter()
            .all(|v| v.kind == VersionKind::Release));
        assert_eq!(plan.start.as_str(), "1.14.4");
        assert_eq!(plan.end.as_str(), "1.15");
    }

    #[test]
    fn custom_type_keeps_snapshots_excludes_special() {
        let spec = BranchSpec::new(BranchType::Custom);
        let plan = apply(
            &sample(),
            &spec,
            &VersionId::new("1.15"),
            &VersionId::new("1.15-pre1"),
        )
        .unwrap();
        assert!(!plan.filtered.iter().any(|v| v.kind == VersionKind::Special));
        assert!(plan.filtered.iter().any(|v| v.id.as_str() == "1.15-pre1"));
        // latest release (1.15, Dec 10) is newer than latest snapshot (1.15-pre1, Nov 27)
        assert_eq!(plan.end.as_str(), "1.15");
    }

    #[test]
    fn versions_allowlist_overrides_include_exclude() {
        let mut spec = BranchSpec::new(BranchType::Custom);
        spec.versions = Some(vec![VersionId::new("1.14.4"), VersionId::new("rd-132211")]);
        let plan = apply(
            &sample(),
            &spec,
            &VersionId::new("1.15"),
            &VersionId::new("1.15-pre1"),
        )
        .unwrap();
        assert_eq!(plan.filtered.len(), 2);
    }

    #[test]
    fn explicit_include_overrides_special_exclusion() {
        let mut spec = BranchSpec::new(BranchType::Custom);
        spec.include = vec![VersionId::new("rd-132211")];
        let plan = apply(
            &sample(),
            &spec,
            &VersionId::new("1.15"),
            &VersionId::new("1.15-pre1"),
        )
        .unwrap();
        assert!(plan.filtered.iter().any(|v| v.id.as_str() == "rd-132211"));
    }

    #[test]
    fn underspecified_when_filtered_is_empty_and_no_explicit_bounds() {
        let mut spec = BranchSpec::new(BranchType::Custom);
        spec.versions = Some(vec![]);
        let err = apply(
            &sample(),
            &spec,
            &VersionId::new("1.15"),
            &VersionId::new("1.15-pre1"),
        )
        .unwrap_err();
        assert!(matches!(err, DvhError::BranchUnderspecified { .. }));
    }

    #[test]
    fn plan_range_slices_inclusive() {
        let versions = sample();
        let range = plan_range(&versions, &VersionId::new("1.14.4"), &VersionId::new("1.15"))
            .unwrap();
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn plan_range_rejects_misordered_bounds() {
        let versions = sample();
        let err = plan_range(&versions, &VersionId::new("1.15"), &VersionId::new("1.14.4"))
            .unwrap_err();
        assert!(matches!(err, DvhError::BranchMisordered { .. }));
    }

    #[test]
    fn plan_range_rejects_unknown_bound() {
        let versions = sample();
        let err = plan_range(&versions, &VersionId::new("nope"), &VersionId::new("1.15"))
            .unwrap_err();
        assert!(matches!(err, DvhError::UnknownVersion { .. }));
    }
}
