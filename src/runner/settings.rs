//! Which settings the selected steps need, and which can no longer change.
//!
//! Settings consumed by a completed step that may not restart are locked:
//! changing them afterwards would leave the produced output out of sync
//! with the stated configuration.

use std::collections::BTreeSet;

use tracing::error;

use crate::api::{Settings, SettingsKey};
use crate::steps::{Step, StepDefinition, StepStatus};

/// Settings a step needs given the current values: its own required
/// settings plus every conditional rule whose value matches.
///
/// The effective value of a key is taken from `candidate` when it holds
/// one, else from `persisted`. Rules are applied one level deep.
pub fn step_settings(
    definition: &StepDefinition,
    persisted: &Settings,
    candidate: Option<&Settings>,
) -> BTreeSet<SettingsKey> {
    let mut keys: BTreeSet<SettingsKey> = definition.required_settings.iter().copied().collect();

    for (key, rules) in &definition.dependent_settings {
        let effective = effective_value(*key, persisted, candidate);
        for rule in rules {
            if effective == Some(rule.value.as_str()) {
                keys.extend(rule.required_settings.iter().copied());
            }
        }
    }

    keys
}

fn effective_value<'a>(
    key: SettingsKey,
    persisted: &'a Settings,
    candidate: Option<&'a Settings>,
) -> Option<&'a str> {
    candidate
        .and_then(|c| c.get(key))
        .or_else(|| persisted.get(key))
}

/// Settings needed by all selected steps.
pub fn required_settings(
    steps: &[Step],
    persisted: &Settings,
    candidate: Option<&Settings>,
) -> BTreeSet<SettingsKey> {
    steps
        .iter()
        .filter(|s| s.selected)
        .flat_map(|s| step_settings(&s.definition, persisted, candidate))
        .collect()
}

/// Required settings without a persisted, non-empty value.
pub fn missing_settings(steps: &[Step], persisted: &Settings) -> BTreeSet<SettingsKey> {
    required_settings(steps, persisted, None)
        .into_iter()
        .filter(|key| !persisted.has_value(*key))
        .collect()
}

/// Settings that may no longer change.
///
/// Every step that succeeded and may not restart locks its own settings and
/// those of the steps named in its `lock_steps`. An unknown id in
/// `lock_steps` is logged and skipped.
pub fn locked_settings(
    steps: &[Step],
    persisted: &Settings,
    candidate: Option<&Settings>,
) -> BTreeSet<SettingsKey> {
    let mut locked = BTreeSet::new();

    for step in steps
        .iter()
        .filter(|s| s.status == Some(StepStatus::Success) && !s.definition.allow_restart)
    {
        locked.extend(step_settings(&step.definition, persisted, candidate));

        for id in &step.definition.lock_steps {
            match steps.iter().find(|s| s.id() == id) {
                Some(target) => {
                    locked.extend(step_settings(&target.definition, persisted, candidate))
                }
                None => error!(step_id = %step.id(), lock_step = %id, "lock_steps names an unknown step"),
            }
        }
    }

    locked
}

/// Locked keys whose value differs between `persisted` and `candidate`.
pub fn locked_changes(
    steps: &[Step],
    persisted: &Settings,
    candidate: &Settings,
) -> Vec<SettingsKey> {
    locked_settings(steps, persisted, Some(candidate))
        .into_iter()
        .filter(|key| persisted.get(*key) != candidate.get(*key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChecksumType;

    fn step(def: StepDefinition, selected: bool, status: Option<StepStatus>) -> Step {
        let mut step = Step::new(def);
        step.selected = selected;
        step.status = status;
        step
    }

    fn calculate() -> StepDefinition {
        StepDefinition::new("calculate", "ContainerChecksumHandler")
            .with_required_settings(&[SettingsKey::ChecksumType, SettingsKey::ChecksumValue])
    }

    fn transform() -> StepDefinition {
        StepDefinition::new("transform", "TransformHandler")
            .with_required_settings(&[SettingsKey::MergeRecordAndFile])
            .with_dependent_setting(
                SettingsKey::MergeRecordAndFile,
                "Ja",
                &[SettingsKey::SchemaToValidate],
            )
    }

    #[test]
    fn required_settings_only_for_selected_steps() {
        let steps = vec![
            step(calculate(), true, None),
            step(
                StepDefinition::new("prewash", "PrewashHandler")
                    .with_required_settings(&[SettingsKey::Prewash]),
                false,
                None,
            ),
        ];
        let keys = required_settings(&steps, &Settings::default(), None);
        assert_eq!(
            keys.into_iter().collect::<Vec<_>>(),
            vec![SettingsKey::ChecksumType, SettingsKey::ChecksumValue]
        );
    }

    #[test]
    fn missing_settings_gates_until_both_values_present() {
        let steps = vec![step(calculate(), true, None)];
        let mut settings = Settings::default();
        assert_eq!(
            missing_settings(&steps, &settings).into_iter().collect::<Vec<_>>(),
            vec![SettingsKey::ChecksumType, SettingsKey::ChecksumValue]
        );

        settings.checksum_type = Some(ChecksumType::SHA256);
        settings.checksum_value = Some("abc123".into());
        assert!(missing_settings(&steps, &settings).is_empty());
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let steps = vec![step(calculate(), true, None)];
        let settings = Settings {
            checksum_type: Some(ChecksumType::MD5),
            checksum_value: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            missing_settings(&steps, &settings).into_iter().collect::<Vec<_>>(),
            vec![SettingsKey::ChecksumValue]
        );
    }

    #[test]
    fn dependent_rule_applies_on_matching_persisted_value() {
        let steps = vec![step(transform(), true, None)];
        let mut settings = Settings::default();
        assert!(!required_settings(&steps, &settings, None).contains(&SettingsKey::SchemaToValidate));

        settings.merge_record_and_file = Some("Ja".into());
        assert!(required_settings(&steps, &settings, None).contains(&SettingsKey::SchemaToValidate));
    }

    #[test]
    fn candidate_value_outranks_persisted() {
        let steps = vec![step(transform(), true, None)];
        let persisted = Settings {
            merge_record_and_file: Some("Nee".into()),
            ..Default::default()
        };
        let candidate = Settings {
            merge_record_and_file: Some("Ja".into()),
            ..Default::default()
        };
        assert!(required_settings(&steps, &persisted, Some(&candidate))
            .contains(&SettingsKey::SchemaToValidate));
        assert!(!required_settings(&steps, &persisted, None)
            .contains(&SettingsKey::SchemaToValidate));
    }

    #[test]
    fn candidate_without_key_falls_back_to_persisted() {
        let steps = vec![step(transform(), true, None)];
        let persisted = Settings {
            merge_record_and_file: Some("Ja".into()),
            ..Default::default()
        };
        let candidate = Settings::default();
        assert!(required_settings(&steps, &persisted, Some(&candidate))
            .contains(&SettingsKey::SchemaToValidate));
    }

    #[test]
    fn completed_restartable_step_locks_nothing() {
        let steps = vec![step(calculate().restartable(), false, Some(StepStatus::Success))];
        assert!(locked_settings(&steps, &Settings::default(), None).is_empty());
    }

    #[test]
    fn completed_step_locks_own_settings() {
        let steps = vec![step(calculate(), false, Some(StepStatus::Success))];
        let locked = locked_settings(&steps, &Settings::default(), None);
        assert!(locked.contains(&SettingsKey::ChecksumType));
        assert!(locked.contains(&SettingsKey::ChecksumValue));
    }

    #[test]
    fn failed_step_locks_nothing() {
        let steps = vec![step(calculate(), false, Some(StepStatus::Failed))];
        assert!(locked_settings(&steps, &Settings::default(), None).is_empty());
    }

    #[test]
    fn lock_steps_propagates_to_steps_that_never_ran() {
        let steps = vec![
            step(
                StepDefinition::new("prewash", "PrewashHandler")
                    .with_required_settings(&[SettingsKey::Prewash])
                    .restartable(),
                false,
                None,
            ),
            step(
                StepDefinition::new("buildopex", "BuildOpexHandler").with_lock_steps(&["prewash"]),
                false,
                Some(StepStatus::Success),
            ),
        ];
        let locked = locked_settings(&steps, &Settings::default(), None);
        assert_eq!(locked.into_iter().collect::<Vec<_>>(), vec![SettingsKey::Prewash]);
    }

    #[test]
    fn unknown_lock_step_is_skipped() {
        let steps = vec![
            step(
                StepDefinition::new("polish", "PolishHandler")
                    .with_required_settings(&[SettingsKey::Polish]),
                false,
                None,
            ),
            step(
                StepDefinition::new("buildopex", "BuildOpexHandler")
                    .with_lock_steps(&["ghost", "polish"]),
                false,
                Some(StepStatus::Success),
            ),
        ];
        let locked = locked_settings(&steps, &Settings::default(), None);
        assert!(locked.contains(&SettingsKey::Polish));
    }

    #[test]
    fn locked_changes_reports_only_modified_keys() {
        let steps = vec![step(calculate(), false, Some(StepStatus::Success))];
        let persisted = Settings {
            checksum_type: Some(ChecksumType::MD5),
            checksum_value: Some("abc".into()),
            ..Default::default()
        };
        let mut candidate = persisted.clone();
        candidate.checksum_value = Some("def".into());
        candidate.prewash = Some("x.xslt".into());

        assert_eq!(
            locked_changes(&steps, &persisted, &candidate),
            vec![SettingsKey::ChecksumValue]
        );
    }
}
