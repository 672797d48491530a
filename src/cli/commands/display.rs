//! Shared display helpers for step and collection rendering.
//!
//! These helpers are used by `status`, `run`, `settings` and any other
//! command that renders a session view.

use std::collections::BTreeSet;

use crate::api::{Collection, SettingsKey};
use crate::steps::{Step, StepStatus};
use crate::ui::{format_date, format_file_size, PreingestTheme, UserInterface};

/// Print the collection header line.
pub fn show_collection(ui: &mut dyn UserInterface, theme: &PreingestTheme, collection: &Collection) {
    let created = collection
        .creation_time
        .as_ref()
        .map(format_date)
        .unwrap_or_else(|| "-".to_string());
    ui.message(&format!(
        "{} {}",
        theme.highlight.apply_to(&collection.name),
        theme.dim.apply_to(format!(
            "({}, {}, {:?})",
            format_file_size(collection.size),
            created,
            collection.overall_status
        ))
    ));
    if let (Some(kind), Some(value)) = (
        collection.calculated_checksum_type,
        collection.calculated_checksum_value.as_deref(),
    ) {
        ui.message(&format!(
            "  {} {}",
            theme.key.apply_to(format!("{}:", kind.display_name())),
            value
        ));
    }
    for url in [
        collection.excel_creator_download_url.as_deref(),
        collection.index_metadata_download_url.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        ui.message(&format!("  {} {}", theme.key.apply_to("report:"), url));
    }
}

/// Print one step line, styled by status.
pub fn show_step(ui: &mut dyn UserInterface, theme: &PreingestTheme, step: &Step) {
    let marker = match (step.selected, step.fixed_selected) {
        (_, Some(false)) => "-",
        (true, _) => "x",
        (false, _) => " ",
    };
    let timing = match (&step.last_start, &step.last_duration) {
        (Some(start), Some(duration)) => format!(
            "{} {}",
            theme.dim.apply_to(format_date(start)),
            theme.duration.apply_to(duration)
        ),
        _ => String::new(),
    };
    let line = format!(
        "  [{}] {:<22} {:<14} {}",
        marker,
        step.id(),
        theme.format_status(step.status),
        timing
    );
    match step.status {
        Some(StepStatus::Failed) => ui.error(line.trim_end()),
        _ => ui.message(line.trim_end()),
    }
}

/// Print a list of setting keys under a label, if any.
pub fn show_keys(
    ui: &mut dyn UserInterface,
    theme: &PreingestTheme,
    label: &str,
    keys: &BTreeSet<SettingsKey>,
) {
    if keys.is_empty() {
        return;
    }
    let names: Vec<_> = keys.iter().map(|k| k.as_str()).collect();
    ui.message(&format!(
        "{} {}",
        theme.key.apply_to(label),
        names.join(", ")
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::StepDefinition;
    use crate::ui::MockUI;

    #[test]
    fn failed_step_goes_to_errors() {
        let mut ui = MockUI::new();
        let mut step = Step::new(StepDefinition::new("unpack", "UnpackTarHandler"));
        step.status = Some(StepStatus::Failed);
        show_step(&mut ui, &PreingestTheme::plain(), &step);
        assert!(ui.errors().iter().any(|m| m.contains("unpack")));
    }

    #[test]
    fn pinned_step_is_marked() {
        let mut ui = MockUI::new();
        let mut step = Step::new(StepDefinition::new("unpack", "UnpackTarHandler"));
        step.status = Some(StepStatus::Success);
        step.fixed_selected = Some(false);
        show_step(&mut ui, &PreingestTheme::plain(), &step);
        assert!(ui.has_message("[-] unpack"));
        assert!(ui.has_message("✓ Success"));
    }

    #[test]
    fn empty_keys_print_nothing() {
        let mut ui = MockUI::new();
        show_keys(&mut ui, &PreingestTheme::plain(), "Missing:", &BTreeSet::new());
        assert!(ui.messages().is_empty());
    }
}
