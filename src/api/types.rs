//! Wire types of the pre-ingest API.
//!
//! Field names follow the server's camelCase JSON. Transient fields on
//! [`Collection`] are never read from or written to the wire; they are
//! populated locally by step post-processing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PreingestError, Result};

/// Status of a single action execution as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    Executing,
    Success,
    Error,
    Failed,
}

impl ActionStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::Executing)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionStatus::Executing => "Executing",
            ActionStatus::Success => "Success",
            ActionStatus::Error => "Error",
            ActionStatus::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

/// Status of an item in the server's execution plan.
///
/// `Done` says nothing about success; read that from the matching [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowItemStatus {
    Pending,
    Executing,
    Done,
}

/// Aggregate status of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverallStatus {
    #[default]
    New,
    Running,
    Success,
    Error,
    Failed,
}

/// Counters and timing reported for a completed (or running) action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionSummary {
    pub processed: u64,
    pub accepted: u64,
    pub rejected: u64,
    #[serde(with = "option_timestamp", skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(with = "option_timestamp", skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

/// An append-only record of one execution of a server-side handler.
///
/// The same `name` may appear several times when a step was run more than
/// once; `process_id` is unique per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub action_status: ActionStatus,
    #[serde(with = "timestamp")]
    pub creation: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub result_files: Vec<String>,
    pub process_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ActionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry of an execution plan, both as submitted and as reported back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowItem {
    pub action_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowItemStatus>,
    #[serde(default = "default_true")]
    pub start_on_error: bool,
    #[serde(default = "default_true")]
    pub continue_on_error: bool,
    #[serde(default)]
    pub continue_on_failed: bool,
}

fn default_true() -> bool {
    true
}

/// Request body for scheduling a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub workflow: Vec<WorkflowItem>,
}

impl ExecutionPlan {
    /// Check if the plan has no items.
    pub fn is_empty(&self) -> bool {
        self.workflow.is_empty()
    }
}

/// Checksum algorithms accepted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecksumType {
    MD5,
    SHA1,
    SHA224,
    SHA256,
    SHA384,
    SHA512,
}

impl ChecksumType {
    /// All checksum types, in display order.
    pub const ALL: [ChecksumType; 6] = [
        ChecksumType::MD5,
        ChecksumType::SHA1,
        ChecksumType::SHA224,
        ChecksumType::SHA256,
        ChecksumType::SHA384,
        ChecksumType::SHA512,
    ];

    /// Wire code, like `SHA256`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumType::MD5 => "MD5",
            ChecksumType::SHA1 => "SHA1",
            ChecksumType::SHA224 => "SHA224",
            ChecksumType::SHA256 => "SHA256",
            ChecksumType::SHA384 => "SHA384",
            ChecksumType::SHA512 => "SHA512",
        }
    }

    /// Human readable name, like `SHA-256`.
    pub fn display_name(&self) -> &'static str {
        match self {
            ChecksumType::MD5 => "MD-5",
            ChecksumType::SHA1 => "SHA-1",
            ChecksumType::SHA224 => "SHA-224",
            ChecksumType::SHA256 => "SHA-256",
            ChecksumType::SHA384 => "SHA-384",
            ChecksumType::SHA512 => "SHA-512",
        }
    }
}

impl FromStr for ChecksumType {
    type Err = PreingestError;

    fn from_str(s: &str) -> Result<Self> {
        ChecksumType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PreingestError::ConfigValidationError {
                message: format!("Unknown checksum type '{}'", s),
            })
    }
}

/// Keys of the per-collection configuration map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsKey {
    ChecksumType,
    ChecksumValue,
    Prewash,
    Polish,
    MergeRecordAndFile,
    SchemaToValidate,
    RootNamesExtraXml,
    IgnoreValidation,
}

impl SettingsKey {
    /// All keys, in display order.
    pub const ALL: [SettingsKey; 8] = [
        SettingsKey::ChecksumType,
        SettingsKey::ChecksumValue,
        SettingsKey::Prewash,
        SettingsKey::Polish,
        SettingsKey::MergeRecordAndFile,
        SettingsKey::SchemaToValidate,
        SettingsKey::RootNamesExtraXml,
        SettingsKey::IgnoreValidation,
    ];

    /// The camelCase key as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsKey::ChecksumType => "checksumType",
            SettingsKey::ChecksumValue => "checksumValue",
            SettingsKey::Prewash => "prewash",
            SettingsKey::Polish => "polish",
            SettingsKey::MergeRecordAndFile => "mergeRecordAndFile",
            SettingsKey::SchemaToValidate => "schemaToValidate",
            SettingsKey::RootNamesExtraXml => "rootNamesExtraXml",
            SettingsKey::IgnoreValidation => "ignoreValidation",
        }
    }
}

impl fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsKey {
    type Err = PreingestError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
            PreingestError::ConfigValidationError {
                message: format!("Unknown setting '{}'", s),
            }
        })
    }
}

/// Per-collection configuration, as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_type: Option<ChecksumType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prewash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polish: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_record_and_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_to_validate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_names_extra_xml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_validation: Option<String>,
}

impl Settings {
    /// Get the raw value for a key, if any.
    pub fn get(&self, key: SettingsKey) -> Option<&str> {
        match key {
            SettingsKey::ChecksumType => self.checksum_type.as_ref().map(|t| t.as_str()),
            SettingsKey::ChecksumValue => self.checksum_value.as_deref(),
            SettingsKey::Prewash => self.prewash.as_deref(),
            SettingsKey::Polish => self.polish.as_deref(),
            SettingsKey::MergeRecordAndFile => self.merge_record_and_file.as_deref(),
            SettingsKey::SchemaToValidate => self.schema_to_validate.as_deref(),
            SettingsKey::RootNamesExtraXml => self.root_names_extra_xml.as_deref(),
            SettingsKey::IgnoreValidation => self.ignore_validation.as_deref(),
        }
    }

    /// Whether the key holds a non-empty value.
    pub fn has_value(&self, key: SettingsKey) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Set or clear the value for a key.
    pub fn set(&mut self, key: SettingsKey, value: Option<String>) -> Result<()> {
        match key {
            SettingsKey::ChecksumType => {
                self.checksum_type = value.as_deref().map(str::parse).transpose()?;
            }
            SettingsKey::ChecksumValue => self.checksum_value = value,
            SettingsKey::Prewash => self.prewash = value,
            SettingsKey::Polish => self.polish = value,
            SettingsKey::MergeRecordAndFile => self.merge_record_and_file = value,
            SettingsKey::SchemaToValidate => self.schema_to_validate = value,
            SettingsKey::RootNamesExtraXml => self.root_names_extra_xml = value,
            SettingsKey::IgnoreValidation => self.ignore_validation = value,
        }
        Ok(())
    }
}

/// One unit of archival material with its settings, history and plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// The file name.
    #[serde(default)]
    pub name: String,
    /// Also the folder name on the server's file system.
    pub session_id: String,
    #[serde(default, with = "option_timestamp", skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub overall_status: OverallStatus,
    #[serde(default)]
    pub preingest: Vec<Action>,
    /// The server may send `null`; that is normalized to empty settings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Settings,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scheduled_plan: Vec<WorkflowItem>,

    #[serde(skip)]
    pub calculated_checksum_type: Option<ChecksumType>,
    #[serde(skip)]
    pub calculated_checksum_value: Option<String>,
    #[serde(skip)]
    pub excel_creator_download_url: Option<String>,
    #[serde(skip)]
    pub index_metadata_download_url: Option<String>,
}

/// A partial collection as pushed by a live-update feed.
///
/// Absent fields leave the cached snapshot untouched.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionPatch {
    pub session_id: String,
    pub name: Option<String>,
    pub overall_status: Option<OverallStatus>,
    pub preingest: Option<Vec<Action>>,
    #[serde(deserialize_with = "null_as_empty_settings")]
    pub settings: Option<Settings>,
    pub scheduled_plan: Option<Vec<WorkflowItem>>,
}

impl Collection {
    /// Replace this snapshot with a freshly fetched one, keeping the
    /// transient fields populated locally.
    pub fn refresh_from(&mut self, fresh: Collection) {
        let Collection {
            name,
            session_id,
            creation_time,
            size,
            overall_status,
            preingest,
            settings,
            scheduled_plan,
            ..
        } = fresh;
        self.name = name;
        self.session_id = session_id;
        self.creation_time = creation_time;
        self.size = size;
        self.overall_status = overall_status;
        self.preingest = preingest;
        self.settings = settings;
        self.scheduled_plan = scheduled_plan;
    }

    /// Most recently created action with the given name.
    ///
    /// The server lists actions in creation order, so on equal timestamps
    /// the later entry wins.
    pub fn last_action(&self, name: &str) -> Option<&Action> {
        self.preingest
            .iter()
            .filter(|a| a.name == name)
            .fold(None, |latest: Option<&Action>, a| match latest {
                Some(l) if l.creation > a.creation => Some(l),
                _ => Some(a),
            })
    }

    /// Plan entry for the given action name.
    pub fn scheduled(&self, action_name: &str) -> Option<&WorkflowItem> {
        self.scheduled_plan
            .iter()
            .find(|w| w.action_name == action_name)
    }

    /// Merge a pushed patch into this snapshot, leaving transient fields alone.
    pub fn apply_patch(&mut self, patch: CollectionPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(status) = patch.overall_status {
            self.overall_status = status;
        }
        if let Some(preingest) = patch.preingest {
            self.preingest = preingest;
        }
        if let Some(settings) = patch.settings {
            self.settings = settings;
        }
        if let Some(plan) = patch.scheduled_plan {
            self.scheduled_plan = plan;
        }
    }
}

impl From<Collection> for CollectionPatch {
    fn from(collection: Collection) -> Self {
        Self {
            session_id: collection.session_id,
            name: Some(collection.name),
            overall_status: Some(collection.overall_status),
            preingest: Some(collection.preingest),
            settings: Some(collection.settings),
            scheduled_plan: Some(collection.scheduled_plan),
        }
    }
}

/// Merge a fresh list of collections into an existing list in place.
///
/// Collections no longer reported are dropped, known ones are updated
/// (keeping their transient fields), and new ones are appended.
pub fn merge_collections(existing: &mut Vec<Collection>, updated: Vec<Collection>) {
    existing.retain(|c| updated.iter().any(|u| u.session_id == c.session_id));

    for current in updated {
        match existing
            .iter_mut()
            .find(|c| c.session_id == current.session_id)
        {
            Some(known) => known.apply_patch(current.into()),
            None => existing.push(current),
        }
    }
}

/// Response of trigger-like endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerActionResult {
    pub message: String,
    pub session_id: String,
    pub action_id: String,
}

/// The nested result value of a JSON action result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultValue {
    pub result_value: ActionStatus,
}

/// Detail of a JSON action result file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionResultDetail {
    pub summary: Option<ActionSummary>,
    pub action_result: Option<ResultValue>,
    pub action_data: Vec<String>,
}

/// A fetched result file: JSON for `.json` files, plain text otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Json(ActionResultDetail),
    Text(String),
}

impl ActionResult {
    /// First data entry of a JSON result, like a calculated checksum.
    pub fn first_datum(&self) -> Option<&str> {
        match self {
            ActionResult::Json(detail) => detail.action_data.first().map(String::as_str),
            ActionResult::Text(_) => None,
        }
    }
}

/// A file listed by `output/stylesheets` or `output/schemas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerFile {
    pub filename: String,
    #[serde(default)]
    pub name: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_settings<'de, D>(deserializer: D) -> std::result::Result<Option<Settings>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::<Settings>::deserialize(deserializer)?.unwrap_or_default()))
}

/// Parse a server timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }
}

mod option_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Unparseable values are dropped rather than failing the whole snapshot.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION_JSON: &str = r#"{
        "name": "archive.tar.gz",
        "sessionId": "b56f1128",
        "creationTime": "2021-01-17T19:20:00+00:00",
        "size": 1024,
        "overallStatus": "Running",
        "preingest": [{
            "actionStatus": "Success",
            "creation": "2021-01-17T19:26:59.4226082+00:00",
            "name": "ContainerChecksumHandler",
            "processId": "e7920e0b",
            "resultFiles": ["ContainerChecksumHandler.json"],
            "summary": {
                "processed": 1, "accepted": 1, "rejected": 0,
                "start": "2021-01-17T19:26:59.5031101+00:00",
                "end": "2021-01-17T19:26:59.9968424+00:00"
            }
        }],
        "settings": null,
        "scheduledPlan": [{"actionName": "UnpackTarHandler", "status": "Pending",
            "continueOnError": true, "continueOnFailed": false}]
    }"#;

    #[test]
    fn collection_parses_server_json() {
        let collection: Collection = serde_json::from_str(COLLECTION_JSON).unwrap();
        assert_eq!(collection.session_id, "b56f1128");
        assert_eq!(collection.overall_status, OverallStatus::Running);
        assert_eq!(collection.preingest.len(), 1);
        let summary = collection.preingest[0].summary.as_ref().unwrap();
        assert!(summary.start.is_some());
        assert_eq!(
            collection.scheduled_plan[0].status,
            Some(WorkflowItemStatus::Pending)
        );
        assert!(collection.scheduled_plan[0].start_on_error);
    }

    #[test]
    fn null_settings_become_empty() {
        let collection: Collection = serde_json::from_str(COLLECTION_JSON).unwrap();
        assert_eq!(collection.settings, Settings::default());
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let dt = parse_timestamp("2020-12-28T18:09:05.00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2020-12-28T18:09:05+00:00");
    }

    #[test]
    fn settings_get_and_set_by_key() {
        let mut settings = Settings::default();
        settings
            .set(SettingsKey::ChecksumType, Some("sha256".into()))
            .unwrap();
        settings
            .set(SettingsKey::ChecksumValue, Some("abc".into()))
            .unwrap();
        assert_eq!(settings.get(SettingsKey::ChecksumType), Some("SHA256"));
        assert!(settings.has_value(SettingsKey::ChecksumValue));
        assert!(!settings.has_value(SettingsKey::Prewash));
    }

    #[test]
    fn empty_setting_has_no_value() {
        let settings = Settings {
            prewash: Some(String::new()),
            ..Default::default()
        };
        assert!(!settings.has_value(SettingsKey::Prewash));
    }

    #[test]
    fn unknown_checksum_type_is_rejected() {
        let mut settings = Settings::default();
        assert!(settings
            .set(SettingsKey::ChecksumType, Some("CRC32".into()))
            .is_err());
    }

    #[test]
    fn settings_key_parses_camel_case() {
        let key: SettingsKey = "schemaToValidate".parse().unwrap();
        assert_eq!(key, SettingsKey::SchemaToValidate);
        assert!("nope".parse::<SettingsKey>().is_err());
    }

    #[test]
    fn settings_serialize_camel_case_without_empty_keys() {
        let settings = Settings {
            checksum_type: Some(ChecksumType::MD5),
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(json, r#"{"checksumType":"MD5"}"#);
    }

    #[test]
    fn patch_leaves_absent_fields_alone() {
        let mut collection: Collection = serde_json::from_str(COLLECTION_JSON).unwrap();
        collection.calculated_checksum_value = Some("kept".into());
        let patch: CollectionPatch =
            serde_json::from_str(r#"{"sessionId": "b56f1128", "overallStatus": "Success"}"#)
                .unwrap();
        collection.apply_patch(patch);
        assert_eq!(collection.overall_status, OverallStatus::Success);
        assert_eq!(collection.preingest.len(), 1);
        assert_eq!(collection.calculated_checksum_value.as_deref(), Some("kept"));
    }

    fn action(name: &str, pid: &str, creation: &str) -> Action {
        Action {
            action_status: ActionStatus::Success,
            creation: parse_timestamp(creation).unwrap(),
            name: name.to_string(),
            result_files: vec![],
            process_id: pid.to_string(),
            summary: None,
            description: None,
        }
    }

    #[test]
    fn last_action_takes_latest_creation() {
        let collection = Collection {
            preingest: vec![
                action("UnpackTarHandler", "new", "2021-01-02T00:00:00Z"),
                action("UnpackTarHandler", "old", "2021-01-01T00:00:00Z"),
                action("OtherHandler", "other", "2021-01-03T00:00:00Z"),
            ],
            ..Default::default()
        };
        assert_eq!(
            collection.last_action("UnpackTarHandler").unwrap().process_id,
            "new"
        );
        assert!(collection.last_action("Missing").is_none());
    }

    #[test]
    fn last_action_prefers_later_entry_on_tie() {
        let collection = Collection {
            preingest: vec![
                action("UnpackTarHandler", "first", "2021-01-01T00:00:00Z"),
                action("UnpackTarHandler", "second", "2021-01-01T00:00:00Z"),
            ],
            ..Default::default()
        };
        assert_eq!(
            collection.last_action("UnpackTarHandler").unwrap().process_id,
            "second"
        );
    }

    #[test]
    fn refresh_keeps_transient_fields() {
        let mut collection: Collection = serde_json::from_str(COLLECTION_JSON).unwrap();
        collection.calculated_checksum_value = Some("abc".into());
        let fresh = Collection {
            session_id: "b56f1128".into(),
            overall_status: OverallStatus::Success,
            ..Default::default()
        };
        collection.refresh_from(fresh);
        assert_eq!(collection.overall_status, OverallStatus::Success);
        assert!(collection.preingest.is_empty());
        assert_eq!(collection.calculated_checksum_value.as_deref(), Some("abc"));
    }

    #[test]
    fn merge_collections_drops_updates_and_appends() {
        let mk = |id: &str, status: OverallStatus| Collection {
            session_id: id.to_string(),
            overall_status: status,
            ..Default::default()
        };
        let mut existing = vec![mk("a", OverallStatus::New), mk("b", OverallStatus::New)];
        existing[1].excel_creator_download_url = Some("url".into());

        merge_collections(
            &mut existing,
            vec![mk("b", OverallStatus::Running), mk("c", OverallStatus::New)],
        );

        let ids: Vec<_> = existing.iter().map(|c| c.session_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(existing[0].overall_status, OverallStatus::Running);
        assert_eq!(existing[0].excel_creator_download_url.as_deref(), Some("url"));
    }

    #[test]
    fn plan_item_omits_absent_status() {
        let item = WorkflowItem {
            action_name: "UnpackTarHandler".into(),
            status: None,
            start_on_error: true,
            continue_on_error: true,
            continue_on_failed: false,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("status"));
        assert!(json.contains(r#""actionName":"UnpackTarHandler""#));
    }
}
