use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Report document exactly as the upstream store serializes it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    #[serde(rename = "_id", default, deserialize_with = "deserialize_opaque_id")]
    pub document_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opaque_id")]
    pub id: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub department: Option<String>,
    pub environment: Option<String>,
    pub resolution: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub team: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    pub created_at: Option<RawTimestamp>,
}

/// `createdAt` arrives either as a date string or as epoch milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Accepts RFC 3339, offset-less ISO date-times (read as UTC) and bare dates
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            RawTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Some(dt.with_timezone(&Utc));
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                    return Some(naive.and_utc());
                }
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }
        }
    }
}

/// Ids may be strings (document ids) or plain numbers
fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OpaqueId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<OpaqueId>::deserialize(deserializer)?.map(|id| match id {
            OpaqueId::Text(text) => text,
            OpaqueId::Number(number) => number.to_string(),
        }),
    )
}

/// Incident report held in a snapshot.
///
/// Empty strings from the store are normalized to `None`, so "absent" and
/// "empty" are the same thing for every consumer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub department: Option<String>,
    pub environment: Option<String>,
    pub resolution: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub team: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_name: Option<String>,
    /// Creation time reported by the store, if it was present and readable
    pub created_at: Option<DateTime<Utc>>,
    /// Instant used for every date computation: `created_at`, or the fetch time
    pub date: DateTime<Utc>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl RawReport {
    /// Normalize a stored document; `fetched_at` stands in for a missing or unreadable `createdAt`
    pub fn into_report(self, fetched_at: DateTime<Utc>) -> Report {
        let created_at = self.created_at.as_ref().and_then(|raw| {
            let parsed = raw.parse();
            if parsed.is_none() {
                tracing::warn!(
                    "Unreadable createdAt {:?} on report {:?}, using fetch time",
                    raw,
                    self.document_id.as_ref().or(self.id.as_ref())
                );
            }
            parsed
        });

        Report {
            id: non_empty(self.document_id.or(self.id)),
            status: non_empty(self.status),
            severity: non_empty(self.severity),
            priority: non_empty(self.priority),
            report_type: non_empty(self.report_type),
            department: non_empty(self.department),
            environment: non_empty(self.environment),
            resolution: non_empty(self.resolution),
            assignee: non_empty(self.assignee),
            reporter: non_empty(self.reporter),
            team: non_empty(self.team),
            title: non_empty(self.title),
            description: non_empty(self.description),
            location_name: non_empty(self.location_name),
            created_at,
            date: created_at.unwrap_or(fetched_at),
        }
    }
}

/// Categorical report fields that can be grouped or matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Status,
    Severity,
    Priority,
    Type,
    Department,
    Environment,
    Resolution,
    Assignee,
    Reporter,
    Team,
}

impl Report {
    pub fn field(&self, field: ReportField) -> Option<&str> {
        let value = match field {
            ReportField::Status => &self.status,
            ReportField::Severity => &self.severity,
            ReportField::Priority => &self.priority,
            ReportField::Type => &self.report_type,
            ReportField::Department => &self.department,
            ReportField::Environment => &self.environment,
            ReportField::Resolution => &self.resolution,
            ReportField::Assignee => &self.assignee,
            ReportField::Reporter => &self.reporter,
            ReportField::Team => &self.team,
        };
        value.as_deref()
    }

    /// Report dated `date` with no other fields set
    #[cfg(test)]
    pub fn at(date: DateTime<Utc>) -> Self {
        Report {
            id: None,
            status: None,
            severity: None,
            priority: None,
            report_type: None,
            department: None,
            environment: None,
            resolution: None,
            assignee: None,
            reporter: None,
            team: None,
            title: None,
            description: None,
            location_name: None,
            created_at: Some(date),
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_document_id_and_numeric_id() {
        let raw: RawReport =
            serde_json::from_str(r#"{"_id": "665f1c2e9b1e8a0012345678", "status": "Open"}"#)
                .unwrap();
        let report = raw.into_report(fetched_at());
        assert_eq!(report.id.as_deref(), Some("665f1c2e9b1e8a0012345678"));

        let raw: RawReport = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(raw.into_report(fetched_at()).id.as_deref(), Some("42"));
    }

    #[test]
    fn test_created_at_variants() {
        let raw: RawReport =
            serde_json::from_str(r#"{"createdAt": "2024-06-14T23:59:00.000Z"}"#).unwrap();
        let report = raw.into_report(fetched_at());
        let expected = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 0).unwrap();
        assert_eq!(report.created_at, Some(expected));
        assert_eq!(report.date, expected);

        let raw: RawReport = serde_json::from_str(r#"{"createdAt": 1718409600000}"#).unwrap();
        assert_eq!(
            raw.into_report(fetched_at()).date,
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
        );

        let raw: RawReport = serde_json::from_str(r#"{"createdAt": "2024-06-01"}"#).unwrap();
        assert_eq!(
            raw.into_report(fetched_at()).date,
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_or_unreadable_created_at_falls_back_to_fetch_time() {
        let raw: RawReport = serde_json::from_str(r#"{"title": "Smoke"}"#).unwrap();
        let report = raw.into_report(fetched_at());
        assert_eq!(report.created_at, None);
        assert_eq!(report.date, fetched_at());

        let raw: RawReport = serde_json::from_str(r#"{"createdAt": "yesterday"}"#).unwrap();
        let report = raw.into_report(fetched_at());
        assert_eq!(report.created_at, None);
        assert_eq!(report.date, fetched_at());
    }

    #[test]
    fn test_empty_strings_become_absent() {
        let raw: RawReport = serde_json::from_str(
            r#"{"status": "", "severity": "High", "type": "Fire", "team": null}"#,
        )
        .unwrap();
        let report = raw.into_report(fetched_at());
        assert_eq!(report.field(ReportField::Status), None);
        assert_eq!(report.field(ReportField::Severity), Some("High"));
        assert_eq!(report.field(ReportField::Type), Some("Fire"));
        assert_eq!(report.field(ReportField::Team), None);
    }

    #[test]
    fn test_serializes_with_store_field_names() {
        let mut report = Report::at(fetched_at());
        report.report_type = Some("Fire".to_string());
        report.location_name = Some("Block C".to_string());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "Fire");
        assert_eq!(json["locationName"], "Block C");
        assert!(json.get("createdAt").is_some());
    }
}
