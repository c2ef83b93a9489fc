use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message row as returned by the row store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(deserialize_with = "lenient::string_or_number")]
    pub id: String,
    pub content: String,
    pub sender_id: String,
    /// Display name of the sender at the time of writing.
    #[serde(default, deserialize_with = "lenient::nullable_string")]
    pub sender: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// The record submitted on append. The store assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub content: String,
    pub sender_id: String,
    pub sender: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    /// Name stamped on outgoing messages; falls back to the email.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn success(body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success".to_string(),
            body: body.into(),
        }
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".to_string(),
            body: body.into(),
        }
    }
}

/// Hosted tables use bigint ids and nullable text columns.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    pub fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Id::deserialize(deserializer)? {
            Id::Text(text) => text,
            Id::Number(number) => number.to_string(),
        })
    }

    pub fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// RFC 3339 with fixed microsecond precision, so stored strings sort in time order.
/// Zone-less values (a `timestamp` column rather than `timestamptz`) are read as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(value) => Ok(value.with_timezone(&Utc)),
            Err(err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|naive| naive.and_utc())
                .map_err(|_| err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = User {
            id: "u1".to_string(),
            email: "a@x.com".to_string(),
            display_name: None,
        };
        assert_eq!(user.display_name(), "a@x.com");

        user.display_name = Some("Alice".to_string());
        assert_eq!(user.display_name(), "Alice");
    }

    #[test]
    fn timestamps_sort_lexicographically() {
        let whole = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let later = whole + chrono::Duration::milliseconds(500);
        assert!(timestamp::format(&whole) < timestamp::format(&later));
        assert_eq!(timestamp::format(&whole), "2024-05-01T10:00:00.000000Z");
    }

    #[test]
    fn message_tolerates_numeric_ids_and_null_senders() {
        let row = serde_json::json!({
            "id": 42,
            "content": "hi",
            "sender_id": "u1",
            "sender": null,
            "created_at": "2024-05-01T10:00:00Z"
        });
        let message: Message = serde_json::from_value(row).unwrap();
        assert_eq!(message.id, "42");
        assert_eq!(message.sender, "");
    }

    #[test]
    fn message_accepts_postgres_offsets() {
        let row = serde_json::json!({
            "id": "7",
            "content": "hello",
            "sender_id": "u1",
            "sender": "a@x.com",
            "created_at": "2024-05-01T12:00:00.123+02:00"
        });
        let message: Message = serde_json::from_value(row).unwrap();
        assert_eq!(message.id, "7");
        assert_eq!(
            message.created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn zone_less_timestamps_are_utc() {
        let row = serde_json::json!({
            "id": 1,
            "content": "hello",
            "sender_id": "u1",
            "created_at": "2024-05-01T10:00:00.123456"
        });
        let message: Message = serde_json::from_value(row).unwrap();
        assert_eq!(
            message.created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + chrono::Duration::microseconds(123_456)
        );

        assert_eq!(
            timestamp::parse("2024-05-01 10:00:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
        assert!(timestamp::parse("yesterday").is_err());
    }
}
