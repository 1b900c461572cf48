use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A user together with their subscription, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSubscription {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub beag_client_id: Option<i64>,
    #[serde(default, deserialize_with = "non_empty_status")]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub plan_id: PlanId,
    #[serde(default, with = "timestamp::option")]
    pub start_date: Option<Timestamp>,
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<Timestamp>,
    #[serde(default)]
    pub my_saas_app_id: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub last_synced: Option<Timestamp>,
    #[serde(with = "timestamp")]
    pub created_at: Timestamp,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<Timestamp>,
}

impl UserSubscription {
    /// Whether this user counts towards the active subscription total.
    pub fn is_active(&self) -> bool {
        self.subscription_status
            .as_ref()
            .is_some_and(SubscriptionStatus::is_active)
    }

    pub fn status_label(&self) -> &str {
        self.subscription_status
            .as_ref()
            .map_or("Free", SubscriptionStatus::as_str)
    }

    pub fn status_tone(&self) -> StatusTone {
        self.subscription_status
            .as_ref()
            .map_or(StatusTone::Neutral, SubscriptionStatus::tone)
    }

    pub fn created_label(&self) -> String {
        self.created_at.strftime("%b %-d, %Y").to_string()
    }

    pub fn valid_until_label(&self) -> String {
        short_date(self.end_date).unwrap_or_else(|| "-".to_string())
    }

    pub fn last_synced_label(&self) -> String {
        short_date(self.last_synced).unwrap_or_else(|| "Never".to_string())
    }
}

fn short_date(ts: Option<Timestamp>) -> Option<String> {
    ts.map(|ts| ts.strftime("%-m/%-d/%Y").to_string())
}

/// Billing state of a subscription. Parsed case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Paid,
    Resumed,
    Active,
    Trial,
    Cancelled,
    Paused,
    Unknown(String),
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Paid
                | SubscriptionStatus::Resumed
                | SubscriptionStatus::Active
                | SubscriptionStatus::Trial
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Paid => "PAID",
            SubscriptionStatus::Resumed => "RESUMED",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Trial => "TRIAL",
            SubscriptionStatus::Cancelled => "CANCELLED",
            SubscriptionStatus::Paused => "PAUSED",
            SubscriptionStatus::Unknown(raw) => raw,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            s if s.is_active() => StatusTone::Success,
            SubscriptionStatus::Cancelled => StatusTone::Danger,
            SubscriptionStatus::Paused => StatusTone::Warning,
            _ => StatusTone::Neutral,
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(raw: String) -> Self {
        match raw.to_uppercase().as_str() {
            "PAID" => SubscriptionStatus::Paid,
            "RESUMED" => SubscriptionStatus::Resumed,
            "ACTIVE" => SubscriptionStatus::Active,
            "TRIAL" => SubscriptionStatus::Trial,
            "CANCELLED" => SubscriptionStatus::Cancelled,
            "PAUSED" => SubscriptionStatus::Paused,
            _ => SubscriptionStatus::Unknown(raw),
        }
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_empty_status<'de, D>(deserializer: D) -> Result<Option<SubscriptionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SubscriptionStatus::from))
}

/// How a status badge should be colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Danger,
    Warning,
    Neutral,
}

impl StatusTone {
    pub fn css_class(self) -> &'static str {
        match self {
            StatusTone::Success => "badge badge-success",
            StatusTone::Danger => "badge badge-danger",
            StatusTone::Warning => "badge badge-warning",
            StatusTone::Neutral => "badge badge-neutral",
        }
    }
}

/// The plan a user is on. The backend uses numeric ids for some plans and
/// names for others; zero, empty and missing all mean the free tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum PlanId {
    #[default]
    None,
    Numeric(i64),
    Named(String),
}

impl PlanId {
    pub fn label(&self) -> String {
        match self {
            PlanId::None => "Free".to_string(),
            PlanId::Numeric(id) => id.to_string(),
            PlanId::Named(name) => name.clone(),
        }
    }
}

impl Serialize for PlanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PlanId::None => serializer.serialize_none(),
            PlanId::Numeric(id) => serializer.serialize_i64(*id),
            PlanId::Named(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for PlanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPlan {
            Numeric(i64),
            Named(String),
        }

        Ok(match Option::<RawPlan>::deserialize(deserializer)? {
            None | Some(RawPlan::Numeric(0)) => PlanId::None,
            Some(RawPlan::Named(name)) if name.is_empty() => PlanId::None,
            Some(RawPlan::Numeric(id)) => PlanId::Numeric(id),
            Some(RawPlan::Named(name)) => PlanId::Named(name),
        })
    }
}

/// Timestamps from the backend may or may not carry an offset. Naive values
/// are taken to be UTC.
pub(crate) mod timestamp {
    use jiff::{Timestamp, civil, tz::TimeZone};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub fn parse(raw: &str) -> Result<Timestamp, jiff::Error> {
        if let Ok(ts) = raw.parse::<Timestamp>() {
            return Ok(ts);
        }
        if let Ok(dt) = raw.parse::<civil::DateTime>() {
            return Ok(dt.to_zoned(TimeZone::UTC)?.timestamp());
        }
        let date: civil::Date = raw.parse()?;
        Ok(date.to_zoned(TimeZone::UTC)?.timestamp())
    }

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        ts.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            ts: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            ts.serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .filter(|raw| !raw.is_empty())
                .map(|raw| parse(&raw).map_err(D::Error::custom))
                .transpose()
        }
    }
}
