//! Mapping between persisted rows and typed records.
//!
//! A row is a JSON object keyed by column name, which is what both the
//! SQLite and PostgreSQL drivers hand back once decoded. Enum columns are
//! stored as their `as_str()` value and parsed here, at the storage edge.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::contribution::{ContributionCategory, ContributionEvent};
use crate::error::MappingError;
use crate::ids::{ContributionId, MemberId};
use crate::member::{CooperativeRole, Member};

type Row = Map<String, Value>;

fn as_object(row: &Value) -> Result<&Row, MappingError> {
    row.as_object().ok_or(MappingError::NotAnObject)
}

fn required<'a>(row: &'a Row, column: &'static str) -> Result<&'a Value, MappingError> {
    match row.get(column) {
        None | Some(Value::Null) => Err(MappingError::MissingField(column)),
        Some(value) => Ok(value),
    }
}

fn string(row: &Row, column: &'static str) -> Result<String, MappingError> {
    required(row, column)?
        .as_str()
        .map(str::to_string)
        .ok_or(MappingError::WrongType {
            column,
            expected: "string",
        })
}

fn amount(row: &Row, column: &'static str) -> Result<f64, MappingError> {
    let value = required(row, column)?
        .as_f64()
        .ok_or(MappingError::WrongType {
            column,
            expected: "number",
        })?;
    if !value.is_finite() || value < 0.0 {
        return Err(MappingError::InvalidNumber { column, value });
    }
    Ok(value)
}

fn boolean(row: &Row, column: &'static str) -> Result<bool, MappingError> {
    // SQLite has no boolean type and returns 0/1.
    match required(row, column)? {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        _ => Err(MappingError::WrongType {
            column,
            expected: "boolean",
        }),
    }
}

fn timestamp_value(column: &'static str, raw: &str) -> Result<DateTime<Utc>, MappingError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MappingError::InvalidTimestamp {
            column,
            value: raw.to_string(),
        })
}

fn timestamp(row: &Row, column: &'static str) -> Result<DateTime<Utc>, MappingError> {
    let raw = string(row, column)?;
    timestamp_value(column, &raw)
}

fn optional_timestamp(
    row: &Row,
    column: &'static str,
) -> Result<Option<DateTime<Utc>>, MappingError> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => timestamp_value(column, raw).map(Some),
        Some(_) => Err(MappingError::WrongType {
            column,
            expected: "string",
        }),
    }
}

impl Member {
    /// Build a member from a `cooperative_members` row.
    pub fn from_row(row: &Value) -> Result<Self, MappingError> {
        let row = as_object(row)?;
        let role: CooperativeRole = string(row, "role")?.parse()?;
        Ok(Self {
            id: MemberId(string(row, "member_id")?),
            agent_name: string(row, "agent_name")?,
            role,
            marketing_score: amount(row, "marketing_score")?,
            work_hours: amount(row, "work_hours")?,
            revenue_generated: amount(row, "revenue_generated")?,
            total_dividends_received: amount(row, "total_dividends_received")?,
            last_dividend_at: optional_timestamp(row, "last_dividend_date")?,
            active: boolean(row, "is_active")?,
            joined_at: timestamp(row, "joined_at")?,
        })
    }

    pub fn to_row(&self) -> Value {
        json!({
            "member_id": self.id.as_str(),
            "agent_name": self.agent_name,
            "role": self.role.as_str(),
            "marketing_score": self.marketing_score,
            "work_hours": self.work_hours,
            "revenue_generated": self.revenue_generated,
            "total_dividends_received": self.total_dividends_received,
            "last_dividend_date": self.last_dividend_at.map(|dt| dt.to_rfc3339()),
            "is_active": self.active,
            "joined_at": self.joined_at.to_rfc3339(),
        })
    }
}

impl ContributionEvent {
    /// Build an event from a `contribution_records` row.
    pub fn from_row(row: &Value) -> Result<Self, MappingError> {
        let row = as_object(row)?;
        let category: ContributionCategory = string(row, "contribution_type")?.parse()?;
        Ok(Self {
            id: ContributionId(string(row, "record_id")?),
            member_id: MemberId(string(row, "member_id")?),
            category,
            amount: amount(row, "value")?,
            description: string(row, "description")?,
            timestamp: timestamp(row, "timestamp")?,
        })
    }

    pub fn to_row(&self) -> Value {
        json!({
            "record_id": self.id.as_str(),
            "member_id": self.member_id.as_str(),
            "contribution_type": self.category.as_str(),
            "value": self.amount,
            "description": self.description,
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }
}
