//! Row types and text encodings shared by the entitlement adapters.

use chrono::{DateTime, Utc};

use crate::domain::entitlement::{EntitlementRecord, EntitlementState};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct EntitlementRow {
    pub user_id: String,
    pub state: String,
    pub provider_customer_id: Option<String>,
    pub pro_since: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EntitlementRow> for EntitlementRecord {
    type Error = DomainError;

    fn try_from(row: EntitlementRow) -> Result<Self, Self::Error> {
        Ok(EntitlementRecord {
            user_id: parse_user_id(&row.user_id)?,
            state: parse_state(&row.state)?,
            provider_customer_id: row.provider_customer_id,
            pro_since: row.pro_since.map(Timestamp::from_datetime),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_user_id(s: &str) -> Result<UserId, DomainError> {
    UserId::new(s).map_err(corrupt)
}

fn parse_state(s: &str) -> Result<EntitlementState, DomainError> {
    s.parse().map_err(corrupt)
}

fn corrupt(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Corrupt row: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entitlement_row(state: &str) -> EntitlementRow {
        EntitlementRow {
            user_id: "user-1".to_string(),
            state: state.to_string(),
            provider_customer_id: Some("cus_1".to_string()),
            pro_since: Some(Utc::now()),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn entitlement_row_converts() {
        let record = EntitlementRecord::try_from(entitlement_row("pro")).unwrap();
        assert_eq!(record.state, EntitlementState::Pro);
        assert_eq!(record.provider_customer_id.as_deref(), Some("cus_1"));
    }

    #[test]
    fn unknown_state_is_database_error() {
        let err = EntitlementRecord::try_from(entitlement_row("gold")).unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
