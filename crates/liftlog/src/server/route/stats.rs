//! Training volume and personal records for the caller.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;

use crate::model::{DailyVolume, PersonalRecord};
use crate::server::{ApiError, AppState, CurrentUser, QueryParams};

const DEFAULT_DAYS: i64 = 7;
const MAX_DAYS: i64 = 3650;

#[derive(Debug, Deserialize)]
pub struct VolumeQuery {
    days: Option<String>,
}

/// Window length in days; anything unparsable or outside `1..=3650` is 7.
fn window_days(raw: Option<&str>) -> i64 {
    raw.and_then(|d| d.trim().parse::<i64>().ok())
        .filter(|d| (1..=MAX_DAYS).contains(d))
        .unwrap_or(DEFAULT_DAYS)
}

pub async fn volume(
    State(state): State<AppState>,
    current: CurrentUser,
    QueryParams(query): QueryParams<VolumeQuery>,
) -> Result<Json<Vec<DailyVolume>>, ApiError> {
    let days = window_days(query.days.as_deref());
    let since = Utc::now() - Duration::days(days);
    let volume = state.with_storage(|storage| storage.volume_by_day(current.user.id, since))?;
    Ok(Json(volume))
}

pub async fn prs(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<PersonalRecord>>, ApiError> {
    let records = state.with_storage(|storage| storage.personal_records(current.user.id))?;
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_days() {
        assert_eq!(window_days(None), 7);
        assert_eq!(window_days(Some("30")), 30);
        assert_eq!(window_days(Some("3650")), 3650);
        assert_eq!(window_days(Some("0")), 7);
        assert_eq!(window_days(Some("3651")), 7);
        assert_eq!(window_days(Some("-5")), 7);
        assert_eq!(window_days(Some("week")), 7);
        assert_eq!(window_days(Some("30abc")), 7);
    }
}
