//! SurrealDB implementation of [`AvailabilityRepository`].

use chrono::{DateTime, Duration, NaiveTime, Utc};
use mentora_core::calendar::DayOfWeek;
use mentora_core::error::{MentoraError, MentoraResult};
use mentora_core::models::availability::{
    AvailabilityWindow, CreateAvailabilityWindow, UpdateAvailabilityWindow,
};
use mentora_core::repository::AvailabilityRepository;
use mentora_core::slot::{SlotLabel, default_slot_width, format_time_of_day, generate_slots};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::{parse_slot, parse_time, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct WindowRow {
    mentor_id: String,
    day_of_week: u32,
    start_time: String,
    end_time: String,
    slots: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct WindowRowWithId {
    record_id: String,
    mentor_id: String,
    day_of_week: u32,
    start_time: String,
    end_time: String,
    slots: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_day(value: u32) -> Result<DayOfWeek, DbError> {
    u8::try_from(value)
        .ok()
        .and_then(|v| DayOfWeek::new(v).ok())
        .ok_or_else(|| DbError::InvalidRow(format!("invalid day of week: {value}")))
}

fn slots_to_strings(slots: &[SlotLabel]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

impl WindowRow {
    fn into_window(self, id: Uuid) -> Result<AvailabilityWindow, DbError> {
        Ok(AvailabilityWindow {
            id,
            mentor_id: parse_uuid(&self.mentor_id, "mentor")?,
            day_of_week: parse_day(self.day_of_week)?,
            start_time: parse_time(&self.start_time)?,
            end_time: parse_time(&self.end_time)?,
            slots: self
                .slots
                .iter()
                .map(|s| parse_slot(s))
                .collect::<Result<_, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl WindowRowWithId {
    fn try_into_window(self) -> Result<AvailabilityWindow, DbError> {
        let id = parse_uuid(&self.record_id, "window")?;
        WindowRow {
            mentor_id: self.mentor_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            slots: self.slots,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_window(id)
    }
}

/// SurrealDB implementation of the availability store.
///
/// Every write recomputes the cached `slots` from the window bounds at
/// the repository's slot width.
#[derive(Clone)]
pub struct SurrealAvailabilityRepository<C: Connection> {
    db: Surreal<C>,
    slot_width: Duration,
}

impl<C: Connection> SurrealAvailabilityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            slot_width: default_slot_width(),
        }
    }

    pub fn with_slot_width(db: Surreal<C>, slot_width: Duration) -> Self {
        Self { db, slot_width }
    }

    pub fn slot_width(&self) -> Duration {
        self.slot_width
    }

    /// A window must hold at least one whole slot.
    fn slots_for(&self, start: NaiveTime, end: NaiveTime) -> MentoraResult<Vec<String>> {
        let slots = generate_slots(start, end, self.slot_width)?;
        if slots.is_empty() {
            return Err(MentoraError::InvalidRange {
                start: format_time_of_day(start),
                end: format_time_of_day(end),
            });
        }
        Ok(slots_to_strings(&slots))
    }

    async fn select_many(
        &self,
        query: &'static str,
        mentor_id: Uuid,
        day_of_week: Option<DayOfWeek>,
    ) -> MentoraResult<Vec<AvailabilityWindow>> {
        let mut builder = self
            .db
            .query(query)
            .bind(("mentor_id", mentor_id.to_string()));
        if let Some(day) = day_of_week {
            builder = builder.bind(("day_of_week", u32::from(day.value())));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<WindowRowWithId> = result.take(0).map_err(DbError::from)?;

        let windows = rows
            .into_iter()
            .map(WindowRowWithId::try_into_window)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(windows)
    }
}

impl<C: Connection> AvailabilityRepository for SurrealAvailabilityRepository<C> {
    async fn create(&self, input: CreateAvailabilityWindow) -> MentoraResult<AvailabilityWindow> {
        let slots = self.slots_for(input.start_time, input.end_time)?;
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('availability_window', $id) SET \
                 mentor_id = $mentor_id, \
                 day_of_week = $day_of_week, \
                 start_time = $start_time, \
                 end_time = $end_time, \
                 slots = $slots",
            )
            .bind(("id", id_str.clone()))
            .bind(("mentor_id", input.mentor_id.to_string()))
            .bind(("day_of_week", u32::from(input.day_of_week.value())))
            .bind(("start_time", format_time_of_day(input.start_time)))
            .bind(("end_time", format_time_of_day(input.end_time)))
            .bind(("slots", slots))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WindowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "availability_window".into(),
            id: id_str,
        })?;

        let window = row.into_window(id)?;
        info!(
            window_id = %window.id,
            mentor_id = %window.mentor_id,
            day_of_week = %window.day_of_week,
            slots = window.slots.len(),
            "Availability window created"
        );
        Ok(window)
    }

    async fn get_by_id(&self, id: Uuid) -> MentoraResult<AvailabilityWindow> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('availability_window', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WindowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "availability_window".into(),
            id: id_str,
        })?;

        Ok(row.into_window(id)?)
    }

    async fn find_windows(
        &self,
        mentor_id: Uuid,
        day_of_week: DayOfWeek,
    ) -> MentoraResult<Vec<AvailabilityWindow>> {
        self.select_many(
            "SELECT meta::id(id) AS record_id, * FROM availability_window \
             WHERE mentor_id = $mentor_id AND day_of_week = $day_of_week \
             ORDER BY created_at ASC",
            mentor_id,
            Some(day_of_week),
        )
        .await
    }

    async fn list_by_mentor(&self, mentor_id: Uuid) -> MentoraResult<Vec<AvailabilityWindow>> {
        self.select_many(
            "SELECT meta::id(id) AS record_id, * FROM availability_window \
             WHERE mentor_id = $mentor_id \
             ORDER BY day_of_week ASC, start_time ASC",
            mentor_id,
            None,
        )
        .await
    }

    async fn update_window(
        &self,
        id: Uuid,
        input: UpdateAvailabilityWindow,
    ) -> MentoraResult<AvailabilityWindow> {
        let slots = self.slots_for(input.start_time, input.end_time)?;
        let id_str = id.to_string();

        // Bounds and slots go out in one statement so readers never see
        // a half-updated window.
        let result = self
            .db
            .query(
                "UPDATE type::record('availability_window', $id) SET \
                 start_time = $start_time, \
                 end_time = $end_time, \
                 slots = $slots, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("start_time", format_time_of_day(input.start_time)))
            .bind(("end_time", format_time_of_day(input.end_time)))
            .bind(("slots", slots))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WindowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "availability_window".into(),
            id: id_str,
        })?;

        let window = row.into_window(id)?;
        info!(
            window_id = %window.id,
            slots = window.slots.len(),
            "Availability window updated"
        );
        Ok(window)
    }
}
