//! Shift board: status tabs, the create/edit forms and the load order of the
//! shifts screen.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::BTreeSet;
use tracing::{info, instrument};

use crate::api::{FacilityService, ShiftService};
use crate::error::{ActionError, ApiError, ValidationError};
use crate::model::{
    CreateShiftRequest, Facility, FacilityRef, NursePayRate, NurseType, Shift, ShiftPatch,
    ShiftStatus,
};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftTab {
    Open,
    Active,
    Canceled,
    All,
}

impl ShiftTab {
    pub fn from_id(id: &str) -> Self {
        match id {
            "open-shifts" => ShiftTab::Open,
            "active-shifts" => ShiftTab::Active,
            "canceled-shifts" => ShiftTab::Canceled,
            _ => ShiftTab::All,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ShiftTab::Open => "open-shifts",
            ShiftTab::Active => "active-shifts",
            ShiftTab::Canceled => "canceled-shifts",
            ShiftTab::All => "all-shifts",
        }
    }

    pub fn status(&self) -> Option<ShiftStatus> {
        match self {
            ShiftTab::Open => Some(ShiftStatus::Open),
            ShiftTab::Active => Some(ShiftStatus::Active),
            ShiftTab::Canceled => Some(ShiftStatus::Canceled),
            ShiftTab::All => None,
        }
    }
}

/// Pure, order-preserving filter. No network.
pub fn filter_by_status(shifts: &[Shift], tab: ShiftTab) -> Vec<&Shift> {
    match tab.status() {
        Some(status) => shifts.iter().filter(|s| s.status == status).collect(),
        None => shifts.iter().collect(),
    }
}

/// Join a calendar date and a wall-clock time in `tz`. Ambiguous times take
/// the earlier instant; times skipped by a DST jump are rejected.
pub fn combine_in<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<DateTime<Utc>, ValidationError> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::NonexistentLocalTime {
            value: naive.format("%Y-%m-%d %H:%M").to_string(),
        })
}

pub fn combine_local(date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, ValidationError> {
    combine_in(&Local, date, time)
}

/// The `date` field travels as UTC midnight of the picked day.
fn date_field(date: NaiveDate) -> Result<DateTime<Utc>, ValidationError> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ValidationError::Invalid {
            field: "date",
            value: date.to_string(),
        })
}

/// Only positive, finite rates reach the backend.
pub fn positive_rates(rates: &[NursePayRate]) -> Vec<NursePayRate> {
    rates
        .iter()
        .filter(|r| r.pay_rate.is_finite() && r.pay_rate > 0.0)
        .copied()
        .collect()
}

fn distinct_types(types: &[NurseType]) -> Result<Vec<NurseType>, ValidationError> {
    let set: BTreeSet<NurseType> = types.iter().copied().collect();
    if set.is_empty() {
        return Err(ValidationError::NoNurseType);
    }
    Ok(set.into_iter().collect())
}

fn timestamps_in<Tz: TimeZone>(
    tz: &Tz,
    date: Option<NaiveDate>,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    ends_next_day: bool,
) -> Result<(DateTime<Utc>, DateTime<Utc>, DateTime<Utc>), ValidationError> {
    let date = date.ok_or(ValidationError::Required("date"))?;
    let start = start.ok_or(ValidationError::Required("startTime"))?;
    let end = end.ok_or(ValidationError::Required("endTime"))?;
    let end_date = if ends_next_day {
        date.succ_opt().ok_or(ValidationError::Invalid {
            field: "date",
            value: date.to_string(),
        })?
    } else {
        date
    };
    let start = combine_in(tz, date, start)?;
    let end = combine_in(tz, end_date, end)?;
    if end <= start {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok((date_field(date)?, start, end))
}

/// State of the "create shift" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftDraft {
    pub title: String,
    pub facility_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub base_price: f64,
    pub caregivers_needed: u32,
    pub nurse_types: Vec<NurseType>,
    pub pay_rates: Vec<NursePayRate>,
    pub status: Option<ShiftStatus>,
}

impl ShiftDraft {
    pub fn into_request(&self) -> Result<CreateShiftRequest, ValidationError> {
        self.into_request_in(&Local)
    }

    pub fn into_request_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
    ) -> Result<CreateShiftRequest, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("title"));
        }
        let facility_id = self
            .facility_id
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or(ValidationError::NoFacility)?;
        let nurse_type = distinct_types(&self.nurse_types)?;
        let (date, start_time, end_time) =
            timestamps_in(tz, self.date, self.start_time, self.end_time, false)?;

        Ok(CreateShiftRequest {
            title: title.to_string(),
            facility_id: facility_id.to_string(),
            date,
            start_time,
            end_time,
            base_price: self.base_price,
            status: self.status.unwrap_or(ShiftStatus::Open),
            caregivers_needed: self.caregivers_needed,
            nurse_type,
            base_price_by_nurse_type: positive_rates(&self.pay_rates),
        })
    }
}

/// State of the "edit shift" form, prefilled from the stored shift.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftEditForm {
    pub title: String,
    pub facility_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// The stored shift runs past midnight, so `end_time` is on the day
    /// after `date`.
    pub ends_next_day: bool,
    pub status: ShiftStatus,
    pub base_price: f64,
    pub caregivers_needed: u32,
    pub nurse_types: Vec<NurseType>,
    pub pay_rates: Vec<NursePayRate>,
}

impl ShiftEditForm {
    pub fn from_shift(shift: &Shift) -> Self {
        Self::from_shift_in(&Local, shift)
    }

    /// The date comes from the stored UTC date; times of day are shown in `tz`.
    pub fn from_shift_in<Tz: TimeZone>(tz: &Tz, shift: &Shift) -> Self {
        let start = shift.start_time.with_timezone(tz).naive_local();
        let end = shift.end_time.with_timezone(tz).naive_local();
        Self {
            title: shift.title.clone(),
            facility_id: shift
                .facility
                .as_ref()
                .and_then(FacilityRef::id)
                .map(str::to_string),
            date: Some(shift.date.date_naive()),
            start_time: Some(start.time()),
            end_time: Some(end.time()),
            ends_next_day: end.date() > start.date(),
            status: shift.status,
            base_price: shift.base_price,
            caregivers_needed: shift.caregivers_needed,
            nurse_types: shift.nurse_type.clone(),
            pay_rates: shift.base_price_by_nurse_type.clone(),
        }
    }

    pub fn to_patch(&self, original: &Shift) -> Result<ShiftPatch, ValidationError> {
        self.to_patch_in(&Local, original)
    }

    /// Changed fields only, except the timestamps, which are always
    /// recomputed from date + time of day. Status is sent only when it moved,
    /// and only along a lifecycle edge.
    pub fn to_patch_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
        original: &Shift,
    ) -> Result<ShiftPatch, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("title"));
        }
        let nurse_type = distinct_types(&self.nurse_types)?;
        let (date, start_time, end_time) =
            timestamps_in(
            tz,
            self.date,
            self.start_time,
            self.end_time,
            self.ends_next_day,
        )?;

        let status = if self.status == original.status {
            None
        } else if original.status.can_transition_to(self.status) {
            Some(self.status)
        } else {
            return Err(ValidationError::IllegalTransition {
                from: original.status.to_string(),
                to: self.status.to_string(),
            });
        };

        let facility_id = self
            .facility_id
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or(ValidationError::NoFacility)?;
        let original_facility = original.facility.as_ref().and_then(FacilityRef::id);
        let rates = positive_rates(&self.pay_rates);

        Ok(ShiftPatch {
            title: (title != original.title).then(|| title.to_string()),
            facility_id: (Some(facility_id) != original_facility).then(|| facility_id.to_string()),
            date: Some(date),
            start_time: Some(start_time),
            end_time: Some(end_time),
            status,
            caregivers_needed: (self.caregivers_needed != original.caregivers_needed)
                .then_some(self.caregivers_needed),
            nurse_type: (nurse_type != original.nurse_type).then_some(nurse_type),
            base_price: (self.base_price != original.base_price).then_some(self.base_price),
            base_price_by_nurse_type: (rates != original.base_price_by_nurse_type)
                .then_some(rates),
        })
    }
}

/// What the shift details dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftDetails {
    pub title: String,
    pub facility: String,
    pub status: ShiftStatus,
    pub assigned: Vec<String>,
    pub cancelled: Vec<String>,
}

impl ShiftDetails {
    pub const NO_ASSIGNED: &'static str = "No caregivers assigned to this shift.";
    pub const NO_CANCELLED: &'static str = "No caregivers cancelled this shift.";

    pub fn of(shift: &Shift) -> Self {
        Self {
            title: shift.title.clone(),
            facility: shift.facility_name().to_string(),
            status: shift.status,
            assigned: shift
                .assigned_caregivers
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
            cancelled: shift
                .cancelled_caregivers
                .iter()
                .map(|c| c.label().to_string())
                .collect(),
        }
    }
}

/// The shifts screen. Facilities are loaded before shifts so the form's
/// facility picker is ready; every mutation is followed by a refetch.
pub struct ShiftBoard<'a, A> {
    api: &'a A,
    session: Session,
    facilities: Vec<Facility>,
    shifts: Vec<Shift>,
    tab: ShiftTab,
}

impl<'a, A> ShiftBoard<'a, A>
where
    A: ShiftService + FacilityService,
{
    #[instrument(skip_all)]
    pub async fn load(api: &'a A, session: Session) -> Result<ShiftBoard<'a, A>, ApiError> {
        let agency_id = session.agency_id()?.to_string();
        let facilities = api.fetch_facilities(&session, &agency_id).await?;
        let shifts = api.fetch_shifts(&session, &agency_id).await?;
        info!(facilities = facilities.len(), shifts = shifts.len(), "shift board loaded");
        Ok(Self {
            api,
            session,
            facilities,
            shifts,
            tab: ShiftTab::All,
        })
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn tab(&self) -> ShiftTab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: ShiftTab) {
        self.tab = tab;
    }

    pub fn visible(&self) -> Vec<&Shift> {
        filter_by_status(&self.shifts, self.tab)
    }

    pub fn find(&self, id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == id)
    }

    pub fn details(&self, id: &str) -> Option<ShiftDetails> {
        self.find(id).map(ShiftDetails::of)
    }

    pub async fn reload(&mut self) -> Result<(), ApiError> {
        let agency_id = self.session.agency_id()?;
        self.shifts = self.api.fetch_shifts(&self.session, agency_id).await?;
        Ok(())
    }

    pub async fn create(&mut self, draft: &ShiftDraft) -> Result<Shift, ActionError> {
        self.session.token()?;
        let req = draft.into_request()?;
        let created = self.api.create_shift(&self.session, &req).await?;
        info!(shift_id = %created.id, "shift created");
        self.reload().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, form: &ShiftEditForm) -> Result<(), ActionError> {
        let original = match self.find(id) {
            Some(shift) => shift.clone(),
            None => self.api.fetch_shift(&self.session, id).await?,
        };
        let patch = form.to_patch(&original)?;
        self.api.update_shift(&self.session, id, &patch).await?;
        info!(shift_id = %id, "shift updated");
        self.reload().await?;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.api.delete_shift(&self.session, id).await?;
        info!(shift_id = %id, "shift deleted");
        self.reload().await
    }
}
