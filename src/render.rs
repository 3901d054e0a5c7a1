//! Plain-text tables and notices. Holds no state of its own.

use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

use crate::agency::Overview;
use crate::caregivers::CaregiverTab;
use crate::model::{
    AgencyProfile, Caregiver, CaregiverDetails, DocumentType, Facility, Shift,
};
use crate::shifts::ShiftDetails;
use crate::verification::{VerificationDialog, NO_DOCUMENTS};

pub const NO_DATA: &str = "No data available in table";

pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// An empty table renders `empty` in place of the header.
    pub fn render_or(&self, empty: &str) -> String {
        if self.rows.is_empty() {
            return format!("{}\n", empty);
        }
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        push_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        out
    }

    pub fn render(&self) -> String {
        self.render_or(NO_DATA)
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{:<width$}", cell, width = *w)
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn calendar_date(ts: &DateTime<Utc>) -> String {
    ts.date_naive().format("%Y-%m-%d").to_string()
}

fn local_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

pub fn shifts(shifts: &[&Shift]) -> String {
    let mut table = Table::new(&["ID", "TITLE", "FACILITY", "DATE", "TIME", "STATUS", "NEEDED", "ROLES"]);
    for s in shifts {
        let roles: Vec<&str> = s.nurse_type.iter().map(|n| n.as_str()).collect();
        table.row(vec![
            s.id.clone(),
            s.title.clone(),
            s.facility_name().to_string(),
            calendar_date(&s.date),
            format!("{}-{}", local_time(&s.start_time), local_time(&s.end_time)),
            s.status.to_string(),
            s.caregivers_needed.to_string(),
            roles.join(","),
        ]);
    }
    table.render()
}

pub fn shift_details(details: &ShiftDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} @ {} [{}]", details.title, details.facility, details.status);
    let _ = writeln!(out, "Assigned caregivers:");
    if details.assigned.is_empty() {
        let _ = writeln!(out, "  {}", ShiftDetails::NO_ASSIGNED);
    }
    for name in &details.assigned {
        let _ = writeln!(out, "  - {}", name);
    }
    let _ = writeln!(out, "Cancelled caregivers:");
    if details.cancelled.is_empty() {
        let _ = writeln!(out, "  {}", ShiftDetails::NO_CANCELLED);
    }
    for name in &details.cancelled {
        let _ = writeln!(out, "  - {}", name);
    }
    out
}

pub fn facilities(facilities: &[Facility]) -> String {
    let mut table = Table::new(&["ID", "NAME", "ADDRESS", "PHONE", "EMAIL"]);
    for f in facilities {
        table.row(vec![
            f.id.clone().unwrap_or_default(),
            f.name.clone(),
            f.text_location.clone(),
            f.phone.clone(),
            f.email.clone(),
        ]);
    }
    table.render()
}

pub fn facility(f: &Facility) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", f.name);
    let _ = writeln!(out, "  address:  {}", f.text_location);
    let _ = writeln!(out, "  location: {}, {}", f.location.latitude, f.location.longitude);
    let _ = writeln!(out, "  phone:    {}", f.phone);
    let _ = writeln!(out, "  email:    {}", f.email);
    if let Some(building) = f.building_name.as_deref().filter(|b| !b.is_empty()) {
        let _ = writeln!(out, "  building: {}", building);
    }
    if let Some(floor) = f.floor.as_deref().filter(|b| !b.is_empty()) {
        let _ = writeln!(out, "  floor:    {}", floor);
    }
    if let Some(desc) = f.description.as_deref().filter(|b| !b.is_empty()) {
        let _ = writeln!(out, "  about:    {}", desc);
    }
    out
}

pub fn caregivers(caregivers: &[&Caregiver], tab: CaregiverTab) -> String {
    let mut table = Table::new(&["ID", "NAME", "EMAIL", "PHONE", "ROLE", "DOCUMENTS", "JOINED"]);
    for c in caregivers {
        let pending = c
            .uploaded_documents
            .iter()
            .filter(|d| d.status == crate::model::DocumentStatus::Pending)
            .count();
        let docs = match tab {
            CaregiverTab::VerifyDocuments => {
                format!("{} ({} pending)", c.uploaded_documents.len(), pending)
            }
            CaregiverTab::VerifiedCaregivers => c.uploaded_documents.len().to_string(),
        };
        table.row(vec![
            c.id.clone(),
            c.name.clone(),
            c.email.clone(),
            c.phone.clone(),
            c.nurse_type.clone(),
            docs,
            c.date_joined.as_ref().map(calendar_date).unwrap_or_default(),
        ]);
    }
    table.render()
}

pub fn caregiver_details(details: &CaregiverDetails) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", details.profile.name);
    let _ = writeln!(out, "  email: {}", details.profile.email);
    let _ = writeln!(out, "  phone: {}", details.profile.phone);

    let _ = writeln!(out, "\nDocuments");
    let mut docs = Table::new(&["TYPE ID", "DOCUMENT", "STATUS", "FILE"]);
    for d in &details.documents {
        docs.row(vec![
            d.document_type_id.clone(),
            d.document_name.clone(),
            d.status.to_string(),
            d.file_url.clone(),
        ]);
    }
    out.push_str(&docs.render_or(NO_DOCUMENTS));

    let _ = writeln!(out, "\nAssigned shifts");
    let assigned: Vec<&Shift> = details.assigned_shifts.iter().collect();
    out.push_str(&shifts(&assigned));
    let _ = writeln!(out, "\nCanceled shifts");
    let canceled: Vec<&Shift> = details.canceled_shifts.iter().collect();
    out.push_str(&shifts(&canceled));
    out
}

pub fn verification(dialog: &VerificationDialog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Documents of {}", dialog.caregiver_name());
    if dialog.is_empty() {
        let _ = writeln!(out, "{}", NO_DOCUMENTS);
        return out;
    }
    let selected = dialog.selected().map(|d| d.id.as_str());
    let mut table = Table::new(&["", "TYPE ID", "DOCUMENT", "STATUS", "COMMENT", "FILE"]);
    for d in dialog.documents() {
        table.row(vec![
            if Some(d.id.as_str()) == selected { ">".into() } else { String::new() },
            d.document_type.id.clone(),
            d.document_type.name.clone(),
            d.status.to_string(),
            d.comments.clone().unwrap_or_default(),
            d.file_url.clone(),
        ]);
    }
    out.push_str(&table.render());
    out
}

pub fn document_types(docs: &[DocumentType]) -> String {
    let mut table = Table::new(&["ID", "NAME", "APPLIES TO", "CATEGORIES"]);
    for d in docs {
        let applies: Vec<&str> = d.applies_to.iter().map(|c| c.as_str()).collect();
        table.row(vec![
            d.id.clone().unwrap_or_default(),
            d.name.clone(),
            if d.applies_to_all { "all".into() } else { applies.join(",") },
            d.applies_to.len().to_string(),
        ]);
    }
    table.render()
}

pub fn profile(p: &AgencyProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", p.name);
    let _ = writeln!(out, "  email:   {}", p.email);
    let _ = writeln!(out, "  phone:   {}", p.phone);
    let _ = writeln!(out, "  address: {}", p.address);
    if let Some(logo) = p.agency_logo.as_deref() {
        let _ = writeln!(out, "  logo:    {}", logo);
    }
    out
}

pub fn overview(o: &Overview) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Caregivers: {}   Facilities: {}   Shifts: {}",
        o.analytics.caregivers_count, o.analytics.facilities_count, o.analytics.shifts_count
    );
    let _ = writeln!(out, "\nRecent applicants");
    let recent: Vec<&Caregiver> = o.recent_caregivers.iter().collect();
    out.push_str(&caregivers(&recent, CaregiverTab::VerifyDocuments));
    out
}

pub fn success(message: &str) -> String {
    format!("✔ {}", message)
}

pub fn failure(err: &dyn std::fmt::Display) -> String {
    format!("✖ {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_table_shows_placeholder() {
        let table = Table::new(&["A", "B"]);
        assert!(table.is_empty());
        assert_eq!(table.render(), "No data available in table\n");
        assert_eq!(facilities(&[]), "No data available in table\n");
    }

    #[test]
    fn columns_are_aligned() {
        let mut table = Table::new(&["ID", "NAME"]);
        table.row(vec!["1".into(), "Maple".into()]);
        table.row(vec!["200".into(), "Oak".into()]);
        assert_eq!(table.render(), "ID   NAME\n---  -----\n1    Maple\n200  Oak\n");
    }

    #[test]
    fn shift_details_empty_states() {
        let shift: Shift = serde_json::from_value(json!({
            "_id": "s1", "title": "Night", "date": "2024-05-01T00:00:00Z",
            "startTime": "2024-05-01T17:00:00Z", "endTime": "2024-05-01T21:00:00Z",
            "status": "open"
        }))
        .unwrap();
        let text = shift_details(&ShiftDetails::of(&shift));
        assert!(text.contains("No caregivers assigned to this shift."));
        assert!(text.contains("No caregivers cancelled this shift."));
    }

    #[test]
    fn verification_without_documents() {
        let caregiver: Caregiver =
            serde_json::from_value(json!({ "_id": "c1", "name": "Ana" })).unwrap();
        let text = verification(&VerificationDialog::open(&caregiver));
        assert!(text.contains("The candidate has not uploaded any documents."));
    }
}
