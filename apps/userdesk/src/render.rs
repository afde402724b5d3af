//! Text rendering of the controller state: endpoint line, error line, users table.

use client_core::SyncState;
use shared::{
    domain::{Draft, DraftField, UserRecord},
    protocol::users_route,
};

const HEADERS: [&str; 4] = ["ID", "Name", "Email", "City"];
const EMPTY_TABLE: &str = "No users found.";
const FOOTER: &str = "If users are not loading: check backend URL + enable CORS.";

pub struct View {
    endpoint: String,
}

impl View {
    pub fn new(api_base: &str) -> Self {
        Self {
            endpoint: format!("{api_base}{}", users_route()),
        }
    }

    pub fn render(&self, state: &SyncState) -> String {
        let mut out = String::new();
        let button = if state.is_loading {
            "Loading..."
        } else {
            "Load Users"
        };
        out.push_str(&format!("[{button}]  Backend: {}\n", self.endpoint));
        if let Some(error) = &state.error_message {
            out.push_str(&format!("error: {error}\n"));
        }
        out.push('\n');
        out.push_str(&render_table(&state.records));
        out.push('\n');
        out.push_str(FOOTER);
        out.push('\n');
        out
    }
}

pub fn render_table(records: &[UserRecord]) -> String {
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|record| {
            [
                record
                    .resolved_id()
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                record.name.clone(),
                record.email.clone(),
                record.city.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format_row(&HEADERS.map(String::from), &widths);
    out.push_str(&format_row(&widths.map(|width| "-".repeat(width)), &widths));
    if rows.is_empty() {
        out.push_str(EMPTY_TABLE);
        out.push('\n');
    }
    for row in &rows {
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{}\n", line.trim_end())
}

pub fn render_draft(draft: &Draft) -> String {
    DraftField::ALL
        .into_iter()
        .map(|field| format!("{:<6}{}\n", format!("{field}:"), draft.field(field)))
        .collect()
}
