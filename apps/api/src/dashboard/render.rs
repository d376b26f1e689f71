//! Plain-text rendering of the dashboard views for the terminal.

use std::fmt::Write;

use crate::dashboard::ApplicationDetail;
use crate::models::application::ApplicationRow;

pub const NO_APPLICATIONS: &str = "No applications found.";

/// The application table: date, name, email, GPA, track and resume file.
pub fn render_table(applications: &[ApplicationRow]) -> String {
    if applications.is_empty() {
        return format!("{NO_APPLICATIONS}\n");
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<10}  {:<28}  {:<32}  {:>5}  {:<10}  {}",
        "ID", "DATE", "NAME", "EMAIL", "GPA", "TRACK", "RESUME"
    );
    for app in applications {
        let _ = writeln!(
            out,
            "{:>5}  {:<10}  {:<28}  {:<32}  {:>5}  {:<10}  {}",
            app.id,
            app.created_at.format("%Y-%m-%d"),
            format!("{} {}", app.first_name, app.last_name),
            app.email,
            app.gpa,
            app.track,
            app.resume_filename.as_deref().unwrap_or("-"),
        );
    }
    out
}

pub fn render_detail(detail: &ApplicationDetail) -> String {
    format!(
        "{}\n{}\n\nWhy Quant?\n{}\n\nGoals & Expectations\n{}\n\nAwards\n{}\n\nFun Fact\n{}\n",
        detail.name, detail.track, detail.why_quant, detail.goals, detail.awards, detail.fun_fact
    )
}
