//! Report and backup commands. All admin only.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use tracing::info;

use ferreteria_admin::AdminState;
use ferreteria_admin::services::Period;

use super::{CommandResult, admin_role, print_json};

/// The whole of each day from `from` through `to`.
fn day_range(from: NaiveDate, to: NaiveDate) -> Result<Period, Box<dyn std::error::Error>> {
    if to < from {
        return Err(format!("{to} is before {from}").into());
    }
    let end = to
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| format!("invalid end date {to}"))?;
    Ok(Period::new(from.and_time(NaiveTime::MIN).and_utc(), end.and_utc()))
}

pub fn sales(state: &AdminState, from: NaiveDate, to: NaiveDate) -> CommandResult {
    admin_role(state)?;
    print_json(&state.reports().sales_report(day_range(from, to)?)?)
}

pub fn commissions(state: &AdminState, range: Option<(NaiveDate, NaiveDate)>) -> CommandResult {
    admin_role(state)?;
    let period = range.map(|(from, to)| day_range(from, to)).transpose()?;
    print_json(&json!({
        "rate": state.config().commission_rate,
        "period": period,
        "commissions": state.reports().commissions(period)?,
    }))
}

#[allow(clippy::print_stdout)]
pub fn export(state: &AdminState, output: Option<&Path>) -> CommandResult {
    admin_role(state)?;
    let backup = state.backup().create_backup()?;
    match output {
        Some(path) => {
            std::fs::write(path, &backup)?;
            info!(path = %path.display(), bytes = backup.len(), "Wrote backup");
            print_json(&json!({ "written": path }))
        }
        None => {
            println!("{backup}");
            Ok(())
        }
    }
}

pub fn restore(state: &AdminState, file: &Path) -> CommandResult {
    let role = admin_role(state)?;
    let text = std::fs::read_to_string(file)?;
    print_json(&state.backup().restore_backup(role, &text)?)
}
