//! Snapshot display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::models::Snapshot;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Snapshot")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Started")]
    started: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Indices")]
    indices: String,
}

/// Format the snapshots of one repository as a table
pub fn format_snapshot_list(repository: &str, snapshots: &[Snapshot]) -> String {
    if snapshots.is_empty() {
        return format!("No snapshots in repository {}.\n", repository);
    }

    let rows = snapshots.iter().map(|snapshot| {
        let status = snapshot.status.as_ref();
        SnapshotRow {
            name: snapshot.name.clone(),
            state: status
                .map(|s| s.state.to_string())
                .unwrap_or_else(|| "-".into()),
            started: status
                .and_then(|s| s.start_time)
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".into()),
            duration: status
                .and_then(|s| s.duration_secs)
                .map(format_seconds)
                .unwrap_or_else(|| "-".into()),
            indices: snapshot.options.indices.clone(),
        }
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("Repository: {}\n{}\n", repository, table)
}

/// Format a single snapshot's details
pub fn format_snapshot_details(snapshot: &Snapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!("Snapshot: {}\n", snapshot.name));
    output.push_str(&format!("  Repository:  {}\n", snapshot.repository));
    output.push_str(&format!("  Indices:     {}\n", snapshot.options.indices));

    let Some(status) = &snapshot.status else {
        output.push_str("  State:       unknown (not yet reported)\n");
        return output;
    };

    output.push_str(&format!("  State:       {}\n", status.state));
    if let Some(start) = status.start_time {
        output.push_str(&format!("  Started:     {}\n", start.format(TIME_FORMAT)));
    }
    if let Some(end) = status.end_time {
        output.push_str(&format!("  Finished:    {}\n", end.format(TIME_FORMAT)));
    }
    if let Some(duration) = status.duration_secs {
        output.push_str(&format!("  Duration:    {}\n", format_seconds(duration)));
    }
    if let Some(shards) = status.shards {
        output.push_str(&format!(
            "  Shards:      {} total, {} successful, {} failed\n",
            shards.total, shards.successful, shards.failed
        ));
    }

    if !status.failures.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Failures ({}):\n", status.failures.len()));
        for failure in &status.failures {
            output.push_str(&format!("    - {}\n", failure));
        }
    }

    output
}

fn format_seconds(seconds: f64) -> String {
    format!("{:.1}s", seconds)
}
