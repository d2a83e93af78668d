//! Repository display formatting
//!
//! Formats repositories for terminal output in table and detail views.

use tabled::{settings::Style, Table, Tabled};

use crate::models::{Repository, RepositorySettings};

#[derive(Tabled)]
struct RepositoryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    repository_type: String,
    #[tabled(rename = "Location")]
    location: String,
}

/// Format a list of repositories as a table
pub fn format_repository_list(repositories: &[Repository]) -> String {
    if repositories.is_empty() {
        return "No repositories found.\n".to_string();
    }

    let rows = repositories.iter().map(|repo| RepositoryRow {
        name: repo.name.clone(),
        repository_type: repo.repository_type().to_string(),
        location: repo
            .location()
            .map(|l| l.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single repository's details
pub fn format_repository_details(repository: &Repository) -> String {
    let mut output = String::new();

    output.push_str(&format!("Repository: {}\n", repository.name));
    output.push_str(&format!("  Type:           {}\n", repository.repository_type()));

    match &repository.settings {
        RepositorySettings::Filesystem(fs) => {
            output.push_str(&format!("  Location:       {}\n", fs.location.display()));
            output.push_str(&format!(
                "  Compress:       {}\n",
                if fs.compress { "Yes" } else { "No" }
            ));
            output.push_str(&format!(
                "  Chunk Size:     {}\n",
                fs.chunk_size.as_deref().unwrap_or("none")
            ));
            output.push_str(&format!("  Restore Rate:   {}\n", fs.restore_rate));
            output.push_str(&format!("  Snapshot Rate:  {}\n", fs.snapshot_rate));
        }
        _ => {
            output.push_str("  (settings for this repository type are not supported)\n");
        }
    }

    output
}
