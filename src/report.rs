use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};

use crate::common::files::count_lines;
use crate::common::paths::{Paths, file_stamp};
use crate::context::Context;

const CODE: &str = "report";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub password_changes: usize,
    pub path: PathBuf,
}

/// Count the report artifacts and write a timestamped summary file.
pub fn generate_report(ctx: &Context) -> Result<Summary> {
    let paths = ctx.paths();
    let now = Local::now();

    let created = count_lines(&paths.created_users())?;
    let password_changes = count_lines(&paths.password_changes())?;

    let path = paths.summary_file(&file_stamp(now));
    fs::write(&path, render_summary(paths, now, created, password_changes))
        .with_context(|| format!("writing summary report to {}", path.display()))?;

    ctx.log()
        .info(CODE, &format!("Report generated: {}", path.display()));

    Ok(Summary {
        created,
        password_changes,
        path,
    })
}

fn render_summary(
    paths: &Paths,
    generated: DateTime<Local>,
    created: usize,
    password_changes: usize,
) -> String {
    format!(
        "User Management Summary Report\n\
         Generated: {}\n\
         \n\
         Total users created: {created}\n\
         Total password changes: {password_changes}\n\
         \n\
         Action log: {}\n\
         Error log: {}\n",
        generated.format("%Y-%m-%d %H:%M:%S"),
        paths.actions_log().display(),
        paths.errors_log().display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::testing::Workspace;
    use crate::common::files::append_line;

    #[test]
    fn test_missing_artifacts_count_zero() {
        let ws = Workspace::new();

        let summary = generate_report(&ws.ctx).unwrap();

        assert_eq!(summary.created, 0);
        assert_eq!(summary.password_changes, 0);
        let text = fs::read_to_string(&summary.path).unwrap();
        assert!(text.contains("Total users created: 0"));
        assert!(text.contains("Total password changes: 0"));
    }

    #[test]
    fn test_counts_match_artifact_lines() {
        let ws = Workspace::new();
        let paths = ws.ctx.paths();
        append_line(&paths.created_users(), "janedoe,jane@x.com,gold,a").unwrap();
        append_line(&paths.created_users(), "johnroe,john@x.com,silver,b").unwrap();
        append_line(&paths.password_changes(), "janedoe,abc").unwrap();

        let summary = generate_report(&ws.ctx).unwrap();

        assert_eq!(summary.created, 2);
        assert_eq!(summary.password_changes, 1);

        let name = summary.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("summary_") && name.ends_with(".txt"));
        assert_eq!(summary.path.parent().unwrap(), paths.reports_dir());

        let text = fs::read_to_string(&summary.path).unwrap();
        assert!(text.contains("Total users created: 2"));
        assert!(text.contains("Total password changes: 1"));
        assert!(text.contains(&paths.actions_log().display().to_string()));
        assert!(text.contains(&paths.errors_log().display().to_string()));
        assert!(ws.actions()[0].contains("Report generated"));
    }
}
