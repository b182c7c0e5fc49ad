//! Import command for replacing the stored ledger with a snapshot document.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tl_db::Database;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Snapshot file to read. Reads stdin when omitted.
    pub file: Option<PathBuf>,
}

/// Replaces the stored ledger. Nothing is written when the document is rejected.
pub fn run<R: Read, W: Write>(reader: &mut R, writer: &mut W, db: &mut Database, args: &ImportArgs) -> Result<()> {
    let json = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut json = String::new();
            reader
                .read_to_string(&mut json)
                .context("failed to read snapshot from stdin")?;
            json
        }
    };

    let ledger = db.import_snapshot(&json).context("invalid snapshot")?;
    let days = ledger.days().count();
    let tasks: usize = ledger.days().map(|day| day.tasks.len()).sum();
    tracing::info!(days, tasks, "imported snapshot");
    writeln!(writer, "Imported {days} days, {tasks} tasks.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use chrono::NaiveDate;
    use tl_core::{DateKey, Ledger};

    const LEGACY: &str = r#"{
        "2025-05-05": [{"id": "task-1", "title": "Planning", "manualTime": 600000}],
        "2025-05-06": [
            {"id": "task-2", "name": "Review", "timeEntries": [{"type": "start", "time": "2025-05-06T09:00:00.000Z"}]},
            {"id": "task-3", "name": "Lunch"}
        ]
    }"#;

    #[test]
    fn imports_from_reader() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut Cursor::new(LEGACY), &mut output, &mut db, &ImportArgs { file: None }).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "Imported 2 days, 3 tasks.\n");
        let ledger = db.load_ledger().unwrap();
        let day = ledger
            .day(DateKey::new(NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()))
            .unwrap();
        assert_eq!(day.tasks[0].name, "Planning");
        assert_eq!(day.tasks[0].manual_added, 600_000);
    }

    #[test]
    fn imports_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("backup.json");
        std::fs::write(&path, LEGACY).unwrap();

        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let args = ImportArgs { file: Some(path) };
        run(&mut Cursor::new(""), &mut output, &mut db, &args).unwrap();
        assert_eq!(db.load_ledger().unwrap().days().count(), 2);
    }

    #[test]
    fn rejected_document_leaves_store_untouched() {
        let mut db = Database::open_in_memory().unwrap();
        let mut ledger = Ledger::new();
        ledger
            .create_task(DateKey::new(NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()), "Keep")
            .unwrap();
        db.save_ledger(&ledger).unwrap();

        let mut output = Vec::new();
        let err = run(
            &mut Cursor::new(r#"{"not-a-date": []}"#),
            &mut output,
            &mut db,
            &ImportArgs { file: None },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid snapshot");
        assert_eq!(db.load_ledger().unwrap(), ledger);
    }
}
