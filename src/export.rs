//! Spreadsheet export of client records.

use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;

use crate::error::Result;
use crate::types::ClientDetails;

/// Writes one CSV row per client to a timestamped file under `dir` and
/// returns the generated path. The directory is created if missing.
pub fn export_clients_to_csv(rows: &[ClientDetails], dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let filename = format!("clients-{}.csv", Utc::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(filename);

    let mut writer = Writer::from_path(&path)?;
    writer.write_record([
        "Company Name",
        "Email",
        "Specification",
        "Certificate Number",
        "Grant Date",
    ])?;

    for row in rows {
        let grant_date = row
            .client
            .grant_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        writer.write_record([
            row.client.company_name.as_str(),
            row.client.email.as_str(),
            row.specification_name.as_str(),
            &row.client.certificate_number.to_string(),
            &grant_date,
        ])?;
    }

    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Client;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample_row(company: &str, number: i64, grant_date: Option<NaiveDate>) -> ClientDetails {
        ClientDetails {
            client: Client {
                id: Uuid::new_v4().to_string(),
                company_name: company.to_string(),
                email: format!("{}@example.com", company.to_lowercase()),
                specification_id: "spec-1".to_string(),
                certificate_number: number,
                grant_date,
                created_at: Utc::now(),
            },
            specification_name: "ISO 9001".to_string(),
        }
    }

    #[test]
    fn test_export_writes_one_row_per_client() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            sample_row("Acme", 101, NaiveDate::from_ymd_opt(2025, 3, 14)),
            sample_row("Globex", 102, None),
            sample_row("Initech", 103, NaiveDate::from_ymd_opt(2024, 11, 2)),
        ];

        let path = export_clients_to_csv(&rows, dir.path()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        // Header plus one line per client
        assert_eq!(lines.len(), rows.len() + 1);
        assert_eq!(
            lines[0],
            "Company Name,Email,Specification,Certificate Number,Grant Date"
        );
        assert!(lines[1].contains("Acme"));
        assert!(lines[1].contains("101"));
        assert!(lines[1].contains("2025-03-14"));
        assert!(lines[2].ends_with(",")); // missing grant date stays empty
    }

    #[test]
    fn test_export_empty_list_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_clients_to_csv(&[], dir.path()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn test_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports");

        let path = export_clients_to_csv(&[sample_row("Acme", 1, None)], &nested).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
