use std::io::Write;
use std::path::Path;

use eyre::{Result, WrapErr};
use log::debug;
use serde_json::Value;

use crate::ResultRecord;
use crate::pipeline::LINK_FIELD;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Union of record keys: `link` first, the rest in first-seen order
pub fn columns(records: &[ResultRecord]) -> Vec<String> {
    let mut columns = vec![LINK_FIELD.to_string()];
    for key in records.iter().flat_map(|r| r.keys()) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

/// Render a JSON value as a CSV cell
pub fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write records as CSV to any writer
pub fn write_records<W: Write>(writer: W, records: &[ResultRecord]) -> Result<()> {
    let columns = columns(records);
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(&columns)?;
    for record in records {
        csv.write_record(columns.iter().map(|c| render_cell(record.get(c))))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write records to `path`, replacing any existing file
pub fn write_csv(path: &Path, records: &[ResultRecord], excel_bom: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).wrap_err_with(|| format!("creating {}", parent.display()))?;
    }

    let mut file = std::fs::File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    if excel_bom {
        file.write_all(UTF8_BOM)?;
    }
    write_records(&mut file, records).wrap_err_with(|| format!("writing {}", path.display()))?;

    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> ResultRecord {
        value.as_object().unwrap().clone()
    }

    fn render(records: &[ResultRecord]) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_columns_first_seen_order() {
        let records = vec![
            record(json!({"link": "a", "transcript": "t", "summary": "s"})),
            record(json!({"link": "b", "score": 1, "summary": "s2"})),
        ];
        assert_eq!(columns(&records), vec!["link", "transcript", "summary", "score"]);
    }

    #[test]
    fn test_columns_link_always_first() {
        assert_eq!(columns(&[]), vec!["link"]);
        let records = vec![record(json!({"zeta": 1, "link": "a"}))];
        assert_eq!(columns(&records), vec!["link", "zeta"]);
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(None), "");
        assert_eq!(render_cell(Some(&Value::Null)), "");
        assert_eq!(render_cell(Some(&json!("Sim"))), "Sim");
        assert_eq!(render_cell(Some(&json!(0.5))), "0.5");
        assert_eq!(render_cell(Some(&json!(7))), "7");
        assert_eq!(render_cell(Some(&json!(true))), "true");
        assert_eq!(render_cell(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
    }

    #[test]
    fn test_missing_cells_render_empty() {
        let records = vec![
            record(json!({"link": "a", "x": "1"})),
            record(json!({"link": "b", "y": "2"})),
        ];
        assert_eq!(render(&records), "link,x,y\na,1,\nb,,2\n");
    }

    #[test]
    fn test_quoting() {
        let records = vec![record(json!({"link": "a", "note": "yes, \"really\"\nok"}))];
        assert_eq!(render(&records), "link,note\na,\"yes, \"\"really\"\"\nok\"\n");
    }

    #[test]
    fn test_empty_table_has_header() {
        assert_eq!(render(&[]), "link\n");
    }

    #[test]
    fn test_write_csv_overwrites_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale content that is longer than the new file\n").unwrap();

        let records = vec![record(json!({"link": "a"}))];
        write_csv(&path, &records, false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "link\na\n");

        write_csv(&path, &records, true).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert_eq!(&bytes[UTF8_BOM.len()..], b"link\na\n");
    }
}
