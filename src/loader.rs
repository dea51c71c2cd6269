use std::collections::HashSet;
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::domain::{LOAD_FAILED, Settings, YaalaError};
use crate::sheets::SheetSource;
use crate::text::Shaper;

/// Fetch the catalog worksheet once. Any failure is reported and turned into an
/// empty catalog, so callers only have to deal with "no data".
pub fn load(source: &dyn SheetSource, settings: &Settings, shaper: Shaper) -> Catalog {
    let start_time = Instant::now();
    match try_load(source, settings) {
        Ok(catalog) => {
            info!(
                rows = catalog.len(),
                columns = ?catalog.column_names(),
                "Loading catalog took {}ms",
                start_time.elapsed().as_millis()
            );
            catalog
        }
        Err(e) => {
            error!(error = %e, "Loading catalog failed");
            eprintln!("{} {e}", shaper(LOAD_FAILED));
            Catalog::empty(settings.columns.clone())
        }
    }
}

fn try_load(source: &dyn SheetSource, settings: &Settings) -> Result<Catalog, YaalaError> {
    let values = source.fetch_rows(&settings.spreadsheet_id, &settings.worksheet)?;
    if values.len() < 2 {
        debug!(rows = values.len(), "Worksheet has no data rows");
        return Ok(Catalog::empty(settings.columns.clone()));
    }
    let frame = build_frame(&values[0], &values[1..])?;
    Catalog::from_frame(frame, settings.columns.clone())
}

/// Turn a header and data rows into a frame of string columns. Short rows are
/// padded with empty cells; cells beyond the header are ignored.
fn build_frame(header: &[String], records: &[Vec<String>]) -> Result<DataFrame, YaalaError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(header.len());
    for (idx, raw_name) in header.iter().enumerate() {
        let name = raw_name.trim();
        if !seen.insert(name.to_string()) {
            warn!(column = name, idx, "Duplicate column name, keeping the first one");
            continue;
        }
        let data: Vec<String> = records
            .iter()
            .map(|record| record.get(idx).cloned().unwrap_or_default())
            .collect();
        columns.push(Column::new(name.into(), data));
    }
    debug!(columns = columns.len(), rows = records.len(), "Built catalog frame");
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::list_groups;
    use crate::catalog::tests::names;
    use crate::text::identity;

    /// Canned worksheet values, or a failure message.
    pub(crate) struct FakeSheet(pub Result<Vec<Vec<&'static str>>, &'static str>);

    impl SheetSource for FakeSheet {
        fn fetch_rows(&self, _: &str, _: &str) -> Result<Vec<Vec<String>>, YaalaError> {
            match &self.0 {
                Ok(rows) => Ok(rows
                    .iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect()),
                Err(msg) => Err(YaalaError::SourceUnavailable(msg.to_string())),
            }
        }
    }

    pub(crate) fn settings() -> Settings {
        Settings::default().columns(names())
    }

    #[test]
    fn nothing_or_header_only_is_empty() {
        let catalog = load(&FakeSheet(Ok(vec![])), &settings(), identity);
        assert!(catalog.is_empty());

        let header_only = FakeSheet(Ok(vec![vec!["group", "name"]]));
        let catalog = load(&header_only, &settings(), identity);
        assert!(catalog.is_empty());
        assert!(list_groups(&catalog).is_empty());
    }

    #[test]
    fn failing_source_fails_closed() {
        let catalog = load(&FakeSheet(Err("offline")), &settings(), identity);
        assert!(catalog.is_empty());
    }

    #[test]
    fn header_names_are_trimmed() {
        let sheet = FakeSheet(Ok(vec![
            vec![" group ", "name  ", "\tsystem"],
            vec!["7", "orders", "https://sys/7"],
        ]));
        let catalog = load(&sheet, &settings(), identity);
        assert_eq!(catalog.column_names(), vec!["group", "name", "system"]);
        let rows = catalog.rows();
        assert_eq!(rows[0].group, "7");
        assert_eq!(rows[0].system_link.as_deref(), Some("https://sys/7"));
    }

    #[test]
    fn ragged_rows_are_padded_and_truncated() {
        let sheet = FakeSheet(Ok(vec![
            vec!["group", "name", "file"],
            vec!["1"],
            vec!["2", "b", "https://f/2", "extra"],
        ]));
        let catalog = load(&sheet, &settings(), identity);
        assert_eq!(catalog.len(), 2);
        let rows = catalog.rows();
        assert_eq!(rows[0].file_name, None);
        assert_eq!(rows[1].file_link.as_deref(), Some("https://f/2"));
        assert_eq!(list_groups(&catalog), vec!["1", "2"]);
    }

    #[test]
    fn duplicate_headers_keep_the_first_column() {
        let sheet = FakeSheet(Ok(vec![
            vec!["group", "name", "name "],
            vec!["1", "first", "second"],
        ]));
        let catalog = load(&sheet, &settings(), identity);
        assert_eq!(catalog.column_names(), vec!["group", "name"]);
        assert_eq!(catalog.rows()[0].file_name.as_deref(), Some("first"));
    }

    #[test]
    fn missing_group_column_gives_empty_catalog() {
        let sheet = FakeSheet(Ok(vec![vec!["unit", "name"], vec!["1", "a"]]));
        assert!(load(&sheet, &settings(), identity).is_empty());
    }
}
