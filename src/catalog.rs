use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::{error, trace};

use crate::domain::{ColumnNames, YaalaError};

/// One catalog entry as read from the worksheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub group: String,
    pub file_name: Option<String>,
    pub description: Option<String>,
    pub system_link: Option<String>,
    pub file_link: Option<String>,
}

/// The loaded worksheet. Every column is a string column; the schema comes
/// from the worksheet header.
#[derive(Debug, Clone)]
pub struct Catalog {
    frame: DataFrame,
    columns: ColumnNames,
}

impl Catalog {
    pub fn empty(columns: ColumnNames) -> Self {
        Self {
            frame: DataFrame::empty(),
            columns,
        }
    }

    pub fn from_frame(frame: DataFrame, columns: ColumnNames) -> Result<Self, YaalaError> {
        if frame.height() > 0 && frame.column(&columns.group).is_err() {
            return Err(YaalaError::MissingColumn(columns.group.clone()));
        }
        Ok(Self { frame, columns })
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    fn group_column(&self) -> Option<&StringChunked> {
        self.frame
            .column(&self.columns.group)
            .ok()
            .and_then(|c| c.str().ok())
    }

    /// Rows of a single group, in worksheet order.
    pub fn rows_in_group(&self, group: &str) -> Vec<Row> {
        let Some(groups) = self.group_column() else {
            return Vec::new();
        };
        let mask = groups.equal(group);
        match self.frame.filter(&mask) {
            Ok(subset) => Self::rows_of(&subset, &self.columns),
            Err(e) => {
                error!(error = %e, %group, "Filtering catalog failed");
                Vec::new()
            }
        }
    }

    #[cfg(test)]
    pub fn rows(&self) -> Vec<Row> {
        Self::rows_of(&self.frame, &self.columns)
    }

    fn rows_of(frame: &DataFrame, columns: &ColumnNames) -> Vec<Row> {
        let column = |name: &str| frame.column(name).ok().and_then(|c| c.str().ok());
        let group = column(&columns.group);
        let file_name = column(&columns.file_name);
        let description = column(&columns.description);
        let system_link = column(&columns.system_link);
        let file_link = column(&columns.file_link);

        let cell = |ca: Option<&StringChunked>, idx: usize| -> Option<String> {
            ca.and_then(|ca| ca.get(idx))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let rows: Vec<Row> = (0..frame.height())
            .map(|idx| Row {
                group: group
                    .and_then(|ca| ca.get(idx))
                    .unwrap_or_default()
                    .to_string(),
                file_name: cell(file_name, idx),
                description: cell(description, idx),
                system_link: cell(system_link, idx),
                file_link: cell(file_link, idx),
            })
            .collect();
        trace!("Extracted {} rows", rows.len());
        rows
    }
}

/// Distinct group values in ascending order.
pub fn list_groups(catalog: &Catalog) -> Vec<String> {
    let Some(groups) = catalog.group_column() else {
        return Vec::new();
    };
    groups
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Map typed input to a group: exact match first, then the first group that
/// contains the input anywhere in its name.
pub fn resolve(input: &str, groups: &[String]) -> Option<String> {
    let input = input.trim();
    if let Some(exact) = groups.iter().find(|g| g.as_str() == input) {
        return Some(exact.clone());
    }
    groups.iter().find(|g| g.contains(input)).cloned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn names() -> ColumnNames {
        ColumnNames::default()
            .group("group")
            .file_name("name")
            .description("desc")
            .system_link("system")
            .file_link("file")
    }

    /// Catalog with the test column names; each record is (group, name, desc, system, file).
    pub(crate) fn catalog(records: &[(&str, &str, &str, &str, &str)]) -> Catalog {
        let pick = |field: usize| -> Vec<String> {
            records
                .iter()
                .map(|r| [r.0, r.1, r.2, r.3, r.4][field].to_string())
                .collect()
        };
        let frame = DataFrame::new(vec![
            Column::new("group".into(), pick(0)),
            Column::new("name".into(), pick(1)),
            Column::new("desc".into(), pick(2)),
            Column::new("system".into(), pick(3)),
            Column::new("file".into(), pick(4)),
        ])
        .unwrap();
        Catalog::from_frame(frame, names()).unwrap()
    }

    #[test]
    fn groups_are_sorted_and_unique() {
        let catalog = catalog(&[
            ("b", "x", "", "", ""),
            ("a", "y", "", "", ""),
            ("b", "z", "", "", ""),
            ("10", "w", "", "", ""),
            ("2", "v", "", "", ""),
        ]);
        let groups = list_groups(&catalog);
        assert_eq!(groups, vec!["10", "2", "a", "b"]);

        let all_groups: Vec<String> = catalog.rows().into_iter().map(|r| r.group).collect();
        assert!(groups.iter().all(|g| all_groups.contains(g)));
    }

    #[test]
    fn empty_catalog_has_no_groups() {
        let catalog = Catalog::empty(names());
        assert!(catalog.is_empty());
        assert!(list_groups(&catalog).is_empty());
        assert!(catalog.rows_in_group("a").is_empty());
    }

    #[test]
    fn frame_without_group_column_is_rejected() {
        let frame = DataFrame::new(vec![Column::new("other".into(), vec!["x".to_string()])]).unwrap();
        assert!(matches!(
            Catalog::from_frame(frame, names()),
            Err(YaalaError::MissingColumn(name)) if name == "group"
        ));
    }

    #[test]
    fn exact_match_wins_over_substring() {
        let groups: Vec<String> = vec!["1".into(), "2".into(), "10".into()];
        assert_eq!(resolve("1", &groups).as_deref(), Some("1"));

        let groups: Vec<String> = vec!["10".into(), "1".into()];
        assert_eq!(resolve("1", &groups).as_deref(), Some("1"));
    }

    #[test]
    fn substring_falls_back_to_first_in_order() {
        let groups: Vec<String> = vec!["גדוד 12".into(), "גדוד 120".into(), "גדוד 7".into()];
        assert_eq!(resolve("12", &groups).as_deref(), Some("גדוד 12"));
        assert_eq!(resolve(" 7 ", &groups).as_deref(), Some("גדוד 7"));
        assert_eq!(resolve("99", &groups), None);
        assert_eq!(resolve("1", &[]), None);
    }

    #[test]
    fn rows_in_group_keep_order_and_trim_cells() {
        let catalog = catalog(&[
            ("a", "first", "", " https://s/1 ", ""),
            ("b", "other", "", "", ""),
            ("a", "", "note", "", "https://f/2"),
        ]);
        let rows = catalog.rows_in_group("a");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].file_name.as_deref(), Some("first"));
        assert_eq!(rows[0].system_link.as_deref(), Some("https://s/1"));
        assert_eq!(rows[0].file_link, None);
        assert_eq!(rows[1].file_name, None);
        assert_eq!(rows[1].description.as_deref(), Some("note"));
        assert!(catalog.rows_in_group("c").is_empty());
    }
}
