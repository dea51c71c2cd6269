use std::collections::BTreeMap;

use tracing::trace;

use crate::catalog::Catalog;

/// Menu number to URL, rebuilt for every rendered file list.
pub type ActionMap = BTreeMap<u32, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    System,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub key: u32,
    pub kind: LinkKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// `None` when the worksheet has no file name for the row.
    pub name: Option<String>,
    pub description: Option<String>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileListing {
    pub group: String,
    pub entries: Vec<FileEntry>,
    pub actions: ActionMap,
}

impl FileListing {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// List the files of `group`. Every non-empty link gets the next free number,
/// system link before file link, counting across the whole listing.
pub fn render(catalog: &Catalog, group: &str) -> FileListing {
    let mut listing = FileListing {
        group: group.to_string(),
        ..FileListing::default()
    };
    let mut counter: u32 = 1;

    for row in catalog.rows_in_group(group) {
        let mut actions = Vec::new();
        let links = [
            (LinkKind::System, row.system_link),
            (LinkKind::File, row.file_link),
        ];
        for (kind, link) in links {
            if let Some(url) = link {
                listing.actions.insert(counter, url);
                actions.push(Action { key: counter, kind });
                counter += 1;
            }
        }
        listing.entries.push(FileEntry {
            name: row.file_name,
            description: row.description,
            actions,
        });
    }
    trace!(
        "Listing for {group}: {} entries, {} actions",
        listing.entries.len(),
        listing.actions.len()
    );
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;

    #[test]
    fn keys_run_across_rows_system_first() {
        let catalog = catalog(&[
            ("a", "one", "", "https://sys/1", ""),
            ("b", "skip", "", "https://sys/x", "https://file/x"),
            ("a", "two", "", "https://sys/2", "https://file/2"),
        ]);
        let listing = render(&catalog, "a");

        assert_eq!(listing.entries.len(), 2);
        assert_eq!(
            listing.entries[0].actions,
            vec![Action { key: 1, kind: LinkKind::System }]
        );
        assert_eq!(
            listing.entries[1].actions,
            vec![
                Action { key: 2, kind: LinkKind::System },
                Action { key: 3, kind: LinkKind::File },
            ]
        );
        assert_eq!(listing.actions.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(listing.actions[&1], "https://sys/1");
        assert_eq!(listing.actions[&2], "https://sys/2");
        assert_eq!(listing.actions[&3], "https://file/2");
    }

    #[test]
    fn file_link_alone_takes_the_next_key() {
        let catalog = catalog(&[
            ("a", "one", "", "", "https://file/1"),
            ("a", "two", "", "https://sys/2", ""),
        ]);
        let listing = render(&catalog, "a");
        assert_eq!(listing.entries[0].actions[0], Action { key: 1, kind: LinkKind::File });
        assert_eq!(listing.entries[1].actions[0], Action { key: 2, kind: LinkKind::System });
    }

    #[test]
    fn rows_without_links_or_names_are_still_listed() {
        let catalog = catalog(&[("a", "", "about it", "", "")]);
        let listing = render(&catalog, "a");
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name, None);
        assert_eq!(listing.entries[0].description.as_deref(), Some("about it"));
        assert!(listing.entries[0].actions.is_empty());
        assert!(listing.is_empty());
    }

    #[test]
    fn unknown_group_gives_empty_action_map() {
        let catalog = catalog(&[("a", "one", "", "https://sys/1", "")]);
        let listing = render(&catalog, "zzz");
        assert!(listing.entries.is_empty());
        assert!(listing.actions.is_empty());
    }
}
