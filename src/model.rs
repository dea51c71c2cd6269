use std::time::Duration;

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

use crate::browser::Launcher;
use crate::catalog::{Catalog, list_groups, resolve};
use crate::domain::{
    FAREWELL, GROUP_NOT_FOUND, HEADER_ACTIONS, HEADER_FILE_NAME, HEADER_GROUPS, HINT_BACK,
    HINT_EXIT, INTERRUPTED, INVALID_CHOICE, LABEL_FILE, LABEL_SYSTEM, Message, NO_FILES,
    NO_LINKS, NO_NAME, OPENING, PROMPT_ACK, PROMPT_FILE, PROMPT_GROUP, Settings, TITLE_FILES,
    TITLE_GROUPS, YaalaError,
};
use crate::inputter::{InputResult, Inputter};
use crate::listing::{FileListing, LinkKind, render};
use crate::text::Shaper;

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    GroupMenu,
    FileMenu(FileListing),
    /// A group without any link; waits for Enter and goes back to the groups.
    EmptyGroup(FileListing),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AfterPause {
    GroupMenu,
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pause {
    delay: Duration,
    after: AfterPause,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewKind {
    Groups,
    Files,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UIRow {
    pub cells: Vec<String>,
    /// Secondary line (file description) rendered dimmed under its row.
    pub annotation: bool,
}

/// Everything the UI needs for one frame, already shaped for display.
#[derive(Debug, Clone, PartialEq)]
pub struct UIData {
    pub kind: ViewKind,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<UIRow>,
    pub hint: String,
    pub prompt: String,
    pub cmdinput: InputResult,
    pub status: Option<StatusLine>,
}

impl UIData {
    fn empty() -> Self {
        UIData {
            kind: ViewKind::Groups,
            title: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            hint: String::new(),
            prompt: String::new(),
            cmdinput: InputResult::default(),
            status: None,
        }
    }
}

pub struct Model {
    settings: Settings,
    pub status: Status,
    catalog: Catalog,
    screen: Screen,
    groups: Vec<String>,
    input: Inputter,
    last_input: InputResult,
    status_line: Option<StatusLine>,
    pause: Option<Pause>,
    launcher: Box<dyn Launcher>,
    shaper: Shaper,
    farewell: Option<String>,
    uidata: UIData,
}

impl Model {
    pub fn init(
        catalog: Catalog,
        settings: &Settings,
        launcher: Box<dyn Launcher>,
        shaper: Shaper,
    ) -> Self {
        let mut model = Self {
            settings: settings.clone(),
            status: Status::Ready,
            catalog,
            screen: Screen::GroupMenu,
            groups: Vec::new(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            status_line: None,
            pause: None,
            launcher,
            shaper,
            farewell: None,
            uidata: UIData::empty(),
        };
        model.show_groups();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    /// Farewell notice to print once the terminal is restored.
    pub fn farewell(&self) -> Option<&str> {
        self.farewell.as_deref()
    }

    /// How long the current message should stay on screen before `settle`.
    pub fn pending_pause(&self) -> Option<Duration> {
        self.pause.map(|p| p.delay)
    }

    /// Finish a paused transition: drop the message and move on.
    pub fn settle(&mut self) {
        let Some(pause) = self.pause.take() else {
            return;
        };
        self.status_line = None;
        match pause.after {
            AfterPause::GroupMenu => self.show_groups(),
            AfterPause::Refresh => match &self.screen {
                Screen::FileMenu(listing) => {
                    // Rebuild the listing so the action map is fresh
                    let group = listing.group.clone();
                    self.show_files(&group);
                }
                _ => self.update_uidata(),
            },
        }
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), YaalaError> {
        if let Some(msg) = message {
            trace!("Update: screen {:?}, message {:?}", self.screen_name(), msg);
            match msg {
                Message::Interrupt => self.quit(INTERRUPTED),
                Message::RawKey(key) => self.raw_input(key),
            }
        }
        Ok(())
    }

    fn screen_name(&self) -> &'static str {
        match self.screen {
            Screen::GroupMenu => "groups",
            Screen::FileMenu(_) => "files",
            Screen::EmptyGroup(_) => "empty-group",
        }
    }

    fn quit(&mut self, notice: &str) {
        info!("Quitting");
        self.farewell = Some((self.shaper)(notice));
        self.status = Status::Quitting;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.pause.is_some() {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            let submitted = self.last_input.clone();
            self.input.clear();
            self.last_input = self.input.get();
            if submitted.canceled {
                self.cancel();
            } else {
                self.submit(submitted.input.trim());
            }
        }
        self.uidata.cmdinput = self.last_input.clone();
    }

    fn cancel(&mut self) {
        match self.screen {
            Screen::GroupMenu => self.update_uidata(),
            Screen::FileMenu(_) | Screen::EmptyGroup(_) => self.show_groups(),
        }
    }

    fn submit(&mut self, input: &str) {
        match &self.screen {
            Screen::GroupMenu => self.select_group(input),
            Screen::FileMenu(listing) => {
                let listing = listing.clone();
                self.select_action(&listing, input);
            }
            Screen::EmptyGroup(_) => self.show_groups(),
        }
    }

    fn select_group(&mut self, input: &str) {
        if input == "0" {
            self.quit(FAREWELL);
            return;
        }
        match resolve(input, &self.groups) {
            Some(group) => {
                debug!(%input, %group, "Group selected");
                self.show_files(&group);
            }
            None => {
                debug!(%input, "No group matches input");
                self.flash(GROUP_NOT_FOUND, Tone::Error);
                self.pause = Some(Pause {
                    delay: self.settings.error_pause(),
                    after: AfterPause::GroupMenu,
                });
            }
        }
    }

    fn select_action(&mut self, listing: &FileListing, input: &str) {
        let choice = if input.is_empty() {
            Ok(0)
        } else {
            input.parse::<u32>()
        };
        match choice {
            Ok(0) => self.show_groups(),
            Ok(key) if listing.actions.contains_key(&key) => {
                let url = &listing.actions[&key];
                self.launcher.launch(url);
                self.status_line = Some(StatusLine {
                    text: format!("{} {url}", (self.shaper)(OPENING)),
                    tone: Tone::Success,
                });
                self.pause = Some(Pause {
                    delay: self.settings.message_pause(),
                    after: AfterPause::Refresh,
                });
                self.update_uidata();
            }
            _ => {
                debug!(%input, "Invalid action choice");
                self.flash(INVALID_CHOICE, Tone::Error);
                self.pause = Some(Pause {
                    delay: self.settings.message_pause(),
                    after: AfterPause::Refresh,
                });
            }
        }
    }

    fn flash(&mut self, text: &str, tone: Tone) {
        self.status_line = Some(StatusLine {
            text: (self.shaper)(text),
            tone,
        });
        self.update_uidata();
    }

    fn show_groups(&mut self) {
        self.groups = list_groups(&self.catalog);
        self.screen = Screen::GroupMenu;
        self.status_line = None;
        self.update_uidata();
    }

    fn show_files(&mut self, group: &str) {
        let listing = render(&self.catalog, group);
        if listing.is_empty() {
            debug!(%group, "Group has nothing to open");
            self.screen = Screen::EmptyGroup(listing);
            self.status_line = Some(StatusLine {
                text: (self.shaper)(NO_FILES),
                tone: Tone::Error,
            });
        } else {
            self.screen = Screen::FileMenu(listing);
        }
        self.update_uidata();
    }

    fn update_uidata(&mut self) {
        let shape = self.shaper;
        self.uidata = match &self.screen {
            Screen::GroupMenu => UIData {
                kind: ViewKind::Groups,
                title: shape(TITLE_GROUPS),
                headers: vec![shape(HEADER_GROUPS)],
                rows: self
                    .groups
                    .iter()
                    .map(|g| UIRow {
                        cells: vec![shape(g)],
                        annotation: false,
                    })
                    .collect(),
                hint: shape(HINT_EXIT),
                prompt: shape(PROMPT_GROUP),
                cmdinput: self.last_input.clone(),
                status: self.status_line.clone(),
            },
            Screen::FileMenu(listing) | Screen::EmptyGroup(listing) => {
                let prompt = match self.screen {
                    Screen::EmptyGroup(_) => PROMPT_ACK,
                    _ => PROMPT_FILE,
                };
                UIData {
                    kind: ViewKind::Files,
                    title: shape(&format!("{TITLE_FILES} {} 📂", listing.group)),
                    headers: vec![shape(HEADER_FILE_NAME), shape(HEADER_ACTIONS)],
                    rows: Self::file_rows(listing, shape),
                    hint: shape(HINT_BACK),
                    prompt: shape(prompt),
                    cmdinput: self.last_input.clone(),
                    status: self.status_line.clone(),
                }
            }
        };
    }

    fn file_rows(listing: &FileListing, shape: Shaper) -> Vec<UIRow> {
        let mut rows = Vec::with_capacity(listing.entries.len() * 2);
        for entry in &listing.entries {
            let name = shape(entry.name.as_deref().unwrap_or(NO_NAME));
            let actions = if entry.actions.is_empty() {
                shape(NO_LINKS)
            } else {
                entry
                    .actions
                    .iter()
                    .map(|action| {
                        let label = match action.kind {
                            LinkKind::System => LABEL_SYSTEM,
                            LinkKind::File => LABEL_FILE,
                        };
                        format!("[{}] {}", action.key, shape(label))
                    })
                    .collect::<Vec<String>>()
                    .join("  |  ")
            };
            rows.push(UIRow {
                cells: vec![name, actions],
                annotation: false,
            });
            if let Some(description) = &entry.description {
                rows.push(UIRow {
                    cells: vec![format!("└─ {}", shape(description)), String::new()],
                    annotation: true,
                });
            }
        }
        rows
    }
}
