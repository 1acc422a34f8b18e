//! Isolated project directories and event recording.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

use hobbes::domain::ports::{BuildEvent, BuildEventSink};
use tempfile::TempDir;

use super::fixtures::{BUTTON_MANIFEST, CARD_MANIFEST, TSCONFIG};

/// A temporary project root
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    /// Empty project with only a `tsconfig.json`
    pub fn new() -> Self {
        let project = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        project.write("tsconfig.json", TSCONFIG);
        project
    }

    /// Project with a button and a card component
    pub fn with_components() -> Self {
        let project = Self::new();
        project.write("src/button/button.component.json", BUTTON_MANIFEST);
        project.write("src/card/card.component.json", CARD_MANIFEST);
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Run the `hobbes` binary from the project root
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_hobbes"))
            .args(args)
            .current_dir(self.root())
            .env_remove("HOBBES_LOG")
            .env_remove("HOBBES_SRC_DIR")
            .env_remove("HOBBES_JSON")
            .env_remove("HOBBES_WATCH_TIMEOUT_MS")
            .output()
            .unwrap()
    }
}

/// Event sink that records every event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BuildEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&BuildEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl BuildEventSink for RecordingSink {
    fn on_event(&self, event: BuildEvent) {
        self.events.lock().unwrap().push(event);
    }
}
