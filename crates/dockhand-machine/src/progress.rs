use std::sync::LazyLock;

use regex::Regex;

use crate::executor::{OutputLine, StreamSource};

/// `Step n/m : ...` lines emitted on stdout by the classic builder.
static STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Step (\d+)/(\d+) : ").expect("could not compile pattern"));

/// Marker on stderr announcing the next image's build phase.
const BUILDING: &str = "Building";

/// Receives progress display updates; rendering lives with the caller.
pub trait ProgressSink {
    /// Open a new display labeled `label`, sized to `total`.
    fn begin(&mut self, label: &str, total: u64);

    /// Move the active display to `step`.
    fn set(&mut self, step: u64);

    /// Discard the active display, if any.
    fn clear(&mut self);
}

/// Incremental parser over a build's interleaved stdout/stderr lines.
///
/// Tracks the `Building <image>` / `Step n/m` protocol and drives a
/// [`ProgressSink`]. Purely observational: the build's exit status
/// decides success, never this parser. A build that emits neither kind
/// of line (fully cached) opens no display at all.
pub struct BuildProgress<'a> {
    sink: &'a mut dyn ProgressSink,
    label: Option<String>,
    total: Option<u64>,
    active: bool,
}

impl<'a> BuildProgress<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            sink,
            label: None,
            total: None,
            active: false,
        }
    }

    pub fn observe(&mut self, line: &OutputLine) {
        match line.source {
            StreamSource::Stderr => self.on_stderr(&line.text),
            StreamSource::Stdout => self.on_stdout(&line.text),
        }
    }

    /// A `Building ...` line announces a stage; any running step count
    /// belongs to the previous image and is discarded.
    fn on_stderr(&mut self, text: &str) {
        let trimmed = text.trim();
        if trimmed.starts_with(BUILDING) {
            self.label = Some(trimmed.to_owned());
            self.total = None;
            if self.active {
                self.sink.clear();
                self.active = false;
            }
        }
    }

    fn on_stdout(&mut self, text: &str) {
        let Some(caps) = STEP.captures(text) else {
            return;
        };
        let (Ok(step), Ok(total)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) else {
            return;
        };

        if !self.active || self.total != Some(total) {
            if self.active {
                self.sink.clear();
            }
            self.sink.begin(self.label.as_deref().unwrap_or(BUILDING), total);
            self.active = true;
            self.total = Some(total);
        }
        self.sink.set(step);
    }
}
