//! Line oriented extraction from tool logs.
//!
//! A [`LineScanner`] looks for a trigger line and hands either the trigger itself or the line
//! following it to the caller.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Exact(&'static str),
    Prefix(&'static str),
    Contains(&'static str),
}

impl Trigger {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Exact(pattern) => line == *pattern,
            Self::Prefix(pattern) => line.starts_with(pattern),
            Self::Contains(pattern) => line.contains(pattern),
        }
    }

    /// whether any line of `text` matches
    pub fn occurs_in(&self, text: &str) -> bool {
        text.lines().any(|line| self.matches(line))
    }
}

/// Which line is captured once the trigger matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Trigger,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Seeking,
    Capturing,
}

#[derive(Debug, Clone)]
pub struct LineScanner {
    trigger: Trigger,
    capture: Capture,
    state: ScanState,
}

impl LineScanner {
    pub fn new(trigger: Trigger, capture: Capture) -> Self {
        Self {
            trigger,
            capture,
            state: ScanState::Seeking,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Feed a single line (without line terminator), returns it if it is captured
    pub fn feed<'l>(&mut self, line: &'l str) -> Option<&'l str> {
        match self.state {
            ScanState::Seeking if self.trigger.matches(line) => match self.capture {
                Capture::Trigger => Some(line),
                Capture::Next => {
                    self.state = ScanState::Capturing;
                    None
                }
            },
            ScanState::Seeking => None,
            ScanState::Capturing => {
                self.state = ScanState::Seeking;
                Some(line)
            }
        }
    }

    /// All captured lines of `text` with their 1-based line number
    pub fn scan<'l>(&mut self, text: &'l str) -> Vec<(usize, &'l str)> {
        text.lines()
            .enumerate()
            .filter_map(|(index, line)| self.feed(line).map(|captured| (index + 1, captured)))
            .collect()
    }
}
