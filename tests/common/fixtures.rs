#![allow(dead_code)]

use recon::model::{NewBug, Priority, Resolution, Severity, Status};

pub fn bug(summary: &str) -> NewBug {
    NewBug::new(summary)
}

pub struct BugBuilder {
    bug: NewBug,
}

impl BugBuilder {
    pub fn new(summary: &str) -> Self {
        Self { bug: bug(summary) }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.bug.severity = severity;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.bug.priority = priority;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.bug.status = status;
        self
    }

    pub fn assignee(mut self, name: &str) -> Self {
        self.bug.assignee_name = Some(name.to_string());
        self
    }

    pub fn reporter(mut self, name: &str) -> Self {
        self.bug.reporter_name = Some(name.to_string());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.bug.description = Some(text.to_string());
        self
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.bug.resolution = Some(resolution);
        self
    }

    pub fn build(self) -> NewBug {
        self.bug
    }
}
