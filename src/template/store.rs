//! The fixed set of markers the agent looks for.
//!
//! Each marker is loaded once at startup. A missing, unreadable or unusable
//! file degrades that marker to an empty template instead of aborting.

use crate::template::Template;
#[cfg(feature = "image-io")]
use crate::trace::{trace_event, trace_warn};
#[cfg(feature = "image-io")]
use std::path::Path;

/// Semantic UI elements recognised on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Actionable entry in the task list.
    Task,
    /// Alternate rendering of an actionable task-list entry.
    TaskAlt,
    /// Duration badge anchoring one video row.
    VideoDuration,
    /// "Pass test" prompt shown while a video plays.
    PassTest,
    /// "Study complete" banner ending a video.
    StudyComplete,
    /// Badge next to a video row that was already finished.
    VideoCompleted,
}

impl Marker {
    pub const ALL: [Marker; 6] = [
        Marker::Task,
        Marker::VideoDuration,
        Marker::PassTest,
        Marker::StudyComplete,
        Marker::VideoCompleted,
        Marker::TaskAlt,
    ];

    /// Asset file name for the marker.
    pub fn file_name(self) -> &'static str {
        match self {
            Marker::Task => "1.png",
            Marker::VideoDuration => "2.png",
            Marker::PassTest => "3.png",
            Marker::StudyComplete => "4.png",
            Marker::VideoCompleted => "5.png",
            Marker::TaskAlt => "6.png",
        }
    }

    fn slot(self) -> usize {
        match self {
            Marker::Task => 0,
            Marker::VideoDuration => 1,
            Marker::PassTest => 2,
            Marker::StudyComplete => 3,
            Marker::VideoCompleted => 4,
            Marker::TaskAlt => 5,
        }
    }
}

/// Templates for every [`Marker`]; absent markers are empty templates.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    templates: [Template; 6],
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self {
            templates: Marker::ALL.map(|m| Template::empty(m.file_name())),
        }
    }
}

impl TemplateStore {
    /// Store with every marker empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the template for `marker`.
    pub fn with(mut self, marker: Marker, template: Template) -> Self {
        self.templates[marker.slot()] = template;
        self
    }

    pub fn get(&self, marker: Marker) -> &Template {
        &self.templates[marker.slot()]
    }

    /// Markers whose template could not be loaded.
    pub fn missing(&self) -> Vec<Marker> {
        Marker::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_empty())
            .collect()
    }

    /// Loads every marker's file from `dir`.
    #[cfg(feature = "image-io")]
    pub fn load_dir<P: AsRef<Path>>(dir: P, min_side: usize) -> Self {
        let dir = dir.as_ref();
        let mut store = Self::new();
        for marker in Marker::ALL {
            store.templates[marker.slot()] = load_template(&dir.join(marker.file_name()), min_side);
        }
        store
    }
}

/// Loads one template, degrading every failure to an empty template.
#[cfg(feature = "image-io")]
pub fn load_template(path: &Path, min_side: usize) -> Template {
    let name = path.display().to_string();
    if !path.exists() {
        trace_warn!("template file missing", path = name.as_str());
        return Template::empty(name);
    }
    let img = match crate::image::io::load_gray_image(path) {
        Ok(img) => img,
        Err(err) => {
            let error = err.to_string();
            trace_warn!("template failed to load", path = name.as_str(), error = error.as_str());
            return Template::empty(name);
        }
    };
    match Template::new(name.as_str(), img, min_side) {
        Ok(tpl) => {
            let (width, height) = tpl.size();
            trace_event!("template loaded", path = name.as_str(), width = width, height = height);
            tpl
        }
        Err(err) => {
            let error = err.to_string();
            trace_warn!("template rejected", path = name.as_str(), error = error.as_str());
            Template::empty(name)
        }
    }
}
