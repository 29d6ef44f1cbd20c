// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures shared by the batch crate's unit tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use parking_lot::Mutex;
use pdfzipper_core::error::Result;
use pdfzipper_core::{AssemblyResult, ConversionOptions, FolderJob};
use pdfzipper_document::PageProgress;

use crate::cancel::CancellationToken;
use crate::progress::ProgressSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RunStarted(usize),
    FolderStarted(String),
    Page { folder: String, done: usize, total: usize },
    FolderFinished { folder: String, completed: usize, total: usize, ok: bool },
    RunFinished,
}

/// Callback a [`RecordingSink`] panics in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicAt {
    Start,
    Page,
    Finish,
}

/// Progress sink that records every event, optionally cancelling after a
/// number of finished folders or panicking for a named folder.
#[derive(Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Event>>>,
    cancel_after: Option<(usize, CancellationToken)>,
    panic_in: Option<(String, PanicAt)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(completed: usize, token: CancellationToken) -> Self {
        Self {
            cancel_after: Some((completed, token)),
            ..Self::default()
        }
    }

    pub fn panicking_in(folder: &str, at: PanicAt) -> Self {
        Self {
            panic_in: Some((folder.to_string(), at)),
            ..Self::default()
        }
    }

    fn panics(&self, folder: &str, at: PanicAt) -> bool {
        self.panic_in
            .as_ref()
            .is_some_and(|(name, when)| name == folder && *when == at)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn pages_for(&self, folder: &str) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Page { folder: f, done, total } if f == folder => Some((done, total)),
                _ => None,
            })
            .collect()
    }

    pub fn finished_counts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::FolderFinished { completed, .. } => Some(completed),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn run_started(&self, total: usize) {
        self.events.lock().push(Event::RunStarted(total));
    }

    fn folder_started(&self, job: &FolderJob) -> Box<dyn PageProgress + Send> {
        if self.panics(job.name(), PanicAt::Start) {
            panic!("injected failure starting {}", job.name());
        }
        self.events
            .lock()
            .push(Event::FolderStarted(job.name().to_string()));
        Box::new(PageRecorder {
            folder: job.name().to_string(),
            events: Arc::clone(&self.events),
            panic: self.panics(job.name(), PanicAt::Page),
        })
    }

    fn folder_finished(
        &self,
        job: &FolderJob,
        completed: usize,
        total: usize,
        result: &Result<AssemblyResult>,
    ) {
        if self.panics(job.name(), PanicAt::Finish) {
            panic!("injected failure finishing {}", job.name());
        }
        self.events.lock().push(Event::FolderFinished {
            folder: job.name().to_string(),
            completed,
            total,
            ok: result.is_ok(),
        });
        if let Some((after, token)) = &self.cancel_after {
            if completed >= *after {
                token.cancel();
            }
        }
    }

    fn run_finished(&self) {
        self.events.lock().push(Event::RunFinished);
    }
}

struct PageRecorder {
    folder: String,
    events: Arc<Mutex<Vec<Event>>>,
    panic: bool,
}

impl PageProgress for PageRecorder {
    fn page_done(&mut self, _image: &Path, done: usize, total: usize) {
        if self.panic {
            panic!("injected failure in {}", self.folder);
        }
        self.events.lock().push(Event::Page {
            folder: self.folder.clone(),
            done,
            total,
        });
    }
}

/// Scratch input/output tree under a temporary directory.
pub struct Workspace {
    pub root: tempfile::TempDir,
    pub options: ConversionOptions,
}

impl Workspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let input = root.path().join("InputImages");
        std::fs::create_dir_all(&input).expect("input dir");
        let options = ConversionOptions {
            input_folder: input,
            output_folder: root.path().join("OutputPDFs"),
            ..Default::default()
        };
        Self { root, options }
    }

    /// Create `<input>/<name>` holding `pages` small JPEGs `p1.jpg`...
    pub fn folder(&self, name: &str, pages: usize) -> PathBuf {
        let dir = self.options.input_folder.join(name);
        std::fs::create_dir_all(&dir).expect("folder");
        for page in 1..=pages {
            write_jpeg(&dir.join(format!("p{page}.jpg")), 12, 16);
        }
        dir
    }

    /// Create `<input>/<name>` whose second page is not a decodable JPEG.
    pub fn corrupt_folder(&self, name: &str) -> PathBuf {
        let dir = self.folder(name, 1);
        std::fs::write(dir.join("p2.jpg"), b"definitely not a jpeg").expect("corrupt page");
        dir
    }

    pub fn job(&self, name: &str) -> FolderJob {
        let dir = self.options.input_folder.join(name);
        let mut images: Vec<PathBuf> = std::fs::read_dir(&dir)
            .expect("read_dir")
            .map(|entry| entry.expect("entry").path())
            .collect();
        images.sort();
        FolderJob::new(dir, images)
    }

    pub fn output_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.options.output_folder) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, Rgb([120, 140, 160]))
        .save(path)
        .expect("write jpeg");
}
