//! Batch orchestration.
//!
//! Every descriptor in the manifest is turned into geometry, then a render
//! request, then handed to the rasterizer on a bounded worker pool. Results
//! come back over a channel in completion order and are written into a
//! per-index slot, so the updated manifest always lines up with the input
//! no matter which worker finishes first. The progress callback only ever
//! runs on the calling thread.

use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use tracing::{debug, info, warn};

use crate::config::MaskConfig;
use crate::error::{BadgeError, RenderFailure, Result};
use crate::geometry::PixelGeometry;
use crate::manifest::{IconSetManifest, ImageDescriptor};
use crate::render::{Rasterizer, RenderRequest};

/// How many render operations may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One worker per available CPU.
    #[default]
    Auto,
    /// Everything runs on the calling thread, in manifest order.
    Sequential,
    /// At most this many workers.
    Limited(NonZeroUsize),
}

impl From<Option<usize>> for Concurrency {
    /// `None` picks the host default, `Some(0)` runs sequentially.
    fn from(jobs: Option<usize>) -> Self {
        match jobs {
            None => Concurrency::Auto,
            Some(n) => NonZeroUsize::new(n).map_or(Concurrency::Sequential, Concurrency::Limited),
        }
    }
}

/// A progress report. `current` is `None` for the initial report and the
/// manifest index of the finished image afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: Option<usize>,
    pub total: usize,
}

/// One run over an icon set.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Directory holding the source images.
    pub source_dir: &'a Path,
    /// Directory rendered images are written to. Must already exist.
    pub output_dir: &'a Path,
    pub config: &'a MaskConfig,
    pub concurrency: Concurrency,
}

type Outcome = Result<String>;

/// One rasterizer call. Slots that list the same source file share a job,
/// so no two workers ever write the same destination.
#[derive(Debug)]
struct Job<'m> {
    name: &'m str,
    /// `(manifest index, descriptor)`; the first entry drives the geometry.
    members: Vec<(usize, &'m ImageDescriptor)>,
}

impl<'m> Job<'m> {
    fn plan(manifest: &'m IconSetManifest) -> Vec<Job<'m>> {
        let mut jobs: Vec<Job<'m>> = Vec::new();
        for (index, descriptor) in manifest.images.iter().enumerate() {
            let Some(name) = descriptor.filename.as_deref() else {
                continue;
            };
            match jobs.iter_mut().find(|job| job.name == name) {
                Some(job) => job.members.push((index, descriptor)),
                None => jobs.push(Job {
                    name,
                    members: vec![(index, descriptor)],
                }),
            }
        }
        jobs
    }
}

impl<'a> Batch<'a> {
    pub fn new(source_dir: &'a Path, output_dir: &'a Path, config: &'a MaskConfig) -> Self {
        Self {
            source_dir,
            output_dir,
            config,
            concurrency: Concurrency::Auto,
        }
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Render every image and return the manifest with rewritten filenames.
    ///
    /// Descriptors without a filename are carried through untouched, and
    /// descriptors sharing a filename are rendered once. A malformed
    /// descriptor aborts the run and stops further dispatch; rasterizer
    /// failures are collected and reported together once all in-flight
    /// work has drained.
    pub fn run<R, F>(
        &self,
        mut manifest: IconSetManifest,
        rasterizer: &R,
        mut on_progress: F,
    ) -> Result<IconSetManifest>
    where
        R: Rasterizer + ?Sized,
        F: FnMut(Progress),
    {
        let jobs = Job::plan(&manifest);

        let total: usize = jobs.iter().map(|job| job.members.len()).sum();
        info!(total, jobs = jobs.len(), concurrency = ?self.concurrency, "starting batch");
        on_progress(Progress {
            current: None,
            total,
        });

        // Per-index result: the new filename, or the failure reason.
        let mut slots: Vec<Option<std::result::Result<String, String>>> = Vec::new();
        slots.resize_with(manifest.len(), || None);
        let mut fatal: Option<BadgeError> = None;

        let mut record = |job: &Job, outcome: Outcome, fatal: &mut Option<BadgeError>| {
            for &(index, _) in &job.members {
                on_progress(Progress {
                    current: Some(index),
                    total,
                });
            }
            let result = match outcome {
                Err(e) if e.is_fatal() => {
                    if fatal.is_none() {
                        *fatal = Some(e);
                    }
                    return;
                }
                Ok(filename) => Ok(filename),
                Err(e) => Err(e.to_string()),
            };
            for &(index, _) in &job.members {
                slots[index] = Some(result.clone());
            }
        };

        match self.concurrency {
            Concurrency::Sequential => {
                for job in &jobs {
                    let outcome = self.process(job, rasterizer);
                    record(job, outcome, &mut fatal);
                    if fatal.is_some() {
                        break;
                    }
                }
            }
            Concurrency::Auto | Concurrency::Limited(_) => {
                let pool = self.build_thread_pool()?;
                let abort = AtomicBool::new(false);
                let (tx, rx) = mpsc::channel::<(usize, Outcome)>();

                pool.in_place_scope(|scope| {
                    for (position, job) in jobs.iter().enumerate() {
                        let tx = tx.clone();
                        let abort = &abort;
                        scope.spawn(move |_| {
                            if abort.load(Ordering::SeqCst) {
                                debug!(file = job.name, "skipping after fatal error");
                                return;
                            }
                            let outcome = self.process(job, rasterizer);
                            if matches!(&outcome, Err(e) if e.is_fatal()) {
                                abort.store(true, Ordering::SeqCst);
                            }
                            // The receiver outlives every worker.
                            let _ = tx.send((position, outcome));
                        });
                    }
                    drop(tx);

                    for (position, outcome) in rx {
                        record(&jobs[position], outcome, &mut fatal);
                    }
                });
            }
        }

        if let Some(err) = fatal {
            return Err(err);
        }

        let mut failures = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(filename)) => manifest.set_filename(index, filename),
                Some(Err(reason)) => {
                    let filename = manifest.images[index]
                        .filename
                        .clone()
                        .unwrap_or_default();
                    warn!(index, %filename, error = %reason, "image failed");
                    failures.push(RenderFailure {
                        index,
                        filename,
                        reason,
                    });
                }
                None => {}
            }
        }

        if !failures.is_empty() {
            return Err(BadgeError::BatchFailed { failures });
        }

        info!(total, "batch finished");
        Ok(manifest)
    }

    /// Geometry, request, rasterize, verify. Returns the new filename.
    fn process<R: Rasterizer + ?Sized>(&self, job: &Job, rasterizer: &R) -> Outcome {
        let (lead, descriptor) = job.members[0];
        let (width, height) = descriptor.pixel_size(lead)?;
        for &(index, other) in &job.members[1..] {
            other.pixel_size(index)?;
        }

        let geometry = PixelGeometry::compute(width, height, self.config);
        let request = RenderRequest::build(
            &self.source_dir.join(job.name),
            self.output_dir,
            &geometry,
            self.config,
        )?;

        // A file left by an earlier run must not pass for this run's output.
        match fs::remove_file(&request.destination) {
            Ok(()) => debug!(destination = %request.destination.display(), "removed stale output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BadgeError::Render {
                    filename: request.filename,
                    reason: format!("could not replace existing output: {}", e),
                })
            }
        }

        debug!(index = lead, width, height, destination = %request.destination.display(), "rendering");
        rasterizer.rasterize(&request)?;

        if !request.destination.is_file() {
            return Err(BadgeError::Render {
                filename: request.filename,
                reason: "rasterizer produced no output file".to_string(),
            });
        }

        Ok(request.filename)
    }

    fn build_thread_pool(&self) -> Result<rayon::ThreadPool> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Concurrency::Limited(n) = self.concurrency {
            builder = builder.num_threads(n.get());
        }
        builder.build().map_err(|e| BadgeError::Configuration {
            message: format!("failed to build worker pool: {}", e),
            help: None,
        })
    }
}
