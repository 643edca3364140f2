//! Numbered image sequence detection.
//!
//! A directory is an image sequence when enough of its files are named by a bare
//! page number (`001.jpg`, `2.png`, ...) and those numbers look like an ordered
//! run rather than a handful of unrelated pictures.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

/// Minimum number of numbered images before a directory is even considered.
const MIN_SEQUENCE_FILES: usize = 2;
/// A run of this many consecutive steps (3 files) is accepted outright.
const MIN_CONSECUTIVE_RUN: usize = 2;
/// Otherwise the numbers must cover more than this fraction of their span.
const MIN_COVERAGE: f64 = 0.8;

lazy_static! {
    /// Bare page number with optional leading zeros and a recognized image extension.
    pub static ref PAGE_NAME_REGEX: Regex =
        Regex::new(r"(?i)^0*(\d+)\.(jpg|jpeg|png|gif|bmp|webp)$").unwrap();
}

/// Statistics the acceptance heuristic is based on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceStats {
    /// Longest run of sorted indices where each is exactly one more than the previous.
    pub max_consecutive_run: usize,
    /// Fraction of the integer span `min..=max` that is actually present.
    pub coverage: f64,
}

impl SequenceStats {
    /// Computes the statistics for a list of page indices.
    ///
    /// Duplicated indices stay in the sorted list and break a run, as two files
    /// claiming the same page are not a step forward. Coverage only counts
    /// distinct indices. Returns `None` for an empty list.
    pub fn from_indices(indices: &[u64]) -> Option<Self> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();

        let min = *sorted.first()?;
        let max = *sorted.last()?;

        let mut run = 0;
        let mut max_consecutive_run = 0;
        for pair in sorted.windows(2) {
            if pair[0].checked_add(1) == Some(pair[1]) {
                run += 1;
                max_consecutive_run = max_consecutive_run.max(run);
            } else {
                run = 0;
            }
        }

        let distinct = sorted.iter().collect::<BTreeSet<_>>().len();
        let span = (max - min) as f64 + 1.0;

        Some(Self {
            max_consecutive_run,
            coverage: distinct as f64 / span,
        })
    }

    pub fn is_accepted(&self) -> bool {
        self.max_consecutive_run >= MIN_CONSECUTIVE_RUN || self.coverage > MIN_COVERAGE
    }
}

/// Decides whether a set of page indices forms a plausible sequence.
pub fn is_sequence(indices: &[u64]) -> bool {
    indices.len() >= MIN_SEQUENCE_FILES
        && SequenceStats::from_indices(indices).is_some_and(|stats| stats.is_accepted())
}

/// Parses the page index out of a file name, if it is a bare numbered image.
pub fn page_index(file_name: &str) -> Option<u64> {
    PAGE_NAME_REGEX
        .captures(file_name)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
}

/// Lists the numbered images directly inside `directory` as `(index, path)` pairs,
/// sorted by index and then by file name.
pub fn collect_numbered_images(directory: &Path) -> io::Result<Vec<(u64, PathBuf)>> {
    let mut images = Vec::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(index) = page_index(file_name) {
            images.push((index, path));
        }
    }

    images.sort_by(|(ai, ap), (bi, bp)| ai.cmp(bi).then_with(|| ap.file_name().cmp(&bp.file_name())));
    Ok(images)
}

/// Returns the images of `directory` in page order if they form a sequence.
///
/// Unreadable directories are simply not sequences; nothing is logged for them.
pub fn detect_sequence(directory: &Path) -> Option<Vec<PathBuf>> {
    let images = collect_numbered_images(directory).ok()?;
    if images.len() < MIN_SEQUENCE_FILES {
        return None;
    }

    let indices: Vec<u64> = images.iter().map(|(index, _)| *index).collect();
    if !is_sequence(&indices) {
        return None;
    }

    Some(images.into_iter().map(|(_, path)| path).collect())
}
