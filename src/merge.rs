//! # Merge Strategies
//!
//! How a [`SliceFs`](crate::SliceFs) turns the raw entries of each layer into
//! one directory listing.
//!
//! A strategy has two steps:
//!
//! 1. [`annotate`](MergeStrategy::annotate) runs once per layer on that
//!    layer's raw entries.
//! 2. [`filter`](MergeStrategy::filter) runs once on the concatenation of
//!    every layer's annotated entries.
//!
//! | Strategy | Annotate | Filter |
//! |----------|----------|--------|
//! | [`PlainMerge`] | directories re-open through the composite | identity |
//! | [`LanguageAwareMerge`] | as above, plus `lang`/`weight`/`translation_base_name` on files | drop lower-weight duplicates |

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::{
    FileInfo, FileMeta, Fs, Languages, Opener, decorate_file_info, lang_info_from, weight_for,
};

/// Per-layer annotation and global filtering of merged directory listings.
pub trait MergeStrategy: Send + Sync + fmt::Debug {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Decorate the raw entries `layer` returned for directory `dir`.
    ///
    /// `composite` is the filesystem directories must be re-opened through.
    fn annotate(
        &self,
        composite: &Arc<dyn Fs>,
        layer: &FileMeta,
        dir: &Path,
        entries: Vec<FileInfo>,
    ) -> Vec<FileInfo>;

    /// Filter the concatenated entries of all layers.
    fn filter(&self, entries: Vec<FileInfo>) -> Vec<FileInfo>;
}

/// Bind a directory entry to the composite, so opening it again merges
/// across layers instead of reading only the layer it came from.
pub(crate) fn open_through(composite: &Arc<dyn Fs>, dir: &Path, info: FileInfo) -> FileInfo {
    let name = dir.join(&info.name);
    decorate_file_info(
        Some(composite.clone()),
        Some(Opener::new(composite.clone(), name)),
        info,
        Path::new(""),
        Path::new(""),
        None,
    )
}

/// Ordered merge without deduplication.
///
/// For layers that are disjoint, or where duplicates are acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMerge;

impl MergeStrategy for PlainMerge {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn annotate(
        &self,
        composite: &Arc<dyn Fs>,
        _layer: &FileMeta,
        dir: &Path,
        entries: Vec<FileInfo>,
    ) -> Vec<FileInfo> {
        entries
            .into_iter()
            .map(|fi| {
                if fi.is_dir() {
                    open_through(composite, dir, fi)
                } else {
                    fi
                }
            })
            .collect()
    }

    fn filter(&self, entries: Vec<FileInfo>) -> Vec<FileInfo> {
        entries
    }
}

/// Merge that picks the right language variant of duplicated files.
///
/// Files get a language and weight from their name and their layer (see
/// [`weight_for`](crate::weight_for)). When the same file name appears more
/// than once, the first occurrence with the highest positive weight is kept
/// and every other file of that name is dropped. Names that only ever carry
/// weight 0, and all directories, are left alone.
#[derive(Debug, Clone, Default)]
pub struct LanguageAwareMerge {
    languages: Languages,
}

impl LanguageAwareMerge {
    /// Create a strategy recognizing `languages` in filenames.
    pub fn new(languages: Languages) -> Self {
        Self { languages }
    }

    /// The recognized languages.
    pub fn languages(&self) -> &Languages {
        &self.languages
    }
}

impl MergeStrategy for LanguageAwareMerge {
    fn name(&self) -> &'static str {
        "language"
    }

    fn annotate(
        &self,
        composite: &Arc<dyn Fs>,
        layer: &FileMeta,
        dir: &Path,
        entries: Vec<FileInfo>,
    ) -> Vec<FileInfo> {
        let layer_lang = layer.lang().unwrap_or_default();
        entries
            .into_iter()
            .map(|fi| {
                if fi.is_dir() {
                    return open_through(composite, dir, fi);
                }
                let info = lang_info_from(&self.languages, &fi.name);
                let (weight, lang) = weight_for(info.lang.as_deref(), layer_lang);
                let patch = FileMeta::new()
                    .with_lang(lang)
                    .with_weight(weight)
                    .with_translation_base_name(info.translation_base_name);
                decorate_file_info(None, None, fi, Path::new(""), Path::new(""), Some(patch))
            })
            .collect()
    }

    fn filter(&self, entries: Vec<FileInfo>) -> Vec<FileInfo> {
        let mut keep: HashMap<&str, (usize, i32)> = HashMap::new();
        for (i, fi) in entries.iter().enumerate() {
            if fi.is_dir() {
                continue;
            }
            let weight = fi.weight();
            if weight <= 0 {
                continue;
            }
            match keep.get(fi.name.as_str()) {
                Some(&(_, kept)) if weight <= kept => {}
                _ => {
                    keep.insert(&fi.name, (i, weight));
                }
            }
        }

        if keep.is_empty() {
            return entries;
        }

        let removed: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(i, fi)| {
                !fi.is_dir()
                    && keep
                        .get(fi.name.as_str())
                        .is_some_and(|&(kept, _)| kept != *i)
            })
            .map(|(i, _)| i)
            .collect();

        for &i in &removed {
            let fi = &entries[i];
            tracing::trace!(name = %fi.name, weight = fi.weight(), "dropping duplicate");
        }

        entries
            .into_iter()
            .enumerate()
            .filter(|(i, _)| removed.binary_search(i).is_err())
            .map(|(_, fi)| fi)
            .collect()
    }
}
