//! Writing embeddings to caller-chosen locations.
//!
//! Structured output is whatever the engine wrote during its run, so
//! persisting it again means relocating that file instead of recomputing.
//! Text output is always rewritten from the cached embeddings.

use motif_core::{keys, Result};
use motif_storage::{write_text_lines, StoragePath};
use tracing::{debug, info};

use crate::cache::ResultCache;

impl ResultCache {
    /// Persist embeddings in the engine's structured format at `path`.
    ///
    /// If embeddings are already cached, the engine's output file is renamed
    /// to `path` and, if it actually moved, the cached embeddings are
    /// dropped; nothing is recomputed.
    /// Otherwise output is pointed at `path` and the embeddings are
    /// materialized, relocating the output if a previously cached run wrote
    /// it elsewhere.
    ///
    /// # Errors
    /// Storage failures are returned unchanged.
    pub fn persist_structured(&mut self, path: impl Into<StoragePath>) -> Result<()> {
        let target = path.into();

        if self.embeddings.is_some() {
            if let Some(current) = self.engine_output.clone() {
                if self.relocate(&current, &target)? {
                    self.embeddings = None;
                }
                return Ok(());
            }
        }

        self.config.set(keys::OUTPUT_PATH, target.as_str());
        self.embeddings()?;

        if let Some(current) = self.engine_output.clone() {
            self.relocate(&current, &target)?;
        }
        Ok(())
    }

    /// Move the engine's output file. Returns whether anything moved.
    fn relocate(&mut self, current: &StoragePath, target: &StoragePath) -> Result<bool> {
        if current.same_location(target) {
            debug!(path = %target, "Structured output already in place");
            return Ok(false);
        }

        self.session().storage().rename(current, target)?;
        info!(from = %current, to = %target, "Relocated structured output");

        self.engine_output = Some(target.clone());
        self.config.set(keys::OUTPUT_PATH, target.as_str());
        Ok(true)
    }

    /// Write embeddings as text at `path`, one embedding per line with its
    /// words separated by spaces. Returns the number of lines written.
    ///
    /// The file is rewritten on every call.
    pub fn persist_text(&mut self, path: impl Into<StoragePath>) -> Result<usize> {
        let target = path.into();
        let embeddings = self.embeddings()?;

        let lines = write_text_lines(
            self.session().storage().as_ref(),
            &target,
            embeddings.to_output_lines(),
        )?;
        info!(path = %target, lines, "Wrote text output");
        Ok(lines)
    }
}
