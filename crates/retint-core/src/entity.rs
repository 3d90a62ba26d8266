//! Image entity lifecycle.
//!
//! An [`ImageEntity`] owns the decoded source bitmap and the derived bitmap
//! the pipeline produces from it, moving through three states:
//! `Unloaded -> Loaded -> Transformed`. A failed load collapses back to
//! `Unloaded` with both buffers released.
//!
//! Ownership is strictly exclusive: replacing either bitmap drops the
//! previous instance first, and there is never a half-released pair. The
//! derived bitmap is either absent or fully consistent with the current
//! source and options; it is rebuilt from scratch by every pipeline run,
//! never patched.

use std::path::Path;

use crate::backend::{BackendError, BitmapLoader, LoadError, RenderBackend};
use crate::config::{ConfigSource, Diagnostics};
use crate::options::{OptionKeys, TransformOptions};
use crate::pipeline;

/// A named image with its transform options and bitmap pair.
pub struct ImageEntity<B: RenderBackend> {
    name: String,
    keys: OptionKeys,
    options: TransformOptions,
    source: Option<B::Bitmap>,
    derived: Option<B::Bitmap>,
}

impl<B: RenderBackend> ImageEntity<B> {
    /// Create an unloaded entity.
    ///
    /// `keys` substitutes option names for this instance; `None` uses the
    /// shared default table. `transforms_disabled` is permanent: crop and
    /// rotation options are never parsed or applied for this entity.
    pub fn new(name: impl Into<String>, keys: Option<OptionKeys>, transforms_disabled: bool) -> Self {
        Self {
            name: name.into(),
            keys: keys.unwrap_or_default(),
            options: TransformOptions::new(transforms_disabled),
            source: None,
            derived: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn option_keys(&self) -> &OptionKeys {
        &self.keys
    }

    /// Whether a source bitmap is currently held.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// The current derived bitmap, if the pipeline has produced one.
    pub fn bitmap(&self) -> Option<&B::Bitmap> {
        self.derived.as_ref()
    }

    /// The undecorated source bitmap.
    pub fn source_bitmap(&self) -> Option<&B::Bitmap> {
        self.source.as_ref()
    }

    /// Source pixel dimensions, `(width, height)`.
    pub fn dimensions(&self, backend: &B) -> Option<(u32, u32)> {
        self.source.as_ref().map(|b| backend.dimensions(b))
    }

    /// Re-parse every option from `config` under `section`.
    ///
    /// This only updates the option record. The pipeline is not re-run;
    /// callers follow up with [`ImageEntity::load`] or
    /// [`ImageEntity::apply_transforms`] when they want the derived bitmap
    /// to reflect the new options.
    pub fn read_options<C: ConfigSource + ?Sized>(
        &mut self,
        config: &C,
        section: &str,
        diag: &dyn Diagnostics,
    ) {
        self.options.read_from(config, &self.keys, section, diag);
    }

    /// Load `path`, replacing any previous source bitmap, then run the
    /// pipeline.
    ///
    /// On decode failure the entity reverts to unloaded with both bitmaps
    /// released. A backend failure after a successful decode keeps the new
    /// source but leaves no derived bitmap until the next successful
    /// [`ImageEntity::apply_transforms`].
    pub fn load<L>(&mut self, loader: &L, backend: &B, path: &Path) -> Result<(), LoadError>
    where
        L: BitmapLoader<Bitmap = B::Bitmap>,
    {
        // The old pair goes first; a derived bitmap must never outlive the
        // source it was computed from
        self.source = None;
        self.derived = None;

        self.source = Some(loader.load(path)?);
        self.apply_transforms(backend)?;
        Ok(())
    }

    /// Re-run the transform pipeline against the current source and
    /// options.
    ///
    /// With no source loaded this clears the derived bitmap and succeeds.
    /// On a staging or materialization failure the previous derived bitmap
    /// is left untouched; release is deferred until a new bitmap exists.
    pub fn apply_transforms(&mut self, backend: &B) -> Result<(), BackendError> {
        let Some(source) = self.source.as_ref() else {
            self.derived = None;
            return Ok(());
        };

        let derived = pipeline::execute(backend, source, &self.options)?;
        self.derived = Some(derived);
        Ok(())
    }

    /// Release both bitmaps and return to the unloaded state.
    pub fn unload(&mut self) {
        self.source = None;
        self.derived = None;
    }
}
