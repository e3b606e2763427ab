use std::collections::HashMap;

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;
use tiny_skia::Pixmap;

/// Errors that can occur during texture generation
#[derive(Error, Debug, PartialEq)]
pub enum TextureGenerationError {
    #[error("Failed to generate texture")]
    GenerationFailed,
    #[error("Invalid texture dimensions")]
    InvalidDimensions,
}

/// What a texture shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// The cached bitmap of one page
    Page(usize),
    /// The floating selection with its lasso outline
    SelectionOverlay,
}

/// Uploads page bitmaps to the GPU, re-uploading only when a slot's version changes.
#[derive(Default)]
pub struct TextureManager {
    textures: HashMap<TextureSlot, (u64, TextureHandle)>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the texture for `slot`, regenerating it if `version` changed
    pub fn get_or_create_texture<F>(
        &mut self,
        slot: TextureSlot,
        version: u64,
        generator: F,
        ctx: &Context,
    ) -> Result<TextureId, TextureGenerationError>
    where
        F: FnOnce() -> Result<ColorImage, TextureGenerationError>,
    {
        if let Some((cached, handle)) = self.textures.get_mut(&slot) {
            if *cached != version {
                handle.set(generator()?, TextureOptions::LINEAR);
                *cached = version;
            }
            return Ok(handle.id());
        }

        let name = match slot {
            TextureSlot::Page(index) => format!("page_{index}"),
            TextureSlot::SelectionOverlay => "selection_overlay".to_string(),
        };
        let handle = ctx.load_texture(name, generator()?, TextureOptions::LINEAR);
        let id = handle.id();
        self.textures.insert(slot, (version, handle));
        Ok(id)
    }

    /// Drops textures of pages at or past `page_count`.
    pub fn retain_pages(&mut self, page_count: usize) {
        self.textures
            .retain(|slot, _| !matches!(slot, TextureSlot::Page(index) if *index >= page_count));
    }

    pub fn invalidate(&mut self, slot: TextureSlot) {
        self.textures.remove(&slot);
    }

    /// Clears all textures from the cache
    pub fn clear_cache(&mut self) {
        self.textures.clear();
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.textures.len()
    }

    #[cfg(test)]
    fn version(&self, slot: TextureSlot) -> Option<u64> {
        self.textures.get(&slot).map(|(version, _)| *version)
    }
}

/// Converts a premultiplied tiny-skia bitmap into an egui image.
pub fn pixmap_image(pixmap: &Pixmap) -> Result<ColorImage, TextureGenerationError> {
    let size = [pixmap.width() as usize, pixmap.height() as usize];
    if size[0] == 0 || size[1] == 0 {
        return Err(TextureGenerationError::InvalidDimensions);
    }
    Ok(ColorImage::from_rgba_premultiplied(size, pixmap.data()))
}
