use crate::document::Document;
use crate::raster_cache::RasterCache;
use crate::selection::Selection;

/// Everything a command may touch, borrowed for the duration of one apply or revert.
///
/// Commands never own the document; the editor lends these handles to the
/// history on each call.
#[derive(Debug)]
pub struct CommandContext<'a> {
    pub document: &'a mut Document,
    pub cache: &'a mut RasterCache,
    pub selection: &'a mut Option<Selection>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        document: &'a mut Document,
        cache: &'a mut RasterCache,
        selection: &'a mut Option<Selection>,
    ) -> Self {
        Self {
            document,
            cache,
            selection,
        }
    }
}
