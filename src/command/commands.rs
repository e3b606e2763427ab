use egui::{Color32, Pos2, Vec2};

use super::{CommandContext, CommandError, CommandResult};
use crate::document::Document;
use crate::page::Page;
use crate::raster_cache::RasterCache;
use crate::selection::Selection;
use crate::stroke::Stroke;

/// A reversible document mutation.
///
/// Each variant captures at construction everything its revert needs, so
/// `execute` followed by `undo` leaves document and selection as they were.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a finished stroke to a page
    AddStroke { page: usize, stroke: Stroke },

    /// Remove the stroke at `index`, e.g. under the eraser
    RemoveStroke {
        page: usize,
        index: usize,
        stroke: Stroke,
    },

    /// Insert a page at `index`
    AddPage { index: usize, page: Page },

    /// Remove the page at `index`
    RemovePage { index: usize, page: Page },

    /// Lift the strokes at `indices` (ascending) off `page` into a new selection
    CreateSelection {
        page: usize,
        indices: Vec<usize>,
        polygon: Vec<Pos2>,
    },

    /// Drop the current selection, appending its strokes to its page when `merge` is set
    ReleaseSelection { selection: Selection, merge: bool },

    /// Install a copy of the clipboard as the current selection
    PasteSelection { selection: Selection },

    /// Move the selection by `delta`, possibly onto another page.
    /// `before` is the selection prior to the move, restored verbatim on undo.
    TransformSelection {
        delta: Vec2,
        to_page: usize,
        before: Selection,
    },

    /// Recolor every selected stroke
    ChangeSelectionColor {
        color: Color32,
        previous: Vec<Color32>,
    },
}

fn page_mut<'d>(document: &'d mut Document, page: usize) -> Result<&'d mut Page, CommandError> {
    let count = document.pages.len();
    document
        .pages
        .get_mut(page)
        .ok_or_else(|| CommandError::InvalidParameters(format!("page {page} out of range ({count} pages)")))
}

/// Follows a page inserted at `index`.
fn shift_selection_for_insert(selection: &mut Option<Selection>, index: usize) {
    if let Some(selection) = selection {
        if selection.page() >= index {
            selection.rehome(selection.page() + 1);
        }
    }
}

/// Follows a page removed at `index`. The selection's own page cannot go.
fn shift_selection_for_remove(selection: &mut Option<Selection>, index: usize) -> CommandResult {
    if let Some(selection) = selection {
        if selection.page() == index {
            return Err(CommandError::InvalidState);
        }
        if selection.page() > index {
            selection.rehome(selection.page() - 1);
        }
    }
    Ok(())
}

fn repaint_strokes<'a>(
    cache: &mut RasterCache,
    document: &Document,
    page: usize,
    strokes: impl IntoIterator<Item = &'a Stroke>,
) {
    let rect = RasterCache::dirty_rect(strokes);
    if rect.is_positive() {
        cache.update_region(document, page, rect, None);
    }
}

impl Command {
    /// Removal of the stroke currently at `index`, if there is one.
    pub fn remove_stroke(document: &Document, page: usize, index: usize) -> Option<Self> {
        let stroke = document.page(page)?.strokes.get(index)?.clone();
        Some(Command::RemoveStroke { page, index, stroke })
    }

    /// Removal of page `index`. `None` for the last remaining page.
    pub fn remove_page(document: &Document, index: usize) -> Option<Self> {
        if document.page_count() <= 1 {
            return None;
        }
        let page = document.page(index)?.clone();
        Some(Command::RemovePage { index, page })
    }

    /// Release of `selection` onto its page, clamped to the current page range.
    pub fn release_selection(document: &Document, selection: &Selection, merge: bool) -> Self {
        let mut selection = selection.clone();
        let page = document.clamp_page(selection.page());
        if page != selection.page() {
            selection.rehome(page);
        }
        Command::ReleaseSelection { selection, merge }
    }

    /// Move of `selection` by `delta` onto `to_page`.
    pub fn transform_selection(selection: &Selection, delta: Vec2, to_page: usize) -> Self {
        Command::TransformSelection {
            delta,
            to_page,
            before: selection.clone(),
        }
    }

    pub fn change_selection_color(selection: &Selection, color: Color32) -> Self {
        Command::ChangeSelectionColor {
            color,
            previous: selection.strokes().iter().map(Stroke::color).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "AddStroke",
            Command::RemoveStroke { .. } => "RemoveStroke",
            Command::AddPage { .. } => "AddPage",
            Command::RemovePage { .. } => "RemovePage",
            Command::CreateSelection { .. } => "CreateSelection",
            Command::ReleaseSelection { .. } => "ReleaseSelection",
            Command::PasteSelection { .. } => "PasteSelection",
            Command::TransformSelection { .. } => "TransformSelection",
            Command::ChangeSelectionColor { .. } => "ChangeSelectionColor",
        }
    }

    /// Apply the command
    pub fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        match self {
            Command::AddStroke { page, stroke } => {
                page_mut(ctx.document, *page)?.strokes.push(stroke.clone());
                ctx.cache.update_region(ctx.document, *page, stroke.bounds(), None);
                Ok(())
            }

            Command::RemoveStroke { page, index, stroke } => {
                let strokes = &mut page_mut(ctx.document, *page)?.strokes;
                if *index >= strokes.len() {
                    return Err(CommandError::InvalidParameters(format!("no stroke {index} on page {page}")));
                }
                strokes.remove(*index);
                ctx.cache.update_region(ctx.document, *page, stroke.bounds(), None);
                Ok(())
            }

            Command::AddPage { index, page } => {
                if *index > ctx.document.pages.len() {
                    return Err(CommandError::InvalidParameters(format!("cannot insert page at {index}")));
                }
                ctx.document.pages.insert(*index, page.clone());
                ctx.cache.insert_page(ctx.document, *index);
                shift_selection_for_insert(ctx.selection, *index);
                Ok(())
            }

            Command::RemovePage { index, .. } => {
                if ctx.document.pages.len() <= 1 {
                    return Err(CommandError::InvalidState);
                }
                if *index >= ctx.document.pages.len() {
                    return Err(CommandError::InvalidParameters(format!("page {index} out of range")));
                }
                shift_selection_for_remove(ctx.selection, *index)?;
                ctx.document.pages.remove(*index);
                ctx.cache.remove_page(*index);
                Ok(())
            }

            Command::CreateSelection { page, indices, polygon } => {
                if ctx.selection.is_some() {
                    return Err(CommandError::InvalidState);
                }
                let strokes = &mut page_mut(ctx.document, *page)?.strokes;
                if indices.iter().any(|&i| i >= strokes.len()) {
                    return Err(CommandError::InvalidParameters(format!("stroke index out of range on page {page}")));
                }
                let mut lifted: Vec<Stroke> = indices.iter().rev().map(|&i| strokes.remove(i)).collect();
                lifted.reverse();
                repaint_strokes(ctx.cache, ctx.document, *page, &lifted);
                *ctx.selection = Some(Selection::new(*page, polygon.clone(), lifted));
                Ok(())
            }

            Command::ReleaseSelection { selection, merge } => {
                if ctx.selection.take().is_none() {
                    return Err(CommandError::InvalidState);
                }
                if *merge {
                    let page = selection.page();
                    page_mut(ctx.document, page)?
                        .strokes
                        .extend(selection.strokes().iter().cloned());
                    repaint_strokes(ctx.cache, ctx.document, page, selection.strokes());
                }
                Ok(())
            }

            Command::PasteSelection { selection } => {
                if ctx.selection.is_some() {
                    return Err(CommandError::InvalidState);
                }
                *ctx.selection = Some(selection.clone());
                Ok(())
            }

            Command::TransformSelection { delta, to_page, .. } => {
                let selection = ctx.selection.as_mut().ok_or(CommandError::InvalidState)?;
                selection.translate(*delta, *to_page);
                Ok(())
            }

            Command::ChangeSelectionColor { color, .. } => {
                let selection = ctx.selection.as_mut().ok_or(CommandError::InvalidState)?;
                selection.set_colors(std::iter::repeat(*color));
                Ok(())
            }
        }
    }

    /// Revert the command
    pub fn undo(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        match self {
            Command::AddStroke { page, stroke } => {
                let strokes = &mut page_mut(ctx.document, *page)?.strokes;
                if strokes.pop().is_none() {
                    return Err(CommandError::InvalidState);
                }
                ctx.cache.update_region(ctx.document, *page, stroke.bounds(), None);
                Ok(())
            }

            Command::RemoveStroke { page, index, stroke } => {
                let strokes = &mut page_mut(ctx.document, *page)?.strokes;
                if *index > strokes.len() {
                    return Err(CommandError::InvalidState);
                }
                strokes.insert(*index, stroke.clone());
                ctx.cache.update_region(ctx.document, *page, stroke.bounds(), None);
                Ok(())
            }

            Command::AddPage { index, .. } => {
                if *index >= ctx.document.pages.len() || ctx.document.pages.len() <= 1 {
                    return Err(CommandError::InvalidState);
                }
                shift_selection_for_remove(ctx.selection, *index)?;
                ctx.document.pages.remove(*index);
                ctx.cache.remove_page(*index);
                Ok(())
            }

            Command::RemovePage { index, page } => {
                if *index > ctx.document.pages.len() {
                    return Err(CommandError::InvalidState);
                }
                ctx.document.pages.insert(*index, page.clone());
                ctx.cache.insert_page(ctx.document, *index);
                shift_selection_for_insert(ctx.selection, *index);
                Ok(())
            }

            Command::CreateSelection { page, indices, .. } => {
                let selection = ctx.selection.take().ok_or(CommandError::InvalidState)?;
                let strokes = match page_mut(ctx.document, *page) {
                    Ok(target) => &mut target.strokes,
                    Err(e) => {
                        *ctx.selection = Some(selection);
                        return Err(e);
                    }
                };
                let lifted = selection.into_strokes();
                for (&index, stroke) in indices.iter().zip(lifted.iter()) {
                    let index = index.min(strokes.len());
                    strokes.insert(index, stroke.clone());
                }
                repaint_strokes(ctx.cache, ctx.document, *page, &lifted);
                Ok(())
            }

            Command::ReleaseSelection { selection, merge } => {
                if ctx.selection.is_some() {
                    return Err(CommandError::InvalidState);
                }
                if *merge {
                    let page = selection.page();
                    let strokes = &mut page_mut(ctx.document, page)?.strokes;
                    let count = selection.strokes().len();
                    if strokes.len() < count {
                        return Err(CommandError::InvalidState);
                    }
                    strokes.truncate(strokes.len() - count);
                    repaint_strokes(ctx.cache, ctx.document, page, selection.strokes());
                }
                *ctx.selection = Some(selection.clone());
                Ok(())
            }

            Command::PasteSelection { .. } => {
                ctx.selection.take().ok_or(CommandError::InvalidState)?;
                Ok(())
            }

            Command::TransformSelection { before, .. } => {
                let selection = ctx.selection.as_mut().ok_or(CommandError::InvalidState)?;
                selection.restore(before);
                Ok(())
            }

            Command::ChangeSelectionColor { previous, .. } => {
                let selection = ctx.selection.as_mut().ok_or(CommandError::InvalidState)?;
                selection.set_colors(previous.iter().copied());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    struct Fixture {
        document: Document,
        cache: RasterCache,
        selection: Option<Selection>,
    }

    impl Fixture {
        fn new(strokes: usize) -> Self {
            let mut document = Document::new();
            for i in 0..strokes {
                let y = 10.0 + i as f32 * 20.0;
                document.pages[0].strokes.push(Stroke::new(
                    Color32::BLACK,
                    2.0,
                    vec![pos2(10.0, y), pos2(50.0, y)],
                    vec![1.0, 1.0],
                ));
            }
            let mut cache = RasterCache::new(1.0);
            cache.rebuild_all(&document, 1.0);
            Self {
                document,
                cache,
                selection: None,
            }
        }

        fn ctx(&mut self) -> CommandContext<'_> {
            CommandContext::new(&mut self.document, &mut self.cache, &mut self.selection)
        }
    }

    #[test]
    fn create_selection_lifts_strokes_in_order() {
        let mut fx = Fixture::new(4);
        let original = fx.document.clone();
        let cmd = Command::CreateSelection {
            page: 0,
            indices: vec![1, 3],
            polygon: vec![pos2(0.0, 0.0), pos2(100.0, 0.0), pos2(100.0, 100.0)],
        };
        cmd.execute(&mut fx.ctx()).expect("execute");
        assert_eq!(fx.document.pages[0].strokes.len(), 2);
        let selection = fx.selection.as_ref().expect("selection");
        assert_eq!(selection.strokes()[0], original.pages[0].strokes[1]);
        assert_eq!(selection.strokes()[1], original.pages[0].strokes[3]);

        cmd.undo(&mut fx.ctx()).expect("undo");
        assert!(fx.selection.is_none());
        assert_eq!(fx.document.pages[0].strokes, original.pages[0].strokes);
    }

    #[test]
    fn create_selection_requires_no_existing_selection() {
        let mut fx = Fixture::new(1);
        fx.selection = Some(Selection::new(0, vec![], vec![]));
        let cmd = Command::CreateSelection {
            page: 0,
            indices: vec![0],
            polygon: vec![],
        };
        assert_eq!(cmd.execute(&mut fx.ctx()), Err(CommandError::InvalidState));
    }

    #[test]
    fn release_with_merge_appends_and_reverts() {
        let mut fx = Fixture::new(2);
        let stroke = fx.document.pages[0].strokes[0].clone();
        let selection = Selection::new(0, vec![], vec![stroke]);
        fx.selection = Some(selection.clone());

        let cmd = Command::release_selection(&fx.document, &selection, true);
        cmd.execute(&mut fx.ctx()).expect("execute");
        assert!(fx.selection.is_none());
        assert_eq!(fx.document.pages[0].strokes.len(), 3);

        cmd.undo(&mut fx.ctx()).expect("undo");
        assert_eq!(fx.document.pages[0].strokes.len(), 2);
        assert_eq!(fx.selection, Some(selection));
    }

    #[test]
    fn release_clamps_stale_page() {
        let fx = Fixture::new(0);
        let selection = Selection::new(5, vec![], vec![]);
        match Command::release_selection(&fx.document, &selection, true) {
            Command::ReleaseSelection { selection, .. } => assert_eq!(selection.page(), 0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn transform_moves_between_pages() {
        let mut fx = Fixture::new(0);
        fx.document.pages.push(Page::default());
        let polygon = vec![pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(10.0, 10.0)];
        fx.selection = Some(Selection::new(0, polygon.clone(), vec![]));

        let cmd = Command::transform_selection(fx.selection.as_ref().expect("selection"), vec2(5.0, -3.0), 1);
        cmd.execute(&mut fx.ctx()).expect("execute");
        let moved = fx.selection.as_ref().expect("selection");
        assert_eq!(moved.page(), 1);
        assert_eq!(moved.polygon()[1], pos2(15.0, -3.0));

        cmd.undo(&mut fx.ctx()).expect("undo");
        let back = fx.selection.as_ref().expect("selection");
        assert_eq!(back.page(), 0);
        assert_eq!(back.polygon(), polygon.as_slice());
    }

    #[test]
    fn repeated_moves_undo_to_the_exact_points() {
        let mut fx = Fixture::new(0);
        let stroke = Stroke::new(Color32::BLACK, 1.0, vec![pos2(0.1, 0.7), pos2(3.3, 9.9)], vec![1.0, 1.0]);
        let start = Selection::new(0, vec![pos2(0.1, 0.2), pos2(7.7, 0.3), pos2(5.5, 8.8)], vec![stroke]);
        fx.selection = Some(start.clone());

        let mut history = Vec::new();
        for step in 0..50 {
            let delta = vec2(0.1 + step as f32 * 0.37, -0.3 + step as f32 * 0.011);
            let cmd = Command::transform_selection(fx.selection.as_ref().expect("selection"), delta, 0);
            cmd.execute(&mut fx.ctx()).expect("execute");
            history.push(cmd);
        }
        for cmd in history.iter().rev() {
            cmd.undo(&mut fx.ctx()).expect("undo");
        }

        let back = fx.selection.as_ref().expect("selection");
        assert_eq!(back.strokes(), start.strokes());
        assert_eq!(back.polygon(), start.polygon());
    }

    #[test]
    fn page_insert_before_selection_shifts_its_page() {
        let mut fx = Fixture::new(0);
        fx.selection = Some(Selection::new(0, vec![], vec![]));
        let cmd = Command::AddPage {
            index: 0,
            page: Page::default(),
        };
        cmd.execute(&mut fx.ctx()).expect("execute");
        assert_eq!(fx.selection.as_ref().expect("selection").page(), 1);

        cmd.undo(&mut fx.ctx()).expect("undo");
        assert_eq!(fx.selection.as_ref().expect("selection").page(), 0);
    }

    #[test]
    fn page_removal_follows_or_protects_the_selection() {
        let mut fx = Fixture::new(0);
        fx.document.pages.push(Page::default());
        fx.document.pages.push(Page::default());
        fx.cache.rebuild_all(&fx.document, 1.0);
        fx.selection = Some(Selection::new(2, vec![], vec![]));

        let own = Command::remove_page(&fx.document, 2).expect("removable");
        assert_eq!(own.execute(&mut fx.ctx()), Err(CommandError::InvalidState));
        assert_eq!(fx.document.page_count(), 3);

        let earlier = Command::remove_page(&fx.document, 0).expect("removable");
        earlier.execute(&mut fx.ctx()).expect("execute");
        assert_eq!(fx.selection.as_ref().expect("selection").page(), 1);
        earlier.undo(&mut fx.ctx()).expect("undo");
        assert_eq!(fx.selection.as_ref().expect("selection").page(), 2);
    }

    #[test]
    fn remove_page_refuses_last_page() {
        let fx = Fixture::new(0);
        assert!(Command::remove_page(&fx.document, 0).is_none());
    }

    #[test]
    fn page_commands_keep_cache_in_step() {
        let mut fx = Fixture::new(0);
        let cmd = Command::AddPage {
            index: 1,
            page: Page::default(),
        };
        cmd.execute(&mut fx.ctx()).expect("execute");
        assert_eq!(fx.cache.len(), 2);
        cmd.undo(&mut fx.ctx()).expect("undo");
        assert_eq!(fx.cache.len(), 1);
        assert_eq!(fx.document.page_count(), 1);
    }

    #[test]
    fn recolor_restores_previous_colors() {
        let mut fx = Fixture::new(0);
        let strokes = vec![
            Stroke::new(Color32::RED, 1.0, vec![pos2(0.0, 0.0)], vec![1.0]),
            Stroke::new(Color32::BLUE, 1.0, vec![pos2(1.0, 1.0)], vec![1.0]),
        ];
        let selection = Selection::new(0, vec![], strokes);
        let cmd = Command::change_selection_color(&selection, Color32::GREEN);
        fx.selection = Some(selection);

        cmd.execute(&mut fx.ctx()).expect("execute");
        let colors: Vec<_> = fx.selection.as_ref().expect("selection").strokes().iter().map(Stroke::color).collect();
        assert_eq!(colors, vec![Color32::GREEN, Color32::GREEN]);

        cmd.undo(&mut fx.ctx()).expect("undo");
        let colors: Vec<_> = fx.selection.as_ref().expect("selection").strokes().iter().map(Stroke::color).collect();
        assert_eq!(colors, vec![Color32::RED, Color32::BLUE]);
    }
}
