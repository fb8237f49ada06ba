//! The first stage of every primitive target: turning a [`Mark`] into the
//! targets the modifiers start from.

use std::{
  cmp::Reverse,
  sync::Arc,
};

use crate::{
  context::ResolveContext,
  descriptor::{
    LineNumber,
    LineNumberType,
    Mark,
  },
  editor::Editor,
  error::{
    Result,
    TargetError,
  },
  hats::StoredTargetKey,
  position::Range,
  scope::line_tokens,
  target::Target,
};

/// The targets `mark` refers to. Marks that depend on the active editor
/// yield nothing when there is none.
pub fn resolve_mark(cx: &ResolveContext, mark: &Mark) -> Result<Vec<Target>> {
  let targets = match mark {
    Mark::Cursor => {
      cx.active_editor()
        .map(|editor| {
          editor
            .selections
            .iter()
            .map(|selection| Target::from_selection(editor.clone(), *selection))
            .collect()
        })
        .unwrap_or_default()
    },
    Mark::CursorToken => {
      match cx.active_editor() {
        Some(editor) => vec![cursor_token(cx, editor)?],
        None => Vec::new(),
      }
    },
    Mark::DecoratedSymbol {
      symbol_color,
      character,
    } => {
      let token = cx.hats().token(symbol_color, character).ok_or_else(|| {
        TargetError::MissingMark {
          style:     symbol_color.to_string(),
          character: character.to_string(),
        }
      })?;
      vec![Target::token(token.editor, token.range, false)]
    },
    Mark::That => stored(cx, StoredTargetKey::That)?,
    Mark::Source => stored(cx, StoredTargetKey::Source)?,
    Mark::LineNumber { anchor, active } => {
      match cx.active_editor() {
        Some(editor) => vec![line_number_target(cx, editor, *anchor, *active)?],
        None => Vec::new(),
      }
    },
    Mark::Nothing => Vec::new(),
  };

  tracing::debug!(?mark, count = targets.len(), "resolved mark");
  Ok(targets)
}

fn stored(cx: &ResolveContext, key: StoredTargetKey) -> Result<Vec<Target>> {
  cx.stored_targets()
    .get(key)
    .ok_or(TargetError::NoStoredTargets { key: key.as_str() })
}

/// The token touching the primary selection. Identifiers beat punctuation,
/// then longer tokens beat shorter ones, then the left one wins.
fn cursor_token(cx: &ResolveContext, editor: &Arc<Editor>) -> Result<Target> {
  let selection = editor
    .primary_selection()
    .ok_or(TargetError::NoTokenInSelection)?;
  let range = selection.range();
  let document = editor.document();

  line_tokens(cx, editor, range)
    .into_iter()
    .filter(|(token, _)| token.intersection(&range).is_some())
    .max_by_key(|(token, is_identifier)| {
      let len = document.offset_at(token.end) - document.offset_at(token.start);
      (*is_identifier, len, Reverse(token.start))
    })
    .map(|(token, _)| Target::token(editor.clone(), token, selection.is_reversed()))
    .ok_or(TargetError::NoTokenInSelection)
}

fn line_number_target(
  cx: &ResolveContext,
  editor: &Arc<Editor>,
  anchor: LineNumber,
  active: LineNumber,
) -> Result<Target> {
  let anchor = line_index(cx, editor, anchor)?;
  let active = line_index(cx, editor, active)?;
  let (first, last) = (anchor.min(active), anchor.max(active));
  Ok(Target::line(
    editor.clone(),
    Range::from_coords(first, 0, last, 0),
    anchor > active,
  ))
}

/// The zero based line `line_number` names in `editor`.
fn line_index(cx: &ResolveContext, editor: &Editor, line_number: LineNumber) -> Result<usize> {
  let line = match line_number.kind {
    LineNumberType::Absolute => line_number.line_number,
    LineNumberType::Relative => {
      let active = editor
        .primary_selection()
        .map_or(0, |selection| selection.active.line);
      active as isize + line_number.line_number
    },
    LineNumberType::Modulo100 => {
      return visible_line(editor, line_number.line_number, cx.config().visible_line_modulo);
    },
  };

  usize::try_from(line)
    .ok()
    .filter(|&line| line < editor.document.line_count())
    .ok_or_else(|| TargetError::out_of_range("line"))
}

/// The single visible line whose number ends in `row` when counted modulo
/// `modulo`.
fn visible_line(editor: &Editor, row: isize, modulo: usize) -> Result<usize> {
  let row = usize::try_from(row)
    .ok()
    .filter(|&row| row < modulo)
    .ok_or_else(|| TargetError::out_of_range("line"))?;
  let line_count = editor.document.line_count();

  let mut lines: Vec<usize> = editor
    .visible_ranges
    .iter()
    .flat_map(|range| range.start.line..=range.end.line)
    .filter(|&line| line < line_count && line % modulo == row)
    .collect();
  lines.sort_unstable();
  lines.dedup();

  match lines.as_slice() {
    [line] => Ok(*line),
    [] => Err(TargetError::NoVisibleLine { row }),
    _ => Err(TargetError::AmbiguousVisibleLine { row }),
  }
}
