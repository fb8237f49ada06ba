use the_core::grapheme::grapheme_char_ranges;

use super::ModifierStage;
use crate::{
  context::ResolveContext,
  descriptor::{
    PieceType,
    ScopeType,
  },
  error::{
    Result,
    TargetError,
  },
  position::{
    Position,
    Range,
  },
  scope::{
    ScopeHandler,
    TokenScopeHandler,
    word_target,
  },
  target::{
    Target,
    TargetArena,
  },
};

/// Words or characters of a token, picked from `anchor` to `active`.
/// Negative indices count from the end.
pub struct SubpieceStage {
  pub piece_type:     PieceType,
  pub anchor:         isize,
  pub active:         isize,
  pub exclude_anchor: bool,
  pub exclude_active: bool,
}

impl SubpieceStage {
  fn scope_type(&self) -> ScopeType {
    match self.piece_type {
      PieceType::Word => ScopeType::Word,
      PieceType::Character => ScopeType::Character,
    }
  }

  /// The token to split: the target itself when it has an explicit range,
  /// else the token around it.
  fn token_range(&self, cx: &ResolveContext, target: &Target) -> Result<Range> {
    if target.has_explicit_range() {
      return Ok(target.content_range());
    }
    TokenScopeHandler::tokens()
      .containing_scope(cx, target.editor(), target.content_range(), false)?
      .map(|token| token.content_range())
      .ok_or_else(|| TargetError::no_containing_scope(ScopeType::Token))
  }
}

impl ModifierStage for SubpieceStage {
  fn run(&self, cx: &ResolveContext, _arena: &mut TargetArena, target: &Target) -> Result<Vec<Target>> {
    if self.exclude_anchor || self.exclude_active {
      return Err(TargetError::SubtokenExclusionUnsupported);
    }

    let token = self.token_range(cx, target)?;
    if !token.is_single_line() {
      return Err(TargetError::out_of_range(self.scope_type()));
    }
    let text = target.document().text_in(token);
    let pieces = match self.piece_type {
      PieceType::Word => cx.words().word_ranges(&text),
      PieceType::Character => grapheme_char_ranges(&text),
    };

    let index = |index: isize| {
      let resolved = if index < 0 {
        pieces.len() as isize + index
      } else {
        index
      };
      usize::try_from(resolved)
        .ok()
        .filter(|&resolved| resolved < pieces.len())
        .ok_or_else(|| TargetError::out_of_range(self.scope_type()))
    };
    let anchor = index(self.anchor)?;
    let active = index(self.active)?;
    let is_reversed = active < anchor;
    let (first, last) = (anchor.min(active), anchor.max(active));

    let editor = target.editor();
    let result = match self.piece_type {
      PieceType::Word => word_target(editor, token, &pieces, first, last, is_reversed),
      PieceType::Character => {
        let at = |offset: usize| Position::new(token.start.line, token.start.character + offset);
        Target::plain(
          editor.clone(),
          Range::new(at(pieces[first].0), at(pieces[last].1)),
          is_reversed,
        )
      },
    };
    Ok(vec![result])
  }
}
