//! Pluggable scanners that interrupt plain text with their own elements.

use crate::{
  context::ConstructionContext,
  element::VisualLineElement,
  options::TextViewOptions,
};

/// Generators are asked, in registration order, for the next offset they
/// would like to interrupt the text at, and then to construct the element
/// there.
///
/// For an unchanged document, `first_interested_offset` must never report an
/// offset below `start`, and asking again from a larger `start` must not
/// report a smaller offset.
pub trait ElementGenerator {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  /// Called once per line build before any scanning.
  fn fetch_options(&mut self, _options: &TextViewOptions) {}

  fn first_interested_offset(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    start: usize,
  ) -> Option<usize>;

  /// Only called at an offset this generator reported. The element's span
  /// begins at `offset`; `None` leaves the text uninterrupted there.
  fn construct_element(
    &mut self,
    ctx: &mut ConstructionContext<'_>,
    offset: usize,
  ) -> Option<Box<dyn VisualLineElement>>;
}
