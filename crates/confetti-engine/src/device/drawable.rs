/// A resizable surface the simulation draws into.
///
/// The backing size is the pixel size of the drawing buffer; the display size
/// is how large the host currently shows it. Hosts implement this for their
/// canvas or window surface.
pub trait Drawable {
    /// Size the host displays the surface at, in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Pixel size of the drawing buffer.
    fn backing_size(&self) -> (u32, u32);

    /// Resizes the drawing buffer.
    fn set_backing_size(&mut self, width: u32, height: u32);
}

/// Resizes the drawing buffer to the displayed size if they differ.
///
/// Returns `true` when a resize happened; callers must then refresh the
/// viewport and anything derived from the pixel size (the view transform).
pub fn sync_size_to_display(drawable: &mut impl Drawable) -> bool {
    let (display_w, display_h) = drawable.display_size();
    if drawable.backing_size() == (display_w, display_h) {
        return false;
    }

    drawable.set_backing_size(display_w, display_h);
    log::debug!("drawable resized to {display_w}x{display_h}");
    true
}
