use sumsheet_core::Layout;

/// Receiver of positioned text. Coordinates are top-left based points,
/// as produced by [`sumsheet_core::layout`].
pub trait PageSink {
    fn new_page(&mut self);
    fn text(&mut self, x: f32, y: f32, text: &str);
}

/// Replay a layout onto a sink that already has its first page open.
pub fn render_layout<S: PageSink + ?Sized>(layout: &Layout, sink: &mut S) {
    for (index, page) in layout.pages.iter().enumerate() {
        if index > 0 {
            sink.new_page();
        }
        for item in &page.items {
            sink.text(item.x, item.y, &item.text);
        }
    }
}
