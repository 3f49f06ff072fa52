use hypertext::prelude::*;

/// A row of buttons, each of which submits an (empty) POST form.
///
/// Used for the destructive actions on a document, which must not be plain
/// links.
pub struct Actions<'r> {
    pub options: &'r [(&'r str, &'r str)],
}

impl<'r> Renderable for Actions<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="d-flex gap-2" {
                @for (action, text) in self.options {
                    form method="post" action=(action) class="d-inline" {
                        button type="submit" class="btn btn-sm btn-outline-danger" {
                            (text)
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
