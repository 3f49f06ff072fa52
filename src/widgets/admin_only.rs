use hypertext::{Renderable, maud, prelude::*};

/// A card which is only rendered for the league admin.
pub struct AdminOnly<T: Renderable> {
    pub children: T,
    pub title: &'static str,
}

impl<T: Renderable> Renderable for AdminOnly<T> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="card bg-light-subtle mb-4" {
                div class="card-header" {
                    h5 class="card-title" {
                       (self.title)
                    }
                    p class="card-subtitle text-muted" {
                        "Only visible to you as the league admin."
                    }
                }
                div class="card-body" {
                    (self.children)
                }
            }
        }.render_to(buffer)
    }
}
