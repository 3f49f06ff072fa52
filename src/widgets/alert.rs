use hypertext::prelude::*;

fn render_alert(
    class: &'static str,
    msg: &str,
    buffer: &mut hypertext::Buffer<hypertext::context::Node>,
) {
    maud!({
        div class=(class) role="alert" {
            (msg)
        }
    })
    .render_to(buffer);
}

pub struct ErrorAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for ErrorAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        render_alert("alert alert-danger", &self.msg.to_string(), buffer);
    }
}

/// Shown on otherwise empty lists.
pub struct InfoAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for InfoAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        render_alert("alert alert-secondary", &self.msg.to_string(), buffer);
    }
}
