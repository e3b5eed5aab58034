//! GL window renderer adapter (component H): blits a decoded RGB frame as
//! a textured quad onto a window each tick. Grounded on `VideoRenderer.h`'s
//! GLFW/GL contract, ported onto glium (the teacher's own GL binding of
//! choice) instead of raw GLFW + hand-rolled shaders.

use glium::{glutin, Surface};

use crate::error::Error;

pub trait FrameRenderer {
    fn render(&mut self, rgb: &[u8]) -> Result<(), Error>;
}

pub struct GliumRenderer {
    display: glium::Display,
    program: glium::Program,
    source_width: u32,
    source_height: u32,
}

#[derive(Copy, Clone)]
struct Vertex {
    position: [f32; 2],
    tex_coords: [f32; 2],
}
glium::implement_vertex!(Vertex, position, tex_coords);

const VERTEX_SHADER: &str = r#"
    #version 140
    in vec2 position;
    in vec2 tex_coords;
    out vec2 v_tex_coords;
    void main() {
        v_tex_coords = tex_coords;
        gl_Position = vec4(position, 0.0, 1.0);
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    #version 140
    in vec2 v_tex_coords;
    out vec4 color;
    uniform sampler2D tex;
    void main() {
        color = texture(tex, v_tex_coords);
    }
"#;

impl GliumRenderer {
    pub fn create(
        source_width: u32,
        source_height: u32,
        window_width: u32,
        window_height: u32,
        window_title: &str,
    ) -> Result<Self, Error> {
        let event_loop = glutin::event_loop::EventLoop::new();
        let wb = glutin::window::WindowBuilder::new()
            .with_title(window_title)
            .with_inner_size(glutin::dpi::LogicalSize::new(window_width, window_height));
        let cb = glutin::ContextBuilder::new();
        let display = glium::Display::new(wb, cb, &event_loop)
            .map_err(|e| Error::Render(e.to_string()))?;

        let program =
            glium::Program::from_source(&display, VERTEX_SHADER, FRAGMENT_SHADER, None)
                .map_err(|e| Error::Render(e.to_string()))?;

        Ok(GliumRenderer {
            display,
            program,
            source_width,
            source_height,
        })
    }
}

impl FrameRenderer for GliumRenderer {
    fn render(&mut self, rgb: &[u8]) -> Result<(), Error> {
        let image = glium::texture::RawImage2d::from_raw_rgb(
            rgb.to_vec(),
            (self.source_width, self.source_height),
        );
        let texture = glium::texture::Texture2d::new(&self.display, image)
            .map_err(|e| Error::Render(e.to_string()))?;

        let shape = [
            Vertex { position: [-1.0, -1.0], tex_coords: [0.0, 0.0] },
            Vertex { position: [1.0, -1.0], tex_coords: [1.0, 0.0] },
            Vertex { position: [1.0, 1.0], tex_coords: [1.0, 1.0] },
            Vertex { position: [-1.0, 1.0], tex_coords: [0.0, 1.0] },
        ];
        let vertex_buffer = glium::VertexBuffer::new(&self.display, &shape)
            .map_err(|e| Error::Render(e.to_string()))?;
        let indices = glium::IndexBuffer::new(
            &self.display,
            glium::index::PrimitiveType::TrianglesList,
            &[0u16, 1, 2, 0, 2, 3],
        )
        .map_err(|e| Error::Render(e.to_string()))?;

        let uniforms = glium::uniform! { tex: &texture };
        let mut frame = self.display.draw();
        frame.clear_color(0.0, 0.0, 0.0, 1.0);
        frame
            .draw(
                &vertex_buffer,
                &indices,
                &self.program,
                &uniforms,
                &Default::default(),
            )
            .map_err(|e| Error::Render(e.to_string()))?;
        frame.finish().map_err(|e| Error::Render(e.to_string()))
    }
}
