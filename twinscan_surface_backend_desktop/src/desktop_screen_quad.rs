/// Full-screen quad used to present the offscreen color texture
///
/// Texture coordinates run bottom-up while the context renders with an
/// upper-left clip origin, so drawing the quad into the default framebuffer
/// flips the image back to window orientation.

use bytemuck::{Pod, Zeroable};
use twinscan_surface::twinscan::{Error, Result};
use twinscan_surface::surface_bail;

use crate::desktop_gl_device::{GlDevice, GlName, VertexAttribute};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ScreenVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

/// Two triangles covering clip space
pub const SCREEN_QUAD_VERTICES: [ScreenVertex; 6] = [
    ScreenVertex { position: [-1.0,  1.0], tex_coord: [0.0, 1.0] },
    ScreenVertex { position: [-1.0, -1.0], tex_coord: [0.0, 0.0] },
    ScreenVertex { position: [ 1.0, -1.0], tex_coord: [1.0, 0.0] },
    ScreenVertex { position: [ 1.0, -1.0], tex_coord: [1.0, 0.0] },
    ScreenVertex { position: [ 1.0,  1.0], tex_coord: [1.0, 1.0] },
    ScreenVertex { position: [-1.0,  1.0], tex_coord: [0.0, 1.0] },
];

/// position at location 0, tex_coord at location 1
pub const SCREEN_VERTEX_ATTRIBUTES: [VertexAttribute; 2] = [
    VertexAttribute { location: 0, components: 2, offset: 0 },
    VertexAttribute { location: 1, components: 2, offset: 8 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenQuad {
    program: GlName,
    vertex_array: GlName,
}

impl ScreenQuad {
    /// Load the screen shader and upload the quad geometry
    pub fn create<G: GlDevice + ?Sized>(gl: &mut G, shader_name: &str) -> Result<Self> {
        let Some(program) = gl.load_program(shader_name) else {
            surface_bail!("twinscan::desktop",
                Error::ContextCreationError(format!("screen shader '{}' failed to load", shader_name)));
        };

        let data: &[u8] = bytemuck::cast_slice(&SCREEN_QUAD_VERTICES);
        let stride = std::mem::size_of::<ScreenVertex>() as u32;
        let Some(vertex_array) = gl.create_vertex_array(data, stride, &SCREEN_VERTEX_ATTRIBUTES) else {
            gl.delete_program(program);
            surface_bail!("twinscan::desktop",
                Error::ContextCreationError("failed to create screen vertex array".to_string()));
        };

        Ok(Self { program, vertex_array })
    }

    /// Draw `texture` over the whole bound draw framebuffer
    pub fn draw<G: GlDevice + ?Sized>(&self, gl: &mut G, texture: GlName) {
        gl.use_program(self.program);
        gl.bind_vertex_array(self.vertex_array);
        gl.bind_texture(0, texture);
        gl.draw_triangles(0, SCREEN_QUAD_VERTICES.len() as u32);
    }

    pub fn destroy<G: GlDevice + ?Sized>(self, gl: &mut G) {
        gl.delete_vertex_array(self.vertex_array);
        gl.delete_program(self.program);
    }

    pub fn program(&self) -> GlName {
        self.program
    }
}
