//! Mesh management module.
//!
//! A [`Mesh`] pairs a VAO/VBO on the GPU with a [`MeshBuilder`] on the CPU. Vertices are appended
//! to the builder as raw bytes, then uploaded in one go with [`Mesh::send`]. The vertex format is
//! described by a [`VertexLayout`].
//!
//! ```ignore
//! #[repr(C)]
//! #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
//! struct Vertex {
//!     pos: [f32; 3],
//!     uv: [f32; 2],
//!     tex_index: i32,
//! }
//!
//! let layout = VertexLayout::new(vec![
//!     VertexComponent::floats(3),
//!     VertexComponent::floats(2),
//!     VertexComponent::ints(1),
//! ]);
//! let mut mesh = Mesh::new(&gl, layout)?;
//! mesh.add_vertices(&vertices);
//! mesh.send();
//! mesh.render();
//! ```

use std::{fmt, sync::Arc};

use glow::HasContext;

use crate::{
    error::{Error, Result},
    glenum::gl_enum_name,
};

/// One attribute of a vertex, e.g. a position made of three floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexComponent {
    /// Size in bytes of a single element.
    pub size: usize,
    /// Number of elements.
    pub count: usize,
    /// GL data type of an element, e.g. `glow::FLOAT`.
    pub data_type: u32,
}

impl VertexComponent {
    pub fn new(size: usize, count: usize, data_type: u32) -> Self {
        Self {
            size,
            count,
            data_type,
        }
    }

    pub fn floats(count: usize) -> Self {
        Self::new(size_of::<f32>(), count, glow::FLOAT)
    }

    pub fn ints(count: usize) -> Self {
        Self::new(size_of::<i32>(), count, glow::INT)
    }

    pub fn uints(count: usize) -> Self {
        Self::new(size_of::<u32>(), count, glow::UNSIGNED_INT)
    }

    /// Bytes this component takes up in a vertex.
    pub fn byte_len(&self) -> usize {
        self.size * self.count
    }

    /// Integer components are read by the shader as integers, not converted to floats.
    pub fn is_integer(&self) -> bool {
        matches!(
            self.data_type,
            glow::BYTE
                | glow::UNSIGNED_BYTE
                | glow::SHORT
                | glow::UNSIGNED_SHORT
                | glow::INT
                | glow::UNSIGNED_INT
        )
    }
}

/// An attribute pointer derived from a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub index: u32,
    pub offset: usize,
    pub component: VertexComponent,
}

/// Ordered list of vertex components. Component `i` is bound to attribute location `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexLayout {
    components: Vec<VertexComponent>,
}

impl VertexLayout {
    pub fn new(components: Vec<VertexComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[VertexComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Size of a whole vertex in bytes.
    pub fn stride(&self) -> usize {
        self.components.iter().map(VertexComponent::byte_len).sum()
    }

    /// Each component with its attribute index and byte offset.
    pub fn attributes(&self) -> Vec<VertexAttribute> {
        let mut offset = 0;
        self.components
            .iter()
            .enumerate()
            .map(|(i, component)| {
                let attribute = VertexAttribute {
                    index: i as u32,
                    offset,
                    component: *component,
                };
                offset += component.byte_len();
                attribute
            })
            .collect()
    }

    /// Sets up the attribute pointers on the currently bound VAO and VBO.
    fn apply(&self, gl: &glow::Context) {
        let stride = self.stride() as i32;
        for attribute in self.attributes() {
            let VertexAttribute {
                index,
                offset,
                component,
            } = attribute;
            unsafe {
                if component.is_integer() {
                    gl.vertex_attrib_pointer_i32(
                        index,
                        component.count as i32,
                        component.data_type,
                        stride,
                        offset as i32,
                    );
                } else {
                    gl.vertex_attrib_pointer_f32(
                        index,
                        component.count as i32,
                        component.data_type,
                        false,
                        stride,
                        offset as i32,
                    );
                }
                gl.enable_vertex_attrib_array(index);
            }
        }
    }
}

/// Append-only byte buffer for building vertex data on the CPU.
///
/// The first append allocates exactly what was appended. After that the capacity doubles
/// whenever an append would overflow it.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    data: Vec<u8>,
    allocated: usize,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes`. Empty slices are ignored.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.allocated == 0 {
            self.allocated = bytes.len();
            self.data.reserve_exact(self.allocated);
        }
        let needed = self.data.len() + bytes.len();
        if needed > self.allocated {
            while needed > self.allocated {
                self.allocated *= 2;
            }
            self.data.reserve_exact(self.allocated - self.data.len());
        }
        self.data.extend_from_slice(bytes);
    }

    /// Appends a slice of plain-old-data values as bytes.
    pub fn add_vertices<V: bytemuck::Pod>(&mut self, vertices: &[V]) {
        self.add_bytes(bytemuck::cast_slice(vertices));
    }

    /// Releases the storage.
    pub fn free(&mut self) {
        self.data = Vec::new();
        self.allocated = 0;
    }

    /// Bytes added so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity, following the doubling policy.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// How the vertices of a mesh are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    pub fn gl_mode(self) -> u32 {
        match self {
            DrawMode::Points => glow::POINTS,
            DrawMode::Lines => glow::LINES,
            DrawMode::LineStrip => glow::LINE_STRIP,
            DrawMode::LineLoop => glow::LINE_LOOP,
            DrawMode::Triangles => glow::TRIANGLES,
            DrawMode::TriangleStrip => glow::TRIANGLE_STRIP,
            DrawMode::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

/// Represents a mesh with a CPU-side builder and a GPU-side VAO and VBO.
pub struct Mesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    layout: VertexLayout,
    stride: usize,
    builder: MeshBuilder,
    sent_bytes: usize,
    draw_mode: DrawMode,
}

impl Mesh {
    /// Creates an empty mesh with the given vertex layout.
    pub fn new(gl: &Arc<glow::Context>, layout: VertexLayout) -> Result<Self> {
        if layout.is_empty() {
            log::error!("couldn't create mesh, mesh has 0 components");
            return Err(Error::EmptyLayout);
        }
        let stride = layout.stride();
        if stride == 0 {
            log::error!("couldn't create mesh, stride was 0");
            return Err(Error::ZeroStride);
        }
        unsafe {
            let vao = gl.create_vertex_array().map_err(Error::Gl)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(Error::Gl(e));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            layout.apply(gl);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            log::debug!(
                "created mesh vao {} with {} components, stride {stride}",
                vao.0,
                layout.components().len()
            );
            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                layout,
                stride,
                builder: MeshBuilder::new(),
                sent_bytes: 0,
                draw_mode: DrawMode::default(),
            })
        }
    }

    /// Appends raw vertex bytes to the builder.
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.builder.add_bytes(bytes);
    }

    /// Appends vertices to the builder.
    pub fn add_vertices<V: bytemuck::Pod>(&mut self, vertices: &[V]) {
        self.builder.add_vertices(vertices);
    }

    /// Uploads the builder contents to the VBO. Does nothing if the builder is empty.
    pub fn send(&mut self) {
        if self.builder.is_empty() {
            return;
        }
        self.sent_bytes = self.builder.len();
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                self.builder.as_bytes(),
                glow::STATIC_DRAW,
            );
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    /// Drops the CPU-side bytes but keeps whatever was last sent.
    ///
    /// Appending afterwards starts a fresh builder.
    pub fn free_builder(&mut self) {
        self.builder.free();
    }

    /// Draws whatever was last sent. Does nothing if nothing was sent yet.
    pub fn render(&self) {
        if self.sent_bytes == 0 {
            return;
        }
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl
                .draw_arrays(self.draw_mode.gl_mode(), 0, self.vertex_count() as i32);
            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    /// Sets the primitive mode. Defaults to [`DrawMode::Triangles`].
    pub fn set_render_mode(&mut self, draw_mode: DrawMode) {
        self.draw_mode = draw_mode;
    }

    pub fn render_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Number of vertices in the last upload.
    pub fn vertex_count(&self) -> usize {
        self.sent_bytes / self.stride
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    pub fn builder(&self) -> &MeshBuilder {
        &self.builder
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
        }
        log::debug!("deleted mesh vao {}", self.vao.0);
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mesh {{")?;
        writeln!(f, "  builder_alloced: {}", self.builder.allocated())?;
        writeln!(f, "  builder_added: {}", self.builder.len())?;
        writeln!(f, "  stride: {}", self.stride)?;
        writeln!(
            f,
            "  last_send_size: {} ({} vertices)",
            self.sent_bytes,
            self.vertex_count()
        )?;
        writeln!(f, "  VAO: {}", self.vao.0)?;
        writeln!(f, "  VBO: {}", self.vbo.0)?;
        let mode = self.draw_mode.gl_mode();
        writeln!(f, "  render_mode: {} ({mode})", gl_enum_name(mode))?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
    struct TestVertex {
        pos: [f32; 3],
        uv: [f32; 2],
        tex_index: i32,
    }

    fn test_layout() -> VertexLayout {
        VertexLayout::new(vec![
            VertexComponent::floats(3),
            VertexComponent::floats(2),
            VertexComponent::ints(1),
        ])
    }

    #[test]
    fn test_layout_stride_and_offsets() {
        let layout = test_layout();
        assert_eq!(layout.stride(), size_of::<TestVertex>());
        assert_eq!(layout.stride(), 24);

        let attributes = layout.attributes();
        let offsets = attributes.iter().map(|a| a.offset).collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 12, 20]);
        assert_eq!(attributes[2].index, 2);
        assert!(!attributes[0].component.is_integer());
        assert!(attributes[2].component.is_integer());
    }

    #[test]
    fn test_layout_zero_count_component() {
        let layout = VertexLayout::new(vec![VertexComponent::floats(0)]);
        assert!(!layout.is_empty());
        assert_eq!(layout.stride(), 0);
        assert!(VertexLayout::default().is_empty());
    }

    #[test]
    fn test_builder_first_add_is_exact() {
        let mut builder = MeshBuilder::new();
        assert_eq!(builder.allocated(), 0);
        builder.add_bytes(&[1, 2, 3]);
        assert_eq!(builder.allocated(), 3);
        assert_eq!(builder.len(), 3);
    }

    #[test]
    fn test_builder_doubles_until_it_fits() {
        let mut builder = MeshBuilder::new();
        builder.add_bytes(&[0; 4]);
        builder.add_bytes(&[1; 1]);
        assert_eq!(builder.allocated(), 8);
        builder.add_bytes(&[2; 3]);
        assert_eq!(builder.allocated(), 8);
        // 8 + 20 = 28 needs two doublings
        builder.add_bytes(&[3; 20]);
        assert_eq!(builder.allocated(), 32);
        assert_eq!(builder.len(), 28);

        let bytes = builder.as_bytes();
        assert_eq!(&bytes[..4], &[0; 4]);
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..8], &[2; 3]);
        assert_eq!(&bytes[8..], &[3; 20]);
    }

    #[test]
    fn test_builder_ignores_empty_and_frees() {
        let mut builder = MeshBuilder::new();
        builder.add_bytes(&[]);
        assert!(builder.is_empty());
        assert_eq!(builder.allocated(), 0);

        builder.add_bytes(&[9; 16]);
        builder.free();
        assert!(builder.is_empty());
        assert_eq!(builder.allocated(), 0);

        // a freed builder starts over with an exact allocation
        builder.add_bytes(&[7; 5]);
        assert_eq!(builder.allocated(), 5);
        assert_eq!(builder.as_bytes(), &[7; 5]);
    }

    #[test]
    fn test_builder_add_vertices() {
        let mut builder = MeshBuilder::new();
        let vertices = [
            TestVertex {
                pos: [0.0, 1.0, 2.0],
                uv: [0.5, 0.5],
                tex_index: 3,
            };
            3
        ];
        builder.add_vertices(&vertices);
        assert_eq!(builder.len(), 3 * test_layout().stride());
        let tex_index = i32::from_ne_bytes(builder.as_bytes()[20..24].try_into().unwrap());
        assert_eq!(tex_index, 3);
    }

    #[test]
    fn test_draw_modes() {
        assert_eq!(DrawMode::default(), DrawMode::Triangles);
        assert_eq!(DrawMode::Lines.gl_mode(), glow::LINES);
        assert_eq!(gl_enum_name(DrawMode::TriangleFan.gl_mode()), "GL_TRIANGLE_FAN");
    }
}
