use glam::{Vec2, Vec3};
use image::{DynamicImage, Rgba, RgbaImage};
use nugl::{
    Config, DrawMode, Mesh, ShaderProgram, Texture, UniformKind, VertexComponent, VertexLayout,
    Window,
};
use sdl2::keyboard::Keycode;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

const SPEED: f32 = 0.01;

fn checkerboard(size: u32, cell: u32, a: [u8; 3], b: [u8; 3]) -> DynamicImage {
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let [r, g, bl] = if (x / cell + y / cell) % 2 == 0 { a } else { b };
        Rgba([r, g, bl, 255])
    });
    DynamicImage::ImageRgba8(image)
}

fn quad_vertices() -> Vec<QuadVertex> {
    let corners = [
        ([-0.5, -0.5], [0.0, 0.0]),
        ([0.5, -0.5], [1.0, 0.0]),
        ([0.5, 0.5], [1.0, 1.0]),
        ([-0.5, 0.5], [0.0, 1.0]),
    ];
    [0, 1, 2, 0, 2, 3]
        .into_iter()
        .map(|i| QuadVertex {
            pos: corners[i].0,
            uv: corners[i].1,
        })
        .collect()
}

fn run() -> nugl::Result<()> {
    let config = Config::load_or_default("nugl.json")?;
    nugl::logging::init(config.level_filter())?;

    let mut window = Window::new(&config.window)?;
    let gl = window.gl().clone();

    let mut program = ShaderProgram::from_files(
        &gl,
        &[
            concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/quad.vert"),
            concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/quad.frag"),
        ],
    )?;
    program.register_uniform_gl("u_offset", glow::FLOAT_VEC2)?;
    program.register_uniform("u_tint", UniformKind::Vec3)?;
    program.register_uniform("u_layer", UniformKind::Int)?;
    program.register_uniform("u_textures", UniformKind::Int)?;
    log::debug!("\n{program}");

    let textures = Texture::from_images_array(
        &gl,
        &[
            checkerboard(64, 8, [230, 230, 230], [40, 40, 40]),
            checkerboard(64, 16, [200, 60, 60], [60, 60, 200]),
        ],
    )?;
    log::debug!("\n{textures}");

    let mut quad = Mesh::new(
        &gl,
        VertexLayout::new(vec![VertexComponent::floats(2), VertexComponent::floats(2)]),
    )?;
    quad.add_vertices(&quad_vertices());
    quad.send();
    quad.free_builder();
    log::debug!("\n{quad}");

    let mut offset = Vec2::ZERO;
    let mut layer = 0;

    while !window.should_close() {
        if window.key_pressed(Keycode::Escape) {
            window.close();
        }
        if window.key_pressed(Keycode::Space) {
            layer = (layer + 1) % textures.layers() as i32;
        }
        if window.key_pressed(Keycode::L) {
            let mode = match quad.render_mode() {
                DrawMode::Triangles => DrawMode::LineLoop,
                _ => DrawMode::Triangles,
            };
            quad.set_render_mode(mode);
        }
        let axis = |neg, pos| (window.key_state(pos) as i32 - window.key_state(neg) as i32) as f32;
        offset += Vec2::new(
            axis(Keycode::Left, Keycode::Right),
            axis(Keycode::Down, Keycode::Up),
        ) * SPEED;

        let (width, height) = window.size();
        let tint = Vec3::new(
            (window.mouse_x() / width.max(1) as f64) as f32,
            1.0 - (window.mouse_y() / height.max(1) as f64) as f32,
            (1.0 - window.delta_mouse_x().abs().min(50.0) / 50.0) as f32,
        );

        window.start_frame();
        program.use_program();
        program.set_uniform("u_offset", offset)?;
        program.set_uniform("u_tint", tint)?;
        program.set_uniform("u_layer", layer)?;
        program.set_uniform("u_textures", 0)?;
        textures.bind(0);
        quad.render();

        window.update_input();
        window.end_frame();
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("nugl-demo: {e}");
        std::process::exit(1);
    }
}
