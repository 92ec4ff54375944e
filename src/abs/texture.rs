//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture,
//! either a single 2D texture or a 2D texture array. Images are flipped vertically on load so
//! that the first row in memory is the bottom of the image, which is what OpenGL expects.

use std::{fmt, path::Path, sync::Arc};

use glow::HasContext;
use image::{DynamicImage, RgbaImage};

use crate::{
    error::{Error, Result},
    glenum::gl_enum_name,
};

/// The target a texture is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Texture2D,
    Texture2DArray,
}

impl TextureKind {
    pub fn gl_target(self) -> u32 {
        match self {
            TextureKind::Texture2D => glow::TEXTURE_2D,
            TextureKind::Texture2DArray => glow::TEXTURE_2D_ARRAY,
        }
    }
}

/// Converts to RGBA8 and flips so the bottom row comes first.
fn to_gl_rgba(image: &DynamicImage) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    image::imageops::flip_vertical_in_place(&mut rgba);
    rgba
}

/// Decodes an image file into flipped RGBA8.
pub fn decode_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|source| {
        log::error!("error loading texture {}: {source}", path.display());
        Error::Image {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(to_gl_rgba(&image))
}

/// Layer plan for a texture array.
///
/// The first image sets the size of every layer. Images of a different size are dropped,
/// leaving their layer blank.
#[derive(Debug, Clone)]
pub struct ArrayLayers {
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Option<RgbaImage>>,
}

impl ArrayLayers {
    /// Plans the layers from already decoded images.
    ///
    /// Each image comes with a label used in warnings.
    pub fn plan(images: Vec<(String, RgbaImage)>) -> Result<Self> {
        let mut images = images.into_iter();
        let Some((_, first)) = images.next() else {
            log::error!("couldn't load texture array, no images given");
            return Err(Error::EmptyTextureArray);
        };
        let (width, height) = first.dimensions();
        let mut layers = vec![Some(first)];
        for (label, image) in images {
            if image.dimensions() != (width, height) {
                log::warn!("image {label} does not match size {width}x{height}, skipping");
                layers.push(None);
            } else {
                layers.push(Some(image));
            }
        }
        Ok(Self {
            width,
            height,
            layers,
        })
    }

    /// Decodes every path and plans the layers. Any decode failure is an error.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let images = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                decode_rgba(path).map(|image| (path.display().to_string(), image))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::plan(images)
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Layers that will actually receive pixels.
    pub fn filled(&self) -> impl Iterator<Item = (usize, &RgbaImage)> {
        self.layers
            .iter()
            .enumerate()
            .filter_map(|(i, layer)| layer.as_ref().map(|image| (i, image)))
    }
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    kind: TextureKind,
    width: u32,
    height: u32,
    layers: u32,
}

impl Texture {
    /// Loads a 2D texture from an image file.
    pub fn load(gl: &Arc<glow::Context>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = decode_rgba(path)?;
        let texture = Self::from_rgba(gl, &image)?;
        log::debug!("loaded texture {} from {}", texture.id.0, path.display());
        Ok(texture)
    }

    /// Creates a 2D texture from the given [`image::DynamicImage`].
    pub fn from_image(gl: &Arc<glow::Context>, image: &DynamicImage) -> Result<Self> {
        let texture = Self::from_rgba(gl, &to_gl_rgba(image))?;
        log::debug!(
            "created texture {} ({}x{}) from image",
            texture.id.0,
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    fn from_rgba(gl: &Arc<glow::Context>, image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        unsafe {
            let texture = gl.create_texture().map_err(Error::Gl)?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            set_nearest(gl, glow::TEXTURE_2D);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(image.as_raw().as_slice())),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                kind: TextureKind::Texture2D,
                width,
                height,
                layers: 1,
            })
        }
    }

    /// Loads a 2D texture array with one layer per path.
    pub fn load_array<P: AsRef<Path>>(gl: &Arc<glow::Context>, paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            log::error!("couldn't load texture array, no paths given");
            return Err(Error::EmptyTextureArray);
        }
        let layers = ArrayLayers::load(paths)?;
        let texture = Self::from_layers(gl, &layers)?;
        log::debug!(
            "loaded texture array {} with {} layers",
            texture.id.0,
            texture.layers
        );
        Ok(texture)
    }

    /// Creates a 2D texture array from already decoded images.
    pub fn from_images_array(gl: &Arc<glow::Context>, images: &[DynamicImage]) -> Result<Self> {
        let images = images
            .iter()
            .enumerate()
            .map(|(i, image)| (format!("#{i}"), to_gl_rgba(image)))
            .collect();
        let texture = Self::from_layers(gl, &ArrayLayers::plan(images)?)?;
        log::debug!(
            "created texture array {} with {} layers from images",
            texture.id.0,
            texture.layers
        );
        Ok(texture)
    }

    /// Uploads a planned set of layers.
    pub fn from_layers(gl: &Arc<glow::Context>, layers: &ArrayLayers) -> Result<Self> {
        let depth = layers.depth() as i32;
        unsafe {
            let texture = gl.create_texture().map_err(Error::Gl)?;
            gl.bind_texture(glow::TEXTURE_2D_ARRAY, Some(texture));
            set_nearest(gl, glow::TEXTURE_2D_ARRAY);
            gl.tex_image_3d(
                glow::TEXTURE_2D_ARRAY,
                0,
                glow::RGBA8 as i32,
                layers.width as i32,
                layers.height as i32,
                depth,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
            for (i, image) in layers.filled() {
                gl.tex_sub_image_3d(
                    glow::TEXTURE_2D_ARRAY,
                    0,
                    0,
                    0,
                    i as i32,
                    layers.width as i32,
                    layers.height as i32,
                    1,
                    glow::RGBA,
                    glow::UNSIGNED_BYTE,
                    glow::PixelUnpackData::Slice(Some(image.as_raw().as_slice())),
                );
            }
            gl.bind_texture(glow::TEXTURE_2D_ARRAY, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                kind: TextureKind::Texture2DArray,
                width: layers.width,
                height: layers.height,
                layers: depth as u32,
            })
        }
    }

    /// Binds the texture to the specified texture unit.
    pub fn bind(&self, slot: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + slot);
            self.gl.bind_texture(self.kind.gl_target(), Some(self.id));
        }
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of layers, 1 for a plain 2D texture.
    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn id(&self) -> glow::Texture {
        self.id
    }
}

unsafe fn set_nearest(gl: &glow::Context, target: u32) {
    unsafe {
        gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
        log::debug!("deleted texture {}", self.id.0);
    }
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.kind.gl_target();
        writeln!(f, "Texture {{")?;
        writeln!(f, "  id: {}", self.id.0)?;
        writeln!(f, "  type: {} ({target})", gl_enum_name(target))?;
        writeln!(f, "  size: {}x{}x{}", self.width, self.height, self.layers)?;
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, value: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
    }

    #[test]
    fn test_plan_skips_mismatched_layers() {
        let layers = ArrayLayers::plan(vec![
            ("a".to_string(), solid(4, 4, 1)),
            ("b".to_string(), solid(4, 4, 2)),
            ("c".to_string(), solid(8, 4, 3)),
            ("d".to_string(), solid(4, 4, 4)),
        ])
        .unwrap();
        assert_eq!((layers.width, layers.height), (4, 4));
        assert_eq!(layers.depth(), 4);
        let filled = layers.filled().map(|(i, _)| i).collect::<Vec<_>>();
        assert_eq!(filled, vec![0, 1, 3]);
        assert!(layers.layers[2].is_none());
    }

    #[test]
    fn test_plan_rejects_empty() {
        assert!(matches!(
            ArrayLayers::plan(Vec::new()),
            Err(Error::EmptyTextureArray)
        ));
    }

    #[test]
    fn test_decode_flips_vertically() {
        let mut image = RgbaImage::new(1, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        let path = std::env::temp_dir().join(format!("nugl-flip-{}.png", std::process::id()));
        image.save(&path).unwrap();

        let decoded = decode_rgba(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(decoded.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_load_fails_on_missing_file() {
        let missing = std::env::temp_dir().join("nugl-no-such-texture.png");
        let err = ArrayLayers::load(&[missing]).unwrap_err();
        assert!(matches!(err, Error::Image { .. }));
    }

    #[test]
    fn test_kind_targets() {
        assert_eq!(TextureKind::Texture2D.gl_target(), glow::TEXTURE_2D);
        assert_eq!(
            gl_enum_name(TextureKind::Texture2DArray.gl_target()),
            "GL_TEXTURE_2D_ARRAY"
        );
    }
}
