//! Symbolic names for the handful of GL enums the handles store.

/// Returns the `GL_*` name of `e`, or `"UNKNOWN GLENUM"`.
pub fn gl_enum_name(e: u32) -> &'static str {
    match e {
        glow::FLOAT => "GL_FLOAT",
        glow::FLOAT_VEC2 => "GL_FLOAT_VEC2",
        glow::FLOAT_VEC3 => "GL_FLOAT_VEC3",
        glow::FLOAT_VEC4 => "GL_FLOAT_VEC4",
        glow::INT => "GL_INT",
        glow::UNSIGNED_INT => "GL_UNSIGNED_INT",
        glow::FLOAT_MAT3 => "GL_FLOAT_MAT3",
        glow::FLOAT_MAT4 => "GL_FLOAT_MAT4",
        glow::SAMPLER_2D => "GL_SAMPLER_2D",
        glow::SAMPLER_2D_ARRAY => "GL_SAMPLER_2D_ARRAY",
        glow::TEXTURE_2D => "GL_TEXTURE_2D",
        glow::TEXTURE_2D_ARRAY => "GL_TEXTURE_2D_ARRAY",
        glow::POINTS => "GL_POINTS",
        glow::LINES => "GL_LINES",
        glow::LINE_STRIP => "GL_LINE_STRIP",
        glow::LINE_LOOP => "GL_LINE_LOOP",
        glow::TRIANGLES => "GL_TRIANGLES",
        glow::TRIANGLE_STRIP => "GL_TRIANGLE_STRIP",
        glow::TRIANGLE_FAN => "GL_TRIANGLE_FAN",
        _ => "UNKNOWN GLENUM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_names() {
        assert_eq!(gl_enum_name(glow::TRIANGLES), "GL_TRIANGLES");
        assert_eq!(gl_enum_name(glow::TEXTURE_2D_ARRAY), "GL_TEXTURE_2D_ARRAY");
        assert_eq!(gl_enum_name(glow::FLOAT_MAT4), "GL_FLOAT_MAT4");
        assert_eq!(gl_enum_name(0xDEAD), "UNKNOWN GLENUM");
    }
}
