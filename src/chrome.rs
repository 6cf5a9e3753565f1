//! Rendu GPU de la barre d'outils.
//!
//! Utilise `glow` pour les appels OpenGL et `fontdue` pour la rastérisation
//! CPU des libellés. Les glyphes ASCII sont pré-rendus dans un atlas texture
//! au démarrage, puis dessinés comme des quads texturés à chaque frame.
//!
//! La police est chargée à l'exécution (`[toolbar] font_path`, sinon quelques
//! emplacements système courants). Sans police, les contrôles sont dessinés
//! sans libellés.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glow::HasContext;
use tracing::{info, warn};

use crate::config::ToolbarConfig;
use crate::error::{Result, ShellError};
use crate::theme::{Palette, Rgba, ShellStyle};
use crate::toolbar::{Control, Rect, ToolbarLayout};

/// Polices essayées quand `font_path` est vide.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const ATLAS_WIDTH: u32 = 512;

const VERTEX_SHADER: &str = r#"#version 300 es
precision mediump float;
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec2 a_uv;
uniform mat4 u_projection;
out vec2 v_uv;
void main() {
    gl_Position = u_projection * vec4(a_position, 0.0, 1.0);
    v_uv = a_uv;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec2 v_uv;
uniform sampler2D u_texture;
uniform vec4 u_color;
uniform bool u_use_texture;
out vec4 fragColor;
void main() {
    if (u_use_texture) {
        float alpha = texture(u_texture, v_uv).r;
        fragColor = vec4(u_color.rgb, u_color.a * alpha);
    } else {
        fragColor = u_color;
    }
}
"#;

// ─────────────────────────────────────────────────────────────────────────────
// Atlas de glyphes
// ─────────────────────────────────────────────────────────────────────────────

/// Glyphe rastérisé, avant placement dans l'atlas.
struct RasterGlyph {
    c: char,
    width: u32,
    height: u32,
    advance_x: f32,
    offset_x: f32,
    offset_y: f32,
    bitmap: Vec<u8>,
}

/// Position d'un glyphe dans l'atlas.
struct GlyphInfo {
    atlas_x: u32,
    atlas_y: u32,
    width: u32,
    height: u32,
    advance_x: f32,
    offset_x: f32,
    /// Bord bas depuis la ligne de base (positif = vers le haut).
    offset_y: f32,
}

struct GlyphAtlas {
    width: u32,
    height: u32,
    glyphs: HashMap<char, GlyphInfo>,
    pixels: Vec<u8>,
}

impl GlyphAtlas {
    fn build(font: &fontdue::Font, font_size: f32) -> Self {
        let rasterized = (32u8..=126)
            .map(|b| {
                let c = b as char;
                let (metrics, bitmap) = font.rasterize(c, font_size);
                RasterGlyph {
                    c,
                    width: metrics.width as u32,
                    height: metrics.height as u32,
                    advance_x: metrics.advance_width,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    bitmap,
                }
            })
            .collect();
        Self::pack(rasterized)
    }

    /// Rangées de gauche à droite, 1px d'espacement, hauteur en puissance de 2.
    fn pack(rasterized: Vec<RasterGlyph>) -> Self {
        let mut glyphs = HashMap::with_capacity(rasterized.len());
        let (mut x, mut y, mut row_height) = (0u32, 0u32, 0u32);

        for g in &rasterized {
            if x + g.width > ATLAS_WIDTH {
                x = 0;
                y += row_height + 1;
                row_height = 0;
            }
            row_height = row_height.max(g.height);
            glyphs.insert(
                g.c,
                GlyphInfo {
                    atlas_x: x,
                    atlas_y: y,
                    width: g.width,
                    height: g.height,
                    advance_x: g.advance_x,
                    offset_x: g.offset_x,
                    offset_y: g.offset_y,
                },
            );
            x += g.width + 1;
        }

        let height = (y + row_height + 1).next_power_of_two().max(64);
        let mut pixels = vec![0u8; (ATLAS_WIDTH * height) as usize];
        for g in &rasterized {
            let info = &glyphs[&g.c];
            for row in 0..g.height {
                let src = (row * g.width) as usize;
                let dst = ((info.atlas_y + row) * ATLAS_WIDTH + info.atlas_x) as usize;
                let len = g.width as usize;
                if src + len <= g.bitmap.len() && dst + len <= pixels.len() {
                    pixels[dst..dst + len].copy_from_slice(&g.bitmap[src..src + len]);
                }
            }
        }

        Self {
            width: ATLAS_WIDTH,
            height,
            glyphs,
            pixels,
        }
    }

    /// Largeur d'un texte en pixels (les caractères absents comptent une espace).
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().map(|c| self.advance(c, font_size)).sum()
    }

    /// Position X relative avant chaque caractère, plus celle après le dernier.
    fn caret_positions(&self, text: &str, font_size: f32) -> Vec<f32> {
        let mut positions = Vec::with_capacity(text.len() + 1);
        let mut pen_x = 0.0;
        positions.push(pen_x);
        for c in text.chars() {
            pen_x += self.advance(c, font_size);
            positions.push(pen_x);
        }
        positions
    }

    fn advance(&self, c: char, font_size: f32) -> f32 {
        self.glyphs
            .get(&c)
            .or_else(|| self.glyphs.get(&' '))
            .map(|g| g.advance_x)
            .unwrap_or(font_size * 0.5)
    }
}

/// Charge la police configurée ou la première police système trouvée.
fn load_font(config: &ToolbarConfig) -> Option<fontdue::Font> {
    let candidates: Vec<&str> = if config.font_path.is_empty() {
        SYSTEM_FONTS.to_vec()
    } else {
        vec![config.font_path.as_str()]
    };

    for path in candidates {
        let Ok(bytes) = std::fs::read(Path::new(path)) else {
            continue;
        };
        match fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()) {
            Ok(font) => {
                info!(path, "Police de la barre d'outils chargée");
                return Some(font);
            }
            Err(e) => warn!(path, error = e, "Police illisible"),
        }
    }
    warn!("Aucune police trouvée, barre d'outils sans libellés");
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Ce qu'il faut dessiner pour une frame.
pub struct ToolbarFrame<'a> {
    pub layout: &'a ToolbarLayout,
    pub style: ShellStyle,
    pub field_text: &'a str,
    /// Position du curseur en caractères, si le champ a le focus.
    pub cursor: Option<usize>,
    pub checked: &'a [Control],
}

/// Couleurs d'un contrôle : bordure 1px, fond, libellé.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ControlColors {
    border: Rgba,
    fill: Rgba,
    text: Rgba,
}

/// Le thème donne le fond et le texte ; la palette les bordures, la
/// surbrillance des bascules actives et du champ focusé.
fn control_colors(palette: &Palette, style: ShellStyle, checked: bool, focused: bool) -> ControlColors {
    if checked {
        return ControlColors {
            border: palette.button,
            fill: palette.highlight,
            text: palette.highlighted_text,
        };
    }
    ControlColors {
        border: if focused { palette.highlight } else { palette.button },
        fill: style.background,
        text: style.text,
    }
}

impl ToolbarFrame<'_> {
    fn colors(&self, palette: &Palette, control: Control) -> ControlColors {
        let focused = control == Control::SearchField && self.cursor.is_some();
        control_colors(palette, self.style, self.checked.contains(&control), focused)
    }

    /// Rectangles pleins de la frame, dans l'ordre de dessin : fond, filet
    /// de séparation avec la page, puis bordure et fond de chaque contrôle.
    fn rects(&self, palette: &Palette, width: f32) -> Vec<(Rect, Rgba)> {
        let height = self.layout.height();
        let mut rects = vec![
            (Rect { x: 0.0, y: 0.0, w: width, h: height }, self.style.background),
            (Rect { x: 0.0, y: height - 1.0, w: width, h: 1.0 }, palette.window),
        ];
        for &(control, rect) in self.layout.slots() {
            if rect.w < 2.0 || rect.h < 2.0 {
                continue;
            }
            let colors = self.colors(palette, control);
            rects.push((rect, colors.border));
            rects.push((
                Rect {
                    x: rect.x + 1.0,
                    y: rect.y + 1.0,
                    w: rect.w - 2.0,
                    h: rect.h - 2.0,
                },
                colors.fill,
            ));
        }
        rects
    }
}

/// Décalage horizontal du texte du champ pour garder le curseur visible.
fn scroll_offset(caret_x: f32, visible_width: f32) -> f32 {
    (caret_x - visible_width).max(0.0)
}

/// Renderer OpenGL de la barre d'outils.
pub struct ChromeRenderer {
    gl: Arc<glow::Context>,
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    atlas_texture: Option<glow::Texture>,
    atlas: Option<GlyphAtlas>,
    u_projection: glow::UniformLocation,
    u_color: glow::UniformLocation,
    u_use_texture: glow::UniformLocation,
    u_texture: glow::UniformLocation,
    palette: Palette,
    font_size: f32,
    text_pad: f32,
}

#[allow(unsafe_op_in_unsafe_fn)]
impl ChromeRenderer {
    /// Crée le renderer. Doit être appelé avec un contexte GL actif.
    ///
    /// # Safety
    /// Appelle des fonctions OpenGL.
    pub unsafe fn new(
        gl: Arc<glow::Context>,
        config: &ToolbarConfig,
        palette: Palette,
    ) -> Result<Self> {
        let program = link_program(&gl)?;

        let u_projection = uniform(&gl, program, "u_projection")?;
        let u_color = uniform(&gl, program, "u_color")?;
        let u_use_texture = uniform(&gl, program, "u_use_texture")?;
        let u_texture = uniform(&gl, program, "u_texture")?;

        // Vertex layout : [x, y, u, v] × 6 sommets (2 triangles).
        let vao = gl
            .create_vertex_array()
            .map_err(|e| ShellError::rendering("create_vertex_array", e))?;
        gl.bind_vertex_array(Some(vao));
        let vbo = gl
            .create_buffer()
            .map_err(|e| ShellError::rendering("create_buffer", e))?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        let float = std::mem::size_of::<f32>() as i32;
        gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 4 * float, 0);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, 4 * float, 2 * float);
        gl.enable_vertex_attrib_array(1);
        gl.bind_vertex_array(None);

        let atlas = load_font(config).map(|font| GlyphAtlas::build(&font, config.font_size));
        let atlas_texture = match atlas {
            Some(ref atlas) => Some(upload_atlas(&gl, atlas)?),
            None => None,
        };

        Ok(Self {
            gl,
            program,
            vao,
            vbo,
            atlas_texture,
            atlas,
            u_projection,
            u_color,
            u_use_texture,
            u_texture,
            palette,
            font_size: config.font_size,
            text_pad: 6.0,
        })
    }

    /// Dessine la barre d'outils dans la bande haute de la fenêtre.
    ///
    /// # Safety
    /// Appelle des fonctions OpenGL.
    pub unsafe fn draw(&self, window_width: u32, window_height: u32, frame: &ToolbarFrame<'_>) {
        let gl = &self.gl;
        let w = window_width as f32;
        let h = window_height as f32;

        let prev_blend = gl.is_enabled(glow::BLEND);
        let prev_depth = gl.is_enabled(glow::DEPTH_TEST);
        let prev_scissor = gl.is_enabled(glow::SCISSOR_TEST);

        gl.viewport(0, 0, window_width as i32, window_height as i32);
        gl.disable(glow::DEPTH_TEST);
        gl.disable(glow::SCISSOR_TEST);
        gl.enable(glow::BLEND);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        gl.use_program(Some(self.program));

        // Projection orthographique, origine en haut à gauche.
        #[rustfmt::skip]
        let projection: [f32; 16] = [
            2.0 / w,  0.0,       0.0, 0.0,
            0.0,     -2.0 / h,   0.0, 0.0,
            0.0,      0.0,      -1.0, 0.0,
           -1.0,      1.0,       0.0, 1.0,
        ];
        gl.uniform_matrix_4_f32_slice(Some(&self.u_projection), false, &projection);
        gl.uniform_1_i32(Some(&self.u_texture), 0);
        gl.bind_vertex_array(Some(self.vao));
        if let Some(texture) = self.atlas_texture {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }

        for (rect, color) in frame.rects(&self.palette, w) {
            self.draw_rect(rect.x, rect.y, rect.w, rect.h, color);
        }
        for &(control, rect) in frame.layout.slots() {
            if control == Control::SearchField {
                self.draw_field_text(rect, frame);
            } else {
                self.draw_label(control, rect, frame);
            }
        }

        gl.bind_vertex_array(None);
        gl.use_program(None);
        if prev_depth {
            gl.enable(glow::DEPTH_TEST);
        }
        if !prev_blend {
            gl.disable(glow::BLEND);
        }
        if prev_scissor {
            gl.enable(glow::SCISSOR_TEST);
        }
    }

    unsafe fn draw_label(&self, control: Control, rect: Rect, frame: &ToolbarFrame<'_>) {
        let Some(ref atlas) = self.atlas else {
            return;
        };
        let label = control.label();
        let text_w = atlas.text_width(label, self.font_size);
        let x = rect.x + (rect.w - text_w) / 2.0;
        let color = frame.colors(&self.palette, control).text;
        self.draw_text(x, self.baseline(rect), label, color, rect.x, rect.x + rect.w);
    }

    /// Texte du champ, défilé pour que le curseur reste visible.
    unsafe fn draw_field_text(&self, rect: Rect, frame: &ToolbarFrame<'_>) {
        let min_x = rect.x + self.text_pad;
        let max_x = rect.x + rect.w - self.text_pad;
        let color = frame.colors(&self.palette, Control::SearchField).text;

        let caret_x = match (frame.cursor, self.atlas.as_ref()) {
            (Some(offset), Some(atlas)) => {
                let positions = atlas.caret_positions(frame.field_text, self.font_size);
                positions.get(offset).or(positions.last()).copied()
            }
            (Some(_), None) => Some(0.0),
            (None, _) => None,
        };
        let scroll = caret_x.map_or(0.0, |cx| scroll_offset(cx, max_x - min_x));

        self.draw_text(
            min_x - scroll,
            self.baseline(rect),
            frame.field_text,
            color,
            min_x,
            max_x,
        );

        if let Some(cx) = caret_x {
            let cx = (min_x + cx - scroll).min(max_x);
            let ch = (self.font_size + 4.0).min(rect.h);
            self.draw_rect(cx, rect.y + (rect.h - ch) / 2.0, 2.0, ch, color);
        }
    }

    fn baseline(&self, rect: Rect) -> f32 {
        rect.y + rect.h / 2.0 + self.font_size / 3.0
    }

    /// Dessine `text` depuis `x` ; seuls les glyphes entièrement compris dans
    /// `[min_x, max_x]` sont tracés.
    unsafe fn draw_text(&self, x: f32, baseline: f32, text: &str, color: Rgba, min_x: f32, max_x: f32) {
        let Some(ref atlas) = self.atlas else {
            return;
        };

        let mut pen_x = x;
        for c in text.chars() {
            if pen_x > max_x {
                break;
            }
            if let Some(glyph) = atlas.glyphs.get(&c)
                && glyph.width > 0
                && glyph.height > 0
            {
                let gx = pen_x + glyph.offset_x;
                if gx >= min_x && gx + glyph.width as f32 <= max_x {
                    let gy = baseline - glyph.offset_y - glyph.height as f32;
                    self.draw_glyph(atlas, glyph, gx, gy, color);
                }
            }
            pen_x += atlas.advance(c, self.font_size);
        }
    }

    unsafe fn draw_rect(&self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.gl.uniform_1_i32(Some(&self.u_use_texture), 0);
        self.gl.uniform_4_f32_slice(Some(&self.u_color), &color);
        self.draw_quad(quad(x, y, w, h, [0.0, 0.0, 0.0, 0.0]));
    }

    unsafe fn draw_glyph(&self, atlas: &GlyphAtlas, glyph: &GlyphInfo, x: f32, y: f32, color: Rgba) {
        self.gl.uniform_1_i32(Some(&self.u_use_texture), 1);
        self.gl.uniform_4_f32_slice(Some(&self.u_color), &color);

        let aw = atlas.width as f32;
        let ah = atlas.height as f32;
        let uv = [
            glyph.atlas_x as f32 / aw,
            glyph.atlas_y as f32 / ah,
            (glyph.atlas_x + glyph.width) as f32 / aw,
            (glyph.atlas_y + glyph.height) as f32 / ah,
        ];
        self.draw_quad(quad(x, y, glyph.width as f32, glyph.height as f32, uv));
    }

    unsafe fn draw_quad(&self, vertices: [f32; 24]) {
        self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
        self.gl
            .buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(&vertices), glow::DYNAMIC_DRAW);
        self.gl.draw_arrays(glow::TRIANGLES, 0, 6);
    }
}

/// Deux triangles couvrant le rectangle ; `uv` = [u0, v0, u1, v1].
fn quad(x: f32, y: f32, w: f32, h: f32, uv: [f32; 4]) -> [f32; 24] {
    let [u0, v0, u1, v1] = uv;
    #[rustfmt::skip]
    let vertices = [
        x,     y,     u0, v0,
        x + w, y,     u1, v0,
        x + w, y + h, u1, v1,
        x,     y,     u0, v0,
        x + w, y + h, u1, v1,
        x,     y + h, u0, v1,
    ];
    vertices
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn link_program(gl: &glow::Context) -> Result<glow::Program> {
    let program = gl
        .create_program()
        .map_err(|e| ShellError::rendering("create_program", e))?;
    let mut shaders = Vec::with_capacity(2);
    for (kind, source) in [
        (glow::VERTEX_SHADER, VERTEX_SHADER),
        (glow::FRAGMENT_SHADER, FRAGMENT_SHADER),
    ] {
        let shader = gl
            .create_shader(kind)
            .map_err(|e| ShellError::rendering("create_shader", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            return Err(ShellError::rendering(
                "compile_shader",
                gl.get_shader_info_log(shader),
            ));
        }
        gl.attach_shader(program, shader);
        shaders.push(shader);
    }
    gl.link_program(program);
    if !gl.get_program_link_status(program) {
        return Err(ShellError::rendering(
            "link_program",
            gl.get_program_info_log(program),
        ));
    }
    for shader in shaders {
        gl.delete_shader(shader);
    }
    Ok(program)
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn uniform(
    gl: &glow::Context,
    program: glow::Program,
    name: &'static str,
) -> Result<glow::UniformLocation> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| ShellError::rendering("get_uniform_location", name))
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn upload_atlas(gl: &glow::Context, atlas: &GlyphAtlas) -> Result<glow::Texture> {
    let texture = gl
        .create_texture()
        .map_err(|e| ShellError::rendering("create_texture", e))?;
    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    for (param, value) in [
        (glow::TEXTURE_MIN_FILTER, glow::LINEAR),
        (glow::TEXTURE_MAG_FILTER, glow::LINEAR),
        (glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE),
        (glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE),
    ] {
        gl.tex_parameter_i32(glow::TEXTURE_2D, param, value as i32);
    }
    gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
    gl.tex_image_2d(
        glow::TEXTURE_2D,
        0,
        glow::R8 as i32,
        atlas.width as i32,
        atlas.height as i32,
        0,
        glow::RED,
        glow::UNSIGNED_BYTE,
        glow::PixelUnpackData::Slice(Some(&atlas.pixels)),
    );
    Ok(texture)
}

/// Vue octets d'un slice `[f32]` pour l'upload GL.
fn as_bytes(data: &[f32]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(c: char, width: u32, height: u32) -> RasterGlyph {
        RasterGlyph {
            c,
            width,
            height,
            advance_x: width as f32 + 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            bitmap: vec![255; (width * height) as usize],
        }
    }

    /// 95 glyphes ASCII de taille variable.
    fn ascii_atlas() -> GlyphAtlas {
        GlyphAtlas::pack(
            (32u8..=126)
                .map(|b| {
                    let c = b as char;
                    if c == ' ' {
                        glyph(c, 0, 0)
                    } else {
                        glyph(c, 6 + (b as u32 % 7), 10 + (b as u32 % 5))
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_atlas_contains_every_packed_glyph() {
        let atlas = ascii_atlas();
        for b in 32u8..=126 {
            assert!(atlas.glyphs.contains_key(&(b as char)));
        }
    }

    #[test]
    fn test_atlas_dimensions() {
        let atlas = ascii_atlas();
        assert_eq!(atlas.width, 512);
        assert!(atlas.height >= 64);
        assert!(atlas.height.is_power_of_two());
        assert_eq!(atlas.pixels.len(), (atlas.width * atlas.height) as usize);
    }

    #[test]
    fn test_glyphs_within_bounds_and_disjoint() {
        let atlas = ascii_atlas();
        let glyphs: Vec<_> = atlas.glyphs.iter().filter(|(_, g)| g.width > 0).collect();
        for (c, g) in &glyphs {
            assert!(g.atlas_x + g.width <= atlas.width, "{c} exceeds width");
            assert!(g.atlas_y + g.height <= atlas.height, "{c} exceeds height");
        }
        for i in 0..glyphs.len() {
            for j in (i + 1)..glyphs.len() {
                let (a, b) = (glyphs[i].1, glyphs[j].1);
                let overlap_x = a.atlas_x < b.atlas_x + b.width && b.atlas_x < a.atlas_x + a.width;
                let overlap_y =
                    a.atlas_y < b.atlas_y + b.height && b.atlas_y < a.atlas_y + a.height;
                assert!(!(overlap_x && overlap_y), "{} overlaps {}", glyphs[i].0, glyphs[j].0);
            }
        }
    }

    #[test]
    fn test_bitmap_copied_into_atlas() {
        let atlas = GlyphAtlas::pack(vec![glyph('a', 3, 2)]);
        let info = &atlas.glyphs[&'a'];
        let idx = (info.atlas_y * atlas.width + info.atlas_x) as usize;
        assert_eq!(&atlas.pixels[idx..idx + 3], &[255, 255, 255]);
        assert_eq!(atlas.pixels[idx + 3], 0);
    }

    #[test]
    fn test_text_width_falls_back_to_space() {
        let atlas = GlyphAtlas::pack(vec![glyph(' ', 0, 0), glyph('a', 4, 4)]);
        assert_eq!(atlas.text_width("aa", 16.0), 10.0);
        assert_eq!(atlas.text_width("é", 16.0), 1.0);
    }

    #[test]
    fn test_quad_covers_rect() {
        let v = quad(1.0, 2.0, 3.0, 4.0, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(&v[0..2], &[1.0, 2.0]);
        assert_eq!(&v[8..10], &[4.0, 6.0]);
        assert_eq!(&v[10..12], &[1.0, 1.0]);
    }

    #[test]
    fn test_as_bytes_length() {
        assert_eq!(as_bytes(&[1.0f32, 2.0]).len(), 8);
    }

    #[test]
    fn test_missing_font_path_yields_none() {
        let config = ToolbarConfig {
            font_path: "/nonexistent/webshell-font.ttf".to_string(),
            ..ToolbarConfig::default()
        };
        assert!(load_font(&config).is_none());
    }

    fn frame<'a>(
        layout: &'a ToolbarLayout,
        cursor: Option<usize>,
        checked: &'a [Control],
    ) -> ToolbarFrame<'a> {
        ToolbarFrame {
            layout,
            style: crate::theme::Theme::Dark.style(),
            field_text: "",
            cursor,
            checked,
        }
    }

    fn fill_of(rects: &[(Rect, Rgba)], layout: &ToolbarLayout, control: Control) -> Rgba {
        let r = layout.rect(control);
        let inner = Rect {
            x: r.x + 1.0,
            y: r.y + 1.0,
            w: r.w - 2.0,
            h: r.h - 2.0,
        };
        rects
            .iter()
            .find(|(rect, _)| *rect == inner)
            .map(|&(_, color)| color)
            .unwrap()
    }

    fn border_of(rects: &[(Rect, Rgba)], layout: &ToolbarLayout, control: Control) -> Rgba {
        let r = layout.rect(control);
        rects.iter().find(|(rect, _)| *rect == r).map(|&(_, color)| color).unwrap()
    }

    #[test]
    fn test_frame_starts_with_theme_background_and_window_separator() {
        let palette = Palette::dark();
        let layout = ToolbarLayout::compute(800, &ToolbarConfig::default());
        let rects = frame(&layout, None, &[]).rects(&palette, 800.0);

        assert_eq!(rects[0].1, crate::theme::DARK_BACKGROUND);
        assert_eq!(rects[1].0.y, layout.height() - 1.0);
        assert_eq!(rects[1].1, palette.window);
    }

    #[test]
    fn test_checked_toggle_uses_highlight_colors() {
        let palette = Palette::dark();
        let layout = ToolbarLayout::compute(800, &ToolbarConfig::default());
        let f = frame(&layout, None, &[Control::AdBlock]);
        let rects = f.rects(&palette, 800.0);

        assert_eq!(fill_of(&rects, &layout, Control::AdBlock), palette.highlight);
        assert_eq!(f.colors(&palette, Control::AdBlock).text, palette.highlighted_text);
        assert_eq!(fill_of(&rects, &layout, Control::DarkTheme), f.style.background);
        assert_eq!(f.colors(&palette, Control::DarkTheme).text, f.style.text);
        assert_eq!(border_of(&rects, &layout, Control::Back), palette.button);
    }

    #[test]
    fn test_focused_field_border_uses_highlight() {
        let palette = Palette::dark();
        let layout = ToolbarLayout::compute(800, &ToolbarConfig::default());

        let focused = frame(&layout, Some(0), &[]).rects(&palette, 800.0);
        assert_eq!(border_of(&focused, &layout, Control::SearchField), palette.highlight);

        let unfocused = frame(&layout, None, &[]).rects(&palette, 800.0);
        assert_eq!(border_of(&unfocused, &layout, Control::SearchField), palette.button);
    }

    #[test]
    fn test_caret_positions_are_cumulative_advances() {
        let atlas = GlyphAtlas::pack(vec![glyph(' ', 0, 0), glyph('a', 4, 4), glyph('b', 2, 4)]);
        assert_eq!(atlas.caret_positions("ab", 16.0), vec![0.0, 5.0, 8.0]);
        assert_eq!(atlas.caret_positions("", 16.0), vec![0.0]);
    }

    #[test]
    fn test_field_scrolls_only_when_caret_overflows() {
        assert_eq!(scroll_offset(40.0, 100.0), 0.0);
        assert_eq!(scroll_offset(100.0, 100.0), 0.0);
        assert_eq!(scroll_offset(130.0, 100.0), 30.0);
    }

    #[test]
    fn test_scrolled_caret_stays_inside_field() {
        let atlas = GlyphAtlas::pack(vec![glyph(' ', 0, 0), glyph('a', 9, 4)]);
        let text = "a".repeat(50);
        let positions = atlas.caret_positions(&text, 16.0);
        let visible = 120.0;
        for offset in [0, 12, 13, 50] {
            let caret = positions[offset];
            let shown = caret - scroll_offset(caret, visible);
            assert!((0.0..=visible).contains(&shown), "offset {offset} shown at {shown}");
        }
        // Fin du texte : collé au bord droit.
        assert_eq!(positions[50] - scroll_offset(positions[50], visible), visible);
    }
}
