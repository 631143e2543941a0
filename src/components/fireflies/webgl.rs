//! Spatial surface: point sprites drawn with WebGL2.
//!
//! Owns a canvas (the renderer), a linked program (the material) and an
//! interleaved vertex buffer with its VAO (the geometry). All of them are
//! released in [`Surface::dispose`], which also drops the GL context so
//! repeated mounts never pile up contexts.

use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{
	HtmlCanvasElement, HtmlElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
	WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject, WebglLoseContext,
};

use super::engine::{Frame, Surface};
use super::error::SurfaceError;
use super::particle::{Particle, Viewport};

/// Floats per vertex: position (3), color (3), size, opacity.
pub const VERTEX_FLOATS: usize = 8;

const VERT_SRC: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 2) in float a_size;
layout(location = 3) in float a_opacity;
uniform mat4 u_view_proj;
uniform float u_pixel_scale;
out vec3 v_color;
out float v_opacity;
void main() {
	gl_Position = u_view_proj * vec4(a_position, 1.0);
	gl_PointSize = max(1.0, a_size * u_pixel_scale / gl_Position.w);
	v_color = a_color;
	v_opacity = a_opacity;
}
"#;

const FRAG_SRC: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
in float v_opacity;
out vec4 o;
void main() {
	float r = length(gl_PointCoord - vec2(0.5)) * 2.0;
	if (r > 1.0) {
		discard;
	}
	float core = 1.0 - smoothstep(0.0, 1.0, r);
	o = vec4(v_color, v_opacity * core * core);
}
"#;

/// Writes the interleaved vertex data for `particles` into `out`.
pub fn pack_vertices(particles: &[Particle<3>], out: &mut Vec<f32>) {
	out.clear();
	out.reserve(particles.len() * VERTEX_FLOATS);
	for p in particles {
		let [r, g, b] = p.color.to_unit_rgb();
		out.extend_from_slice(&[
			p.position[0] as f32,
			p.position[1] as f32,
			p.position[2] as f32,
			r,
			g,
			b,
			p.size as f32,
			p.opacity as f32,
		]);
	}
}

/// Views the `WEBGL_lose_context` extension object as its interface.
///
/// Extension interfaces have no global constructor, so `dyn_into`'s
/// `instanceof` check would always fail.
fn lose_context_extension(extension: Option<js_sys::Object>) -> Result<WebglLoseContext, SurfaceError> {
	extension
		.map(|ext| ext.unchecked_into::<WebglLoseContext>())
		.ok_or(SurfaceError::Unsupported("WEBGL_lose_context"))
}

fn compile_shader(gl: &GL, src: &str, shader_type: u32) -> Result<WebGlShader, SurfaceError> {
	let shader = gl
		.create_shader(shader_type)
		.ok_or(SurfaceError::Shader("could not create shader".into()))?;
	gl.shader_source(&shader, src);
	gl.compile_shader(&shader);
	if !gl
		.get_shader_parameter(&shader, GL::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		let log = gl.get_shader_info_log(&shader).unwrap_or_default();
		gl.delete_shader(Some(&shader));
		return Err(SurfaceError::Shader(log));
	}
	Ok(shader)
}

fn link_program(gl: &GL, shaders: &[WebGlShader]) -> Result<WebGlProgram, SurfaceError> {
	let program = gl
		.create_program()
		.ok_or(SurfaceError::Shader("could not create program".into()))?;
	for shader in shaders {
		gl.attach_shader(&program, shader);
	}
	gl.link_program(&program);
	if !gl
		.get_program_parameter(&program, GL::LINK_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		let log = gl.get_program_info_log(&program).unwrap_or_default();
		gl.delete_program(Some(&program));
		return Err(SurfaceError::Shader(log));
	}
	Ok(program)
}

/// WebGL2 renderer appended to the host element.
pub struct GlSurface {
	canvas: HtmlCanvasElement,
	gl: GL,
	viewport: Viewport,
	program: Option<WebGlProgram>,
	shaders: Vec<WebGlShader>,
	buffer: Option<WebGlBuffer>,
	vao: Option<WebGlVertexArrayObject>,
	u_view_proj: Option<WebGlUniformLocation>,
	u_pixel_scale: Option<WebGlUniformLocation>,
	vertices: Vec<f32>,
	disposed: bool,
}

impl GlSurface {
	/// Creates the canvas, context and pipeline inside `host`.
	pub fn new(host: &HtmlElement, viewport: Viewport) -> Result<Self, SurfaceError> {
		let document = host
			.owner_document()
			.ok_or(SurfaceError::Unsupported("host document"))?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")?
			.dyn_into()
			.map_err(|_| SurfaceError::Js("created <canvas> is not a HtmlCanvasElement".into()))?;
		canvas
			.style()
			.set_property("display", "block")?;

		let gl: GL = canvas
			.get_context("webgl2")?
			.ok_or(SurfaceError::Unsupported("WebGL2"))?
			.dyn_into()
			.map_err(|_| SurfaceError::Unsupported("WebGL2"))?;

		host.append_child(&canvas)?;

		let mut surface = Self {
			canvas,
			gl,
			viewport,
			program: None,
			shaders: Vec::new(),
			buffer: None,
			vao: None,
			u_view_proj: None,
			u_pixel_scale: None,
			vertices: Vec::new(),
			disposed: false,
		};
		if let Err(e) = surface.init_pipeline() {
			if let Err(cleanup) = surface.dispose() {
				warn!("fireflies: cleanup after failed WebGL setup: {}", cleanup);
			}
			return Err(e);
		}
		surface.apply_size();
		Ok(surface)
	}

	fn init_pipeline(&mut self) -> Result<(), SurfaceError> {
		let gl = &self.gl;
		self.shaders.push(compile_shader(gl, VERT_SRC, GL::VERTEX_SHADER)?);
		self.shaders.push(compile_shader(gl, FRAG_SRC, GL::FRAGMENT_SHADER)?);
		let program = link_program(gl, &self.shaders)?;

		self.u_view_proj = gl.get_uniform_location(&program, "u_view_proj");
		self.u_pixel_scale = gl.get_uniform_location(&program, "u_pixel_scale");

		let vao = gl
			.create_vertex_array()
			.ok_or(SurfaceError::Js("could not create vertex array".into()))?;
		let buffer = gl
			.create_buffer()
			.ok_or(SurfaceError::Js("could not create buffer".into()))?;
		gl.bind_vertex_array(Some(&vao));
		gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));

		let stride = (VERTEX_FLOATS * 4) as i32;
		for (location, components, offset) in [(0, 3, 0), (1, 3, 3), (2, 1, 6), (3, 1, 7)] {
			gl.enable_vertex_attrib_array(location);
			gl.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, stride, offset * 4);
		}
		gl.bind_vertex_array(None);

		gl.disable(GL::DEPTH_TEST);
		gl.enable(GL::BLEND);
		gl.blend_func(GL::SRC_ALPHA, GL::ONE);
		gl.clear_color(0.0, 0.0, 0.0, 0.0);

		self.program = Some(program);
		self.vao = Some(vao);
		self.buffer = Some(buffer);
		Ok(())
	}

	fn apply_size(&self) {
		let (w, h) = (self.viewport.width as u32, self.viewport.height as u32);
		self.canvas.set_width(w);
		self.canvas.set_height(h);
		self.gl.viewport(0, 0, w as i32, h as i32);
	}

	fn upload(&self) {
		let gl = &self.gl;
		gl.bind_buffer(GL::ARRAY_BUFFER, self.buffer.as_ref());
		let data = js_sys::Float32Array::from(self.vertices.as_slice());
		gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::DYNAMIC_DRAW);
	}
}

impl Surface<3> for GlSurface {
	fn populate(&mut self, particles: &[Particle<3>]) -> Result<(), SurfaceError> {
		pack_vertices(particles, &mut self.vertices);
		self.upload();
		debug!("fireflies: uploaded {} sprites", particles.len());
		Ok(())
	}

	fn commit(&mut self, frame: &Frame<'_, 3>) -> Result<(), SurfaceError> {
		if self.disposed {
			return Ok(());
		}
		let camera = frame
			.camera
			.ok_or(SurfaceError::Unsupported("spatial frame without camera"))?;
		pack_vertices(frame.particles, &mut self.vertices);
		self.upload();

		let gl = &self.gl;
		gl.clear(GL::COLOR_BUFFER_BIT);
		if frame.particles.is_empty() {
			return Ok(());
		}
		gl.use_program(self.program.as_ref());
		gl.uniform_matrix4fv_with_f32_array(
			self.u_view_proj.as_ref(),
			false,
			&camera.view_projection().to_cols_array(),
		);
		gl.uniform1f(
			self.u_pixel_scale.as_ref(),
			camera.pixel_scale(self.viewport.height),
		);
		gl.bind_vertex_array(self.vao.as_ref());
		gl.draw_arrays(GL::POINTS, 0, frame.particles.len() as i32);
		gl.bind_vertex_array(None);
		Ok(())
	}

	fn resize(&mut self, viewport: Viewport) -> Result<(), SurfaceError> {
		self.viewport = viewport;
		if !self.disposed {
			self.apply_size();
		}
		Ok(())
	}

	fn dispose(&mut self) -> Result<(), SurfaceError> {
		if self.disposed {
			return Ok(());
		}
		self.disposed = true;
		let gl = &self.gl;

		gl.bind_vertex_array(None);
		gl.bind_buffer(GL::ARRAY_BUFFER, None);
		gl.use_program(None);
		gl.delete_vertex_array(self.vao.take().as_ref());
		gl.delete_buffer(self.buffer.take().as_ref());
		if let Some(program) = self.program.take() {
			for shader in &self.shaders {
				gl.detach_shader(&program, shader);
			}
			gl.delete_program(Some(&program));
		}
		for shader in self.shaders.drain(..) {
			gl.delete_shader(Some(&shader));
		}
		self.vertices = Vec::new();
		self.canvas.remove();

		lose_context_extension(gl.get_extension("WEBGL_lose_context")?)?.lose_context();
		debug!("fireflies: released WebGL resources");
		Ok(())
	}
}
