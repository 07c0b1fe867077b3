/// WGSL vertex stage for the primary plane.
pub const PLANE_VERTEX_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    time: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * uniforms.model * vec4<f32>(vertex.position, 1.0);
    out.uv = vertex.uv;
    return out;
}
"#;

/// WGSL fragment stage for the primary plane.
///
/// Colors the plane with a uv gradient phased by `time`, modulated by the
/// bound texture (white when none is set).
pub const PLANE_FRAGMENT_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    time: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(0) @binding(1)
var plane_texture: texture_2d<f32>;

@group(0) @binding(2)
var plane_sampler: sampler;

struct FragmentInput {
    @location(0) uv: vec2<f32>,
};

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
    let gradient = 0.5 + 0.5 * cos(uniforms.time + in.uv.xyx + vec3<f32>(0.0, 2.0, 4.0));
    let texel = textureSample(plane_texture, plane_sampler, in.uv);
    return vec4<f32>(gradient * texel.rgb, 1.0);
}
"#;
