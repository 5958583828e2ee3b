/// WGSL shader for the wave surface: grid vertices displaced by the
/// per-vertex height attribute, lambert-lit, colored by height.
pub const SURFACE_SHADER: &str = r#"
struct SurfaceUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    normal_rot: mat4x4<f32>,
    // x = wave amplitude, y/z/w unused
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: SurfaceUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) height: f32,
    @location(2) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) height: f32,
};

@vertex
fn vs_surface(vertex: VertexInput) -> VertexOutput {
    let displaced = vec3<f32>(vertex.position.x, vertex.height, vertex.position.z);
    let world = uniforms.model * vec4<f32>(displaced, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world;
    out.normal = normalize((uniforms.normal_rot * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.height = vertex.height;
    return out;
}

@fragment
fn fs_surface(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let ambient = 0.3;
    let diffuse = max(dot(normalize(in.normal), light_dir), 0.0);
    let lighting = ambient + diffuse * 0.7;

    // Grade from deep blue in the troughs to cyan on the crests.
    let amplitude = max(uniforms.params.x, 1e-6);
    let t = clamp(in.height / amplitude * 0.5 + 0.5, 0.0, 1.0);
    let base = mix(vec3<f32>(0.05, 0.15, 0.5), vec3<f32>(0.3, 0.9, 0.9), t);
    return vec4<f32>(base * lighting, 1.0);
}
"#;

/// WGSL shader for backdrop panels: a unit quad under a screen-space
/// transform with a single uniform color.
pub const PANEL_SHADER: &str = r#"
struct PanelUniforms {
    transform: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: PanelUniforms;

struct PanelOutput {
    @builtin(position) clip_position: vec4<f32>,
};

@vertex
fn vs_panel(@location(0) position: vec2<f32>) -> PanelOutput {
    var out: PanelOutput;
    out.clip_position = uniforms.transform * vec4<f32>(position, 0.0, 1.0);
    return out;
}

@fragment
fn fs_panel(_in: PanelOutput) -> @location(0) vec4<f32> {
    return uniforms.color;
}
"#;
