// Integration tests for the surface assembler against the recording device

use approx::assert_abs_diff_eq;
use msurf_geometry::{
    shapes, Coloring, Image, NormalComputation, SurfaceDescriptor, SurfaceKind, SurfaceOptions,
};
use msurf_math::{Color, DVec2, DVec3, ParamRange, Vector3};
use msurf_mesh::ShapeRanges;
use msurf_render::{
    BlendMode, BufferUsage, LightSource, RecordingDevice, Semantic, Surface, MAX_LIGHTS,
};

fn floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn grid_options(num_u: usize, num_v: usize) -> SurfaceOptions {
    SurfaceOptions {
        num_u,
        num_v,
        ..SurfaceOptions::default()
    }
}

fn implicit_sphere_options() -> SurfaceOptions {
    let cube = ParamRange::new(-2.0, 2.0);
    SurfaceOptions {
        range_u: cube,
        range_v: cube,
        range_w: cube,
        refinements: vec![12],
        ..SurfaceOptions::default()
    }
}

fn initialized(desc: SurfaceDescriptor) -> (Surface, RecordingDevice) {
    let mut surface = Surface::new();
    let mut device = RecordingDevice::new();
    surface.initialize(desc, &mut device).unwrap();
    (surface, device)
}

#[test]
fn integration_paraboloid_scenario() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(grid_options(3, 3));
    let (surface, device) = initialized(desc);

    assert_eq!(surface.vertex_count().unwrap(), 9);
    assert_eq!(surface.index_count().unwrap(), 24);

    let resources = surface.resources().unwrap();
    let vertices = device.buffer(resources.vertex_buffer).unwrap();
    assert_eq!(vertices.count, 9);
    assert_eq!(vertices.usage, BufferUsage::Default);

    // position followed by normal, six floats per vertex
    let data = floats(&vertices.data);
    let z: Vec<f32> = data.chunks_exact(6).map(|v| v[2]).collect();
    assert_eq!(z, vec![2.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 2.0]);
    for v in data.chunks_exact(6) {
        let n = Vector3::new(v[3] as f64, v[4] as f64, v[5] as f64);
        assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-4);
    }
    assert_eq!(device.indices(resources.index_buffer).unwrap().len(), 24);
}

#[test]
fn integration_grid_sizing() {
    for (n, m) in [(2, 2), (4, 9), (10, 3)] {
        let desc = SurfaceDescriptor::from_shape(shapes::torus(2.0, 0.5))
            .with_options(grid_options(n, m));
        let (surface, _) = initialized(desc);
        assert_eq!(surface.vertex_count().unwrap(), n * m);
        assert_eq!(surface.index_count().unwrap(), 6 * (n - 1) * (m - 1));
    }
}

#[test]
fn integration_cpu_mesh_kept_only_with_updates() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid());
    let (surface, _) = initialized(desc);
    assert!(surface.cpu_mesh().unwrap().is_none());

    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(SurfaceOptions {
        enable_updates: true,
        ..SurfaceOptions::default()
    });
    let (surface, device) = initialized(desc);
    let mesh = surface.cpu_mesh().unwrap().unwrap();
    assert_eq!(mesh.vertex_count(), 2500);
    let vb = surface.resources().unwrap().vertex_buffer;
    assert_eq!(device.buffer(vb).unwrap().usage, BufferUsage::Dynamic);
}

#[test]
fn integration_update_shape_is_idempotent() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(SurfaceOptions {
        enable_updates: true,
        ..grid_options(6, 5)
    });
    let (mut surface, mut device) = initialized(desc);
    let vb = surface.resources().unwrap().vertex_buffer;

    let ranges = ShapeRanges::new(
        ParamRange::new(-3.0, 2.0),
        ParamRange::new(0.5, 1.5),
        ParamRange::KEEP,
    );
    surface.update_shape(ranges, &mut device).unwrap();
    let first = device.buffer(vb).unwrap().data.clone();
    surface.update_shape(ranges, &mut device).unwrap();
    let second = device.buffer(vb).unwrap().data.clone();

    assert_eq!(first, second);
    assert_eq!(device.buffer(vb).unwrap().writes, 2);
    assert_eq!(surface.ranges().unwrap().u, ParamRange::new(-3.0, 2.0));
}

#[test]
fn integration_update_shape_keeps_zero_ranges() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(SurfaceOptions {
        enable_updates: true,
        ..grid_options(3, 3)
    });
    let (mut surface, mut device) = initialized(desc);
    let before = surface.cpu_mesh().unwrap().unwrap().clone();

    surface.update_shape(ShapeRanges::keep(), &mut device).unwrap();
    assert_eq!(surface.cpu_mesh().unwrap().unwrap(), &before);

    let moved = ShapeRanges::new(ParamRange::KEEP, ParamRange::new(0.0, 2.0), ParamRange::KEEP);
    surface.update_shape(moved, &mut device).unwrap();
    let mesh = surface.cpu_mesh().unwrap().unwrap();
    assert_eq!(mesh.positions[0].x, -1.0);
    assert_eq!(mesh.positions[0].y, 0.0);
    assert_eq!(mesh.positions[8].y, 2.0);
}

#[test]
fn integration_implicit_update_replaces_indices() {
    let desc = SurfaceDescriptor::from_shape(shapes::implicit_sphere(1.0)).with_options(
        SurfaceOptions {
            enable_updates: true,
            ..implicit_sphere_options()
        },
    );
    let (mut surface, mut device) = initialized(desc);
    let resources = surface.resources().unwrap();
    let initial = surface.index_count().unwrap();
    assert!(initial > 0);

    let tighter = ParamRange::new(-1.3, 1.3);
    surface
        .update_shape(ShapeRanges::new(tighter, tighter, tighter), &mut device)
        .unwrap();
    let index_buffer = device.buffer(resources.index_buffer).unwrap();
    assert_eq!(index_buffer.writes, 1);
    assert_eq!(index_buffer.count, surface.index_count().unwrap());
    assert_eq!(
        device.buffer(resources.vertex_buffer).unwrap().count,
        surface.vertex_count().unwrap()
    );
    assert_eq!(surface.vertex_count().unwrap(), surface.index_count().unwrap());
}

#[test]
fn integration_implicit_sphere_stays_on_surface() {
    let desc = SurfaceDescriptor::from_shape(shapes::implicit_sphere(1.0)).with_options(
        SurfaceOptions {
            refinements: vec![20],
            max_implicit_triangles: 10_000,
            enable_illuminated: false,
            ..implicit_sphere_options()
        },
    );
    let (surface, device) = initialized(desc);
    let vb = surface.resources().unwrap().vertex_buffer;
    for p in floats(&device.buffer(vb).unwrap().data).chunks_exact(3) {
        let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
        assert!((r - 1.0).abs() < 0.02, "radius {}", r);
    }
}

#[test]
fn integration_implicit_triangle_cap() {
    let mut surface = Surface::new();
    let mut device = RecordingDevice::new();
    let desc = SurfaceDescriptor::from_shape(shapes::implicit_sphere(1.0)).with_options(
        SurfaceOptions {
            refinements: vec![20],
            max_implicit_triangles: 10,
            ..implicit_sphere_options()
        },
    );
    let err = surface.initialize(desc, &mut device).unwrap_err();
    assert!(err.is_resource_exhausted());
    assert!(!surface.is_initialized());
    assert_eq!(device.buffer_count(), 0);
}

#[test]
fn integration_illegal_combinations_rejected() {
    let mut device = RecordingDevice::new();

    let sphere_array = SurfaceDescriptor::from_shape(shapes::sphere(1.0))
        .with_coloring(Coloring::Array(vec![Color::WHITE; 2500]));
    let err = Surface::new().initialize(sphere_array, &mut device).unwrap_err();
    assert!(err.is_configuration());

    let implicit_input_normals = SurfaceDescriptor::from_shape(shapes::implicit_sphere(1.0))
        .with_normals(NormalComputation::input_function(|_, _| Vector3::Z));
    let err = Surface::new()
        .initialize(implicit_input_normals, &mut device)
        .unwrap_err();
    assert!(err.is_configuration());

    let backwards_step = SurfaceDescriptor::from_shape(shapes::implicit_sphere(1.0)).with_options(
        SurfaceOptions {
            delta_value: -1e-4,
            refinements: vec![10],
            ..implicit_sphere_options()
        },
    );
    let err = Surface::new().initialize(backwards_step, &mut device).unwrap_err();
    assert!(err.is_configuration());

    let mut missing = SurfaceDescriptor::new(SurfaceKind::Explicit);
    missing.options = grid_options(3, 3);
    let err = Surface::new().initialize(missing, &mut device).unwrap_err();
    assert!(err.is_configuration());

    assert_eq!(device.buffer_count(), 0);
}

#[test]
fn integration_updates_need_enable_updates() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid())
        .with_coloring(Coloring::Array(vec![Color::WHITE; 2500]));
    let (mut surface, mut device) = initialized(desc);

    let err = surface.update_shape(ShapeRanges::keep(), &mut device).unwrap_err();
    assert!(err.is_usage());
    let err = surface
        .update_colors(&vec![Color::BLACK; 2500], &mut device)
        .unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn integration_update_colors() {
    let options = SurfaceOptions {
        enable_updates: true,
        enable_illuminated: false,
        ..grid_options(2, 2)
    };
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid())
        .with_options(options)
        .with_coloring(Coloring::Array(vec![Color::WHITE; 4]));
    let (mut surface, mut device) = initialized(desc);
    assert!(surface.bindings().unwrap().layout.has(Semantic::Color));

    let colors = vec![
        Color::rgb(1.0, 0.0, 0.0),
        Color::rgb(0.0, 1.0, 0.0),
        Color::rgb(0.0, 0.0, 1.0),
        Color::BLACK,
    ];
    surface.update_colors(&colors, &mut device).unwrap();

    // position then color, seven floats per vertex
    let vb = surface.resources().unwrap().vertex_buffer;
    let data = floats(&device.buffer(vb).unwrap().data);
    let uploaded: Vec<Color> = data
        .chunks_exact(7)
        .map(|v| Color::new(v[3], v[4], v[5], v[6]))
        .collect();
    assert_eq!(uploaded, colors);

    // a later shape update keeps the new colors
    surface.update_shape(ShapeRanges::keep(), &mut device).unwrap();
    assert_eq!(surface.cpu_mesh().unwrap().unwrap().colors, colors);

    let err = surface.update_colors(&colors[..3], &mut device).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn integration_update_requires_matching_coloring() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(SurfaceOptions {
        enable_updates: true,
        ..SurfaceOptions::default()
    });
    let (mut surface, mut device) = initialized(desc);

    let err = surface
        .update_colors(&vec![Color::BLACK; 2500], &mut device)
        .unwrap_err();
    assert!(err.is_usage());
    let err = surface
        .update_texture(Image::filled(2, 2, [0; 4]), &mut device)
        .unwrap_err();
    assert!(err.is_usage());

    surface
        .update_global_color(Color::rgb(0.2, 0.4, 0.6), &mut device)
        .unwrap();
    let color = surface.resources().unwrap().color.unwrap();
    assert_eq!(floats(&device.constant(color).unwrap().data), vec![0.2, 0.4, 0.6, 1.0]);
}

#[test]
fn integration_textured_sphere_and_texture_update() {
    let options = SurfaceOptions {
        enable_updates: true,
        pixelated_texture: true,
        icosphere_depth: 2,
        ..SurfaceOptions::default()
    };
    let desc = SurfaceDescriptor::from_shape(shapes::sphere(1.5))
        .with_options(options)
        .with_coloring(Coloring::Textured(Image::filled(4, 24, [255, 0, 0, 255])));
    let (mut surface, mut device) = initialized(desc);

    let resources = surface.resources().unwrap();
    let texture = resources.texture.unwrap();
    assert_eq!(device.texture(texture).unwrap().height, 24);
    let sampler = device.sampler(resources.sampler.unwrap()).unwrap();
    assert_eq!(*sampler, surface.bindings().unwrap().sampler.unwrap());
    assert_eq!(surface.vertex_count().unwrap(), 162);

    let err = surface
        .update_texture(Image::filled(4, 4, [0; 4]), &mut device)
        .unwrap_err();
    assert!(err.is_configuration());

    surface
        .update_texture(Image::filled(8, 48, [0, 0, 255, 255]), &mut device)
        .unwrap();
    let record = device.texture(texture).unwrap();
    assert_eq!(record.writes, 1);
    assert_eq!(record.width, 8);
}

#[test]
fn integration_lights() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid());
    let (mut surface, mut device) = initialized(desc);
    assert_eq!(surface.lights().unwrap().active_count(), 4);

    let light = LightSource::new(DVec2::new(1.0, 0.5), Color::WHITE, DVec3::new(0.0, 0.0, 10.0));
    surface.update_light(6, light, &mut device).unwrap();
    surface.clear_light(0, &mut device).unwrap();
    assert_eq!(surface.lights().unwrap().active_count(), 4);
    assert_eq!(surface.lights().unwrap().get(6), Some(&light));

    let err = surface.update_light(MAX_LIGHTS, light, &mut device).unwrap_err();
    assert!(err.is_usage());

    let lights = surface.resources().unwrap().lights.unwrap();
    assert_eq!(device.constant(lights).unwrap().writes, 2);

    let unlit = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(SurfaceOptions {
        enable_illuminated: false,
        ..SurfaceOptions::default()
    });
    let (mut surface, mut device) = initialized(unlit);
    assert!(surface.resources().unwrap().lights.is_none());
    assert!(surface.update_light(0, light, &mut device).unwrap_err().is_usage());
}

#[test]
fn integration_no_default_lights() {
    let desc = SurfaceDescriptor::from_shape(shapes::paraboloid()).with_options(SurfaceOptions {
        default_initial_lights: false,
        ..SurfaceOptions::default()
    });
    let (surface, _) = initialized(desc);
    assert_eq!(surface.lights().unwrap().active_count(), 0);
}

#[test]
fn integration_options_from_json() {
    let options = SurfaceOptions::from_json_str(
        r#"{
            "num_u": 4,
            "num_v": 4,
            "enable_transparency": true,
            "double_sided_rendering": true
        }"#,
    )
    .unwrap();
    let desc = SurfaceDescriptor::from_shape(shapes::plane(1.0, 0.0, 0.0)).with_options(options);
    let (surface, _) = initialized(desc);

    let bindings = surface.bindings().unwrap();
    assert_eq!(bindings.blend, BlendMode::OitWeighted);
    assert!(bindings.rasterizer.double_sided);
    assert!(!bindings.rasterizer.wireframe);
    assert_eq!(surface.vertex_count().unwrap(), 16);

    let json = serde_json::to_string(bindings).unwrap();
    assert!(json.contains("OitWeighted"));
}
