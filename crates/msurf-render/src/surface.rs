//! The surface assembler: validates a descriptor, generates its mesh, uploads
//! it and registers the bindings it is drawn with.
//!
//! A [`Surface`] starts uninitialized. [`Surface::initialize`] may succeed
//! once; every other method fails with a usage error until it has.

use msurf_core::{Result, SurfaceError, SurfaceId, Validate};
use msurf_geometry::{Coloring, ColoringMode, Image, SurfaceDescriptor, SurfaceKind};
use msurf_math::{Color, DMat3, DQuat, SurfaceTransform, Vector3};
use msurf_mesh::{generate_mesh, GeneratedMesh, ShapeRanges};
use tracing::{debug, info, warn};

use crate::bindings::RenderBindings;
use crate::device::{BufferId, BufferUsage, ConstantBufferId, GpuDevice, SamplerId, TextureId};
use crate::lights::{LightRig, LightSource};
use crate::pipeline::{ColorUniform, TransformUniform};

/// Device handles owned by an initialized surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceResources {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub texture: Option<TextureId>,
    pub sampler: Option<SamplerId>,
    /// Global coloring only.
    pub color: Option<ConstantBufferId>,
    pub transform: ConstantBufferId,
    /// Illuminated surfaces only.
    pub lights: Option<ConstantBufferId>,
}

struct SurfaceState {
    descriptor: SurfaceDescriptor,
    ranges: ShapeRanges,
    bindings: RenderBindings,
    resources: SurfaceResources,
    vertex_count: usize,
    index_count: usize,
    transform: SurfaceTransform,
    lights: LightRig,
    /// Kept only when updates are enabled.
    mesh: Option<GeneratedMesh>,
}

pub struct Surface {
    id: SurfaceId,
    state: Option<Box<SurfaceState>>,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        Self {
            id: SurfaceId::new(),
            state: None,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Validate `descriptor`, generate the mesh and create every device
    /// resource the surface draws with.
    pub fn initialize(&mut self, descriptor: SurfaceDescriptor, device: &mut dyn GpuDevice) -> Result<()> {
        if self.state.is_some() {
            return Err(SurfaceError::usage(format!("{} is already initialized", self.id)));
        }
        descriptor.validate()?;

        let opts = &descriptor.options;
        let ranges = ShapeRanges::from_options(opts);
        let mesh = generate_mesh(&descriptor, &ranges)?;
        let bindings = RenderBindings::for_descriptor(&descriptor);
        let usage = if opts.enable_updates {
            BufferUsage::Dynamic
        } else {
            BufferUsage::Default
        };

        let vertex_bytes = bindings.layout.pack(&mesh)?;
        let vertex_buffer = device.create_vertex_buffer(
            &vertex_bytes,
            bindings.layout.stride(),
            mesh.vertex_count(),
            usage,
        )?;
        let index_buffer = device.create_index_buffer(&mesh.indices, usage)?;

        let (texture, sampler) = match (&descriptor.coloring, bindings.sampler) {
            (Coloring::Textured(image), Some(sampler)) => {
                let kind = ColoringMode::texture_kind(descriptor.kind).ok_or_else(|| {
                    SurfaceError::config(format!("{} surfaces cannot be textured", descriptor.kind))
                })?;
                (
                    Some(device.create_texture(image, usage, kind)?),
                    Some(device.create_sampler(sampler)?),
                )
            }
            _ => (None, None),
        };

        let color = match descriptor.coloring {
            Coloring::Global(c) => Some(device.create_constant_buffer(bytemuck::bytes_of(&ColorUniform::from(c)))?),
            _ => None,
        };

        let transform = SurfaceTransform::identity();
        let transform_buffer =
            device.create_constant_buffer(bytemuck::bytes_of(&TransformUniform::from_transform(&transform)))?;

        let lights = if opts.default_initial_lights {
            LightRig::default_rig()
        } else {
            LightRig::empty()
        };
        let light_buffer = if opts.enable_illuminated {
            Some(device.create_constant_buffer(bytemuck::bytes_of(&lights.to_uniform()))?)
        } else {
            None
        };

        info!(
            surface = %self.id,
            kind = %descriptor.kind,
            coloring = %descriptor.coloring.mode(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            shaders = %bindings.shaders,
            updates = opts.enable_updates,
            "surface initialized"
        );

        let keep_mesh = opts.enable_updates;
        self.state = Some(Box::new(SurfaceState {
            ranges,
            bindings,
            resources: SurfaceResources {
                vertex_buffer,
                index_buffer,
                texture,
                sampler,
                color,
                transform: transform_buffer,
                lights: light_buffer,
            },
            vertex_count: mesh.vertex_count(),
            index_count: mesh.indices.len(),
            transform,
            lights,
            mesh: keep_mesh.then_some(mesh),
            descriptor,
        }));
        Ok(())
    }

    fn state(&self) -> Result<&SurfaceState> {
        self.state
            .as_deref()
            .ok_or_else(|| SurfaceError::usage(format!("{} is not initialized", self.id)))
    }

    fn state_mut(&mut self) -> Result<&mut SurfaceState> {
        let id = self.id;
        self.state
            .as_deref_mut()
            .ok_or_else(|| SurfaceError::usage(format!("{} is not initialized", id)))
    }

    /// Regenerate the mesh over `ranges` with the original functions. A
    /// `(0, 0)` range keeps the current one. Implicit surfaces are
    /// polygonized again from scratch and get a new index list, written
    /// before the vertices and restored if the vertex upload fails.
    pub fn update_shape(&mut self, ranges: ShapeRanges, device: &mut dyn GpuDevice) -> Result<()> {
        let id = self.id;
        let state = self.state_mut()?;
        state.require_updates("update_shape")?;

        let ranges = state.ranges.merge(ranges);
        let mesh = generate_mesh(&state.descriptor, &ranges)?;
        let bytes = state.bindings.layout.pack(&mesh)?;
        let reindex = state.descriptor.kind == SurfaceKind::Implicit;
        if reindex {
            device.replace_index_buffer(state.resources.index_buffer, &mesh.indices)?;
        }
        if let Err(err) = device.update_vertices(state.resources.vertex_buffer, &bytes, mesh.vertex_count()) {
            // put the previous indices back so both buffers describe the old mesh
            if let (true, Some(previous)) = (reindex, &state.mesh) {
                if let Err(restore) = device.replace_index_buffer(state.resources.index_buffer, &previous.indices) {
                    warn!(surface = %id, error = %restore, "could not restore index buffer");
                }
            }
            return Err(err);
        }

        debug!(surface = %id, vertices = mesh.vertex_count(), "shape updated");
        state.ranges = ranges;
        state.vertex_count = mesh.vertex_count();
        state.index_count = mesh.indices.len();
        state.mesh = Some(mesh);
        Ok(())
    }

    /// Replace the per-sample colors of an array-colored surface.
    pub fn update_colors(&mut self, colors: &[Color], device: &mut dyn GpuDevice) -> Result<()> {
        let state = self.state_mut()?;
        state.require_updates("update_colors")?;
        state.require_coloring(ColoringMode::Array, "update_colors")?;
        let expected = state.descriptor.options.grid_len();
        if colors.len() != expected {
            return Err(SurfaceError::config(format!(
                "color array has {} entries, grid has {}",
                colors.len(),
                expected
            )));
        }

        let current = state.cpu_mesh()?;
        let mut next = current.clone();
        next.colors = colors.to_vec();
        let bytes = state.bindings.layout.pack(&next)?;
        device.update_vertices(state.resources.vertex_buffer, &bytes, next.vertex_count())?;

        state.descriptor.coloring = Coloring::Array(next.colors.clone());
        state.mesh = Some(next);
        Ok(())
    }

    /// Replace the image of a textured surface.
    pub fn update_texture(&mut self, image: Image, device: &mut dyn GpuDevice) -> Result<()> {
        let state = self.state_mut()?;
        state.require_updates("update_texture")?;
        state.require_coloring(ColoringMode::Textured, "update_texture")?;
        let texture = state
            .resources
            .texture
            .ok_or_else(|| SurfaceError::usage("textured surface has no texture"))?;
        if let Some(kind) = ColoringMode::texture_kind(state.descriptor.kind) {
            image.check_for(kind)?;
        }
        device.update_texture(texture, &image)?;
        state.descriptor.coloring = Coloring::Textured(image);
        Ok(())
    }

    pub fn update_global_color(&mut self, color: Color, device: &mut dyn GpuDevice) -> Result<()> {
        let state = self.state_mut()?;
        state.require_coloring(ColoringMode::Global, "update_global_color")?;
        let buffer = state
            .resources
            .color
            .ok_or_else(|| SurfaceError::usage("globally colored surface has no color buffer"))?;
        device.update_constant_buffer(buffer, bytemuck::bytes_of(&ColorUniform::from(color)))?;
        state.descriptor.coloring = Coloring::Global(color);
        Ok(())
    }

    /// Rotate by `angle` radians around `axis`, replacing the current rotation.
    pub fn update_rotation(&mut self, axis: Vector3, angle: f64, device: &mut dyn GpuDevice) -> Result<()> {
        let rotation = SurfaceTransform::axis_rotation(axis, angle);
        self.update_transform(device, |t| t.rotation = rotation)
    }

    pub fn update_rotation_quat(&mut self, rotation: DQuat, device: &mut dyn GpuDevice) -> Result<()> {
        let rotation = rotation.normalize();
        self.update_transform(device, |t| t.rotation = rotation)
    }

    pub fn update_position(&mut self, position: Vector3, device: &mut dyn GpuDevice) -> Result<()> {
        self.update_transform(device, |t| t.position = position)
    }

    /// Linear distortion applied before rotation and translation.
    pub fn update_distortion(&mut self, distortion: DMat3, device: &mut dyn GpuDevice) -> Result<()> {
        self.update_transform(device, |t| t.distortion = distortion)
    }

    fn update_transform(
        &mut self,
        device: &mut dyn GpuDevice,
        edit: impl FnOnce(&mut SurfaceTransform),
    ) -> Result<()> {
        let state = self.state_mut()?;
        let mut next = state.transform;
        edit(&mut next);
        let uniform = TransformUniform::from_transform(&next);
        device.update_constant_buffer(state.resources.transform, bytemuck::bytes_of(&uniform))?;
        state.transform = next;
        Ok(())
    }

    /// Put `light` in slot `index`.
    pub fn update_light(&mut self, index: usize, light: LightSource, device: &mut dyn GpuDevice) -> Result<()> {
        self.update_lights(device, |rig| rig.set(index, light))
    }

    /// Switch off the light in slot `index`.
    pub fn clear_light(&mut self, index: usize, device: &mut dyn GpuDevice) -> Result<()> {
        self.update_lights(device, |rig| rig.clear(index))
    }

    fn update_lights(
        &mut self,
        device: &mut dyn GpuDevice,
        edit: impl FnOnce(&mut LightRig) -> Result<()>,
    ) -> Result<()> {
        let state = self.state_mut()?;
        let buffer = state
            .resources
            .lights
            .ok_or_else(|| SurfaceError::usage("lights need an illuminated surface"))?;
        let mut next = state.lights.clone();
        edit(&mut next)?;
        device.update_constant_buffer(buffer, bytemuck::bytes_of(&next.to_uniform()))?;
        state.lights = next;
        Ok(())
    }

    pub fn kind(&self) -> Result<SurfaceKind> {
        Ok(self.state()?.descriptor.kind)
    }

    pub fn descriptor(&self) -> Result<&SurfaceDescriptor> {
        Ok(&self.state()?.descriptor)
    }

    pub fn bindings(&self) -> Result<&RenderBindings> {
        Ok(&self.state()?.bindings)
    }

    pub fn resources(&self) -> Result<SurfaceResources> {
        Ok(self.state()?.resources)
    }

    /// The CPU copy of the mesh, present only when updates are enabled.
    pub fn cpu_mesh(&self) -> Result<Option<&GeneratedMesh>> {
        Ok(self.state()?.mesh.as_ref())
    }

    pub fn ranges(&self) -> Result<ShapeRanges> {
        Ok(self.state()?.ranges)
    }

    pub fn vertex_count(&self) -> Result<usize> {
        Ok(self.state()?.vertex_count)
    }

    pub fn index_count(&self) -> Result<usize> {
        Ok(self.state()?.index_count)
    }

    pub fn transform(&self) -> Result<SurfaceTransform> {
        Ok(self.state()?.transform)
    }

    pub fn lights(&self) -> Result<&LightRig> {
        Ok(&self.state()?.lights)
    }
}

impl SurfaceState {
    fn require_updates(&self, call: &str) -> Result<()> {
        if !self.descriptor.options.enable_updates {
            return Err(SurfaceError::usage(format!(
                "{} needs a surface created with enable_updates",
                call
            )));
        }
        Ok(())
    }

    fn require_coloring(&self, mode: ColoringMode, call: &str) -> Result<()> {
        let actual = self.descriptor.coloring.mode();
        if actual != mode {
            return Err(SurfaceError::usage(format!(
                "{} needs {} coloring, surface uses {}",
                call, mode, actual
            )));
        }
        Ok(())
    }

    fn cpu_mesh(&self) -> Result<&GeneratedMesh> {
        self.mesh
            .as_ref()
            .ok_or_else(|| SurfaceError::usage("surface keeps no CPU mesh"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RecordingDevice;
    use msurf_geometry::shapes;

    #[test]
    fn test_calls_before_initialize_are_usage_errors() {
        let mut surface = Surface::new();
        let mut device = RecordingDevice::new();
        assert!(!surface.is_initialized());
        assert!(surface.vertex_count().unwrap_err().is_usage());
        assert!(surface
            .update_shape(ShapeRanges::keep(), &mut device)
            .unwrap_err()
            .is_usage());
        assert!(surface
            .update_position(Vector3::X, &mut device)
            .unwrap_err()
            .is_usage());
    }

    #[test]
    fn test_second_initialize_rejected() {
        let mut surface = Surface::new();
        let mut device = RecordingDevice::new();
        surface
            .initialize(SurfaceDescriptor::from_shape(shapes::paraboloid()), &mut device)
            .unwrap();
        let buffers = device.buffer_count();
        let err = surface
            .initialize(SurfaceDescriptor::from_shape(shapes::paraboloid()), &mut device)
            .unwrap_err();
        assert!(err.is_usage());
        assert_eq!(device.buffer_count(), buffers);
    }

    #[test]
    fn test_invalid_descriptor_leaves_surface_uninitialized() {
        let mut surface = Surface::new();
        let mut device = RecordingDevice::new();
        let mut desc = SurfaceDescriptor::from_shape(shapes::paraboloid());
        desc.options.num_u = 1;
        assert!(surface.initialize(desc, &mut device).unwrap_err().is_configuration());
        assert!(!surface.is_initialized());
        assert_eq!(device.buffer_count(), 0);
    }

    /// Recording device whose vertex updates can be made to fail.
    #[derive(Default)]
    struct FlakyDevice {
        inner: RecordingDevice,
        fail_vertex_updates: bool,
    }

    impl GpuDevice for FlakyDevice {
        fn create_vertex_buffer(
            &mut self,
            data: &[u8],
            stride: usize,
            count: usize,
            usage: BufferUsage,
        ) -> Result<BufferId> {
            self.inner.create_vertex_buffer(data, stride, count, usage)
        }

        fn update_vertices(&mut self, id: BufferId, data: &[u8], count: usize) -> Result<()> {
            if self.fail_vertex_updates {
                return Err(SurfaceError::device("vertex upload lost"));
            }
            self.inner.update_vertices(id, data, count)
        }

        fn create_index_buffer(&mut self, indices: &[u32], usage: BufferUsage) -> Result<BufferId> {
            self.inner.create_index_buffer(indices, usage)
        }

        fn replace_index_buffer(&mut self, id: BufferId, indices: &[u32]) -> Result<()> {
            self.inner.replace_index_buffer(id, indices)
        }

        fn create_texture(
            &mut self,
            image: &Image,
            usage: BufferUsage,
            kind: msurf_geometry::TextureKind,
        ) -> Result<TextureId> {
            self.inner.create_texture(image, usage, kind)
        }

        fn update_texture(&mut self, id: TextureId, image: &Image) -> Result<()> {
            self.inner.update_texture(id, image)
        }

        fn create_constant_buffer(&mut self, data: &[u8]) -> Result<ConstantBufferId> {
            self.inner.create_constant_buffer(data)
        }

        fn update_constant_buffer(&mut self, id: ConstantBufferId, data: &[u8]) -> Result<()> {
            self.inner.update_constant_buffer(id, data)
        }

        fn create_sampler(&mut self, desc: crate::bindings::SamplerDesc) -> Result<SamplerId> {
            self.inner.create_sampler(desc)
        }
    }

    #[test]
    fn test_failed_vertex_upload_keeps_old_indices() {
        let mut surface = Surface::new();
        let mut device = FlakyDevice::default();
        let mut desc = SurfaceDescriptor::from_shape(shapes::implicit_sphere(1.0));
        let cube = msurf_math::ParamRange::new(-2.0, 2.0);
        desc.options.range_u = cube;
        desc.options.range_v = cube;
        desc.options.range_w = cube;
        desc.options.refinements = vec![10];
        desc.options.enable_updates = true;
        surface.initialize(desc, &mut device).unwrap();

        let index_buffer = surface.resources().unwrap().index_buffer;
        let before = device.inner.indices(index_buffer).unwrap();
        let count = surface.index_count().unwrap();

        device.fail_vertex_updates = true;
        let tighter = msurf_math::ParamRange::new(-1.3, 1.3);
        let err = surface
            .update_shape(ShapeRanges::new(tighter, tighter, tighter), &mut device)
            .unwrap_err();
        assert!(err.is_device());

        assert_eq!(device.inner.indices(index_buffer).unwrap(), before);
        assert_eq!(surface.index_count().unwrap(), count);
        assert_eq!(surface.ranges().unwrap().u, cube);
        let mesh = surface.cpu_mesh().unwrap().unwrap();
        assert_eq!(mesh.indices.len(), device.inner.buffer(index_buffer).unwrap().count);
    }

    #[test]
    fn test_transform_update_writes_constant_buffer() {
        let mut surface = Surface::new();
        let mut device = RecordingDevice::new();
        surface
            .initialize(SurfaceDescriptor::from_shape(shapes::paraboloid()), &mut device)
            .unwrap();
        surface
            .update_position(Vector3::new(0.0, 0.0, 5.0), &mut device)
            .unwrap();
        surface
            .update_rotation(Vector3::Z, std::f64::consts::PI, &mut device)
            .unwrap();
        let transform = surface.transform().unwrap();
        assert_eq!(transform.position, Vector3::new(0.0, 0.0, 5.0));

        let id = surface.resources().unwrap().transform;
        let record = device.constant(id).unwrap();
        assert_eq!(record.writes, 2);
        let expected = TransformUniform::from_transform(&transform);
        assert_eq!(record.data, bytemuck::bytes_of(&expected));
    }
}
