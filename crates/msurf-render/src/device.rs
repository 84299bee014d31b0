//! The GPU collaborator a surface uploads into.
//!
//! [`GpuDevice`] is the narrow set of buffer, texture and sampler calls the
//! surface assembler needs. [`RecordingDevice`] implements it in memory so the
//! uploaded bytes can be inspected.

use msurf_core::{Result, SurfaceError};
use msurf_geometry::{Image, TextureKind};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::bindings::SamplerDesc;

new_key_type! {
    pub struct BufferId;
    pub struct TextureId;
    pub struct ConstantBufferId;
    pub struct SamplerId;
}

/// Whether a resource may be written after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferUsage {
    /// Written once at creation.
    Default,
    /// Rewritten by updates.
    Dynamic,
}

pub trait GpuDevice {
    /// `count` vertices of `stride` bytes each.
    fn create_vertex_buffer(
        &mut self,
        data: &[u8],
        stride: usize,
        count: usize,
        usage: BufferUsage,
    ) -> Result<BufferId>;

    /// Overwrite a dynamic vertex buffer. The vertex count may change.
    fn update_vertices(&mut self, id: BufferId, data: &[u8], count: usize) -> Result<()>;

    fn create_index_buffer(&mut self, indices: &[u32], usage: BufferUsage) -> Result<BufferId>;

    /// Swap the contents of a dynamic index buffer for a list of another length.
    fn replace_index_buffer(&mut self, id: BufferId, indices: &[u32]) -> Result<()>;

    fn create_texture(
        &mut self,
        image: &Image,
        usage: BufferUsage,
        kind: TextureKind,
    ) -> Result<TextureId>;

    fn update_texture(&mut self, id: TextureId, image: &Image) -> Result<()>;

    /// Constant buffers are always writable.
    fn create_constant_buffer(&mut self, data: &[u8]) -> Result<ConstantBufferId>;

    fn update_constant_buffer(&mut self, id: ConstantBufferId, data: &[u8]) -> Result<()>;

    fn create_sampler(&mut self, desc: SamplerDesc) -> Result<SamplerId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    Vertex,
    Index,
}

#[derive(Debug, Clone)]
pub struct BufferRecord {
    pub role: BufferRole,
    pub usage: BufferUsage,
    pub data: Vec<u8>,
    /// Bytes per element: the vertex stride, or 4 for indices.
    pub stride: usize,
    pub count: usize,
    /// Writes after creation.
    pub writes: usize,
}

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub kind: TextureKind,
    pub usage: BufferUsage,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub writes: usize,
}

#[derive(Debug, Clone)]
pub struct ConstantRecord {
    pub data: Vec<u8>,
    pub writes: usize,
}

/// In-memory [`GpuDevice`] that keeps every byte it is given.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: SlotMap<BufferId, BufferRecord>,
    textures: SlotMap<TextureId, TextureRecord>,
    constants: SlotMap<ConstantBufferId, ConstantRecord>,
    samplers: SlotMap<SamplerId, SamplerDesc>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&BufferRecord> {
        self.buffers.get(id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureRecord> {
        self.textures.get(id)
    }

    pub fn constant(&self, id: ConstantBufferId) -> Option<&ConstantRecord> {
        self.constants.get(id)
    }

    pub fn sampler(&self, id: SamplerId) -> Option<&SamplerDesc> {
        self.samplers.get(id)
    }

    /// Indices held by an index buffer.
    pub fn indices(&self, id: BufferId) -> Option<Vec<u32>> {
        self.buffers
            .get(id)
            .filter(|b| b.role == BufferRole::Index)
            .map(|b| {
                b.data
                    .chunks_exact(4)
                    .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect()
            })
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    fn writable_buffer(&mut self, id: BufferId, role: BufferRole) -> Result<&mut BufferRecord> {
        let buffer = self
            .buffers
            .get_mut(id)
            .ok_or_else(|| SurfaceError::device(format!("unknown buffer {:?}", id)))?;
        if buffer.role != role {
            return Err(SurfaceError::device(format!(
                "buffer {:?} is a {:?} buffer, not {:?}",
                id, buffer.role, role
            )));
        }
        if buffer.usage != BufferUsage::Dynamic {
            return Err(SurfaceError::device(format!(
                "buffer {:?} was created static and cannot be updated",
                id
            )));
        }
        Ok(buffer)
    }
}

impl GpuDevice for RecordingDevice {
    fn create_vertex_buffer(
        &mut self,
        data: &[u8],
        stride: usize,
        count: usize,
        usage: BufferUsage,
    ) -> Result<BufferId> {
        if data.len() != stride * count {
            return Err(SurfaceError::device(format!(
                "vertex data is {} bytes, expected {} x {}",
                data.len(),
                count,
                stride
            )));
        }
        debug!(bytes = data.len(), count, ?usage, "create vertex buffer");
        Ok(self.buffers.insert(BufferRecord {
            role: BufferRole::Vertex,
            usage,
            data: data.to_vec(),
            stride,
            count,
            writes: 0,
        }))
    }

    fn update_vertices(&mut self, id: BufferId, data: &[u8], count: usize) -> Result<()> {
        let buffer = self.writable_buffer(id, BufferRole::Vertex)?;
        if data.len() != buffer.stride * count {
            return Err(SurfaceError::device(format!(
                "vertex data is {} bytes, expected {} x {}",
                data.len(),
                count,
                buffer.stride
            )));
        }
        buffer.data.clear();
        buffer.data.extend_from_slice(data);
        buffer.count = count;
        buffer.writes += 1;
        Ok(())
    }

    fn create_index_buffer(&mut self, indices: &[u32], usage: BufferUsage) -> Result<BufferId> {
        debug!(count = indices.len(), ?usage, "create index buffer");
        Ok(self.buffers.insert(BufferRecord {
            role: BufferRole::Index,
            usage,
            data: bytemuck::cast_slice::<u32, u8>(indices).to_vec(),
            stride: std::mem::size_of::<u32>(),
            count: indices.len(),
            writes: 0,
        }))
    }

    fn replace_index_buffer(&mut self, id: BufferId, indices: &[u32]) -> Result<()> {
        let buffer = self.writable_buffer(id, BufferRole::Index)?;
        buffer.data = bytemuck::cast_slice::<u32, u8>(indices).to_vec();
        buffer.count = indices.len();
        buffer.writes += 1;
        Ok(())
    }

    fn create_texture(
        &mut self,
        image: &Image,
        usage: BufferUsage,
        kind: TextureKind,
    ) -> Result<TextureId> {
        image.check_for(kind)?;
        Ok(self.textures.insert(TextureRecord {
            kind,
            usage,
            width: image.width,
            height: image.height,
            data: image.to_bytes(),
            writes: 0,
        }))
    }

    fn update_texture(&mut self, id: TextureId, image: &Image) -> Result<()> {
        let texture = self
            .textures
            .get_mut(id)
            .ok_or_else(|| SurfaceError::device(format!("unknown texture {:?}", id)))?;
        if texture.usage != BufferUsage::Dynamic {
            return Err(SurfaceError::device(format!(
                "texture {:?} was created static and cannot be updated",
                id
            )));
        }
        image.check_for(texture.kind)?;
        texture.width = image.width;
        texture.height = image.height;
        texture.data = image.to_bytes();
        texture.writes += 1;
        Ok(())
    }

    fn create_constant_buffer(&mut self, data: &[u8]) -> Result<ConstantBufferId> {
        Ok(self.constants.insert(ConstantRecord {
            data: data.to_vec(),
            writes: 0,
        }))
    }

    fn update_constant_buffer(&mut self, id: ConstantBufferId, data: &[u8]) -> Result<()> {
        let constant = self
            .constants
            .get_mut(id)
            .ok_or_else(|| SurfaceError::device(format!("unknown constant buffer {:?}", id)))?;
        if constant.data.len() != data.len() {
            return Err(SurfaceError::device(format!(
                "constant buffer {:?} holds {} bytes, got {}",
                id,
                constant.data.len(),
                data.len()
            )));
        }
        constant.data.copy_from_slice(data);
        constant.writes += 1;
        Ok(())
    }

    fn create_sampler(&mut self, desc: SamplerDesc) -> Result<SamplerId> {
        Ok(self.samplers.insert(desc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::SamplerFilter;

    #[test]
    fn test_static_buffer_rejects_updates() {
        let mut device = RecordingDevice::new();
        let id = device
            .create_vertex_buffer(&[0u8; 24], 12, 2, BufferUsage::Default)
            .unwrap();
        let err = device.update_vertices(id, &[1u8; 24], 2).unwrap_err();
        assert!(err.is_device());
        assert_eq!(device.buffer(id).unwrap().data, vec![0u8; 24]);
    }

    #[test]
    fn test_dynamic_buffer_may_resize() {
        let mut device = RecordingDevice::new();
        let id = device
            .create_vertex_buffer(&[0u8; 24], 12, 2, BufferUsage::Dynamic)
            .unwrap();
        device.update_vertices(id, &[7u8; 36], 3).unwrap();
        let record = device.buffer(id).unwrap();
        assert_eq!(record.count, 3);
        assert_eq!(record.writes, 1);
        assert!(device.update_vertices(id, &[7u8; 35], 3).is_err());
    }

    #[test]
    fn test_index_buffer_replacement() {
        let mut device = RecordingDevice::new();
        let id = device.create_index_buffer(&[0, 1, 2], BufferUsage::Dynamic).unwrap();
        device.replace_index_buffer(id, &[0, 1, 2, 2, 1, 3]).unwrap();
        assert_eq!(device.indices(id).unwrap(), vec![0, 1, 2, 2, 1, 3]);
        assert!(device.update_vertices(id, &[], 0).unwrap_err().is_device());
    }

    #[test]
    fn test_cubemap_texture_shape_checked() {
        let mut device = RecordingDevice::new();
        let planar = Image::filled(4, 4, [1, 2, 3, 4]);
        assert!(device
            .create_texture(&planar, BufferUsage::Default, TextureKind::Cubemap)
            .is_err());
        let id = device
            .create_texture(&planar, BufferUsage::Dynamic, TextureKind::Planar)
            .unwrap();
        device.update_texture(id, &Image::filled(2, 2, [0; 4])).unwrap();
        assert_eq!(device.texture(id).unwrap().data.len(), 16);
    }

    #[test]
    fn test_constant_buffer_size_is_fixed() {
        let mut device = RecordingDevice::new();
        let id = device.create_constant_buffer(&[0u8; 16]).unwrap();
        device.update_constant_buffer(id, &[1u8; 16]).unwrap();
        assert!(device.update_constant_buffer(id, &[1u8; 8]).is_err());
        let sampler = device.create_sampler(SamplerDesc::new(SamplerFilter::Point)).unwrap();
        assert_eq!(device.sampler(sampler).unwrap().filter, SamplerFilter::Point);
    }
}
