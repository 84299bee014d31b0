pub mod bindings;
pub mod device;
pub mod lights;
pub mod pipeline;
pub mod surface;

// Re-export main types
pub use bindings::{
    AddressMode, BlendMode, RasterizerState, RenderBindings, SamplerDesc, SamplerFilter,
    ShaderKey, Topology,
};
pub use device::{
    BufferId, BufferRecord, BufferRole, BufferUsage, ConstantBufferId, ConstantRecord, GpuDevice,
    RecordingDevice, SamplerId, TextureId, TextureRecord,
};
pub use lights::{GpuLight, LightRig, LightSource, LightUniform, MAX_LIGHTS};
pub use pipeline::{ColorUniform, Format, InputElement, Semantic, TransformUniform, VertexLayout};
pub use surface::{Surface, SurfaceResources};
