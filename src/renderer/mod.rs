pub mod batch;
pub mod batches;
pub mod buffer;
pub mod gpu;
pub mod headless;
pub mod instance;
pub mod material;
pub mod pipeline_builder;
pub mod state;
pub mod target;
pub mod uniforms;
pub mod vertex;
pub mod wgpu_backend;

pub use batch::{FlushOutcome, MeshBatch, MAX_BATCH_VERTICES};
pub use batches::BatchedTarget;
pub use buffer::GrowableBuffer;
pub use gpu::{GpuBackend, MaterialDesc, MaterialHandle, MeshDesc, MeshHandle};
pub use headless::{HeadlessBackend, HeadlessMesh, UploadStats};
pub use instance::InstancePool;
pub use material::MaterialCache;
pub use state::{CompareFunc, CullMode, DepthOverrides, DrawType, RenderStateKey, Technique};
pub use target::{BatchStats, DrawRequest, DrawTarget, GeometryId};
pub use vertex::{DebugVertex, FLOATS_PER_VERTEX};
pub use wgpu_backend::WgpuBackend;
