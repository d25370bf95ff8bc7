//! GPU-accelerated array kernels using WGPU.
//!
//! This module runs the elementwise and matrix-product kernels on the GPU
//! using WGPU + WGSL. The device, queue and compute pipelines for both element
//! types are created once, on first use, and cached in a `lazy_static`
//! context. A failed initialization is cached too, so every later call reports
//! the same [`GpuError::Unavailable`] instead of retrying.
//!
//! Each call uploads the operand spans, dispatches one kernel, and blocks until
//! the result has been copied back into the caller's output span.

use std::sync::mpsc;

use wgpu::util::DeviceExt;

use crate::element::{DataType, Element, Operation};

const ELEMENTWISE: &str = include_str!("shaders/elementwise.wgsl");
const MATMUL: &str = include_str!("shaders/matmul.wgsl");

/// Placeholder for the element type in the kernel templates.
const ELEMENT_PLACEHOLDER: &str = "ELEM";

const ELEMENTWISE_WORKGROUP: u32 = 64;
const MATMUL_WORKGROUP: u32 = 8;
const MAX_GROUPS_PER_DIMENSION: u32 = 65_535;

/// Errors raised by the GPU backend.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    /// No suitable adapter was found.
    #[error("adapter error: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to open a device.
    #[error("device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// A kernel failed to build.
    #[error("shader error: {0}")]
    Shader(String),
    /// Initialization failed earlier; the message is the original failure.
    #[error("GPU unavailable: {0}")]
    Unavailable(String),
    /// The kernel does not implement the operation.
    #[error("{0:?} has no GPU kernel")]
    Unsupported(Operation),
    /// A size exceeds what the kernels or the device can address.
    #[error("{what} of {value} exceeds the GPU limit of {limit}")]
    TooLarge {
        /// The quantity that overflowed.
        what: &'static str,
        /// Its value.
        value: u64,
        /// The largest accepted value.
        limit: u64,
    },
    /// WGPU rejected a command.
    #[error("validation error: {0}")]
    Validation(String),
    /// Reading the result back failed.
    #[error("buffer map error: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    /// Waiting for the device failed.
    #[error("poll error: {0}")]
    Poll(#[from] wgpu::PollError),
}

#[derive(Debug, Clone, Copy)]
enum Kernel {
    Elementwise,
    Matmul,
}

struct Pipelines {
    elementwise: wgpu::ComputePipeline,
    matmul: wgpu::ComputePipeline,
}

/// Holds the WGPU device, its queue and the compiled kernels.
///
/// Initialized once globally via `lazy_static`; see [`context`].
pub struct GpuContext {
    /// The GPU device.
    pub device: wgpu::Device,
    /// The device's submission queue.
    pub queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    float: Pipelines,
    integer: Pipelines,
}

impl GpuContext {
    /// Opens the default adapter and compiles every kernel for both element
    /// types.
    ///
    /// # Errors
    ///
    /// - [`GpuError::Adapter`] / [`GpuError::Device`] if no device can be opened
    /// - [`GpuError::Shader`] if a kernel fails to build
    pub fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
        let info = adapter.get_info();
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("briny_array"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))?;
        log::info!("GPU context on {} ({:?})", info.name, info.backend);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kernel_bgl"),
            entries: &[
                layout_entry(0, wgpu::BufferBindingType::Uniform),
                layout_entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                layout_entry(2, wgpu::BufferBindingType::Storage { read_only: true }),
                layout_entry(3, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kernel_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let float = Pipelines::new(&device, &pipeline_layout, DataType::Float)?;
        let integer = Pipelines::new(&device, &pipeline_layout, DataType::Integer)?;
        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(GpuError::Shader(e.to_string()));
        }

        Ok(Self {
            device,
            queue,
            bind_group_layout,
            float,
            integer,
        })
    }

    fn pipeline(&self, dtype: DataType, kernel: Kernel) -> &wgpu::ComputePipeline {
        let pipelines = match dtype {
            DataType::Float => &self.float,
            DataType::Integer => &self.integer,
        };
        match kernel {
            Kernel::Elementwise => &pipelines.elementwise,
            Kernel::Matmul => &pipelines.matmul,
        }
    }

    /// Uploads the operands, runs `kernel` over `groups` workgroups and reads
    /// the result back into `out`.
    fn run<T: Element>(
        &self,
        kernel: Kernel,
        params: [u32; 4],
        a: &[T],
        b: &[T],
        out: &mut [T],
        groups: (u32, u32),
    ) -> Result<(), GpuError> {
        let limit = u64::from(self.device.limits().max_storage_buffer_binding_size);
        for bytes in [size_of_val(a), size_of_val(b), size_of_val(out)] {
            let bytes = bytes as u64;
            if bytes > limit {
                return Err(GpuError::TooLarge {
                    what: "buffer size",
                    value: bytes,
                    limit,
                });
            }
        }
        let out_size = size_of_val(out) as u64;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let params_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("params"),
            contents: bytemuck::cast_slice(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let a_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lhs"),
            contents: bytemuck::cast_slice(a),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let b_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rhs"),
            contents: bytemuck::cast_slice(b),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let out_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("result"),
            size: out_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kernel_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: a_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: b_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: out_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kernel_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("kernel_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(self.pipeline(T::DTYPE, kernel));
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups.0, groups.1, 1);
        }

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging"),
            size: out_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        encoder.copy_buffer_to_buffer(&out_buffer, 0, &staging, 0, out_size);
        self.queue.submit(Some(encoder.finish()));

        if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::Validation(e.to_string()));
        }

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::Wait)?;
        rx.recv()
            .map_err(|_| GpuError::Validation("buffer mapping was dropped".into()))??;

        let data = slice.get_mapped_range();
        out.copy_from_slice(bytemuck::cast_slice(&data[..]));
        drop(data);
        staging.unmap();
        Ok(())
    }
}

impl Pipelines {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        dtype: DataType,
    ) -> Result<Self, GpuError> {
        let elementwise = instantiate(ELEMENTWISE, dtype)?;
        let matmul = instantiate(MATMUL, dtype)?;
        Ok(Self {
            elementwise: build_pipeline(device, layout, "elementwise", &elementwise),
            matmul: build_pipeline(device, layout, "matmul", &matmul),
        })
    }
}

fn layout_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    source: &str,
) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        module: &module,
        entry_point: Some("main"),
        cache: None,
        compilation_options: wgpu::PipelineCompilationOptions::default(),
    })
}

/// Specializes a kernel template for `dtype`.
fn instantiate(template: &str, dtype: DataType) -> Result<String, GpuError> {
    if !template.contains(ELEMENT_PLACEHOLDER) {
        return Err(GpuError::Shader("template has no element placeholder".into()));
    }
    if !template.contains("@compute") || !template.contains("fn main") {
        return Err(GpuError::Shader("template has no `main` compute entry point".into()));
    }
    Ok(template.replace(ELEMENT_PLACEHOLDER, dtype.wgsl()))
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: Result<GpuContext, String> = GpuContext::new().map_err(|e| {
        log::warn!("GPU initialization failed: {e}");
        e.to_string()
    });
}

/// The process-wide GPU context, initialized on first call.
///
/// # Errors
///
/// [`GpuError::Unavailable`] if initialization failed, now or earlier.
pub fn context() -> Result<&'static GpuContext, GpuError> {
    let ctx: &'static Result<GpuContext, String> = &GPU_CONTEXT;
    ctx.as_ref().map_err(|e| GpuError::Unavailable(e.clone()))
}

/// Whether a GPU context could be initialized.
pub fn is_available() -> bool {
    context().is_ok()
}

fn to_u32(what: &'static str, value: usize) -> Result<u32, GpuError> {
    u32::try_from(value).map_err(|_| GpuError::TooLarge {
        what,
        value: value as u64,
        limit: u64::from(u32::MAX),
    })
}

fn check_groups(what: &'static str, groups: u32) -> Result<u32, GpuError> {
    if groups > MAX_GROUPS_PER_DIMENSION {
        return Err(GpuError::TooLarge {
            what,
            value: u64::from(groups),
            limit: u64::from(MAX_GROUPS_PER_DIMENSION),
        });
    }
    Ok(groups)
}

/// Runs the elementwise kernel: `out[i] = op(a[i % a.len()], b[i % b.len()])`.
///
/// # Errors
///
/// [`GpuError::Unsupported`] for [`Operation::Pow`]; otherwise any failure to
/// reach or drive the device.
pub fn elementwise<T: Element>(
    op: Operation,
    a: &[T],
    b: &[T],
    out: &mut [T],
) -> Result<(), GpuError> {
    if !op.gpu_supported() {
        return Err(GpuError::Unsupported(op));
    }
    if out.is_empty() {
        return Ok(());
    }
    let ctx = context()?;

    let out_len = to_u32("output length", out.len())?;
    let params = [
        op as u32,
        to_u32("lhs length", a.len())?,
        to_u32("rhs length", b.len())?,
        out_len,
    ];

    // large outputs spill into a second grid dimension
    let groups = out_len.div_ceil(ELEMENTWISE_WORKGROUP);
    let x = groups.min(MAX_GROUPS_PER_DIMENSION);
    let y = check_groups("workgroup rows", groups.div_ceil(x))?;

    log::trace!("elementwise {op:?} kernel: {out_len} elements, {x}x{y} workgroups");
    ctx.run(Kernel::Elementwise, params, a, b, out, (x, y))
}

/// Runs the matrix-product kernel on row-major operands.
///
/// # Errors
///
/// Any failure to reach or drive the device.
pub fn matmul<T: Element>(
    a: &[T],
    b: &[T],
    out: &mut [T],
    rows: usize,
    cols: usize,
    inner: usize,
) -> Result<(), GpuError> {
    if out.is_empty() {
        return Ok(());
    }
    if inner == 0 {
        out.fill(T::zero());
        return Ok(());
    }
    let ctx = context()?;

    let dims = [
        to_u32("rows", rows)?,
        to_u32("cols", cols)?,
        to_u32("inner dimension", inner)?,
        0,
    ];
    let x = check_groups("column workgroups", dims[1].div_ceil(MATMUL_WORKGROUP))?;
    let y = check_groups("row workgroups", dims[0].div_ceil(MATMUL_WORKGROUP))?;

    log::trace!("matmul kernel: {rows}x{inner} * {inner}x{cols}, {x}x{y} workgroups");
    ctx.run(Kernel::Matmul, dims, a, b, out, (x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_specialize_for_both_types() {
        for template in [ELEMENTWISE, MATMUL] {
            let float = instantiate(template, DataType::Float).unwrap();
            let int = instantiate(template, DataType::Integer).unwrap();
            assert!(!float.contains(ELEMENT_PLACEHOLDER));
            assert!(float.contains("array<f32>"));
            assert!(int.contains("array<i32>"));
        }
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(matches!(
            instantiate("fn main() {}", DataType::Float),
            Err(GpuError::Shader(_))
        ));
        assert!(matches!(
            instantiate("var<storage> x: array<ELEM>;", DataType::Float),
            Err(GpuError::Shader(_))
        ));
    }

    #[test]
    fn pow_is_refused_before_touching_the_device() {
        let mut out = [0.0_f32; 2];
        let err = elementwise(Operation::Pow, &[1.0, 2.0], &[2.0], &mut out).unwrap_err();
        assert!(matches!(err, GpuError::Unsupported(Operation::Pow)));
    }

    #[test]
    fn oversized_dimensions_are_reported() {
        let err = to_u32("rows", usize::MAX).unwrap_err();
        assert!(matches!(err, GpuError::TooLarge { what: "rows", .. }));
        assert!(check_groups("workgroups", MAX_GROUPS_PER_DIMENSION + 1).is_err());
    }
}
