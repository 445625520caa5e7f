/*!
 * Monitoring
 * Derived metrics, host memory sampling and tracing setup
 */

mod host;
mod metrics;
mod sampler;
mod tracer;

pub use host::{HostMemorySample, HostMemorySource, HostSampleError, ProcMeminfo};
pub use metrics::{MetricsCalculator, MetricsSnapshot, OperationCounters};
pub use sampler::HostSampler;
pub use tracer::{init_tracing, ENV_LOG_FILE, ENV_TRACE_JSON};
