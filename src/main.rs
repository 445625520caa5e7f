/*!
 * memtrack - Main Entry Point
 *
 * Real-time terminal view of a simulated page table and segment list:
 * - `a` allocates a random run of pages
 * - `d` releases the newest allocation
 * - `q` quits
 */

use memtrack::{init_tracing, ui, AppResult, ProcMeminfo, SimConfig};
use time::UtcOffset;
use tracing::info;

fn main() -> miette::Result<()> {
    // The local offset can only be read soundly while single-threaded
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    init_tracing()?;
    let config = SimConfig::from_env()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(memtrack::AppError::from)?;

    runtime.block_on(start(config, offset))?;
    Ok(())
}

async fn start(config: SimConfig, offset: UtcOffset) -> AppResult<()> {
    info!("memtrack starting");
    ui::run(config, ProcMeminfo::new(), ui::Clock::new(offset)).await?;
    info!("memtrack exited");
    Ok(())
}
