//! Background worker thread — report building runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the report context (cache, provider, metric settings).

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use stoc_report::{build_report, Report, ReportContext, ReportError, ReportRequest};
use tracing::{debug, info};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    BuildReport { request: ReportRequest },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    ReportReady { report: Box<Report> },
    ReportFailed { error: String, no_data: bool },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    ctx: ReportContext,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stoc-worker".into())
        .spawn(move || worker_loop(rx, tx, ctx))
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>, ctx: ReportContext) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::BuildReport { request }) => {
                debug!(symbol = %request.symbol, "worker received report request");
                let _ = tx.send(handle_build(&ctx, &request));
            }
        }
    }
    info!("worker stopped");
}

fn handle_build(ctx: &ReportContext, request: &ReportRequest) -> WorkerResponse {
    match build_report(ctx, request) {
        Ok(report) => WorkerResponse::ReportReady {
            report: Box::new(report),
        },
        Err(e) => WorkerResponse::ReportFailed {
            no_data: matches!(e, ReportError::NoData { .. }),
            error: e.to_string(),
        },
    }
}
