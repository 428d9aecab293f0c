pub mod reconcile_worker;

pub use reconcile_worker::{CycleReport, ReconcileWorker, WorkerHandle};
