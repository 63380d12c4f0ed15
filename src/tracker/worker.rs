use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::error::WorkerError;
use super::sample::Sample;
use crate::device::{DeviceProps, PROP_BATTERY_LEVEL, PROP_NET_SIGNAL};
use crate::locator::SampleSource;
use crate::notify::StatusFeed;
use crate::observer::{StatusKind, StatusObserver};
use crate::report::ReportSink;

pub const NO_CONNECTION: &str = "No Connection";
pub const PHASE_TRACKING: &str = "Tracking";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Stopped,
}

struct Shared {
    state: WorkerState,
}

/// Everything the run loop owns once started.
pub struct WorkerParts {
    pub interval: Duration,
    pub source: Box<dyn SampleSource>,
    pub primary: Box<dyn ReportSink>,
    pub secondary: Box<dyn ReportSink>,
    pub feed: Option<StatusFeed>,
    pub props: Box<dyn DeviceProps>,
    pub observer: Arc<dyn StatusObserver>,
}

/// The agent's run loop. One worker per agent instance; `Idle → Running →
/// Stopped`, with `Stopped` terminal — a new worker is required to restart.
pub struct Worker {
    shared: Arc<StdMutex<Shared>>,
    parts: Option<WorkerParts>,
    stop_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<Result<(), WorkerError>>>,
}

impl Worker {
    pub fn new(parts: WorkerParts) -> Self {
        Self {
            shared: Arc::new(StdMutex::new(Shared {
                state: WorkerState::Idle,
            })),
            parts: Some(parts),
            stop_tx: None,
            join: None,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.shared.lock().unwrap().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    /// Spawns the run loop on its own task. The first tick runs immediately.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        if self.state() != WorkerState::Idle {
            return Err(WorkerError::AlreadyStarted);
        }
        let parts = self.parts.take().ok_or(WorkerError::AlreadyStarted)?;

        let (stop_tx, stop_rx) = oneshot::channel();
        self.shared.lock().unwrap().state = WorkerState::Running;
        let join = tokio::spawn(run_worker_loop(self.shared.clone(), parts, stop_rx));

        self.stop_tx = Some(stop_tx);
        self.join = Some(join);
        Ok(())
    }

    /// Takes effect within one tick: the loop observes the signal at the top
    /// of an iteration or during its sleep, never mid-tick.
    pub async fn stop(&mut self) -> Result<(), WorkerError> {
        log::info!("Stopping worker");
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        let result = match self.join.take() {
            Some(join) => match join.await {
                Ok(result) => result,
                Err(e) => Err(WorkerError::Join(e.to_string())),
            },
            None => Ok(()),
        };
        self.shared.lock().unwrap().state = WorkerState::Stopped;
        result
    }
}

async fn run_worker_loop(
    shared: Arc<StdMutex<Shared>>,
    parts: WorkerParts,
    mut stop_rx: oneshot::Receiver<()>,
) -> Result<(), WorkerError> {
    let WorkerParts {
        interval,
        mut source,
        primary,
        secondary,
        mut feed,
        props,
        observer,
    } = parts;

    // A sensor that cannot initialize will never produce data.
    if let Err(e) = source.initialize(interval).await {
        log::error!("Failed to init locator: {e}");
        observer.report(StatusKind::Tracking, "Failed to init locator");
        shared.lock().unwrap().state = WorkerState::Stopped;
        return Err(WorkerError::LocatorInit(e));
    }

    // One eager channel connection attempt; later ones happen inside
    // announce when needed.
    if let Some(feed) = feed.as_mut() {
        feed.establish(observer.as_ref()).await;
    }

    observer.report(StatusKind::Tracking, PHASE_TRACKING);

    loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }

        let sample = collect_sample(source.as_mut(), props.as_ref(), observer.as_ref()).await;
        publish_sample(
            &sample,
            primary.as_ref(),
            secondary.as_ref(),
            &mut feed,
            observer.as_ref(),
        )
        .await;
        log_sample(&sample, observer.as_ref());
        if let Some(feed) = feed.as_mut() {
            feed.announce("Tracking update", &sample, observer.as_ref())
                .await;
        }

        let stop_requested = tokio::select! {
            _ = sleep(interval) => false,
            _ = &mut stop_rx => true,
        };
        if stop_requested {
            break;
        }
    }

    shared.lock().unwrap().state = WorkerState::Stopped;
    Ok(())
}

/// Builds this tick's sample. A failed fix degrades the sample, it never
/// fails the tick; signal and battery are read either way.
async fn collect_sample(
    source: &mut dyn SampleSource,
    props: &dyn DeviceProps,
    observer: &dyn StatusObserver,
) -> Sample {
    let mut sample = Sample::default();

    match source.current_fix().await {
        Ok(fix) => {
            observer.report(StatusKind::Tracking, "Location updated");
            observer.report(
                StatusKind::Tracking,
                &format!(
                    "lat={} long={} alt={}",
                    fix.latitude, fix.longitude, fix.altitude
                ),
            );
            sample.fix = Some(fix);
        }
        Err(e) => {
            log::error!("Failed to get location: {e}");
            observer.report(StatusKind::Tracking, "Failed to get location");
        }
    }

    sample.signal = props.get(PROP_NET_SIGNAL);
    sample.battery = props.get(PROP_BATTERY_LEVEL);

    log::info!("Got current data");
    sample
}

/// Primary delivery with a single same-tick retry against the secondary.
/// No failover memory is kept; the next tick starts at the primary again.
async fn publish_sample(
    sample: &Sample,
    primary: &dyn ReportSink,
    secondary: &dyn ReportSink,
    feed: &mut Option<StatusFeed>,
    observer: &dyn StatusObserver,
) {
    observer.report(StatusKind::Connection, "Publishing location");
    let record = sample.to_record();

    let Err(primary_err) = primary.send(&record).await else {
        return;
    };
    observer.report(
        StatusKind::Connection,
        &format!("{NO_CONNECTION} URL A, trying URL B"),
    );
    log::error!("Failed to connect to URL A, trying URL B: {primary_err}");
    if let Some(feed) = feed.as_mut() {
        feed.announce("Lost contact with mission control A", sample, observer)
            .await;
    }

    if let Err(secondary_err) = secondary.send(&record).await {
        observer.report(
            StatusKind::Connection,
            &format!("{NO_CONNECTION}: {secondary_err}"),
        );
        log::error!("Failed to connect to URL B: {secondary_err}");
        if let Some(feed) = feed.as_mut() {
            feed.announce("Lost contact mission control", sample, observer)
                .await;
        }
        log::error!("Lost contact with mission control");
    }
}

fn log_sample(sample: &Sample, observer: &dyn StatusObserver) {
    observer.report(StatusKind::Tracking, "Logging data");

    if let Some(fix) = &sample.fix {
        log::info!(
            "Current location [ lat={} long={} alt={} ]",
            fix.latitude,
            fix.longitude,
            fix.altitude
        );
        log::info!(
            "Current accuracy = [ h={} v={} ]",
            fix.horizontal_accuracy,
            fix.vertical_accuracy
        );
        log::info!("Current speed = {}m/s", fix.speed);
    }
    if let Some(battery) = &sample.battery {
        log::info!("Current battery level = {battery}");
    }
    if let Some(signal) = &sample.signal {
        log::info!("Current signal strength = {signal}");
    }
}
