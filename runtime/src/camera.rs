//! Camera actor: the only owner of the camera adapter.

use juror_capability::{CameraAdapter, MediaDevices};
use juror_session::{Event, RequestId};
use juror_types::Facing;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

enum Command {
    Start { request: RequestId, facing: Facing },
    Grab { request: RequestId },
    Stop,
}

/// Handle to the camera actor task.
///
/// Commands run strictly in order, so a start always stops the previous
/// stream before the next one is requested. Results are posted to the
/// session's event channel. Dropping the handle ends the actor, which drops
/// the adapter and releases any stream.
pub struct CameraHandle {
    tx: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl CameraHandle {
    pub fn spawn<D: MediaDevices + 'static>(
        devices: D,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let mut adapter = CameraAdapter::new(devices);
            while let Some(command) = rx.recv().await {
                let event = match command {
                    Command::Start { request, facing } => Event::CameraStarted {
                        request,
                        result: adapter.start(facing).await,
                    },
                    Command::Grab { request } => Event::FrameGrabbed {
                        request,
                        result: adapter.grab_frame(),
                    },
                    Command::Stop => {
                        adapter.stop();
                        continue;
                    }
                };
                if events.send(event).is_err() {
                    break;
                }
            }
            tracing::debug!("camera actor stopped");
        });
        Self { tx, task }
    }

    pub fn start(&self, request: RequestId, facing: Facing) {
        self.send(Command::Start { request, facing });
    }

    pub fn grab(&self, request: RequestId) {
        self.send(Command::Grab { request });
    }

    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::warn!("camera actor is gone, command dropped");
        }
    }

    /// Close the command channel and wait until the adapter is released.
    pub async fn shutdown(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "camera actor ended abnormally");
        }
    }
}
