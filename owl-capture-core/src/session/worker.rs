//! Serialized session worker.
//!
//! Every `CaptureSession` call runs on one dedicated thread, in the order
//! the commands were sent. Backend completions are fed back into the same
//! queue, so a finalized movie or delivered still is handled between
//! commands and never concurrently with one. Results flow out as
//! `SessionEvent`s for the UI side to drain.
//!
//! A reconfiguring command that arrives while a movie is recording stops
//! the movie and is held, together with every later command, until the
//! movie is finalized. Inputs are never swapped under an open movie file.

use std::collections::VecDeque;
use std::mem;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use parking_lot::Mutex;

use crate::models::camera_models::{FlashStrategy, MediaKind};
use crate::models::capture_result::{CapturedPhoto, VideoRecording};
use crate::models::error::CaptureError;
use crate::models::orientation::DeviceOrientation;
use crate::traits::capture_backend::CaptureBackend;

use super::capture_session::{CaptureSession, SessionSnapshot, StopOutcome};

/// Work the UI side asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Configure,
    StartRecording,
    StopRecording,
    CapturePhoto,
    ToggleCamera,
    SetFlash(bool),
    SetOrientation(DeviceOrientation),
    BeginZoom,
    UpdateZoom(f64),
    SetZoom(f64),
    Shutdown,
}

/// Results reported back to the UI side.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A permission prompt was answered. Posted by the controller's
    /// permission reply rather than by the worker.
    PermissionResolved { kind: MediaKind, granted: bool },
    Configured(Result<SessionSnapshot, CaptureError>),
    /// `None` when the movie output refused to start.
    RecordingStarted(Option<PathBuf>),
    /// A stop was requested but nothing was recording.
    RecordingAborted,
    RecordingFinished(Result<VideoRecording, CaptureError>),
    PhotoCaptureStarted(Result<FlashStrategy, CaptureError>),
    PhotoCaptured(Result<CapturedPhoto, CaptureError>),
    CameraToggled {
        snapshot: SessionSnapshot,
        error: Option<CaptureError>,
    },
    FlashChanged(SessionSnapshot),
    ZoomChanged(f64),
}

enum Message {
    Command(SessionCommand),
    MovieFinalized(Result<PathBuf, CaptureError>),
    StillCaptured(Result<Vec<u8>, CaptureError>),
}

/// Handle to the worker thread. Dropping it shuts the session down.
pub struct SessionWorker {
    inbox: Sender<Message>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SessionWorker {
    pub fn spawn<B>(session: CaptureSession<B>, events: Sender<SessionEvent>) -> Result<Self, CaptureError>
    where
        B: CaptureBackend + 'static,
    {
        let (inbox, queue) = mpsc::channel();
        let loopback = inbox.clone();

        let handle = thread::Builder::new()
            .name("owl-session".into())
            .spawn(move || run(session, queue, loopback, events))
            .map_err(|e| CaptureError::CaptureFailed(format!("failed to spawn session worker: {}", e)))?;

        Ok(Self {
            inbox,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue a command. Returns false once the worker has exited.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.inbox.send(Message::Command(command)).is_ok()
    }

    /// Stop the session and wait for the worker to exit.
    pub fn shutdown(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        let _ = self.inbox.send(Message::Command(SessionCommand::Shutdown));
        if handle.join().is_err() {
            log::error!("session worker panicked");
        }
    }
}

impl Drop for SessionWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<B: CaptureBackend>(
    mut session: CaptureSession<B>,
    queue: Receiver<Message>,
    loopback: Sender<Message>,
    events: Sender<SessionEvent>,
) {
    log::debug!("session worker started");
    let emit = |event: SessionEvent| {
        if events.send(event).is_err() {
            log::trace!("session event dropped: controller is gone");
        }
    };

    let mut held = VecDeque::new();
    while let Ok(message) = queue.recv() {
        match message {
            Message::Command(SessionCommand::Shutdown) => {
                if !held.is_empty() {
                    log::debug!("dropping {} held session commands", held.len());
                }
                session.shutdown();
                break;
            }
            Message::Command(command) => dispatch(&mut session, &mut held, command, &loopback, &emit),
            Message::MovieFinalized(result) => {
                emit(SessionEvent::RecordingFinished(session.finish_recording(result)));
                for command in mem::take(&mut held) {
                    dispatch(&mut session, &mut held, command, &loopback, &emit);
                }
            }
            Message::StillCaptured(result) => {
                let photo = result
                    .map_err(CaptureError::into_capture_failure)
                    .and_then(|bytes| session.process_photo(bytes));
                emit(SessionEvent::PhotoCaptured(photo));
            }
        }
    }
    log::debug!("session worker stopped");
}

/// Commands that detach or attach inputs.
fn reconfigures(command: SessionCommand) -> bool {
    matches!(command, SessionCommand::Configure | SessionCommand::ToggleCamera)
}

fn dispatch<B: CaptureBackend>(
    session: &mut CaptureSession<B>,
    held: &mut VecDeque<SessionCommand>,
    command: SessionCommand,
    loopback: &Sender<Message>,
    emit: &impl Fn(SessionEvent),
) {
    if held.is_empty() && !(reconfigures(command) && session.is_recording()) {
        handle_command(session, command, loopback, emit);
        return;
    }
    if held.is_empty() && session.stop_recording() == StopOutcome::Stopping {
        log::info!("stopping in-flight recording before {:?}", command);
    }
    log::debug!("holding {:?} until the movie is finalized", command);
    held.push_back(command);
}

fn handle_command<B: CaptureBackend>(
    session: &mut CaptureSession<B>,
    command: SessionCommand,
    loopback: &Sender<Message>,
    emit: &impl Fn(SessionEvent),
) {
    log::trace!("session command: {:?}", command);
    match command {
        SessionCommand::Configure => {
            let result = session.configure();
            emit(SessionEvent::Configured(result.map(|()| session.snapshot())));
        }
        SessionCommand::StartRecording => {
            let loopback = loopback.clone();
            let path = session.start_recording(Box::new(move |result| {
                let _ = loopback.send(Message::MovieFinalized(result));
            }));
            emit(SessionEvent::RecordingStarted(path));
        }
        SessionCommand::StopRecording => match session.stop_recording() {
            StopOutcome::NotRecording => emit(SessionEvent::RecordingAborted),
            StopOutcome::Stopping | StopOutcome::AlreadyFinalizing => {}
        },
        SessionCommand::CapturePhoto => {
            let loopback = loopback.clone();
            let started = session.capture_photo(Box::new(move |result| {
                let _ = loopback.send(Message::StillCaptured(result));
            }));
            emit(SessionEvent::PhotoCaptureStarted(started));
        }
        SessionCommand::ToggleCamera => {
            let error = session.toggle_camera().err();
            emit(SessionEvent::CameraToggled {
                snapshot: session.snapshot(),
                error,
            });
        }
        SessionCommand::SetFlash(enabled) => {
            session.set_flash(enabled);
            emit(SessionEvent::FlashChanged(session.snapshot()));
        }
        SessionCommand::SetOrientation(orientation) => session.set_orientation(orientation),
        SessionCommand::BeginZoom => session.begin_zoom(),
        SessionCommand::UpdateZoom(scale) => emit(SessionEvent::ZoomChanged(session.update_zoom(scale))),
        SessionCommand::SetZoom(factor) => emit(SessionEvent::ZoomChanged(session.set_zoom(factor))),
        SessionCommand::Shutdown => {}
    }
}
