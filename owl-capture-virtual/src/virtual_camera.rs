//! Software capture backend.
//!
//! Renders scrolling test patterns instead of reading a sensor. Movies are
//! written by a dedicated thread at roughly `MOVIE_FPS` until stopped;
//! stills are rendered and encoded on a short-lived capture thread so the
//! completion arrives asynchronously, as it does on hardware.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use owl_capture_core::models::camera_models::{
    CameraDevice, CameraPosition, DeviceSetting, InputKind, MovieSettings, OutputKind,
};
use owl_capture_core::models::error::CaptureError;
use owl_capture_core::traits::capture_backend::{CaptureBackend, MovieCompletion, StillCompletion};

use crate::frames;

/// Frames per second written to virtual movies.
pub const MOVIE_FPS: u64 = 10;

const STILL_QUALITY: u8 = 90;
const MOVIE_QUALITY: u8 = 60;

/// Observable state of a `VirtualCamera`, shared with whoever holds a
/// `VirtualProbe` after the camera has moved onto the session worker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VirtualStats {
    pub running: bool,
    pub position: Option<CameraPosition>,
    pub torch: bool,
    pub flash: bool,
    pub zoom_factor: f64,
    pub movies_started: u32,
    pub frames_written: u64,
    pub stills_captured: u32,
}

/// Read-only view of a camera's `VirtualStats`.
#[derive(Debug, Clone)]
pub struct VirtualProbe {
    stats: Arc<Mutex<VirtualStats>>,
}

impl VirtualProbe {
    pub fn stats(&self) -> VirtualStats {
        self.stats.lock().clone()
    }
}

struct MovieWriter {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// A camera pair (back and front) plus microphone, in software.
pub struct VirtualCamera {
    devices: Vec<CameraDevice>,
    microphone: bool,
    unsupported: HashSet<&'static str>,
    frame_size: (u32, u32),
    configuring: bool,
    inputs: Vec<InputKind>,
    outputs: Vec<OutputKind>,
    stats: Arc<Mutex<VirtualStats>>,
    writer: Option<MovieWriter>,
    sequence: u64,
}

impl VirtualCamera {
    pub fn new() -> Self {
        Self {
            devices: vec![
                CameraDevice {
                    id: "virtual-back".into(),
                    name: "Virtual Back Camera".into(),
                    position: CameraPosition::Back,
                    has_flash: true,
                    has_torch: true,
                    max_zoom_factor: 6.0,
                },
                CameraDevice {
                    id: "virtual-front".into(),
                    name: "Virtual Front Camera".into(),
                    position: CameraPosition::Front,
                    has_flash: false,
                    has_torch: false,
                    max_zoom_factor: 1.0,
                },
            ],
            microphone: true,
            unsupported: HashSet::new(),
            frame_size: (160, 120),
            configuring: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
            stats: Arc::new(Mutex::new(VirtualStats {
                zoom_factor: 1.0,
                ..VirtualStats::default()
            })),
            writer: None,
            sequence: 0,
        }
    }

    pub fn with_devices(mut self, devices: Vec<CameraDevice>) -> Self {
        self.devices = devices;
        self
    }

    pub fn without_microphone(mut self) -> Self {
        self.microphone = false;
        self
    }

    /// Settings (by `DeviceSetting::name`) this camera rejects.
    pub fn with_unsupported(mut self, names: &[&'static str]) -> Self {
        self.unsupported.extend(names.iter().copied());
        self
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width.max(1), height.max(1));
        self
    }

    pub fn probe(&self) -> VirtualProbe {
        VirtualProbe {
            stats: Arc::clone(&self.stats),
        }
    }

    fn active_device(&self) -> Option<&CameraDevice> {
        let position = self.inputs.iter().find_map(|input| match input {
            InputKind::Video(position) => Some(*position),
            InputKind::Audio => None,
        })?;
        self.devices.iter().find(|d| d.position == position)
    }

    fn has_output(&self, output: OutputKind) -> bool {
        self.outputs.contains(&output)
    }

    fn stop_writer(&mut self) {
        if let Some(writer) = self.writer.take() {
            writer.stop.store(true, Ordering::SeqCst);
            if writer.handle.join().is_err() {
                log::error!("virtual movie writer panicked");
            }
        }
    }
}

impl Default for VirtualCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VirtualCamera {
    fn drop(&mut self) {
        self.stop_writer();
    }
}

impl CaptureBackend for VirtualCamera {
    fn devices(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn has_audio_device(&self) -> bool {
        self.microphone
    }

    fn begin_configuration(&mut self) {
        if self.configuring {
            log::warn!("nested configuration bracket");
        }
        self.configuring = true;
    }

    fn commit_configuration(&mut self) {
        self.configuring = false;
        log::debug!("virtual camera committed: inputs {:?}, outputs {:?}", self.inputs, self.outputs);
    }

    fn add_input(&mut self, input: InputKind) -> Result<(), CaptureError> {
        if self.inputs.contains(&input) {
            return Err(CaptureError::ConfigurationUnsupported(format!("{:?} already attached", input)));
        }
        match input {
            InputKind::Video(position) => {
                if !self.devices.iter().any(|d| d.position == position) {
                    return Err(CaptureError::DeviceUnavailable);
                }
                if self.inputs.iter().any(|i| matches!(i, InputKind::Video(_))) {
                    return Err(CaptureError::ConfigurationUnsupported("only one camera input".into()));
                }
                self.stats.lock().position = Some(position);
            }
            InputKind::Audio if !self.microphone => return Err(CaptureError::DeviceUnavailable),
            InputKind::Audio => {}
        }
        self.inputs.push(input);
        Ok(())
    }

    fn remove_input(&mut self, input: InputKind) {
        self.inputs.retain(|i| *i != input);
        if matches!(input, InputKind::Video(_)) {
            let mut stats = self.stats.lock();
            stats.position = None;
            stats.torch = false;
            stats.zoom_factor = 1.0;
        }
    }

    fn inputs(&self) -> Vec<InputKind> {
        self.inputs.clone()
    }

    fn add_output(&mut self, output: OutputKind) -> Result<(), CaptureError> {
        if !self.outputs.is_empty() {
            return Err(CaptureError::ConfigurationUnsupported("session already has an output".into()));
        }
        self.outputs.push(output);
        Ok(())
    }

    fn remove_output(&mut self, output: OutputKind) {
        if output == OutputKind::Movie {
            self.stop_writer();
        }
        self.outputs.retain(|o| *o != output);
    }

    fn start_running(&mut self) {
        self.stats.lock().running = true;
    }

    fn stop_running(&mut self) {
        self.stop_writer();
        self.stats.lock().running = false;
    }

    fn is_running(&self) -> bool {
        self.stats.lock().running
    }

    fn apply_setting(&mut self, position: CameraPosition, setting: DeviceSetting) -> Result<(), CaptureError> {
        let unsupported = || CaptureError::ConfigurationUnsupported(setting.name().into());
        if self.unsupported.contains(setting.name()) {
            return Err(unsupported());
        }
        let device = self
            .devices
            .iter()
            .find(|d| d.position == position)
            .ok_or(CaptureError::DeviceUnavailable)?;

        let mut stats = self.stats.lock();
        match setting {
            DeviceSetting::Torch(on) if device.has_torch => stats.torch = on,
            DeviceSetting::Flash(on) if device.has_flash => stats.flash = on,
            DeviceSetting::Torch(_) | DeviceSetting::Flash(_) => return Err(unsupported()),
            DeviceSetting::Zoom(factor) => {
                if !(1.0..=device.max_zoom_factor).contains(&factor) {
                    return Err(unsupported());
                }
                stats.zoom_factor = factor;
            }
            _ => {}
        }
        log::trace!("applied {} on {:?} camera", setting.name(), position);
        Ok(())
    }

    fn start_movie(
        &mut self,
        path: &Path,
        settings: MovieSettings,
        completion: MovieCompletion,
    ) -> Result<(), CaptureError> {
        if !self.stats.lock().running || !self.has_output(OutputKind::Movie) {
            return Err(CaptureError::CaptureFailed("movie output is not running".into()));
        }
        if self.writer.is_some() {
            return Err(CaptureError::CaptureFailed("a movie is already being written".into()));
        }
        let position = self
            .active_device()
            .map(|d| d.position)
            .ok_or(CaptureError::DeviceUnavailable)?;

        let file = File::create(path)
            .map_err(|e| CaptureError::StorageError(format!("{}: {}", path.display(), e)))?;

        let stop = Arc::new(AtomicBool::new(false));
        let job = MovieJob {
            path: path.to_path_buf(),
            settings,
            position,
            frame_size: self.frame_size,
            stop: Arc::clone(&stop),
            stats: Arc::clone(&self.stats),
        };

        let handle = thread::Builder::new()
            .name("virtual-movie-writer".into())
            .spawn(move || {
                let path = job.path.clone();
                let result = write_movie(job, BufWriter::new(file)).map(|()| path);
                if let Err(e) = &result {
                    log::error!("virtual movie writer failed: {}", e);
                }
                completion(result);
            })
            .map_err(|e| CaptureError::CaptureFailed(format!("failed to spawn movie writer: {}", e)))?;

        self.stats.lock().movies_started += 1;
        self.writer = Some(MovieWriter { stop, handle });
        log::debug!("virtual movie started: {}", path.display());
        Ok(())
    }

    fn stop_movie(&mut self) {
        self.stop_writer();
    }

    fn capture_still(&mut self, completion: StillCompletion) -> Result<(), CaptureError> {
        if !self.stats.lock().running || !self.has_output(OutputKind::Still) {
            return Err(CaptureError::CaptureFailed("still output is not running".into()));
        }
        let position = self
            .active_device()
            .map(|d| d.position)
            .ok_or(CaptureError::DeviceUnavailable)?;

        self.sequence += 1;
        let (width, height) = self.frame_size;
        let sequence = self.sequence;
        let flash = self.stats.lock().flash;
        let stats = Arc::clone(&self.stats);

        thread::Builder::new()
            .name("virtual-still-capture".into())
            .spawn(move || {
                let mut frame = frames::test_pattern(width, height, position, sequence);
                if flash {
                    frames::apply_flash(&mut frame);
                }
                let result = frames::encode_frame(&frame, STILL_QUALITY);
                if result.is_ok() {
                    stats.lock().stills_captured += 1;
                }
                completion(result);
            })
            .map_err(|e| CaptureError::CaptureFailed(format!("failed to spawn still capture: {}", e)))?;
        Ok(())
    }
}

struct MovieJob {
    path: PathBuf,
    settings: MovieSettings,
    position: CameraPosition,
    frame_size: (u32, u32),
    stop: Arc<AtomicBool>,
    stats: Arc<Mutex<VirtualStats>>,
}

/// Writer loop. Always writes at least one frame so a finalized movie is
/// never empty.
fn write_movie(job: MovieJob, mut out: BufWriter<File>) -> Result<(), CaptureError> {
    let io_err = |e: std::io::Error| CaptureError::StorageError(format!("{}: {}", job.path.display(), e));
    let frame_interval = Duration::from_millis(1000 / MOVIE_FPS);
    let (width, height) = job.frame_size;

    out.write_all(frames::MOVIE_MAGIC).map_err(io_err)?;
    out.write_all(&[frames::orientation_tag(job.settings.orientation)])
        .map_err(io_err)?;

    let mut sequence = 0u64;
    loop {
        let mut frame = frames::test_pattern(width, height, job.position, sequence);
        if job.settings.mirrored {
            frame = frames::mirror(&frame);
        }
        let jpeg = frames::encode_frame(&frame, MOVIE_QUALITY)?;
        out.write_all(&frames::frame_header(jpeg.len())?).map_err(io_err)?;
        out.write_all(&jpeg).map_err(io_err)?;
        job.stats.lock().frames_written += 1;
        sequence += 1;

        // Sleep in small steps so a stop request is honored promptly.
        let mut slept = Duration::ZERO;
        while slept < frame_interval && !job.stop.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(5));
            slept += Duration::from_millis(5);
        }
        if job.stop.load(Ordering::SeqCst) {
            break;
        }
    }

    out.flush().map_err(io_err)?;
    log::debug!("virtual movie finalized: {} ({} frames)", job.path.display(), sequence);
    Ok(())
}
