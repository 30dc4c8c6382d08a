use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use owl_capture_core::{
    CameraPosition, CaptureController, CaptureDelegate, CaptureError, CapturePhase, CaptureResult, CapturedPhoto,
    ImageOrientation, OwlConfiguration, Screen, ShutterState, VideoRecording,
};
use owl_capture_virtual::frames;
use owl_capture_virtual::{StaticPermissions, VirtualCamera, VirtualProbe};

const DEADLINE: Duration = Duration::from_secs(10);

#[derive(Default)]
struct Host {
    photos: Mutex<Vec<Option<CapturedPhoto>>>,
    videos: Mutex<Vec<Option<VideoRecording>>>,
    alerts: Mutex<Vec<CaptureError>>,
    finished: Mutex<Vec<CaptureResult>>,
    closed: Mutex<u32>,
}

impl CaptureDelegate for Host {
    fn on_photo_selected(&self, photo: Option<CapturedPhoto>) {
        self.photos.lock().push(photo);
    }

    fn on_video_selected(&self, video: Option<VideoRecording>) {
        self.videos.lock().push(video);
    }

    fn on_closed(&self) {
        *self.closed.lock() += 1;
    }

    fn on_alert(&self, error: &CaptureError) {
        self.alerts.lock().push(error.clone());
    }

    fn on_capture_finished(&self, result: &CaptureResult) {
        self.finished.lock().push(result.clone());
    }
}

struct Screenplay {
    controller: CaptureController,
    host: Arc<Host>,
    probe: VirtualProbe,
    scratch: tempfile::TempDir,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn screenplay(config: OwlConfiguration, camera: VirtualCamera, permissions: StaticPermissions) -> Screenplay {
    init_logging();
    let scratch = tempfile::tempdir().unwrap();
    let config = OwlConfiguration {
        scratch_directory: scratch.path().join("movies"),
        ..config
    };
    let host = Arc::new(Host::default());
    let probe = camera.probe();
    let controller = CaptureController::new(config, camera, Arc::new(permissions), host.clone()).unwrap();
    Screenplay {
        controller,
        host,
        probe,
        scratch,
    }
}

fn pump_until(controller: &mut CaptureController, done: impl Fn(&CaptureController) -> bool) {
    let deadline = Instant::now() + DEADLINE;
    while !done(controller) {
        assert!(Instant::now() < deadline, "timed out in phase {:?}", controller.phase());
        controller.pump(Duration::from_millis(20), Instant::now());
    }
}

fn go_live(play: &mut Screenplay) {
    play.controller.present();
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Live);
}

#[test]
fn photo_capture_is_delivered_on_accept() {
    let mut play = screenplay(
        OwlConfiguration::photo(),
        VirtualCamera::new().with_frame_size(64, 48),
        StaticPermissions::granted(),
    );
    go_live(&mut play);
    assert_eq!(play.controller.instructions_key(), "camera.instructions.tap");

    play.controller.tap();
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Reviewing);

    let Screen::PhotoReview(photo) = play.controller.screen().clone() else {
        panic!("expected photo review");
    };
    assert_eq!((photo.width, photo.height), (64, 48));
    assert_eq!(photo.orientation, ImageOrientation::Right);
    assert_eq!(photo.position, CameraPosition::Back);
    assert!(image::load_from_memory(&photo.bytes).is_ok());

    assert!(play.controller.accept_review());
    assert_eq!(*play.host.photos.lock(), vec![Some(photo.clone())]);
    assert_eq!(*play.host.finished.lock(), vec![CaptureResult::Photo(photo)]);
    assert_eq!(play.controller.shutter_state(), ShutterState::Idle);
    assert_eq!(play.probe.stats().stills_captured, 1);
}

#[test]
fn preview_size_aspect_fills_the_still() {
    let config = OwlConfiguration {
        preview_size: Some((30, 40)),
        ..OwlConfiguration::photo()
    };
    let mut play = screenplay(config, VirtualCamera::new(), StaticPermissions::granted());
    go_live(&mut play);

    play.controller.tap();
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Reviewing);

    let Screen::PhotoReview(photo) = play.controller.screen() else {
        panic!("expected photo review");
    };
    // Portrait back camera stills display rotated, so stored axes are swapped.
    assert_eq!((photo.width, photo.height), (40, 30));
}

#[test]
fn released_recording_lands_in_scratch_directory() {
    let mut play = screenplay(
        OwlConfiguration::video(10).unwrap(),
        VirtualCamera::new().with_frame_size(32, 24),
        StaticPermissions::prompting(true),
    );
    go_live(&mut play);
    assert_eq!(play.controller.instructions_key(), "camera.instructions.pressandhold");

    play.controller.long_press_began(Instant::now());
    let probe = play.probe.clone();
    pump_until(&mut play.controller, |_| probe.stats().frames_written >= 2);
    play.controller.long_press_ended();
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Reviewing);

    let Screen::VideoReview(video) = play.controller.screen().clone() else {
        panic!("expected video review");
    };
    assert!(video.file_path.starts_with(play.scratch.path().join("movies")));
    assert_eq!(video.file_path.extension().and_then(|e| e.to_str()), Some("mov"));
    assert!(video.duration_secs > 0.0);
    let movie = frames::read_movie(&video.file_path).unwrap();
    assert!(movie.frames.len() >= 2);

    assert!(play.controller.cancel_review());
    assert_eq!(*play.host.videos.lock(), vec![None]);
    assert_eq!(*play.host.finished.lock(), vec![CaptureResult::Cancelled]);
    assert!(video.file_path.exists());
}

#[test]
fn recording_expires_at_the_limit() {
    let mut play = screenplay(
        OwlConfiguration::video(1).unwrap(),
        VirtualCamera::new().with_frame_size(16, 16),
        StaticPermissions::granted(),
    );
    go_live(&mut play);

    let t0 = Instant::now();
    play.controller.long_press_began(t0);
    play.controller.update(t0 + Duration::from_secs(1));
    assert_eq!(play.controller.phase(), CapturePhase::Finishing);
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Reviewing);

    // Releasing after expiry changes nothing.
    play.controller.long_press_ended();
    assert_eq!(play.controller.phase(), CapturePhase::Reviewing);
    assert!(play.controller.accept_review());
    assert_eq!(play.host.videos.lock().len(), 1);
}

#[test]
fn torch_follows_flash_while_recording() {
    let mut play = screenplay(
        OwlConfiguration::video(10).unwrap(),
        VirtualCamera::new().with_frame_size(16, 16),
        StaticPermissions::granted(),
    );
    go_live(&mut play);

    assert!(play.controller.toggle_flash());
    pump_until(&mut play.controller, |c| c.flash_enabled());
    play.controller.long_press_began(Instant::now());
    let probe = play.probe.clone();
    pump_until(&mut play.controller, |_| probe.stats().torch);

    play.controller.long_press_ended();
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Reviewing);
    assert!(!play.probe.stats().torch);
}

#[test]
fn front_camera_toggle_is_reflected_in_the_session() {
    let mut play = screenplay(
        OwlConfiguration::video(10).unwrap(),
        VirtualCamera::new(),
        StaticPermissions::granted(),
    );
    go_live(&mut play);

    play.controller.toggle_camera();
    assert!(!play.controller.flash_control_enabled());
    let probe = play.probe.clone();
    pump_until(&mut play.controller, |_| {
        let stats = probe.stats();
        stats.position == Some(CameraPosition::Front) && stats.running
    });
    assert_eq!(play.controller.camera_position(), CameraPosition::Front);

    play.controller.pinch_began();
    play.controller.pinch_changed(3.0);
    thread::sleep(Duration::from_millis(50));
    play.controller.update(Instant::now());
    assert!((play.controller.zoom_factor() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn denied_prompt_leaves_screen_inert() {
    let mut play = screenplay(
        OwlConfiguration::photo(),
        VirtualCamera::new(),
        StaticPermissions::prompting(false),
    );
    play.controller.present();
    pump_until(&mut play.controller, |c| c.phase() == CapturePhase::Inert);

    play.controller.tap();
    play.controller.present();
    thread::sleep(Duration::from_millis(50));
    play.controller.update(Instant::now());

    assert_eq!(*play.host.alerts.lock(), vec![CaptureError::PermissionDenied]);
    assert!(!play.probe.stats().running);
}

#[test]
fn close_while_recording_finalizes_movie() {
    let mut play = screenplay(
        OwlConfiguration::video(10).unwrap(),
        VirtualCamera::new().with_frame_size(16, 16),
        StaticPermissions::granted(),
    );
    go_live(&mut play);

    play.controller.long_press_began(Instant::now());
    let probe = play.probe.clone();
    pump_until(&mut play.controller, |_| probe.stats().frames_written >= 1);
    play.controller.close();

    assert_eq!(play.controller.phase(), CapturePhase::Closed);
    assert_eq!(*play.host.closed.lock(), 1);
    assert!(!play.probe.stats().running);
    assert!(play.host.videos.lock().is_empty());

    let movies: Vec<_> = std::fs::read_dir(play.scratch.path().join("movies"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(movies.len(), 1);
    assert!(!frames::read_movie(&movies[0]).unwrap().frames.is_empty());
}
