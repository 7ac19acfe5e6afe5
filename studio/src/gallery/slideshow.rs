//! Slideshow animation.
//!
//! The camera for each slide moves between two random keyframes with an
//! eased interpolation, plus a few layered sine waves that fade in and out
//! with the slide. Everything is driven by the caller's clock: [`Slideshow`]
//! never reads the time itself and all randomness comes from a seeded
//! [`StdRng`], so a given seed and tick sequence always yields the same
//! frames.

use std::f64::consts::{PI, TAU};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Time each image stays on screen.
pub const SLIDE_INTERVAL: Duration = Duration::from_secs(5);

const MAX_PAN: f64 = 40.0;
const MIN_ZOOM: f64 = 1.05;
const MAX_ZOOM: f64 = 1.35;
const MAX_TILT: f64 = 3.0;

/// (amplitude, frequency in Hz) of the oscillation layers.
const PAN_X_WAVES: [(f64, f64); 2] = [(6.0, 0.13), (2.5, 0.41)];
const PAN_Y_WAVES: [(f64, f64); 2] = [(5.0, 0.17), (2.0, 0.37)];
const ZOOM_WAVES: [(f64, f64); 1] = [(0.015, 0.09)];
const TILT_WAVES: [(f64, f64); 1] = [(0.4, 0.07)];

/// Pan in pixels, zoom factor and rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    pub rotation: f64,
}

impl Camera {
    pub const IDENTITY: Camera = Camera {
        pan_x: 0.0,
        pan_y: 0.0,
        zoom: 1.0,
        rotation: 0.0,
    };

    /// A random camera within the slideshow's pan/zoom/tilt bounds.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            pan_x: rng.gen_range(-MAX_PAN..=MAX_PAN),
            pan_y: rng.gen_range(-MAX_PAN..=MAX_PAN),
            zoom: rng.gen_range(MIN_ZOOM..=MAX_ZOOM),
            rotation: rng.gen_range(-MAX_TILT..=MAX_TILT),
        }
    }

    fn lerp(self, to: Camera, t: f64) -> Camera {
        Camera {
            pan_x: lerp(self.pan_x, to.pan_x, t),
            pan_y: lerp(self.pan_y, to.pan_y, t),
            zoom: lerp(self.zoom, to.zoom, t),
            rotation: lerp(self.rotation, to.rotation, t),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Start and end camera of one slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyframePair {
    pub from: Camera,
    pub to: Camera,
}

impl KeyframePair {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            from: Camera::random(rng),
            to: Camera::random(rng),
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic ease in/out on `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn waves(layers: &[(f64, f64)], secs: f64) -> f64 {
    layers
        .iter()
        .map(|(amplitude, hz)| amplitude * (TAU * hz * secs).sin())
        .sum()
}

/// Camera `elapsed` into a slide lasting `interval`.
///
/// Equals `pair.from` at the start and `pair.to` once the slide is over.
pub fn camera_at(pair: &KeyframePair, elapsed: Duration, interval: Duration) -> Camera {
    let t = if interval.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f64() / interval.as_secs_f64()).clamp(0.0, 1.0)
    };
    let base = pair.from.lerp(pair.to, smoothstep(t));

    // Oscillation fades in and out so slides join without a jump.
    let envelope = (PI * t).sin();
    let secs = elapsed.as_secs_f64();
    Camera {
        pan_x: base.pan_x + envelope * waves(&PAN_X_WAVES, secs),
        pan_y: base.pan_y + envelope * waves(&PAN_Y_WAVES, secs),
        zoom: base.zoom + envelope * waves(&ZOOM_WAVES, secs),
        rotation: base.rotation + envelope * waves(&TILT_WAVES, secs),
    }
}

/// Slideshow clock and camera state.
///
/// `now` values passed to [`Slideshow::start`] and [`Slideshow::tick`] are
/// offsets on any monotonic clock the caller chooses.
#[derive(Debug, Clone)]
pub struct Slideshow {
    rng: StdRng,
    interval: Duration,
    active: bool,
    slide_started: Duration,
    pair: KeyframePair,
    camera: Camera,
}

impl Slideshow {
    pub fn new(seed: u64) -> Self {
        Self::with_interval(seed, SLIDE_INTERVAL)
    }

    pub fn with_interval(seed: u64, interval: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            interval,
            active: false,
            slide_started: Duration::ZERO,
            pair: KeyframePair {
                from: Camera::IDENTITY,
                to: Camera::IDENTITY,
            },
            camera: Camera::IDENTITY,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn keyframes(&self) -> KeyframePair {
        self.pair
    }

    /// Starts (or restarts) the first slide at `now`.
    pub fn start(&mut self, now: Duration) {
        self.active = true;
        self.begin_slide(now);
    }

    /// Stops and resets the camera to identity.
    pub fn stop(&mut self) {
        self.active = false;
        self.camera = Camera::IDENTITY;
    }

    /// Moves the animation to `now`. Returns how many slides ended since the
    /// last tick; the caller advances its image by that many.
    pub fn tick(&mut self, now: Duration) -> usize {
        if !self.active {
            return 0;
        }
        let mut advanced = 0;
        if !self.interval.is_zero() {
            while now.saturating_sub(self.slide_started) >= self.interval {
                let next = self.slide_started + self.interval;
                self.begin_slide(next);
                advanced += 1;
            }
        }
        let elapsed = now.saturating_sub(self.slide_started);
        self.camera = camera_at(&self.pair, elapsed, self.interval);
        advanced
    }

    fn begin_slide(&mut self, at: Duration) {
        self.slide_started = at;
        self.pair = KeyframePair::random(&mut self.rng);
        self.camera = self.pair.from;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Camera, b: Camera) -> bool {
        (a.pan_x - b.pan_x).abs() < 1e-9
            && (a.pan_y - b.pan_y).abs() < 1e-9
            && (a.zoom - b.zoom).abs() < 1e-9
            && (a.rotation - b.rotation).abs() < 1e-9
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(2.0), 1.0);
        assert!(smoothstep(0.25) < 0.25);
    }

    #[test]
    fn test_camera_at_endpoints() {
        let mut rng = StdRng::seed_from_u64(7);
        let pair = KeyframePair::random(&mut rng);

        assert!(close(camera_at(&pair, Duration::ZERO, SLIDE_INTERVAL), pair.from));
        assert!(close(camera_at(&pair, SLIDE_INTERVAL, SLIDE_INTERVAL), pair.to));
        assert!(close(camera_at(&pair, SLIDE_INTERVAL * 3, SLIDE_INTERVAL), pair.to));
    }

    #[test]
    fn test_camera_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let pair = KeyframePair::random(&mut rng);
            for ms in (0..=5000).step_by(250) {
                let cam = camera_at(&pair, Duration::from_millis(ms), SLIDE_INTERVAL);
                assert!(cam.pan_x.abs() <= MAX_PAN + 8.51);
                assert!(cam.pan_y.abs() <= MAX_PAN + 7.01);
                assert!(cam.zoom >= MIN_ZOOM - 0.016 && cam.zoom <= MAX_ZOOM + 0.016);
                assert!(cam.rotation.abs() <= MAX_TILT + 0.41);
            }
        }
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = Slideshow::new(42);
        let mut b = Slideshow::new(42);
        a.start(Duration::ZERO);
        b.start(Duration::ZERO);
        for ms in [100u64, 1800, 4999, 5000, 7300, 16000] {
            let now = Duration::from_millis(ms);
            assert_eq!(a.tick(now), b.tick(now));
            assert_eq!(a.camera(), b.camera());
        }
    }

    #[test]
    fn test_tick_counts_slides() {
        let mut show = Slideshow::new(1);
        assert_eq!(show.tick(Duration::from_secs(10)), 0);

        show.start(Duration::from_secs(1));
        assert_eq!(show.tick(Duration::from_secs(3)), 0);
        assert_eq!(show.tick(Duration::from_secs(6)), 1);
        assert_eq!(show.tick(Duration::from_secs(7)), 0);
        // Two missed intervals.
        assert_eq!(show.tick(Duration::from_secs(16)), 2);
    }

    #[test]
    fn test_new_slide_draws_new_keyframes() {
        let mut show = Slideshow::new(5);
        show.start(Duration::ZERO);
        let first = show.keyframes();
        assert_eq!(show.camera(), first.from);

        show.tick(Duration::from_millis(1200));
        assert_eq!(show.keyframes(), first);

        assert_eq!(show.tick(SLIDE_INTERVAL), 1);
        assert_ne!(show.keyframes(), first);
        assert_eq!(show.camera(), show.keyframes().from);
    }

    #[test]
    fn test_stop_resets_camera() {
        let mut show = Slideshow::new(3);
        show.start(Duration::ZERO);
        show.tick(Duration::from_millis(2500));
        assert_ne!(show.camera(), Camera::IDENTITY);

        show.stop();
        assert!(!show.is_active());
        assert_eq!(show.camera(), Camera::IDENTITY);
        assert_eq!(show.tick(Duration::from_secs(60)), 0);
    }
}
