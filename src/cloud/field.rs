//! Cloud field: a set of drifting clouds bound to one surface
//!
//! The field runs a self-perpetuating frame chain: `run` requests a frame,
//! every serviced frame requests the next one, and `pause` breaks the chain
//! by cancelling the one outstanding request. Only the outstanding handle is
//! honoured, so a cancelled or duplicated frame can never move the clouds.

use super::{create_cloud, CloudSprite};
use crate::color::Rgba;
use crate::display::DrawSurface;
use crate::error::{CloudError, Result};
use crate::scheduler::{FrameHandle, FrameQueue, FrameScheduler};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Frame gaps at or above this many milliseconds are treated as a stall
/// (hidden window, debugger pause) and produce no motion.
pub const STUTTER_THRESHOLD_MS: f64 = 250.0;

pub struct CloudField<S: DrawSurface, F: FrameScheduler = FrameQueue> {
    /// Back to front
    clouds: Vec<CloudSprite>,
    /// Radians, 0 = toward +x
    wind: f32,
    sky: Rgba,
    running: bool,
    last_update: Option<f64>,
    pending: Option<FrameHandle>,
    surface: S,
    scheduler: F,
    rng: StdRng,
}

impl<S: DrawSurface> CloudField<S, FrameQueue> {
    /// Bind a field to a surface, with a `FrameQueue` scheduler
    pub fn new(surface: S) -> Result<Self> {
        Self::with_scheduler(surface, FrameQueue::new())
    }
}

impl<S: DrawSurface, F: FrameScheduler> CloudField<S, F> {
    /// Bind a field to a surface and the scheduler that will drive it.
    /// Fails if nothing can be drawn on the surface.
    pub fn with_scheduler(surface: S, scheduler: F) -> Result<Self> {
        if !surface.is_drawable() {
            log::warn!(
                "rejecting {}x{} surface for cloud field",
                surface.width(),
                surface.height()
            );
            return Err(CloudError::InvalidSurface {
                width: surface.width(),
                height: surface.height(),
            });
        }

        Ok(Self {
            clouds: Vec::new(),
            wind: 0.0,
            sky: Rgba::TRANSPARENT,
            running: false,
            last_update: None,
            pending: None,
            surface,
            scheduler,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Make texture generation reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Wind direction in radians. Applies from the next tick on.
    pub fn set_wind_direction(&mut self, radians: f32) {
        log::debug!("wind set to {:.1} degrees", radians.to_degrees());
        self.wind = radians;
    }

    /// Wind direction in degrees, as control surfaces supply it
    pub fn set_wind_degrees(&mut self, degrees: f32) {
        self.set_wind_direction(degrees.to_radians());
    }

    pub fn wind(&self) -> f32 {
        self.wind
    }

    /// Flat backdrop painted before the clouds
    pub fn set_sky_color(&mut self, color: Rgba) {
        log::debug!("sky set to {}", color);
        self.sky = color;
    }

    pub fn sky(&self) -> Rgba {
        self.sky
    }

    /// Generate a cloud centered at (x, y) and put it in front of the others
    pub fn add(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        disc_count: u32,
        color: Rgba,
        speed: f32,
    ) {
        let cloud = create_cloud(x, y, width, height, disc_count, color, speed, &mut self.rng);
        self.clouds.push(cloud);
        log::debug!(
            "cloud {} added at ({:.1}, {:.1}), {}x{} box, speed {}",
            self.clouds.len(),
            x,
            y,
            width,
            height,
            speed
        );
    }

    /// Clouds in draw order
    pub fn clouds(&self) -> &[CloudSprite] {
        &self.clouds
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// For hosts that resize or otherwise manage the surface between frames
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Repaint the surface: clear, fill with the sky color, clouds back to front
    pub fn draw(&mut self) {
        let w = self.surface.width();
        let h = self.surface.height();

        self.surface.clear_region(0, 0, w, h);
        self.surface.fill_region(0, 0, w, h, self.sky);

        for cloud in &self.clouds {
            cloud.render(&mut self.surface);
        }
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Start animating. No-op while already running.
    pub fn run(&mut self) {
        if self.running {
            return;
        }

        self.running = true;
        self.last_update = None;
        self.request_frame();
        log::info!("cloud field running ({} clouds)", self.clouds.len());
    }

    /// Stop animating and withdraw the outstanding frame. No-op while stopped.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }

        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        log::info!("cloud field paused");
    }

    /// Service a frame the scheduler fired at `timestamp_ms`.
    ///
    /// Moves and redraws the clouds unless this is the first frame since
    /// `run` or the gap since the previous frame reaches the stutter
    /// threshold. Either way the timestamp becomes the new baseline and the
    /// next frame is requested.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) {
        if self.pending != Some(handle) {
            log::trace!("ignoring stale frame {:?}", handle);
            return;
        }
        self.pending = None;

        if let Some(last) = self.last_update {
            let elapsed = timestamp_ms - last;
            if elapsed < STUTTER_THRESHOLD_MS {
                self.advance(elapsed);
                self.draw();
            } else {
                log::trace!("dropping {:.0} ms frame gap", elapsed);
            }
        }

        self.last_update = Some(timestamp_ms);
        self.request_frame();
    }

    /// Fire every frame that is due on the scheduler at `timestamp_ms`
    pub fn dispatch(&mut self, timestamp_ms: f64) {
        for handle in self.scheduler.take_due() {
            self.on_frame(handle, timestamp_ms);
        }
    }

    fn request_frame(&mut self) {
        self.pending = Some(self.scheduler.schedule());
    }

    /// Integrate every cloud along the wind for `elapsed_ms`, wrapping at the
    /// surface edges. Surface size is read fresh on each call.
    fn advance(&mut self, elapsed_ms: f64) {
        let seconds = (elapsed_ms / 1000.0) as f32;
        let (sin, cos) = self.wind.sin_cos();
        let surface_w = self.surface.width() as f32;
        let surface_h = self.surface.height() as f32;

        for cloud in &mut self.clouds {
            let delta = cloud.speed() * seconds;
            cloud.drift(cos * delta, sin * delta, surface_w, surface_h);
        }
    }
}

impl<S: DrawSurface, F: FrameScheduler> Drop for CloudField<S, F> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}
