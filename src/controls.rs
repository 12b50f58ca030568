//! Playback controls shared by the keyboard and the remote
//!
//! Every command is applied to all layers the moment it is handled, so
//! relative changes such as wind steps compose even within one frame.

use crate::cloud::CloudField;
use crate::display::DrawSurface;
use crate::remote::RemoteCommand;
use crate::scheduler::FrameScheduler;

#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    running: bool,
    wind_degrees: f32,
    show_fps: bool,
}

impl Controls {
    /// Stopped, with the given initial wind
    pub fn new(wind_degrees: f32) -> Self {
        Self {
            running: false,
            wind_degrees: wind_degrees.rem_euclid(360.0),
            show_fps: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current wind in degrees, normalized to [0, 360)
    pub fn wind_degrees(&self) -> f32 {
        self.wind_degrees
    }

    pub fn show_fps(&self) -> bool {
        self.show_fps
    }

    pub fn toggle_fps(&mut self) {
        self.show_fps = !self.show_fps;
    }

    /// Apply one command to every layer
    pub fn apply<S: DrawSurface, F: FrameScheduler>(
        &mut self,
        command: &RemoteCommand,
        fields: &mut [CloudField<S, F>],
    ) {
        match command {
            RemoteCommand::Play => self.set_running(true, fields),
            RemoteCommand::Pause => self.set_running(false, fields),
            RemoteCommand::Toggle => self.set_running(!self.running, fields),
            RemoteCommand::Wind(degrees) => {
                self.wind_degrees = degrees.rem_euclid(360.0);
                for field in fields.iter_mut() {
                    field.set_wind_degrees(self.wind_degrees);
                }
                log::info!("wind {}°", self.wind_degrees);
            },
            RemoteCommand::Sky(color) => {
                if let Some(back) = fields.first_mut() {
                    back.set_sky_color(*color);
                    // repaint now in case the animation is paused
                    back.draw();
                }
            },
        }
    }

    /// Rotate the wind by `step_degrees` from where it is now
    pub fn turn_wind<S: DrawSurface, F: FrameScheduler>(
        &mut self,
        step_degrees: f32,
        fields: &mut [CloudField<S, F>],
    ) {
        let target = self.wind_degrees + step_degrees;
        self.apply(&RemoteCommand::Wind(target), fields);
    }

    fn set_running<S: DrawSurface, F: FrameScheduler>(
        &mut self,
        running: bool,
        fields: &mut [CloudField<S, F>],
    ) {
        self.running = running;
        for field in fields.iter_mut() {
            if running {
                field.run();
            } else {
                field.pause();
            }
        }
    }
}
