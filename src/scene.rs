//! Sky scenes: which clouds to build, saved and loaded as JSON
//!
//! Cloud geometry is stored as fractions of the surface size so one scene
//! file works at any resolution.

use crate::cloud::{create_cloud, draw_cloud, CloudField};
use crate::color::Rgba;
use crate::display::{DrawSurface, PixelBuffer};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One cloud, positioned relative to the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudSpec {
    /// Center, as fractions of surface width / height
    pub x: f32,
    pub y: f32,
    /// Box size, as fractions of surface width / height
    pub width: f32,
    pub height: f32,
    pub discs: u32,
    pub color: Rgba,
    /// Pixels per second
    #[serde(default)]
    pub speed: f32,
}

impl CloudSpec {
    pub fn new(x: f32, y: f32, width: f32, height: f32, discs: u32, color: Rgba, speed: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            discs,
            color,
            speed,
        }
    }

    /// (x, y, width, height) in pixels for a surface of the given size
    pub fn resolve(&self, surface_w: u32, surface_h: u32) -> (f32, f32, f32, f32) {
        let w = surface_w as f32;
        let h = surface_h as f32;
        (self.x * w, self.y * h, self.width * w, self.height * h)
    }
}

/// A still picture painted once behind the animated layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    pub sky: Rgba,
    #[serde(default)]
    pub clouds: Vec<CloudSpec>,
}

/// One animated layer, backed by its own cloud field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub sky: Rgba,
    pub clouds: Vec<CloudSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub backdrop: Option<Backdrop>,
    #[serde(default)]
    pub wind_degrees: f32,
    /// Back to front
    pub layers: Vec<Layer>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backdrop: None,
            wind_degrees: 0.0,
            layers: Vec::new(),
        }
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Save scene to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load scene from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Paint the backdrop into a new opaque-or-transparent buffer.
    /// Without a backdrop the buffer stays transparent.
    pub fn render_backdrop(&self, width: u32, height: u32, seed: Option<u64>) -> PixelBuffer {
        let mut buffer = PixelBuffer::with_size(width, height);
        let Some(backdrop) = &self.backdrop else {
            return buffer;
        };

        let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        buffer.fill_region(0, 0, width, height, backdrop.sky);
        for spec in &backdrop.clouds {
            let (x, y, w, h) = spec.resolve(width, height);
            let cloud = create_cloud(x, y, w, h, spec.discs, spec.color, spec.speed, &mut rng);
            draw_cloud(&cloud, &mut buffer);
        }
        buffer
    }

    /// Build one cloud field per layer, each on its own `width` x `height` buffer.
    /// Every field gets the scene wind. With a seed, layer `i` is seeded with `seed + i`.
    pub fn build_layers(
        &self,
        width: u32,
        height: u32,
        seed: Option<u64>,
    ) -> Result<Vec<CloudField<PixelBuffer>>> {
        let mut fields = Vec::with_capacity(self.layers.len());

        for (i, layer) in self.layers.iter().enumerate() {
            let mut field = CloudField::new(PixelBuffer::with_size(width, height))?;
            if let Some(seed) = seed {
                field = field.with_seed(seed.wrapping_add(i as u64));
            }
            field.set_sky_color(layer.sky);
            field.set_wind_degrees(self.wind_degrees);

            for spec in &layer.clouds {
                let (x, y, w, h) = spec.resolve(width, height);
                field.add(x, y, w, h, spec.discs, spec.color, spec.speed);
            }
            fields.push(field);
        }

        log::info!(
            "scene '{}': {} layers, {} clouds",
            self.name,
            fields.len(),
            self.layers.iter().map(|l| l.clouds.len()).sum::<usize>()
        );
        Ok(fields)
    }
}

impl Default for Scene {
    /// Sky-blue backdrop with one broad grey cloud, three slow background
    /// clouds, and four faster foreground clouds, two of them starting
    /// off-screen to the left.
    fn default() -> Self {
        let grey = |v: u8, a: f32| Rgba::new(v, v, v, a);
        let (big, small) = (0.75, 0.5);

        Self {
            name: "default".to_string(),
            backdrop: Some(Backdrop {
                sky: Rgba::SKY_BLUE,
                clouds: vec![CloudSpec::new(0.5, 0.5, 1.0, 1.0, 60, grey(150, 0.4), 0.0)],
            }),
            wind_degrees: 0.0,
            layers: vec![
                Layer {
                    sky: Rgba::TRANSPARENT,
                    clouds: vec![
                        CloudSpec::new(0.25, 0.25, big, big, 20, grey(120, 0.4), 16.0),
                        CloudSpec::new(1.0 / 3.0, 1.0 / 3.0, big, big, 30, grey(170, 0.4), 8.0),
                        CloudSpec::new(0.75, 0.75, big, big, 30, grey(180, 0.4), 24.0),
                    ],
                },
                Layer {
                    sky: Rgba::TRANSPARENT,
                    clouds: vec![
                        CloudSpec::new(0.75, 0.25, big, big, 45, grey(200, 0.2), 50.0),
                        CloudSpec::new(-0.75, 0.75, big, big, 30, grey(230, 0.2), 110.0),
                        CloudSpec::new(-0.5, 0.5, small, small, 40, grey(245, 0.2), 80.0),
                        CloudSpec::new(-0.75, 0.25, small, small, 40, grey(215, 0.2), 140.0),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tiny_scene() -> Scene {
        let mut scene = Scene::new("tiny");
        scene.wind_degrees = 90.0;
        scene.add_layer(Layer {
            sky: Rgba::TRANSPARENT,
            clouds: vec![CloudSpec::new(0.5, 0.25, 0.5, 0.5, 2, Rgba::WHITE, 10.0)],
        });
        scene.add_layer(Layer {
            sky: Rgba::BLACK,
            clouds: vec![],
        });
        scene
    }

    #[test]
    fn test_resolve_scales_by_surface() {
        let spec = CloudSpec::new(0.25, 0.5, 0.75, 0.5, 1, Rgba::WHITE, 0.0);
        assert_eq!(spec.resolve(800, 600), (200.0, 300.0, 600.0, 300.0));
    }

    #[test]
    fn test_build_layers_applies_scene() {
        let fields = tiny_scene().build_layers(40, 20, Some(5)).unwrap();
        assert_eq!(fields.len(), 2);

        let back = &fields[0];
        assert_abs_diff_eq!(back.wind(), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_eq!(back.clouds().len(), 1);
        assert_eq!(back.clouds()[0].position(), (20.0, 5.0));
        assert_eq!(back.clouds()[0].texture().width(), 20);
        assert_eq!(fields[1].sky(), Rgba::BLACK);
    }

    #[test]
    fn test_build_layers_rejects_empty_surface() {
        assert!(tiny_scene().build_layers(0, 0, None).is_err());
    }

    #[test]
    fn test_backdrop_fills_sky() {
        let mut scene = Scene::new("plain");
        scene.backdrop = Some(Backdrop {
            sky: Rgba::SKY_BLUE,
            clouds: vec![],
        });
        let buffer = scene.render_backdrop(8, 8, Some(1));
        assert_eq!(buffer.get_pixel_rgba(7, 7), Some((135, 206, 235, 255)));

        let none = Scene::new("none").render_backdrop(8, 8, None);
        assert!(none.is_transparent());
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("cumulus-scene-{}.json", std::process::id()));
        let scene = Scene::default();
        scene.save(&path).unwrap();
        let loaded = Scene::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, scene);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "name": "minimal",
            "layers": [
                { "clouds": [ { "x": 0.5, "y": 0.5, "width": 0.2, "height": 0.1,
                                "discs": 10, "color": { "r": 255, "g": 255, "b": 255 } } ] }
            ]
        }"#;
        let scene: Scene = serde_json::from_str(json).unwrap();
        assert!(scene.backdrop.is_none());
        assert_eq!(scene.wind_degrees, 0.0);
        assert_eq!(scene.layers[0].sky, Rgba::TRANSPARENT);
        let cloud = &scene.layers[0].clouds[0];
        assert_eq!(cloud.speed, 0.0);
        assert_eq!(cloud.color, Rgba::WHITE);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Scene::load("/nonexistent/cumulus/scene.json").unwrap_err();
        assert!(matches!(err, crate::error::CloudError::Io(_)));
    }

    #[test]
    fn test_default_scene_layout() {
        let scene = Scene::default();
        assert_eq!(scene.layers.len(), 2);
        assert_eq!(scene.layers[0].clouds.len(), 3);
        assert_eq!(scene.layers[1].clouds.len(), 4);
        assert_eq!(scene.backdrop.as_ref().map(|b| b.clouds.len()), Some(1));
    }
}
