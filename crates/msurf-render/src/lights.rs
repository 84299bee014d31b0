//! Point lights of an illuminated surface.

use msurf_core::{Result, SurfaceError};
use msurf_math::{Color, DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Light slots available to one surface.
pub const MAX_LIGHTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    /// Diffuse and specular intensity.
    pub intensity: DVec2,
    pub color: Color,
    pub position: DVec3,
}

impl LightSource {
    pub fn new(intensity: DVec2, color: Color, position: DVec3) -> Self {
        Self {
            intensity,
            color,
            position,
        }
    }
}

/// Fixed set of [`MAX_LIGHTS`] slots, each either lit or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    slots: [Option<LightSource>; MAX_LIGHTS],
}

impl LightRig {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Key, fill, rim and top lights around the origin.
    pub fn default_rig() -> Self {
        let mut rig = Self::empty();
        let lights = [
            LightSource::new(DVec2::new(0.7, 0.4), Color::rgb(1.0, 0.95, 0.85), DVec3::new(20.0, -20.0, 30.0)),
            LightSource::new(DVec2::new(0.35, 0.1), Color::rgb(0.8, 0.85, 1.0), DVec3::new(-25.0, -10.0, 10.0)),
            LightSource::new(DVec2::new(0.4, 0.3), Color::WHITE, DVec3::new(0.0, 30.0, 15.0)),
            LightSource::new(DVec2::new(0.25, 0.05), Color::WHITE, DVec3::new(0.0, 0.0, -40.0)),
        ];
        for (slot, light) in rig.slots.iter_mut().zip(lights) {
            *slot = Some(light);
        }
        rig
    }

    fn check_index(index: usize) -> Result<()> {
        if index >= MAX_LIGHTS {
            return Err(SurfaceError::usage(format!(
                "light index {} out of range, a surface has {} light slots",
                index, MAX_LIGHTS
            )));
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&LightSource> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn set(&mut self, index: usize, light: LightSource) -> Result<()> {
        Self::check_index(index)?;
        self.slots[index] = Some(light);
        Ok(())
    }

    pub fn clear(&mut self, index: usize) -> Result<()> {
        Self::check_index(index)?;
        self.slots[index] = None;
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn to_uniform(&self) -> LightUniform {
        let mut uniform: LightUniform = bytemuck::Zeroable::zeroed();
        for (gpu, light) in uniform.lights.iter_mut().zip(&self.slots) {
            if let Some(light) = light {
                *gpu = GpuLight::from(light);
            }
        }
        uniform.enabled = self.slots.map(|s| u32::from(s.is_some()));
        uniform
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub intensity: [f32; 4],
    pub color: [f32; 4],
    pub position: [f32; 4],
}

impl From<&LightSource> for GpuLight {
    fn from(light: &LightSource) -> Self {
        let i = light.intensity.as_vec2();
        let p = light.position.as_vec3();
        Self {
            intensity: [i.x, i.y, 0.0, 0.0],
            color: light.color.to_array(),
            position: [p.x, p.y, p.z, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub lights: [GpuLight; MAX_LIGHTS],
    /// Non-zero for lit slots.
    pub enabled: [u32; MAX_LIGHTS],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rig_has_four_lights() {
        let rig = LightRig::default_rig();
        assert_eq!(rig.active_count(), 4);
        assert!(rig.get(3).is_some());
        assert!(rig.get(4).is_none());
        assert_eq!(LightRig::empty().active_count(), 0);
    }

    #[test]
    fn test_slot_bounds() {
        let mut rig = LightRig::empty();
        let light = LightSource::new(DVec2::ONE, Color::WHITE, DVec3::ZERO);
        rig.set(7, light).unwrap();
        assert!(rig.set(MAX_LIGHTS, light).unwrap_err().is_usage());
        assert!(rig.clear(8).is_err());
        rig.clear(7).unwrap();
        assert_eq!(rig.active_count(), 0);
    }

    #[test]
    fn test_uniform_packing() {
        let mut rig = LightRig::empty();
        rig.set(2, LightSource::new(DVec2::new(0.5, 0.25), Color::BLACK, DVec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        let uniform = rig.to_uniform();
        assert_eq!(uniform.enabled, [0, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(uniform.lights[2].position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.lights[2].intensity[..2], [0.5, 0.25]);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), MAX_LIGHTS * 48 + MAX_LIGHTS * 4);
    }
}
