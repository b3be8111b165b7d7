//! Satellite feature extraction
//!
//! Pure functions from raw band grids to the feature vector consumed by
//! the fusion engine. No I/O and no shared state.

use shared::{SatelliteFeatureVector, SatelliteScene};

use crate::error::{AppError, AppResult};

/// Normalized Difference Vegetation Index for one pixel
pub fn ndvi(red: f64, nir: f64) -> f64 {
    let denom = nir + red;
    if denom == 0.0 {
        0.0
    } else {
        (nir - red) / denom
    }
}

/// Normalized Difference Water Index for one pixel
pub fn ndwi(green: f64, nir: f64) -> f64 {
    let denom = green + nir;
    if denom == 0.0 {
        0.0
    } else {
        (green - nir) / denom
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Extract the feature vector from a scene.
///
/// A scene with no usable bands is an error, not a vector of zeros; a
/// zeroed vector would read as "cold, bare, dry" downstream. Individual
/// missing bands leave their features as `None`.
pub fn extract_features(scene: &SatelliteScene) -> AppResult<SatelliteFeatureVector> {
    if scene.is_empty() {
        return Err(AppError::DataUnavailable(
            "satellite scene has no band data".to_string(),
        ));
    }

    let (thermal_mean, thermal_max, thermal_std, hotspot_pct) = if scene.thermal.is_empty() {
        (None, None, None, None)
    } else {
        let mean = mean(&scene.thermal);
        let std = std_dev(&scene.thermal, mean);
        let max = scene
            .thermal
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        // Hotspots are thermal outliers above mean + 2 sigma
        let threshold = mean + 2.0 * std;
        let hot = scene.thermal.iter().filter(|&&t| t > threshold).count();
        let pct = hot as f64 / scene.thermal.len() as f64;
        (Some(mean), Some(max), Some(std), Some(pct))
    };

    let (ndvi_mean, ndvi_min, ndvi_max) =
        if scene.red.is_empty() || scene.nir.is_empty() || scene.red.len() != scene.nir.len() {
            (None, None, None)
        } else {
            let values: Vec<f64> = scene
                .red
                .iter()
                .zip(&scene.nir)
                .map(|(&r, &n)| ndvi(r, n))
                .collect();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (Some(mean(&values)), Some(min), Some(max))
        };

    let (ndwi_mean, ndwi_max) =
        if scene.green.is_empty() || scene.nir.is_empty() || scene.green.len() != scene.nir.len() {
            (None, None)
        } else {
            let values: Vec<f64> = scene
                .green
                .iter()
                .zip(&scene.nir)
                .map(|(&g, &n)| ndwi(g, n))
                .collect();
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (Some(mean(&values)), Some(max))
        };

    Ok(SatelliteFeatureVector {
        thermal_mean,
        thermal_max,
        thermal_std,
        hotspot_pct,
        ndvi_mean,
        ndvi_min,
        ndvi_max,
        ndwi_mean,
        ndwi_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_is_unavailable() {
        let scene = SatelliteScene::default();
        assert!(matches!(
            extract_features(&scene),
            Err(AppError::DataUnavailable(_))
        ));
    }

    #[test]
    fn ndvi_handles_zero_denominator() {
        assert_eq!(ndvi(0.0, 0.0), 0.0);
        assert!((ndvi(0.1, 0.3) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ndwi_sign_convention() {
        // Water reflects green more than NIR, so water pixels are positive
        assert!(ndwi(0.4, 0.1) > 0.0);
        assert!(ndwi(0.1, 0.4) < 0.0);
    }

    #[test]
    fn hotspot_fraction_counts_outliers() {
        // 99 background pixels at 20C, one at 400C
        let mut thermal = vec![20.0; 99];
        thermal.push(400.0);
        let scene = SatelliteScene {
            thermal,
            ..Default::default()
        };
        let features = extract_features(&scene).unwrap();
        assert_eq!(features.hotspot_pct, Some(0.01));
        assert_eq!(features.thermal_max, Some(400.0));
        assert!(features.ndvi_mean.is_none());
    }

    #[test]
    fn uniform_thermal_has_no_hotspots() {
        let scene = SatelliteScene {
            thermal: vec![25.0; 50],
            ..Default::default()
        };
        let features = extract_features(&scene).unwrap();
        assert_eq!(features.hotspot_pct, Some(0.0));
        assert_eq!(features.thermal_std, Some(0.0));
    }

    #[test]
    fn ndvi_stats_over_mixed_pixels() {
        let scene = SatelliteScene {
            red: vec![0.1, 0.3, 0.2],
            nir: vec![0.5, 0.3, 0.6],
            ..Default::default()
        };
        let features = extract_features(&scene).unwrap();
        let min = features.ndvi_min.unwrap();
        let max = features.ndvi_max.unwrap();
        assert!(min <= features.ndvi_mean.unwrap());
        assert!(features.ndvi_mean.unwrap() <= max);
        assert_eq!(min, 0.0);
    }

    #[test]
    fn mismatched_band_lengths_skip_index() {
        let scene = SatelliteScene {
            red: vec![0.1, 0.2],
            nir: vec![0.5],
            thermal: vec![20.0],
            ..Default::default()
        };
        let features = extract_features(&scene).unwrap();
        assert!(features.ndvi_mean.is_none());
        assert!(features.thermal_mean.is_some());
    }
}
