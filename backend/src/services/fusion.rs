//! Multi-hazard risk fusion
//!
//! Scores each hazard from a declarative rule table over the satellite
//! feature vector, the latest weather observation, and recent weather
//! deltas. Confidence is the satisfied weight over the maximum attainable
//! weight; rules whose inputs are unavailable drop out of both sides, so
//! degraded data lowers certainty instead of poisoning the score.

use shared::{
    GeoPoint, HazardKind, HazardScore, RiskAssessment, RiskLevel, SatelliteFeatureVector,
    SourceTag, WeatherDeltas, WeatherObservation,
};

use crate::config::FusionConfig;

/// Inputs available to rule predicates for one assessment
#[derive(Debug, Clone, Copy)]
pub struct FusionInputs<'a> {
    pub satellite: Option<&'a SatelliteFeatureVector>,
    pub weather: Option<&'a WeatherObservation>,
    pub deltas: &'a WeatherDeltas,
}

/// Result of evaluating one rule
enum RuleEval {
    /// Predicate held; carries the human-readable reason
    Satisfied(String),
    NotSatisfied,
    /// The inputs the predicate needs were missing
    Unavailable,
}

/// One entry in a hazard's rule table
struct Rule {
    weight: f64,
    source: SourceTag,
    eval: fn(&FusionInputs) -> RuleEval,
}

fn sat_field(
    inputs: &FusionInputs,
    get: fn(&SatelliteFeatureVector) -> Option<f64>,
) -> Option<f64> {
    inputs.satellite.and_then(get)
}

fn fire_rules() -> Vec<Rule> {
    vec![
        Rule {
            weight: 0.5,
            source: SourceTag::Satellite,
            eval: |inputs| match sat_field(inputs, |f| f.hotspot_pct) {
                None => RuleEval::Unavailable,
                Some(pct) if pct > 0.005 => RuleEval::Satisfied(format!(
                    "Satellite: {:.1}% hotspot density",
                    pct * 100.0
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.3,
            source: SourceTag::Satellite,
            eval: |inputs| match sat_field(inputs, |f| f.thermal_max) {
                None => RuleEval::Unavailable,
                Some(max) if max > 45.0 => RuleEval::Satisfied(format!(
                    "Satellite: extreme surface temperature {:.1}C",
                    max
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.2,
            source: SourceTag::Satellite,
            eval: |inputs| match sat_field(inputs, |f| f.ndvi_mean) {
                None => RuleEval::Unavailable,
                Some(ndvi) if ndvi < 0.25 => {
                    RuleEval::Satisfied(format!("Satellite: dry vegetation (NDVI {:.2})", ndvi))
                }
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.6,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.weather {
                None => RuleEval::Unavailable,
                Some(w) if w.temperature_c >= 35.0 && w.humidity_pct <= 25.0 => {
                    RuleEval::Satisfied(format!(
                        "Weather: hot and dry ({:.0}C, {:.0}% humidity)",
                        w.temperature_c, w.humidity_pct
                    ))
                }
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.3,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.weather {
                None => RuleEval::Unavailable,
                Some(w) if w.wind_speed_kmh >= 20.0 => RuleEval::Satisfied(format!(
                    "Weather: strong wind {:.0} km/h",
                    w.wind_speed_kmh
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.1,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.deltas.temperature.max_rise() {
                None => RuleEval::Unavailable,
                Some(delta) if delta > 5.0 => RuleEval::Satisfied(format!(
                    "Weather: rapidly rising temperature (+{:.1}C)",
                    delta
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
    ]
}

fn flood_rules() -> Vec<Rule> {
    vec![
        Rule {
            weight: 0.7,
            source: SourceTag::Satellite,
            eval: |inputs| match sat_field(inputs, |f| f.ndwi_mean) {
                None => RuleEval::Unavailable,
                Some(ndwi) if ndwi > 0.3 => RuleEval::Satisfied(format!(
                    "Satellite: widespread surface water (NDWI {:.2})",
                    ndwi
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.5,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.weather {
                None => RuleEval::Unavailable,
                Some(w) if w.rainfall_mm >= 50.0 => RuleEval::Satisfied(format!(
                    "Weather: intense rainfall {:.0} mm/h",
                    w.rainfall_mm
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.3,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.deltas.humidity.max_rise() {
                None => RuleEval::Unavailable,
                Some(delta) if delta > 15.0 => RuleEval::Satisfied(format!(
                    "Weather: rapid humidity rise (+{:.0}%)",
                    delta
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.2,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.weather {
                None => RuleEval::Unavailable,
                Some(w) if w.humidity_pct >= 90.0 => {
                    RuleEval::Satisfied("Weather: saturated air".to_string())
                }
                Some(_) => RuleEval::NotSatisfied,
            },
        },
    ]
}

fn cyclone_rules() -> Vec<Rule> {
    vec![
        Rule {
            weight: 0.4,
            source: SourceTag::Satellite,
            eval: |inputs| match sat_field(inputs, |f| f.thermal_mean) {
                None => RuleEval::Unavailable,
                Some(mean) if mean < -20.0 => RuleEval::Satisfied(format!(
                    "Satellite: cold cloud tops ({:.0}C)",
                    mean
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.6,
            source: SourceTag::Weather,
            eval: |inputs| {
                let drops = [
                    inputs.deltas.pressure.over_6h.value(),
                    inputs.deltas.pressure.over_12h.value(),
                ];
                if drops.iter().all(|d| d.is_none()) {
                    return RuleEval::Unavailable;
                }
                let steepest = drops.iter().flatten().cloned().fold(f64::INFINITY, f64::min);
                if steepest < -10.0 {
                    RuleEval::Satisfied(format!("Weather: rapid pressure drop ({:.0} hPa)", steepest))
                } else {
                    RuleEval::NotSatisfied
                }
            },
        },
        Rule {
            weight: 0.3,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.weather {
                None => RuleEval::Unavailable,
                Some(w) if w.wind_speed_kmh > 40.0 => RuleEval::Satisfied(format!(
                    "Weather: gale-force wind {:.0} km/h",
                    w.wind_speed_kmh
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
        Rule {
            weight: 0.2,
            source: SourceTag::Weather,
            eval: |inputs| match inputs.weather {
                None => RuleEval::Unavailable,
                Some(w) if w.pressure_hpa < 990.0 => RuleEval::Satisfied(format!(
                    "Weather: very low pressure {:.0} hPa",
                    w.pressure_hpa
                )),
                Some(_) => RuleEval::NotSatisfied,
            },
        },
    ]
}

fn rules_for(hazard: HazardKind) -> Vec<Rule> {
    match hazard {
        HazardKind::Fire => fire_rules(),
        HazardKind::Flood => flood_rules(),
        HazardKind::Cyclone => cyclone_rules(),
    }
}

/// Rule-fusion risk scorer
#[derive(Clone)]
pub struct RiskFusionEngine {
    config: FusionConfig,
}

impl RiskFusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Map a confidence to a level using the hazard's cut points.
    /// Medium sits at 60% of the HIGH cut; everything below is LOW, the
    /// floor of the scale.
    pub fn level_for(&self, hazard: HazardKind, confidence: f64) -> RiskLevel {
        let high = self.config.high_cut(hazard);
        if confidence >= self.config.critical {
            RiskLevel::Critical
        } else if confidence >= high {
            RiskLevel::High
        } else if confidence >= high * 0.6 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Score one hazard from its rule table
    pub fn score_hazard(&self, hazard: HazardKind, inputs: &FusionInputs) -> HazardScore {
        let mut satisfied_weight = 0.0;
        let mut attainable_weight = 0.0;
        let mut satellite_weight = 0.0;
        let mut weather_weight = 0.0;
        let mut reasons = Vec::new();

        for rule in rules_for(hazard) {
            match (rule.eval)(inputs) {
                RuleEval::Satisfied(reason) => {
                    satisfied_weight += rule.weight;
                    attainable_weight += rule.weight;
                    match rule.source {
                        SourceTag::Satellite => satellite_weight += rule.weight,
                        SourceTag::Weather => weather_weight += rule.weight,
                    }
                    reasons.push(reason);
                }
                RuleEval::NotSatisfied => attainable_weight += rule.weight,
                RuleEval::Unavailable => {}
            }
        }

        let no_usable_data = attainable_weight == 0.0;
        let confidence = if no_usable_data {
            0.0
        } else {
            (satisfied_weight / attainable_weight).clamp(0.0, 1.0)
        };
        if no_usable_data {
            reasons.push(format!(
                "No usable data for {} assessment",
                hazard.label().to_lowercase()
            ));
        }

        let (satellite_share, weather_share) = if satisfied_weight > 0.0 {
            (
                satellite_weight / satisfied_weight,
                weather_weight / satisfied_weight,
            )
        } else {
            (0.0, 0.0)
        };

        HazardScore {
            hazard,
            confidence,
            level: self.level_for(hazard, confidence),
            reasons,
            satellite_share,
            weather_share,
            no_usable_data,
        }
    }

    /// Assess every hazard for a location. The primary threat is the
    /// highest-confidence hazard; on a tie the earlier hazard in
    /// `HazardKind::ALL` wins.
    pub fn assess(
        &self,
        location_key: &str,
        point: GeoPoint,
        satellite: Option<&SatelliteFeatureVector>,
        weather: Option<&WeatherObservation>,
        deltas: &WeatherDeltas,
    ) -> RiskAssessment {
        let inputs = FusionInputs {
            satellite,
            weather,
            deltas,
        };
        let scores: Vec<HazardScore> = HazardKind::ALL
            .iter()
            .map(|&hazard| self.score_hazard(hazard, &inputs))
            .collect();

        // max_by on equal keys keeps the later element, so scan manually
        let mut primary = &scores[0];
        for score in &scores[1..] {
            if score.confidence > primary.confidence {
                primary = score;
            }
        }

        RiskAssessment {
            location_key: location_key.to_string(),
            point,
            generated_at: chrono::Utc::now(),
            current_weather: weather.cloned(),
            primary_threat: primary.hazard,
            primary_confidence: primary.confidence,
            primary_level: primary.level,
            scores,
        }
    }
}
