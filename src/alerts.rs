// src/alerts.rs
//
// Turns detection results into operator alerts. Only threat classes raise
// alerts; a per-(camera, object type) cooldown keeps a loitering person from
// generating an alert on every tick.

use crate::types::{now_epoch_secs, AlertConfig, DetectionResult, ObjectType};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Intrusion,
    Weapon,
    Drone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub source: String,
    pub camera_id: String,
    pub timestamp: f64,
}

fn alert_kind(object_type: ObjectType) -> Option<AlertKind> {
    match object_type {
        ObjectType::Person => Some(AlertKind::Intrusion),
        ObjectType::Weapon => Some(AlertKind::Weapon),
        ObjectType::Drone => Some(AlertKind::Drone),
        ObjectType::Vehicle | ObjectType::Unknown => None,
    }
}

fn severity_for(object_type: ObjectType) -> Severity {
    match object_type {
        ObjectType::Weapon => Severity::Critical,
        ObjectType::Person => Severity::High,
        _ => Severity::Medium,
    }
}

fn title_for(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::Intrusion => "Person Detected",
        AlertKind::Weapon => "Weapon Detected",
        AlertKind::Drone => "Drone Detected",
    }
}

pub struct AlertBridge {
    cooldown: Duration,
    last_raised: HashMap<(String, ObjectType), Instant>,
}

impl AlertBridge {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            cooldown: Duration::from_secs(config.cooldown_secs),
            last_raised: HashMap::new(),
        }
    }

    /// Raise alerts for the threats in a result, honoring the cooldown.
    pub fn process(&mut self, result: &DetectionResult, camera_id: &str) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for threat in &result.threats {
            let Some(kind) = alert_kind(threat.object_type) else {
                continue;
            };

            let key = (camera_id.to_string(), threat.object_type);
            let now = Instant::now();
            if let Some(last) = self.last_raised.get(&key) {
                if now.duration_since(*last) < self.cooldown {
                    continue;
                }
            }
            self.last_raised.insert(key, now);

            let confidence_pct = (threat.confidence * 100.0).round() as u32;
            let alert = Alert {
                id: format!("alert_{}", uuid::Uuid::new_v4().simple()),
                kind,
                severity: severity_for(threat.object_type),
                title: title_for(kind).to_string(),
                description: format!(
                    "{} detected with {}% confidence",
                    title_for(kind).split(' ').next().unwrap_or("Object"),
                    confidence_pct
                ),
                source: "detection".to_string(),
                camera_id: camera_id.to_string(),
                timestamp: now_epoch_secs(),
            };
            info!(
                "Alert raised: {} on {} ({:?})",
                alert.title, alert.camera_id, alert.severity
            );
            alerts.push(alert);
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::types::{DetectedObject, Region};

    fn detection(object_type: ObjectType, confidence: f32) -> DetectedObject {
        DetectedObject {
            id: format!("obj_{:?}", object_type),
            object_type,
            confidence,
            bbox: Region::new(10, 10, 50, 80),
            timestamp: 100.0,
            original_class: None,
        }
    }

    fn bridge(cooldown_secs: u64) -> AlertBridge {
        AlertBridge::new(&AlertConfig { cooldown_secs })
    }

    #[test]
    fn threats_map_to_alert_kinds_and_severities() {
        let result = assemble(vec![
            detection(ObjectType::Person, 0.85),
            detection(ObjectType::Weapon, 0.6),
            detection(ObjectType::Drone, 0.5),
        ]);
        let alerts = bridge(30).process(&result, "camera-1");
        assert_eq!(alerts.len(), 3);

        let person = alerts.iter().find(|a| a.kind == AlertKind::Intrusion).unwrap();
        assert_eq!(person.severity, Severity::High);
        assert_eq!(person.description, "Person detected with 85% confidence");

        let weapon = alerts.iter().find(|a| a.kind == AlertKind::Weapon).unwrap();
        assert_eq!(weapon.severity, Severity::Critical);

        let drone = alerts.iter().find(|a| a.kind == AlertKind::Drone).unwrap();
        assert_eq!(drone.severity, Severity::Medium);
    }

    #[test]
    fn vehicles_never_raise_alerts() {
        let result = assemble(vec![detection(ObjectType::Vehicle, 0.9)]);
        let alerts = bridge(30).process(&result, "camera-1");
        assert!(alerts.is_empty());
    }

    #[test]
    fn cooldown_suppresses_repeat_alerts_per_camera_and_type() {
        let mut bridge = bridge(30);
        let result = assemble(vec![detection(ObjectType::Person, 0.8)]);

        assert_eq!(bridge.process(&result, "camera-1").len(), 1);
        assert_eq!(bridge.process(&result, "camera-1").len(), 0);
        // Different camera has its own cooldown window.
        assert_eq!(bridge.process(&result, "camera-2").len(), 1);

        // A different object type on the same camera is not suppressed.
        let weapon = assemble(vec![detection(ObjectType::Weapon, 0.7)]);
        assert_eq!(bridge.process(&weapon, "camera-1").len(), 1);
    }

    #[test]
    fn zero_cooldown_allows_every_tick() {
        let mut bridge = bridge(0);
        let result = assemble(vec![detection(ObjectType::Person, 0.8)]);
        assert_eq!(bridge.process(&result, "camera-1").len(), 1);
        assert_eq!(bridge.process(&result, "camera-1").len(), 1);
    }
}
