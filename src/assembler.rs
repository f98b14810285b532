// src/assembler.rs
//
// Pure assembly of classified objects into one DetectionResult. Counts are
// derived from the object list, never tracked separately; the threat
// subset is exactly the objects whose type is operationally significant.

use crate::types::{DetectedObject, DetectionResult, ObjectCounts, ObjectType};

pub fn assemble(objects: Vec<DetectedObject>) -> DetectionResult {
    let mut counts = ObjectCounts::default();
    for obj in &objects {
        match obj.object_type {
            ObjectType::Person => counts.persons += 1,
            ObjectType::Vehicle => counts.vehicles += 1,
            ObjectType::Drone => counts.drones += 1,
            ObjectType::Weapon => counts.weapons += 1,
            ObjectType::Unknown => {}
        }
    }

    let threats = objects
        .iter()
        .filter(|obj| obj.object_type.is_threat())
        .cloned()
        .collect();

    DetectionResult {
        objects,
        counts,
        threats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Region;

    fn obj(object_type: ObjectType) -> DetectedObject {
        DetectedObject {
            id: format!("obj_{}", object_type.as_str()),
            object_type,
            confidence: 0.8,
            bbox: Region::new(0, 0, 10, 10),
            timestamp: 0.0,
            original_class: None,
        }
    }

    #[test]
    fn counts_match_object_list() {
        let result = assemble(vec![
            obj(ObjectType::Person),
            obj(ObjectType::Person),
            obj(ObjectType::Vehicle),
            obj(ObjectType::Weapon),
        ]);
        assert_eq!(result.counts.persons, 2);
        assert_eq!(result.counts.vehicles, 1);
        assert_eq!(result.counts.drones, 0);
        assert_eq!(result.counts.weapons, 1);
        assert_eq!(result.counts.total(), result.objects.len());
    }

    #[test]
    fn threats_exclude_vehicles() {
        let result = assemble(vec![
            obj(ObjectType::Person),
            obj(ObjectType::Vehicle),
            obj(ObjectType::Drone),
            obj(ObjectType::Weapon),
        ]);
        assert_eq!(result.threats.len(), 3);
        assert!(result
            .threats
            .iter()
            .all(|t| t.object_type != ObjectType::Vehicle));
    }

    #[test]
    fn unknown_objects_are_counted_nowhere() {
        let result = assemble(vec![obj(ObjectType::Unknown), obj(ObjectType::Person)]);
        assert_eq!(result.counts.total(), 1);
        assert!(result.counts.total() <= result.objects.len());
    }

    #[test]
    fn empty_input_gives_empty_result() {
        let result = assemble(Vec::new());
        assert_eq!(result.counts, ObjectCounts::default());
        assert!(result.objects.is_empty());
        assert!(result.threats.is_empty());
    }

    #[test]
    fn discovery_order_is_preserved() {
        let result = assemble(vec![
            obj(ObjectType::Weapon),
            obj(ObjectType::Person),
            obj(ObjectType::Drone),
        ]);
        let order: Vec<_> = result.objects.iter().map(|o| o.object_type).collect();
        assert_eq!(
            order,
            vec![ObjectType::Weapon, ObjectType::Person, ObjectType::Drone]
        );
    }
}
