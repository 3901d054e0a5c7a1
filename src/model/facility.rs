use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Zero on either axis is the form's "not geocoded yet" placeholder.
    pub fn is_set(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: GeoPoint,
    #[serde(default)]
    pub text_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
}

/// Coordinates are stored as strings by some backend versions.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(f64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{}'", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_string_and_numeric_coordinates() {
        let f: Facility = serde_json::from_value(json!({
            "_id": "f1",
            "name": "Maple House",
            "location": { "latitude": "40.5", "longitude": -73.25 },
            "textLocation": "1 Main St",
            "email": "a@b.c",
            "phone": "1",
            "buildingName": "B",
        }))
        .unwrap();
        assert_eq!(f.location, GeoPoint::new(40.5, -73.25));
        assert_eq!(f.building_name.as_deref(), Some("B"));
        assert!(f.floor.is_none());
    }

    #[test]
    fn rejects_garbage_coordinates() {
        let res: Result<GeoPoint, _> =
            serde_json::from_value(json!({ "latitude": "north", "longitude": 1 }));
        assert!(res.is_err());
    }

    #[test]
    fn unset_location() {
        assert!(!GeoPoint::default().is_set());
        assert!(!GeoPoint::new(0.0, 12.0).is_set());
        assert!(GeoPoint::new(1.0, 12.0).is_set());
    }
}
