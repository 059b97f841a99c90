use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Recyclable {
    Yes,
    No,
}

impl Recyclable {
    pub fn is_recyclable(&self) -> bool {
        matches!(self, Recyclable::Yes)
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Recyclable::Yes => "Recyclable!",
            Recyclable::No => "Not Recyclable",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Recyclable::Yes => "This item can be recycled. Check out the videos below for tips!",
            Recyclable::No => "This item cannot be recycled through standard programs.",
        }
    }
}

/// Link to an external tutorial video. Opened exactly as received.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct VideoRef(pub String);

impl VideoRef {
    pub fn url(&self) -> &str {
        &self.0
    }
}

/// Link to a map entry for a disposal location.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct LocationRef(pub String);

impl LocationRef {
    pub fn url(&self) -> &str {
        &self.0
    }

    /// Human readable name for the card. Maps links carry the place name in
    /// the `place/<name>` path segment or a `q`/`query` parameter; anything
    /// else falls back to the host, then to the raw link.
    pub fn label(&self) -> String {
        let Ok(parsed) = Url::parse(&self.0) else {
            return self.0.clone();
        };

        let from_path = parsed.path_segments().and_then(|segments| {
            let segments: Vec<&str> = segments.collect();
            segments
                .iter()
                .position(|s| *s == "place")
                .and_then(|i| segments.get(i + 1))
                .map(|s| decode_component(s))
        });

        let from_query = || {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "q" || key == "query")
                .map(|(_, value)| value.trim().to_string())
        };

        from_path
            .filter(|s| !s.is_empty())
            .or_else(|| from_query().filter(|s| !s.is_empty()))
            .or_else(|| parsed.host_str().map(str::to_string))
            .unwrap_or_else(|| self.0.clone())
    }
}

fn decode_component(segment: &str) -> String {
    url::form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.trim().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AlternatePrediction {
    pub object: String,
    pub probability: f64,
}

/// A classification confirmed by the service.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub id: String,
    pub product: String,
    pub probability: f64,
    pub description: String,
    pub recyclable: Recyclable,
    pub tutorials: Vec<VideoRef>,
    pub disposal_locations: Vec<LocationRef>,
    /// In the order the service sent them.
    pub alternates: Vec<AlternatePrediction>,
}

/// Body of `/predict` and `/update` as it comes off the wire.
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    pub id: String,
    pub product: String,
    pub probability: f64,
    pub description: String,
    pub recyclable: Recyclable,
    #[serde(default)]
    pub yt: Vec<Value>,
    #[serde(default)]
    pub maps: Vec<Value>,
    #[serde(default)]
    pub other_predictions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireAlternate {
    object: String,
    probability: f64,
}

#[derive(Debug, Serialize)]
pub struct UpdateRequest<'a> {
    pub id: &'a str,
    pub product: &'a str,
}

fn valid_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

fn string_entries(field: &str, entries: Vec<Value>) -> Vec<String> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            other => {
                tracing::warn!(field, entry = %other, "Dropping malformed link entry");
                None
            }
        })
        .collect()
}

impl TryFrom<PredictResponse> for PredictionResult {
    type Error = String;

    /// Top-level fields are strict; individual link and alternate entries
    /// that do not fit are dropped so one bad entry cannot sink the result.
    fn try_from(wire: PredictResponse) -> Result<Self, Self::Error> {
        if wire.id.trim().is_empty() {
            return Err("result id is empty".to_string());
        }
        if !valid_probability(wire.probability) {
            return Err(format!("probability {} is outside [0, 1]", wire.probability));
        }

        let alternates = wire
            .other_predictions
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<WireAlternate>(entry) {
                Ok(alt) if valid_probability(alt.probability) && !alt.object.trim().is_empty() => {
                    Some(AlternatePrediction {
                        object: alt.object,
                        probability: alt.probability,
                    })
                }
                Ok(alt) => {
                    tracing::warn!(object = %alt.object, probability = alt.probability, "Dropping invalid alternate");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed alternate");
                    None
                }
            })
            .collect();

        Ok(PredictionResult {
            id: wire.id,
            product: wire.product,
            probability: wire.probability,
            description: wire.description,
            recyclable: wire.recyclable,
            tutorials: string_entries("yt", wire.yt).into_iter().map(VideoRef).collect(),
            disposal_locations: string_entries("maps", wire.maps)
                .into_iter()
                .map(LocationRef)
                .collect(),
            alternates,
        })
    }
}

/// Parse a response body into a result, validating the schema.
pub fn parse_prediction(body: &[u8]) -> Result<PredictionResult, String> {
    let wire: PredictResponse = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    PredictionResult::try_from(wire)
}

/// Whole-percent confidence text, e.g. `0.873` -> `"87%"`.
pub fn confidence_label(probability: f64) -> String {
    let pct = if probability.is_finite() {
        (probability * 100.0).round().clamp(0.0, 100.0)
    } else {
        0.0
    };
    format!("{}%", pct as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn body(overrides: Value) -> Vec<u8> {
        let mut base = json!({
            "id": "abc123",
            "product": "Plastic Bottle",
            "probability": 0.91,
            "description": "A PET drinks bottle.",
            "recyclable": "yes",
            "yt": ["https://youtu.be/dQw4w9WgXcQ"],
            "maps": ["https://www.google.com/maps/place/Green+Depot/@1,2,15z"],
            "other_predictions": [
                {"object": "Glass Bottle", "probability": 0.05},
                {"object": "Can", "probability": 0.02}
            ]
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut base, overrides) {
            base.extend(extra);
        }
        serde_json::to_vec(&base).unwrap()
    }

    #[rstest]
    #[case(0.873, "87%")]
    #[case(0.875, "88%")]
    #[case(0.0, "0%")]
    #[case(1.0, "100%")]
    #[case(0.004, "0%")]
    #[case(0.996, "100%")]
    #[case(f64::NAN, "0%")]
    fn confidence_rounds_to_whole_percent(#[case] p: f64, #[case] expected: &str) {
        assert_eq!(confidence_label(p), expected);
    }

    #[test]
    fn parses_well_formed_body() {
        let result = parse_prediction(&body(json!({}))).unwrap();
        assert_eq!(result.product, "Plastic Bottle");
        assert_eq!(result.recyclable, Recyclable::Yes);
        assert_eq!(result.tutorials, vec![VideoRef("https://youtu.be/dQw4w9WgXcQ".into())]);
        assert_eq!(result.alternates.len(), 2);
        assert_eq!(result.alternates[0].object, "Glass Bottle");
    }

    #[test]
    fn rejects_schema_violations() {
        assert!(parse_prediction(b"<html>oops</html>").is_err());
        assert!(parse_prediction(&body(json!({"probability": 1.5}))).is_err());
        assert!(parse_prediction(&body(json!({"recyclable": "maybe"}))).is_err());
        assert!(parse_prediction(&body(json!({"id": ""}))).is_err());
        assert!(parse_prediction(br#"{"id":"x","product":"y"}"#).is_err());
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let result = parse_prediction(&body(json!({
            "yt": ["https://youtu.be/dQw4w9WgXcQ", {"title": "no url"}, ""],
            "maps": [null, "https://maps.example/?q=Depot"],
            "other_predictions": [{"object": "Can"}, {"object": "Jar", "probability": 0.3}, {"object": "Box", "probability": 2.0}]
        })))
        .unwrap();
        assert_eq!(result.tutorials.len(), 1);
        assert_eq!(result.disposal_locations.len(), 1);
        assert_eq!(
            result.alternates,
            vec![AlternatePrediction {
                object: "Jar".into(),
                probability: 0.3
            }]
        );
    }

    #[test]
    fn missing_link_lists_default_to_empty() {
        let raw = br#"{"id":"1","product":"Can","probability":0.5,"description":"","recyclable":"no"}"#;
        let result = parse_prediction(raw).unwrap();
        assert!(result.tutorials.is_empty());
        assert!(result.disposal_locations.is_empty());
        assert!(result.alternates.is_empty());
    }

    #[rstest]
    #[case("https://www.google.com/maps/place/Green+Depot/@51.5,-0.1,15z", "Green Depot")]
    #[case("https://www.google.com/maps/place/Caf%C3%A9%20Recycle", "Café Recycle")]
    #[case("https://www.google.com/maps/search/?api=1&query=City+Recycling+Centre", "City Recycling Centre")]
    #[case("https://maps.example.org/?q=Depot", "Depot")]
    #[case("https://maps.app.goo.gl/AbCdEf", "maps.app.goo.gl")]
    #[case("not a link", "not a link")]
    fn location_labels(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(LocationRef(url.to_string()).label(), expected);
    }

    #[test]
    fn verdict_copy() {
        assert_eq!(Recyclable::Yes.headline(), "Recyclable!");
        assert_eq!(Recyclable::No.headline(), "Not Recyclable");
        assert!(Recyclable::No.guidance().contains("cannot be recycled"));
    }
}
