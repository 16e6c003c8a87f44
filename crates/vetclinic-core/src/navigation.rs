//! Identity resolution from navigation parameters.
//!
//! A patient page can be reached with the identifiers in the URL path
//! (`/registers/patient-profile/{tutorId}/{petId}/...`) or in the query string
//! (`?tutorId=..&petId=..`). Resolution picks one complete pair per navigation
//! event, in priority order: path, then query, then the pair already held by
//! the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::IdentityPair;

/// Default route of the medical-appointment page.
pub const DEFAULT_PATIENT_ROUTE: &str =
    "/registers/patient-profile/:tutorId/:petId/pet-medical-appointment";

const TUTOR_PLACEHOLDER: &str = ":tutorId";
const PATIENT_PLACEHOLDER: &str = ":petId";
const TUTOR_QUERY_KEY: &str = "tutorId";
const PATIENT_QUERY_KEY: &str = "petId";

// Only used to resolve relative URLs handed over by the router.
const BASE_URL: &str = "app://vetclinic/";

/// Navigation parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid route pattern: {0}")]
    InvalidPattern(String),
}

/// Route template with `:tutorId` and `:petId` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePattern {
    segments: Vec<String>,
}

impl RoutePattern {
    /// Parse a template. Both placeholders must appear exactly once.
    pub fn parse(pattern: &str) -> Result<Self, NavigationError> {
        let segments: Vec<String> = split_path(pattern).map(str::to_string).collect();

        for placeholder in [TUTOR_PLACEHOLDER, PATIENT_PLACEHOLDER] {
            let count = segments.iter().filter(|s| *s == placeholder).count();
            if count != 1 {
                return Err(NavigationError::InvalidPattern(format!(
                    "{} must contain {} exactly once",
                    pattern, placeholder
                )));
            }
        }

        Ok(Self { segments })
    }

    /// Match decoded path segments, returning `(tutor_id, patient_id)`.
    ///
    /// Trailing segments past the template are allowed, so nested pages of
    /// the same patient still resolve.
    pub fn match_segments(&self, path: &[String]) -> Option<(String, String)> {
        if path.len() < self.segments.len() {
            return None;
        }

        let mut tutor = None;
        let mut patient = None;
        for (expected, actual) in self.segments.iter().zip(path) {
            match expected.as_str() {
                TUTOR_PLACEHOLDER => tutor = Some(actual.clone()),
                PATIENT_PLACEHOLDER => patient = Some(actual.clone()),
                literal if literal == actual => {}
                _ => return None,
            }
        }

        Some((tutor?, patient?))
    }
}

impl Default for RoutePattern {
    fn default() -> Self {
        Self {
            segments: split_path(DEFAULT_PATIENT_ROUTE).map(str::to_string).collect(),
        }
    }
}

impl TryFrom<String> for RoutePattern {
    type Error = NavigationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoutePattern> for String {
    fn from(pattern: RoutePattern) -> Self {
        pattern.to_string()
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Identifiers exposed by the current navigation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationParams {
    pub path_tutor_id: Option<String>,
    pub path_patient_id: Option<String>,
    pub query_tutor_id: Option<String>,
    pub query_patient_id: Option<String>,
}

impl NavigationParams {
    /// Identifiers taken from route path segments.
    pub fn from_path(tutor_id: impl Into<String>, patient_id: impl Into<String>) -> Self {
        Self {
            path_tutor_id: Some(tutor_id.into()),
            path_patient_id: Some(patient_id.into()),
            ..Self::default()
        }
    }

    /// Identifiers taken from query parameters.
    pub fn from_query(tutor_id: impl Into<String>, patient_id: impl Into<String>) -> Self {
        Self {
            query_tutor_id: Some(tutor_id.into()),
            query_patient_id: Some(patient_id.into()),
            ..Self::default()
        }
    }

    /// Extract identifiers from an absolute or app-relative URL.
    pub fn from_url(raw: &str, route: &RoutePattern) -> Result<Self, NavigationError> {
        let base = Url::parse(BASE_URL).map_err(|e| NavigationError::InvalidUrl(e.to_string()))?;
        let url = base
            .join(raw)
            .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", raw, e)))?;

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(percent_decode)
                    .collect()
            })
            .unwrap_or_default();

        let mut params = Self::default();
        if let Some((tutor, patient)) = route.match_segments(&segments) {
            params.path_tutor_id = Some(tutor);
            params.path_patient_id = Some(patient);
        }

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                TUTOR_QUERY_KEY => params.query_tutor_id = Some(value.into_owned()),
                PATIENT_QUERY_KEY => params.query_patient_id = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(params)
    }
}

fn percent_decode(segment: &str) -> String {
    percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned()
}

/// Resolve the active pair.
///
/// Sources are tried pair-wise (path, query, stored); the first one that
/// yields a valid complete pair wins. Values are never mixed across sources.
pub fn resolve_identity(
    params: &NavigationParams,
    stored: Option<&IdentityPair>,
) -> Option<IdentityPair> {
    let candidates = [
        (&params.path_tutor_id, &params.path_patient_id),
        (&params.query_tutor_id, &params.query_patient_id),
    ];

    candidates
        .into_iter()
        .find_map(|(tutor, patient)| match (tutor, patient) {
            (Some(tutor), Some(patient)) => IdentityPair::new(tutor.as_str(), patient.as_str()).ok(),
            _ => None,
        })
        .or_else(|| stored.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(tutor: &str, patient: &str) -> IdentityPair {
        IdentityPair::new(tutor, patient).unwrap()
    }

    #[test]
    fn test_path_wins_over_query_and_stored() {
        let params = NavigationParams {
            path_tutor_id: Some("t-path".into()),
            path_patient_id: Some("p-path".into()),
            query_tutor_id: Some("t-query".into()),
            query_patient_id: Some("p-query".into()),
        };
        let stored = pair("t-stored", "p-stored");

        assert_eq!(resolve_identity(&params, Some(&stored)), Some(pair("t-path", "p-path")));
    }

    #[test]
    fn test_query_used_when_path_incomplete() {
        let params = NavigationParams {
            path_tutor_id: Some("t-path".into()),
            path_patient_id: None,
            query_tutor_id: Some("t-query".into()),
            query_patient_id: Some("p-query".into()),
        };

        assert_eq!(resolve_identity(&params, None), Some(pair("t-query", "p-query")));
    }

    #[test]
    fn test_stored_fallback() {
        let stored = pair("t-stored", "p-stored");
        assert_eq!(
            resolve_identity(&NavigationParams::default(), Some(&stored)),
            Some(stored)
        );
    }

    #[test]
    fn test_unresolved() {
        let params = NavigationParams {
            query_tutor_id: Some("t-query".into()),
            query_patient_id: Some("".into()),
            ..NavigationParams::default()
        };
        assert_eq!(resolve_identity(&params, None), None);
    }

    #[test]
    fn test_from_url_path() {
        let route = RoutePattern::default();
        let params = NavigationParams::from_url(
            "/registers/patient-profile/tutor-1/pet-9/pet-medical-appointment",
            &route,
        )
        .unwrap();

        assert_eq!(params.path_tutor_id.as_deref(), Some("tutor-1"));
        assert_eq!(params.path_patient_id.as_deref(), Some("pet-9"));
        assert_eq!(params.query_tutor_id, None);
    }

    #[test]
    fn test_from_url_query_decoded() {
        let route = RoutePattern::default();
        let params = NavigationParams::from_url(
            "https://clinic.example/Dashboard?tutorId=tutor%201&petId=pet-9&tab=x",
            &route,
        )
        .unwrap();

        assert_eq!(params.path_tutor_id, None);
        assert_eq!(params.query_tutor_id.as_deref(), Some("tutor 1"));
        assert_eq!(params.query_patient_id.as_deref(), Some("pet-9"));
    }

    #[test]
    fn test_from_url_percent_encoded_segment() {
        let route = RoutePattern::parse("/patients/:tutorId/:petId").unwrap();
        let params = NavigationParams::from_url("/patients/ana%20maria/rex+1", &route).unwrap();

        assert_eq!(params.path_tutor_id.as_deref(), Some("ana maria"));
        assert_eq!(params.path_patient_id.as_deref(), Some("rex+1"));
    }

    #[test]
    fn test_route_mismatch() {
        let route = RoutePattern::default();
        let params = NavigationParams::from_url("/registers/tutor-profile/tutor-1/pet-9", &route)
            .unwrap();
        assert_eq!(params, NavigationParams::default());
    }

    #[test]
    fn test_pattern_requires_placeholders() {
        assert!(RoutePattern::parse("/patients/:tutorId").is_err());
        assert!(RoutePattern::parse("/a/:tutorId/:petId/:petId").is_err());
        assert_eq!(
            String::from(RoutePattern::default()),
            DEFAULT_PATIENT_ROUTE.to_string()
        );
    }
}
