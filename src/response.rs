//! Mapping of pipeline outcomes to a transport response.
//!
//! The surrounding HTTP layer owns the socket; this module only decides the
//! status, headers and body for a finished run.

use crate::{
    error::{ErrorKind, ReportError},
    sheet::XLSX_CONTENT_TYPE,
};

pub const ATTACHMENT_FILE_NAME: &str = "report.xlsx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ReportResponse {
    pub fn from_outcome(outcome: Result<Vec<u8>, ReportError>) -> Self {
        match outcome {
            Ok(bytes) => Self {
                status: 200,
                headers: vec![
                    (
                        "Content-Disposition".to_string(),
                        format!("attachment; filename={ATTACHMENT_FILE_NAME}"),
                    ),
                    ("Content-Type".to_string(), XLSX_CONTENT_TYPE.to_string()),
                ],
                body: bytes,
            },
            Err(err) => {
                let payload = err.payload();
                Self {
                    status: status_for(payload.kind),
                    headers: vec![(
                        "Content-Type".to_string(),
                        "application/json".to_string(),
                    )],
                    body: payload.to_json().into_bytes(),
                }
            }
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Request-caused failures are 400, collaborator failures are 500.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::ConfigValidation
        | ErrorKind::EmptyResult
        | ErrorKind::Mapping
        | ErrorKind::FilterType => 400,
        ErrorKind::DataAccess | ErrorKind::Serialization => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_an_xlsx_attachment() {
        let response = ReportResponse::from_outcome(Ok(vec![1, 2, 3]));
        assert_eq!(response.status, 200);
        assert_eq!(
            response.header("content-disposition"),
            Some("attachment; filename=report.xlsx")
        );
        assert_eq!(response.header("Content-Type"), Some(XLSX_CONTENT_TYPE));
        assert_eq!(response.body, vec![1, 2, 3]);
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let response = ReportResponse::from_outcome(Err(ReportError::ConfigValidation(
            "Missing required fields in the report configuration".to_string(),
        )));
        assert_eq!(response.status, 400);
        let body = String::from_utf8(response.body).unwrap();
        assert!(body.contains("CONFIG_VALIDATION"));
        assert!(body.contains("Missing required fields"));
    }

    #[test]
    fn collaborator_failures_are_server_errors() {
        let response = ReportResponse::from_outcome(Err(ReportError::DataAccess {
            procedure: "sp".to_string(),
            message: "connection refused".to_string(),
        }));
        assert_eq!(response.status, 500);
        assert_eq!(status_for(ErrorKind::Serialization), 500);
    }
}
