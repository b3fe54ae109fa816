use std::fmt;

use regex::Regex;

use crate::Error;

/// Code reported to peers for every envelope that could not be opened.
pub const UNPACK_PROBLEM_CODE: &str = "e.p.crypto.unpack";

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Problem {
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    escalate_to: Option<String>,
}

impl Problem {
    /// Parses given code into new instance of Problem
    /// If given string is not a `{sorter}.{scope}.{descriptor}` code - returns Err.
    ///
    pub fn from_code(code: &str) -> Result<Self, Error> {
        let re = Regex::new(r"^[ew]\.[a-z0-9]{1,32}\.[a-zA-Z]*\.?[-a-zA-Z\-]*\.?[-a-zA-Z\-]*$")?;
        if re.is_match(code) {
            Ok(Problem {
                code: code.into(),
                ..Default::default()
            })
        } else {
            Err(Error::Generic(format!("problem code '{}' is badly formatted", code)))
        }
    }

    /// Takes `KnownProblems` variant and creates new Problem
    /// using it as code.
    ///
    pub fn from_known_problem(problem: KnownProblems) -> Self {
        Problem {
            code: problem.to_string(),
            ..Default::default()
        }
    }

    /// Report safe to send back to the peer that caused `error`.
    ///
    /// Malformed envelopes, unknown recipients and failed decryption all give
    /// the same report. Other failures only get a generic comment, their
    /// details stay in the local log.
    pub fn from_error(error: &Error) -> Self {
        if error.is_unpack_failure() {
            return Problem {
                code: UNPACK_PROBLEM_CODE.into(),
                comment: Some("message could not be unpacked".into()),
                ..Default::default()
            };
        }
        debug!("reporting local failure as a generic problem: {}", error);
        Problem {
            comment: Some("message could not be processed".into()),
            ..Problem::from_known_problem(KnownProblems::Unknown)
        }
    }

    pub fn with_comment(self, comment: &str) -> Self {
        Problem {
            comment: Some(comment.into()),
            ..self
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

/// Problem codes from https://identity.foundation/didcomm-messaging/spec/#problem-codes
/// Except `KnownProblems::Unknown`, which is default and should be used as little as possible
///
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnownProblems {
    #[serde(rename = "e.p.trust.crypto")]
    CryptoTrustError,
    #[serde(rename = "e.p.xfer")]
    XferError,
    #[serde(rename = "e.p.did")]
    DidError,
    #[serde(rename = "e.p.msg")]
    MsgError,
    #[serde(rename = "e.p.req")]
    ReqError,
    #[serde(rename = "w.p.trust.crypto")]
    CryptoTrustWarning,
    #[serde(rename = "w.p.msg")]
    MsgWarning,

    /// Error - Unknown - No data
    #[default]
    #[serde(rename = "e.u.no-data")]
    Unknown,
}

impl fmt::Display for KnownProblems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        f.write_str(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::KeyManagerError;

    #[test]
    fn unpack_failures_look_alike() {
        let reports: Vec<Problem> = [
            Error::MalformedEnvelope("bad json".into()),
            Error::NoMatchingRecipientKey,
            Error::DecryptionFailed,
        ]
        .iter()
        .map(Problem::from_error)
        .collect();
        assert!(reports.iter().all(|report| report == &reports[0]));
        assert_eq!(reports[0].code(), UNPACK_PROBLEM_CODE);
        assert!(Problem::from_code(reports[0].code()).is_ok());
    }

    #[test]
    fn other_errors_hide_their_details() {
        let kid = "z6MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp";
        let errors = [
            Error::KeyManager(KeyManagerError::KeyNotFound(kid.into())),
            Error::NoRecipients,
        ];
        for error in errors.iter() {
            let report = Problem::from_error(error);
            assert_eq!(report.code(), "e.u.no-data");
            assert_eq!(report.comment(), Some("message could not be processed"));
        }
        let serialized = serde_json::to_string(&Problem::from_error(&errors[0])).expect("json");
        assert!(!serialized.contains(kid));
    }

    #[test]
    fn badly_formatted_code_is_rejected() {
        assert!(Problem::from_code("x.p.crypto").is_err());
        assert!(Problem::from_code("e.p.xfer.cant-use-endpoint").is_ok());
    }

    #[test]
    fn known_problem_codes() {
        assert_eq!(KnownProblems::CryptoTrustError.to_string(), "e.p.trust.crypto");
        assert_eq!(Problem::from_known_problem(KnownProblems::default()).code(), "e.u.no-data");
    }
}
