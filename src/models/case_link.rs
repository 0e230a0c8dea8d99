//! Links from the results listing to a case's detail view.

use serde::Serialize;

/// The summary form attached to one result row.
///
/// The portal opens case details by posting a small form, so a link is the
/// form's target plus the values it would submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseLink {
    /// Absolute form action URL.
    pub action: String,
    /// Lower-case form method (`get` or `post`).
    pub method: String,
    /// Named inputs in document order.
    pub fields: Vec<(String, String)>,
    /// Case number shown in the listing row, when present.
    pub case_hint: Option<String>,
}

impl CaseLink {
    /// Short label for logs.
    pub fn label(&self) -> &str {
        self.case_hint.as_deref().unwrap_or(&self.action)
    }
}
