//! JavaScript snippets evaluated in portal pages.
//!
//! Values are embedded as JSON string literals so quotes and backslashes in
//! selectors or case numbers cannot break out of the script.

use crate::models::CaseLink;

fn literal(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Set a form control's value and fire `change`. Evaluates to `false` when
/// the element is missing.
pub fn set_value(selector: &str, value: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({sel}); \
         if (!el) return false; \
         el.value = {val}; \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true; }})()",
        sel = literal(selector),
        val = literal(value),
    )
}

/// Rebuild a result-row form in the current document and submit it.
pub fn submit_case_form(link: &CaseLink) -> String {
    let mut script = format!(
        "(() => {{ const form = document.createElement('form'); \
         form.action = {action}; form.method = {method}; ",
        action = literal(&link.action),
        method = literal(&link.method),
    );
    for (name, value) in &link.fields {
        script.push_str(&format!(
            "{{ const input = document.createElement('input'); \
             input.type = 'hidden'; input.name = {}; input.value = {}; \
             form.appendChild(input); }} ",
            literal(name),
            literal(value),
        ));
    }
    script.push_str("document.body.appendChild(form); form.submit(); return true; })()");
    script
}
