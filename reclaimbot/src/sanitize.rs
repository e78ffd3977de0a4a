use regex::Regex;
use std::sync::OnceLock;

static BOOL_THEN_NEWLINE: OnceLock<Regex> = OnceLock::new();
static BOOL_THEN_SPACE: OnceLock<Regex> = OnceLock::new();

/// Strips a leading boolean echo from an assistant reply, e.g. `true`,
/// `"false":` or `true -`, left behind by the eligibility stage. Applied at
/// the presentation edge only; session history keeps the raw text.
pub fn sanitize_response(text: &str) -> String {
    let newline_form = BOOL_THEN_NEWLINE.get_or_init(|| {
        Regex::new(r#"(?i)^\s*["']?(?:true|false)["']?\s*[:\-]*\s*(?:\r?\n)+"#)
            .expect("invalid regex pattern")
    });
    let space_form = BOOL_THEN_SPACE.get_or_init(|| {
        Regex::new(r#"(?i)^\s*["']?(?:true|false)["']?\s*[:\-]*\s+"#)
            .expect("invalid regex pattern")
    });

    let stripped = newline_form.replace(text, "");
    space_form.replace(&stripped, "").into_owned()
}
