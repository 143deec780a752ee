use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `GARAGEBOOK_QUIET=1` drops decorative CLI lines; data output is unaffected.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("GARAGEBOOK_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
