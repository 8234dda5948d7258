//! Convenience macros and input sanitization.
//!
//! # Rules
//!
//! 1. **Public messages MUST be string literals** in `app_error!` - dynamic text
//!    belongs in the service half
//! 2. **Untrusted values go through `sanitized!()`** before they reach a message
//!    or a log line - bounded length, no control characters
//!
//! # Usage
//!
//! ```rust
//! # use bastion_errors::{app_error, definitions, meta, sanitized};
//! let order_id = "A-1001";
//! let err = app_error!(
//!     definitions::NOT_FOUND_RESOURCE,
//!     "Order not found",
//!     "order {} missing",
//!     sanitized!(order_id)
//! );
//! assert_eq!(err.service_message, "order A-1001 missing");
//!
//! let tags = meta! { "error_type" => "Data not found", "resourceName" => "Order" };
//! assert_eq!(tags.len(), 2);
//! ```
//!
//! ```rust,compile_fail
//! # use bastion_errors::{app_error, definitions};
//! let leaked = String::from("user=admin");
//! // ✗ COMPILE ERROR: public message must be a literal
//! let err = app_error!(definitions::BAD_REQUEST, leaked, "details");
//! ```
//!
//! ## Sanitization
//!
//! - Truncates to `MAX_SANITIZED_LEN` bytes on a UTF-8 boundary, marking the cut
//!   with `...[TRUNCATED]`
//! - Replaces control characters with `?`
//! - Swallows well-formed CSI escape sequences (`ESC [ ... m`), leaving one `?`;
//!   any other ESC becomes `?` and the text after it is kept
//! - Input made only of control characters becomes `[INVALID_INPUT]`
//!
//! Sanitization is linear in the input length and never panics.

// ============================================================================
// Sanitization Utilities
// ============================================================================

/// Maximum byte length of a sanitized string, indicator included.
pub const MAX_SANITIZED_LEN: usize = 256;

const TRUNCATED_MARK: &str = "...[TRUNCATED]";
const INVALID_INPUT: &str = "[INVALID_INPUT]";

/// Bound and neutralize untrusted text for inclusion in messages or logs.
///
/// See the module docs for the exact rules. Empty input stays empty.
pub fn sanitize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(input.len().min(MAX_SANITIZED_LEN));
    let mut saw_printable = false;
    let mut truncated = false;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let mut consumed = c.len_utf8();
        let replacement = if c == '\u{1b}' {
            consumed += csi_len(&rest[consumed..]);
            '?'
        } else if c.is_control() {
            '?'
        } else {
            saw_printable = true;
            c
        };
        if out.len() + replacement.len_utf8() > MAX_SANITIZED_LEN {
            truncated = true;
            break;
        }
        out.push(replacement);
        rest = &rest[consumed..];
    }

    if !saw_printable {
        return String::from(INVALID_INPUT);
    }

    if truncated {
        let mut cut = MAX_SANITIZED_LEN - TRUNCATED_MARK.len();
        while cut > 0 && !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str(TRUNCATED_MARK);
    }

    out
}

/// Length of a well-formed CSI sequence body following an ESC, or 0.
///
/// A CSI body is `[`, parameter bytes (`0x30..=0x3F`), intermediate bytes
/// (`0x20..=0x2F`) and one final byte (`0x40..=0x7E`).
fn csi_len(after_esc: &str) -> usize {
    let bytes = after_esc.as_bytes();
    if bytes.first() != Some(&b'[') {
        return 0;
    }
    let mut i = 1;
    while i < bytes.len() && (0x30..=0x3F).contains(&bytes[i]) {
        i += 1;
    }
    while i < bytes.len() && (0x20..=0x2F).contains(&bytes[i]) {
        i += 1;
    }
    match bytes.get(i) {
        Some(b) if (0x40..=0x7E).contains(b) => i + 1,
        _ => 0,
    }
}

/// Sanitize any `Display` value. See [`sanitize`].
///
/// ```rust
/// # use bastion_errors::sanitized;
/// let long = "A".repeat(300);
/// let san = sanitized!(long);
/// assert!(san.len() <= 256);
/// assert!(san.ends_with("[TRUNCATED]"));
/// ```
#[macro_export]
macro_rules! sanitized {
    ($expr:expr) => {
        $crate::convenience::sanitize(&$expr.to_string())
    };
}

// ============================================================================
// Construction Macros
// ============================================================================

/// Build a [`MetaData`](crate::MetaData) map from `key => value` pairs.
#[macro_export]
macro_rules! meta {
    () => {
        $crate::MetaData::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::MetaData::new();
        $( map.insert($key, $value); )+
        map
    }};
}

/// Create an [`AppError`](crate::AppError) with one code on both halves.
///
/// The public message must be a literal. The service message is a format
/// string; wrap untrusted arguments in `sanitized!()`.
#[macro_export]
macro_rules! app_error {
    ($code:expr, $public:literal, $service:literal $(,)?) => {
        $crate::AppError::builder()
            .public($code, $public)
            .service($code, $service)
            .build()
    };
    ($code:expr, $public:literal, $fmt:literal, $($arg:expr),+ $(,)?) => {
        $crate::AppError::builder()
            .public($code, $public)
            .service($code, ::std::format!($fmt, $($arg),+))
            .build()
    };
}

/// Define the status code registry.
///
/// Expands to one `pub const` per code, each checked against its band at
/// compile time, and a `REGISTRY` slice of `(code, name)` pairs in definition
/// order.
///
/// # Example
///
/// ```rust
/// mod registry {
///     use bastion_errors::{define_status_codes, Band};
///     define_status_codes! {
///         Band::NotFound => {
///             /// Generic not found.
///             NOT_FOUND = (4040, "NotFound"),
///         }
///     }
/// }
/// assert_eq!(registry::REGISTRY.len(), 1);
/// ```
#[macro_export]
macro_rules! define_status_codes {
    ($( $band:expr => { $( $(#[$doc:meta])* $name:ident = ($value:expr, $display:literal) ),+ $(,)? } )+) => {
        $( $(
            $(#[$doc])*
            pub const $name: $crate::StatusCode = $crate::StatusCode::const_new($band, $value);
        )+ )+

        /// Every registered code with its display name, in definition order.
        pub const REGISTRY: &[($crate::StatusCode, &str)] = &[
            $( $( ($name, $display), )+ )+
        ];
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;

    #[test]
    fn sanitize_truncates_long_strings() {
        let long_string = "A".repeat(1000);
        let sanitized = sanitized!(long_string);

        assert!(sanitized.len() <= MAX_SANITIZED_LEN);
        assert!(sanitized.ends_with(TRUNCATED_MARK));
    }

    #[test]
    fn sanitize_preserves_short_strings() {
        assert_eq!(sanitized!("short"), "short");
    }

    #[test]
    fn sanitize_keeps_exact_limit() {
        let s = "B".repeat(MAX_SANITIZED_LEN);
        assert_eq!(sanitize(&s), s);
    }

    #[test]
    fn sanitize_respects_utf8_boundaries() {
        let emoji = "🔥".repeat(100);
        let sanitized = sanitized!(emoji);

        assert!(std::str::from_utf8(sanitized.as_bytes()).is_ok());
        assert!(sanitized.len() <= MAX_SANITIZED_LEN);
    }

    #[test]
    fn sanitize_replaces_control_chars() {
        assert_eq!(sanitized!("hello\nworld\t\x07"), "hello?world??");
    }

    #[test]
    fn sanitize_swallows_escape_sequences() {
        assert_eq!(sanitized!("normal\x1b[0m escape \r\n sequence"), "normal? escape ?? sequence");
    }

    #[test]
    fn sanitize_keeps_text_after_bare_escape() {
        assert_eq!(sanitize("abc\x1bdef"), "abc?def");
        assert_eq!(sanitize("\x1b(B text"), "?(B text");
    }

    #[test]
    fn sanitize_keeps_text_after_unterminated_csi() {
        assert_eq!(sanitize("a\x1b[12;"), "a?[12;");
        assert_eq!(sanitize("x\x1b[1;31mred\x1b[0m"), "x?red?");
    }

    #[test]
    fn sanitize_rejects_control_only_input() {
        assert_eq!(sanitized!("\x07".repeat(300)), INVALID_INPUT);
    }

    #[test]
    fn sanitize_empty_stays_empty() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn sanitize_works_with_numbers() {
        assert_eq!(sanitized!(42), "42");
    }

    #[test]
    fn meta_macro_builds_ordered_map() {
        let m = meta! { "b" => "2", "a" => String::from("1") };
        assert_eq!(m.to_string(), "{b: '2', a: '1'}");
        assert!(meta!().is_empty());
    }

    #[test]
    fn app_error_macro_sets_both_halves() {
        let err = app_error!(definitions::CONFLICT, "Already exists", "duplicate key {}", sanitized!("k1"));
        assert_eq!(err.public_status_code, definitions::CONFLICT);
        assert_eq!(err.service_status_code, definitions::CONFLICT);
        assert_eq!(err.public_message, "Already exists");
        assert_eq!(err.service_message, "duplicate key k1");
    }

    #[test]
    fn app_error_macro_accepts_trailing_comma() {
        let err = app_error!(definitions::BAD_REQUEST, "Invalid input", "plain",);
        assert_eq!(err.service_message, "plain");
    }

    #[test]
    fn app_error_macro_ignores_local_format() {
        #[allow(unused_macros)]
        macro_rules! format {
            ($($t:tt)*) => {
                compile_error!("caller's format! must not be used")
            };
        }
        let err = app_error!(definitions::CONFLICT, "Already exists", "key {}", 7);
        assert_eq!(err.service_message, "key 7");
    }
}
