use url::Url;

/// Canonicalizes a YouTube link to the standard watch-page form.
///
/// Short links (`youtu.be/<id>`) and full links carrying extra query
/// parameters both become `https://www.youtube.com/watch?v=<id>`. Anything
/// else — non-YouTube input, unparseable input, or a YouTube URL without a
/// `v` parameter — is returned unchanged. The last case is a deliberate
/// fall-through, not an error.
pub fn normalize(input: &str) -> String {
    if !input.contains("youtube") && !input.contains("youtu.be") {
        return input.to_string();
    }
    let Ok(parsed) = Url::parse(input) else {
        return input.to_string();
    };
    if parsed.host_str() == Some("youtu.be") {
        let id = parsed.path().trim_start_matches('/');
        return format!("https://www.youtube.com/watch?v={id}");
    }
    if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        return format!("https://www.youtube.com/watch?v={id}");
    }
    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn short_link_becomes_watch_url() {
        assert_eq!(
            normalize("https://youtu.be/dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn short_link_with_query_is_stripped() {
        assert_eq!(
            normalize("https://youtu.be/dQw4w9WgXcQ?t=42&si=share"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn extra_query_parameters_are_stripped() {
        assert_eq!(
            normalize("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123&index=2"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn canonical_url_is_unchanged_in_value() {
        assert_eq!(
            normalize("https://www.youtube.com/watch?v=abc123"),
            "https://www.youtube.com/watch?v=abc123"
        );
    }

    #[test]
    fn non_youtube_input_passes_through() {
        assert_eq!(normalize("https://example.com/video"), "https://example.com/video");
        assert_eq!(normalize("not a url at all"), "not a url at all");
    }

    #[test]
    fn youtube_url_without_v_parameter_passes_through() {
        // Documented fall-through: no watch id to extract, so no rewrite.
        assert_eq!(
            normalize("https://www.youtube.com/feed/subscriptions"),
            "https://www.youtube.com/feed/subscriptions"
        );
    }

    #[test]
    fn unparseable_youtube_mention_passes_through() {
        assert_eq!(normalize("youtube video please"), "youtube video please");
    }
}
