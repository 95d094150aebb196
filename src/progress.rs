/// Progress template handed to yt-dlp; each chunk event prints a
/// `progress:<downloaded>:<total>` line on stdout.
pub const TEMPLATE: &str = "progress:%(progress.downloaded_bytes)s:%(progress.total_bytes)s";

/// Parses one yt-dlp stdout line into a completion fraction.
///
/// Returns `None` for non-progress lines and for lines where the total
/// size is unknown (yt-dlp prints `NA` before the size is resolved).
pub fn parse_line(line: &str) -> Option<f32> {
    let rest = line.strip_prefix("progress:")?;
    let (downloaded, total) = rest.split_once(':')?;
    let downloaded: f64 = downloaded.trim().parse().ok()?;
    let total: f64 = total.trim().parse().ok()?;
    if total <= 0.0 {
        return None;
    }
    Some((downloaded / total).clamp(0.0, 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::parse_line;

    #[test]
    fn computes_fraction_from_sizes() {
        assert_eq!(parse_line("progress:50:200"), Some(0.25));
        assert_eq!(parse_line("progress:200:200"), Some(1.0));
    }

    #[test]
    fn ignores_unknown_total() {
        assert_eq!(parse_line("progress:1024:NA"), None);
        assert_eq!(parse_line("progress:1024:0"), None);
    }

    #[test]
    fn ignores_non_progress_lines() {
        assert_eq!(parse_line("[download] Destination: video.mp4"), None);
        assert_eq!(parse_line("/tmp/out/video.mp4"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn clamps_overshoot() {
        // yt-dlp occasionally reports a byte or two past the estimate.
        assert_eq!(parse_line("progress:201:200"), Some(1.0));
    }
}
