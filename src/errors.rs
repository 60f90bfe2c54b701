use error_stack::{AttachmentKind, FrameKind, Report};

/// One line explanation of a report, root cause first: the printable
/// attachments plus the innermost error, joined with `: `.
pub fn failure_reason<C>(report: &Report<C>) -> String {
    let mut parts = report
        .frames()
        .filter_map(|frame| match frame.kind() {
            FrameKind::Context(context) if frame.sources().is_empty() => {
                Some(context.to_string())
            }
            FrameKind::Attachment(AttachmentKind::Printable(attachment)) => {
                Some(attachment.to_string())
            }
            _ => None,
        })
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>();
    if parts.is_empty() {
        return format!("{report:#}");
    }
    parts.reverse();
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use error_stack::{IntoReport, ResultExt};

    use super::*;

    #[derive(Debug)]
    struct InnerError;
    impl fmt::Display for InnerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Inner error")
        }
    }
    impl std::error::Error for InnerError {}

    #[derive(Debug)]
    struct OuterError;
    impl fmt::Display for OuterError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Outer error")
        }
    }
    impl std::error::Error for OuterError {}

    #[test]
    fn test_reason_keeps_attachments_and_root_cause() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "broken pipe",
        ));
        let report = result
            .into_report()
            .change_context(InnerError)
            .attach_printable("yt-dlp failed: HTTP Error 403")
            .change_context(OuterError)
            .attach_printable("while downloading")
            .unwrap_err();

        let reason = failure_reason(&report);

        assert_eq!(
            reason,
            "broken pipe: yt-dlp failed: HTTP Error 403: while downloading"
        );
    }

    #[test]
    fn test_reason_without_attachments_is_the_context() {
        let report = Report::new(InnerError).change_context(OuterError);
        assert_eq!(failure_reason(&report), "Inner error");
    }
}
