//! Derivation of collaborator inputs from stored records.

use crate::collaborators::ThumbnailRequest;
use crate::video::VideoRecord;

/// First sentence of a script, used as the visual generation prompt.
///
/// Cuts at the first `.`, `!` or `?` and always ends with a period, so
/// "Hello. World." gives "Hello.".
pub fn first_sentence(script: &str) -> String {
    let head = script
        .split(['.', '!', '?'])
        .next()
        .unwrap_or_default()
        .trim();
    format!("{}.", head)
}

/// Thumbnail input for a record: the original title is the topic, the
/// optimized title tells series parts apart.
pub fn thumbnail_request(record: &VideoRecord) -> ThumbnailRequest {
    ThumbnailRequest {
        topic: record.title.clone(),
        script: Some(record.script.clone()).filter(|s| !s.is_empty()),
        title: Some(record.optimized_title.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use crate::video::VideoLength;

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("Hello. World."), "Hello.");
        assert_eq!(first_sentence("Is Rust fast? Yes!"), "Is Rust fast.");
        assert_eq!(first_sentence("  Wow!  Amazing."), "Wow.");
        assert_eq!(first_sentence("No terminator here"), "No terminator here.");
    }

    #[test]
    fn test_thumbnail_request_uses_both_titles() {
        let mut record = fixtures::video_record(
            "AI Agents Explained - Part 2",
            VideoLength::Long,
            fixtures::friday_noon().date_naive(),
        );
        record.title = "AI agents".to_string();

        let request = thumbnail_request(&record);
        assert_eq!(request.topic, "AI agents");
        assert_eq!(request.title.as_deref(), Some("AI Agents Explained - Part 2"));
        assert!(request.script.is_some());
    }
}
