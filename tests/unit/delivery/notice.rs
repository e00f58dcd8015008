use super::*;

#[test]
fn phrases_are_fixed() {
    assert_eq!(Notice::NoCelebrations.text(), "No celebrations found for today");
    assert_eq!(
        Notice::GenerationFailed.text(),
        "Error generating celebration postcard"
    );
    assert_eq!(
        Notice::UploadFailed.text(),
        "Error uploading celebration postcard"
    );
    assert_eq!(
        Notice::Unexpected.to_string(),
        "An error occurred in the celebration script. Check logs for details."
    );
}

#[test]
fn notices_are_distinct_single_sentences() {
    let texts: Vec<&str> = Notice::ALL.iter().map(|n| n.text()).collect();
    for (i, a) in texts.iter().enumerate() {
        assert!(!a.contains('\n'));
        assert!(texts[i + 1..].iter().all(|b| a != b));
    }
}
