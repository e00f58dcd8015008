/// Fixed text sent through the notification template.
///
/// Only these phrases ever leave the process; error details stay in local logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Nobody to celebrate today.
    NoCelebrations,
    /// Anything between composing the text and writing the image failed.
    GenerationFailed,
    /// Media upload failed.
    UploadFailed,
    /// Any other failure.
    Unexpected,
}

impl Notice {
    /// The exact phrase delivered to the recipient.
    pub fn text(self) -> &'static str {
        match self {
            Self::NoCelebrations => "No celebrations found for today",
            Self::GenerationFailed => "Error generating celebration postcard",
            Self::UploadFailed => "Error uploading celebration postcard",
            Self::Unexpected => "An error occurred in the celebration script. Check logs for details.",
        }
    }

    /// Every notice, in the order a run can reach them.
    pub const ALL: [Self; 4] = [
        Self::NoCelebrations,
        Self::GenerationFailed,
        Self::UploadFailed,
        Self::Unexpected,
    ];
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/delivery/notice.rs"]
mod tests;
