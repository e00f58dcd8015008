use std::path::PathBuf;

use chrono::NaiveDate;

use crate::assets::fonts::FontSet;
use crate::assets::template::load_template;
use crate::compose::text::{TextBlock, compose, today_label};
use crate::config::{AppConfig, PathsConfig};
use crate::delivery::notice::Notice;
use crate::delivery::whatsapp::{
    MediaId, MessagingDelivery, TEMPLATE_CONGRATULATION, TEMPLATE_NOTIFICATION,
};
use crate::encode::output::{OutputFormat, write_image};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::{StyleConfig, layout};
use crate::people::directory::DirectorySource;
use crate::people::grouper::group_households;
use crate::people::model::{CelebrationEntry, PersonRecord};
use crate::render::cpu::{RenderedImage, render};

/// Entries to print on today's card.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Celebrations {
    /// One entry per birthday person.
    pub birthdays: Vec<CelebrationEntry>,
    /// Couples and singles celebrating an anniversary.
    pub anniversaries: Vec<CelebrationEntry>,
}

impl Celebrations {
    /// `true` when nobody is celebrating.
    pub fn is_empty(&self) -> bool {
        self.birthdays.is_empty() && self.anniversaries.is_empty()
    }
}

/// A postcard written to disk.
#[derive(Clone, Debug)]
pub struct Postcard {
    /// Decoded pixels.
    pub image: RenderedImage,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// Where the file was written.
    pub path: PathBuf,
    /// Encoding chosen from the extension.
    pub format: OutputFormat,
}

/// What a run ended up sending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The postcard went out with the congratulation template.
    Delivered {
        /// Id of the uploaded image.
        media_id: MediaId,
        /// Local copy of the postcard.
        output: PathBuf,
        /// Birthday entries printed.
        birthdays: usize,
        /// Anniversary entries printed.
        anniversaries: usize,
        /// Some names did not fit.
        truncated: bool,
    },
    /// A notification was sent (or attempted) instead of a postcard.
    Notified {
        /// Phrase that was sent.
        notice: Notice,
        /// `false` when the notification itself could not be delivered.
        sent: bool,
    },
}

fn or_empty(result: CardResult<Vec<PersonRecord>>, stage: &str) -> CardResult<Vec<PersonRecord>> {
    match result {
        Ok(people) => Ok(people),
        Err(err) if err.is_degradable() => {
            tracing::warn!(stage, error = %err, "directory call failed, continuing without it");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

/// Fetch today's birthdays and anniversaries, grouping anniversary couples by household.
///
/// Transport, status and decoding failures degrade the affected list to empty.
#[tracing::instrument(skip(directory))]
pub fn gather_celebrations(
    directory: &dyn DirectorySource,
    today: NaiveDate,
) -> CardResult<Celebrations> {
    let birthdays: Vec<CelebrationEntry> = or_empty(directory.fetch_birthdays(), "birthdays")?
        .into_iter()
        .filter(|p| p.date.falls_on(today))
        .map(|p| CelebrationEntry::new(p.full_name))
        .collect();

    let candidates: Vec<PersonRecord> =
        or_empty(directory.fetch_anniversary_candidates(), "anniversaries")?
            .into_iter()
            .filter(|p| p.date.falls_on(today))
            .collect();

    let anniversaries = group_households(&candidates, |id| {
        match directory.fetch_household_id(id) {
            Ok(hh) => hh,
            Err(err) => {
                tracing::warn!(person = %id, error = %err, "household lookup failed");
                None
            }
        }
    });

    tracing::info!(
        birthdays = birthdays.len(),
        anniversaries = anniversaries.len(),
        "celebrations gathered"
    );
    Ok(Celebrations {
        birthdays,
        anniversaries,
    })
}

/// Compose the card text for `today`.
pub fn card_text(celebrations: &Celebrations, today: NaiveDate) -> TextBlock {
    compose(
        &celebrations.birthdays,
        &celebrations.anniversaries,
        &today_label(today),
    )
}

/// Lay out and draw `block` over the configured template.
#[tracing::instrument(skip_all)]
pub fn render_postcard(
    paths: &PathsConfig,
    style: &StyleConfig,
    fonts: &mut FontSet,
    block: &TextBlock,
) -> CardResult<RenderedImage> {
    let template = load_template(&paths.template_path()?)?;
    let plan = layout(template.canvas()?, block, style, &mut *fonts)?;
    render(&template, fonts, &plan)
}

/// Render and write the postcard to `paths.out`.
pub fn generate_postcard(
    paths: &PathsConfig,
    style: &StyleConfig,
    fonts: &mut FontSet,
    block: &TextBlock,
) -> CardResult<Postcard> {
    tracing::debug!(text = %block.to_plain_text(), "card text");
    let image = render_postcard(paths, style, fonts, block)?;
    let bytes = write_image(&image, &paths.out)?;
    tracing::info!(path = %paths.out.display(), len = bytes.len(), "postcard written");
    Ok(Postcard {
        image,
        bytes,
        path: paths.out.clone(),
        format: OutputFormat::from_path(&paths.out),
    })
}

fn notify(messaging: &dyn MessagingDelivery, notice: Notice) -> RunOutcome {
    let sent = match messaging.send_template(
        TEMPLATE_NOTIFICATION,
        &[notice.text().to_owned()],
        None,
    ) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(error = %err, %notice, "notification could not be sent");
            false
        }
    };
    RunOutcome::Notified { notice, sent }
}

fn deliver(
    messaging: &dyn MessagingDelivery,
    postcard: Postcard,
    celebrations: &Celebrations,
) -> Result<RunOutcome, Notice> {
    let file_name = postcard
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("postcard")
        .to_owned();
    let truncated = postcard.image.is_truncated();
    let media_id = messaging
        .upload_media(postcard.bytes, &file_name, postcard.format.mime_type())
        .map_err(|err| {
            tracing::error!(error = %err, "postcard upload failed");
            Notice::UploadFailed
        })?;

    messaging
        .send_template(TEMPLATE_CONGRATULATION, &[], Some(&media_id))
        .map_err(|err| {
            tracing::error!(error = %err, "congratulation message failed");
            Notice::Unexpected
        })?;

    Ok(RunOutcome::Delivered {
        media_id,
        output: postcard.path,
        birthdays: celebrations.birthdays.len(),
        anniversaries: celebrations.anniversaries.len(),
        truncated,
    })
}

/// Run the daily job once: gather, render, upload, send.
///
/// Never fails; every failure ends in one of the fixed [`Notice`] phrases.
#[tracing::instrument(skip_all, fields(%today))]
pub fn run_once(
    cfg: &AppConfig,
    today: NaiveDate,
    directory: &dyn DirectorySource,
    messaging: &dyn MessagingDelivery,
    fonts: &mut FontSet,
) -> RunOutcome {
    let celebrations = match gather_celebrations(directory, today) {
        Ok(c) => c,
        Err(err) => {
            tracing::error!(error = %err, "gathering celebrations failed");
            return notify(messaging, Notice::Unexpected);
        }
    };

    if celebrations.is_empty() {
        tracing::info!("no celebrations found for today");
        return notify(messaging, Notice::NoCelebrations);
    }

    let block = card_text(&celebrations, today);
    let postcard = match generate_postcard(&cfg.paths, &cfg.style, fonts, &block) {
        Ok(p) => p,
        Err(err) => {
            tracing::error!(error = %err, "postcard generation failed");
            return notify(messaging, Notice::GenerationFailed);
        }
    };

    match deliver(messaging, postcard, &celebrations) {
        Ok(outcome) => outcome,
        Err(notice) => notify(messaging, notice),
    }
}

/// Render a card offline from explicit names.
pub fn preview(
    paths: &PathsConfig,
    style: &StyleConfig,
    fonts: &mut FontSet,
    birthdays: &[String],
    anniversaries: &[String],
    today: NaiveDate,
) -> CardResult<Postcard> {
    let celebrations = Celebrations {
        birthdays: birthdays.iter().map(CelebrationEntry::new).collect(),
        anniversaries: anniversaries.iter().map(CelebrationEntry::new).collect(),
    };
    if celebrations.is_empty() {
        return Err(CardError::validation(
            "preview needs at least one --birthday or --anniversary name",
        ));
    }
    generate_postcard(paths, style, fonts, &card_text(&celebrations, today))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
