//! Daily birthday and anniversary postcards.
//!
//! A run fetches today's celebrants from the church directory, groups anniversary couples by
//! household, lays the names out on a template image with auto-fitted type and sends the result
//! through WhatsApp:
//!
//! - [`gather_celebrations`] pulls and groups people through a [`DirectorySource`]
//! - [`compose()`] and [`layout()`] turn entries into a positioned [`LayoutPlan`]
//! - [`render()`] draws the plan and [`write_image`] encodes it
//! - [`run_once`] ties the stages together and always ends in a delivery or a [`Notice`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assets;
pub mod compose;
/// Run configuration.
pub mod config;
pub mod delivery;
pub mod encode;
pub mod foundation;
pub mod layout;
pub mod people;
/// Stage orchestration.
pub mod pipeline;
pub mod render;

pub use crate::assets::fonts::FontSet;
pub use crate::assets::template::{TemplateImage, load_template};
pub use crate::compose::text::{Line, TextBlock, compose, today_label};
pub use crate::config::{AppConfig, Credentials, Endpoints, PathsConfig};
pub use crate::delivery::notice::Notice;
pub use crate::delivery::whatsapp::{MediaId, MessagingDelivery, WhatsAppClient};
pub use crate::encode::output::{OutputFormat, write_image};
pub use crate::foundation::core::{Canvas, Rgba8};
pub use crate::foundation::error::{CardError, CardResult};
pub use crate::layout::plan::{FontRole, LayoutPlan, StyleConfig, TextMetrics, layout};
pub use crate::people::directory::{DirectorySource, PlanningCenterClient};
pub use crate::people::grouper::group_households;
pub use crate::people::model::{CelebrationDate, CelebrationEntry, HouseholdId, PersonId, PersonRecord};
pub use crate::pipeline::{Celebrations, RunOutcome, gather_celebrations, run_once};
pub use crate::render::cpu::{RenderedImage, render};
