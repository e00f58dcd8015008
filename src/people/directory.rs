//! Planning Center People client and the directory interface the pipeline consumes.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::foundation::error::{CardError, CardResult};
use crate::people::model::{CelebrationDate, HouseholdId, PersonId, PersonRecord};

/// Default Planning Center People API root.
pub const DEFAULT_DIRECTORY_BASE_URL: &str = "https://api.planningcenteronline.com/people/v2";

/// Source of people records.
///
/// Implementations return raw candidates; filtering to the run date is the caller's job.
pub trait DirectorySource {
    /// People listed by the directory's birthday endpoint.
    fn fetch_birthdays(&self) -> CardResult<Vec<PersonRecord>>;

    /// Members of the anniversary list.
    fn fetch_anniversary_candidates(&self) -> CardResult<Vec<PersonRecord>>;

    /// First household the person belongs to, if any.
    fn fetch_household_id(&self, person: &PersonId) -> CardResult<Option<HouseholdId>>;
}

/// Connection settings for [`PlanningCenterClient`].
#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Basic-auth user (application id).
    pub app_id: String,
    /// Basic-auth password (secret).
    pub secret: String,
    /// List whose members carry anniversaries.
    pub anniversary_list_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Blocking HTTP client for the Planning Center People API.
pub struct PlanningCenterClient {
    client: Client,
    cfg: DirectoryConfig,
}

impl PlanningCenterClient {
    /// Build a client with the configured timeout.
    pub fn new(cfg: DirectoryConfig) -> CardResult<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| CardError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, cfg })
    }

    fn get_text(&self, path: &str, what: &str) -> CardResult<String> {
        let url = format!("{}/{}", self.cfg.base_url.trim_end_matches('/'), path);
        tracing::debug!(%url, "directory request");
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.cfg.app_id, Some(&self.cfg.secret))
            .send()
            .map_err(|e| CardError::from_reqwest(what, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CardError::http_status(status.as_u16(), what));
        }
        resp.text().map_err(|e| CardError::from_reqwest(what, e))
    }
}

impl DirectorySource for PlanningCenterClient {
    #[tracing::instrument(skip(self))]
    fn fetch_birthdays(&self) -> CardResult<Vec<PersonRecord>> {
        let body = self.get_text("birthday_people", "fetch birthdays")?;
        decode_birthdays(&body)
    }

    #[tracing::instrument(skip(self))]
    fn fetch_anniversary_candidates(&self) -> CardResult<Vec<PersonRecord>> {
        let path = format!("lists/{}/people", self.cfg.anniversary_list_id);
        let body = self.get_text(&path, "fetch anniversaries")?;
        decode_anniversary_people(&body)
    }

    #[tracing::instrument(skip(self), fields(person = %person))]
    fn fetch_household_id(&self, person: &PersonId) -> CardResult<Option<HouseholdId>> {
        let path = format!("people/{person}/households");
        let body = self.get_text(&path, "fetch household")?;
        decode_household(&body)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Str(String),
    Num(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Str(s) => s,
            WireId::Num(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct BirthdayEnvelope {
    data: BirthdayData,
}

#[derive(Deserialize)]
struct BirthdayData {
    attributes: BirthdayAttributes,
}

#[derive(Deserialize)]
struct BirthdayAttributes {
    #[serde(default)]
    people: Vec<BirthdayPerson>,
}

#[derive(Deserialize)]
struct BirthdayPerson {
    #[serde(default)]
    id: Option<WireId>,
    name: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    birthdate: Option<String>,
}

#[derive(Deserialize)]
struct PeopleEnvelope {
    data: Vec<PersonResource>,
}

#[derive(Deserialize)]
struct PersonResource {
    id: WireId,
    attributes: PersonAttributes,
}

#[derive(Deserialize)]
struct PersonAttributes {
    name: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    anniversary: Option<String>,
}

#[derive(Deserialize)]
struct HouseholdEnvelope {
    #[serde(default)]
    data: Vec<HouseholdResource>,
}

#[derive(Deserialize)]
struct HouseholdResource {
    id: WireId,
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a str, what: &str) -> CardResult<T> {
    serde_json::from_str(body).map_err(|e| CardError::malformed(format!("{what}: {e}")))
}

/// Decode `birthday_people`. People without a usable birthdate are skipped.
pub fn decode_birthdays(body: &str) -> CardResult<Vec<PersonRecord>> {
    let env: BirthdayEnvelope = parse_json(body, "birthday response")?;
    Ok(env
        .data
        .attributes
        .people
        .into_iter()
        .filter_map(|p| {
            let date = CelebrationDate::parse(p.birthdate.as_deref()?).ok()?;
            Some(PersonRecord {
                id: p.id.map(|id| PersonId(id.into_string())),
                full_name: p.name,
                first_name: p.first_name,
                last_name: p.last_name,
                date,
            })
        })
        .collect())
}

/// Decode a list's people. Members without a full `YYYY-MM-DD` anniversary are skipped.
pub fn decode_anniversary_people(body: &str) -> CardResult<Vec<PersonRecord>> {
    let env: PeopleEnvelope = parse_json(body, "anniversary response")?;
    Ok(env
        .data
        .into_iter()
        .filter_map(|p| {
            let raw = p.attributes.anniversary.as_deref()?;
            let date = match CelebrationDate::parse_full(raw) {
                Ok(d) => d,
                Err(_) => {
                    tracing::debug!(anniversary = raw, "skipping unparsable anniversary");
                    return None;
                }
            };
            Some(PersonRecord {
                id: Some(PersonId(p.id.into_string())),
                full_name: p.attributes.name,
                first_name: p.attributes.first_name,
                last_name: p.attributes.last_name,
                date,
            })
        })
        .collect())
}

/// Decode a person's households, returning the first id.
pub fn decode_household(body: &str) -> CardResult<Option<HouseholdId>> {
    let env: HouseholdEnvelope = parse_json(body, "household response")?;
    Ok(env
        .data
        .into_iter()
        .next()
        .map(|h| HouseholdId(h.id.into_string())))
}

#[cfg(test)]
#[path = "../../tests/unit/people/directory.rs"]
mod tests;
