use std::collections::{HashMap, HashSet};

use crate::people::model::{CelebrationEntry, HouseholdId, PersonId, PersonRecord};

/// Drop repeated records for the same person id, keeping the first occurrence.
///
/// Records without an id are always kept.
pub fn dedup_people(people: &[PersonRecord]) -> Vec<&PersonRecord> {
    let mut seen = HashSet::<&PersonId>::new();
    people
        .iter()
        .filter(|p| match &p.id {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}

/// Group anniversary records into couples and singles by shared household.
///
/// Output order is stable: households in first-seen order, then people without a household in
/// input order. `lookup_household` is called at most once per distinct person id.
#[tracing::instrument(skip_all, fields(people = people.len()))]
pub fn group_households<F>(people: &[PersonRecord], mut lookup_household: F) -> Vec<CelebrationEntry>
where
    F: FnMut(&PersonId) -> Option<HouseholdId>,
{
    let mut order = Vec::<HouseholdId>::new();
    let mut groups = HashMap::<HouseholdId, Vec<&PersonRecord>>::new();
    let mut singles = Vec::<&PersonRecord>::new();

    for person in dedup_people(people) {
        let household = person.id.as_ref().and_then(|id| lookup_household(id));
        match household {
            Some(hh) => {
                let members = groups.entry(hh.clone()).or_insert_with(|| {
                    order.push(hh);
                    Vec::new()
                });
                members.push(person);
            }
            None => singles.push(person),
        }
    }

    let mut out = Vec::with_capacity(people.len());
    for hh in &order {
        let members = groups.get(hh).map(Vec::as_slice).unwrap_or_default();
        match members {
            [a, b] if a.date == b.date => out.push(CelebrationEntry::new(couple_name(a, b))),
            [a, b] => {
                tracing::debug!(household = %hh, "household pair with mismatched dates; not merged");
                out.push(CelebrationEntry::new(a.full_name.clone()));
                out.push(CelebrationEntry::new(b.full_name.clone()));
            }
            _ => {
                if members.len() > 2 {
                    tracing::debug!(
                        household = %hh,
                        members = members.len(),
                        "household with more than two celebrants; listing individually"
                    );
                }
                out.extend(
                    members
                        .iter()
                        .map(|p| CelebrationEntry::new(p.full_name.clone())),
                );
            }
        }
    }
    out.extend(
        singles
            .into_iter()
            .map(|p| CelebrationEntry::new(p.full_name.clone())),
    );
    out
}

/// `"First1 & First2 Last"` for a shared family name, else `"Full1 & Full2"`.
pub fn couple_name(a: &PersonRecord, b: &PersonRecord) -> String {
    let shared_last = match (&a.last_name, &b.last_name) {
        (Some(la), Some(lb)) if !la.trim().is_empty() && la == lb => Some(la),
        _ => None,
    };
    match (shared_last, &a.first_name, &b.first_name) {
        (Some(last), Some(fa), Some(fb)) => format!("{fa} & {fb} {last}"),
        _ => format!("{} & {}", a.full_name, b.full_name),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/people/grouper.rs"]
mod tests;
