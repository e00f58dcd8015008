use super::*;

#[test]
fn birthdays_decode_and_skip_missing_dates() {
    let body = r#"{
        "data": {
            "attributes": {
                "people": [
                    {"id": 11, "name": "Ana García", "birthdate": "1990-03-05"},
                    {"name": "Luis Pérez", "birthdate": "03-05"},
                    {"name": "No Date"},
                    {"name": "Bad Date", "birthdate": "someday"}
                ]
            }
        }
    }"#;
    let people = decode_birthdays(body).unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].id, Some(PersonId("11".to_owned())));
    assert_eq!(people[0].full_name, "Ana García");
    assert_eq!(people[0].date.year, Some(1990));
    assert_eq!(people[1].id, None);
    assert_eq!((people[1].date.month, people[1].date.day), (3, 5));
}

#[test]
fn birthday_without_name_is_malformed() {
    let body = r#"{"data":{"attributes":{"people":[{"birthdate":"1990-03-05"}]}}}"#;
    assert!(matches!(
        decode_birthdays(body),
        Err(CardError::MalformedResponse(_))
    ));
}

#[test]
fn non_json_is_malformed() {
    let err = decode_birthdays("<html>oops</html>").unwrap_err();
    assert!(err.is_degradable());
    assert!(matches!(err, CardError::MalformedResponse(_)));
}

#[test]
fn anniversary_people_keep_name_parts() {
    let body = r#"{
        "data": [
            {"id": "7", "attributes": {"name": "Juan Pérez", "first_name": "Juan", "last_name": "Pérez", "anniversary": "2001-06-12"}},
            {"id": "8", "attributes": {"name": "Single", "anniversary": null}},
            {"id": "9", "attributes": {"name": "Garbled", "anniversary": "12/06/2001"}}
        ]
    }"#;
    let people = decode_anniversary_people(body).unwrap();
    assert_eq!(people.len(), 1);
    let juan = &people[0];
    assert_eq!(juan.id, Some(PersonId("7".to_owned())));
    assert_eq!(juan.first_name.as_deref(), Some("Juan"));
    assert_eq!(juan.last_name.as_deref(), Some("Pérez"));
    assert_eq!(
        juan.date,
        CelebrationDate {
            month: 6,
            day: 12,
            year: Some(2001)
        }
    );
}

#[test]
fn anniversaries_need_a_full_date() {
    let body = r#"{
        "data": [
            {"id": "1", "attributes": {"name": "Month Day", "anniversary": "06-12"}},
            {"id": "2", "attributes": {"name": "Full", "anniversary": "1999-06-12"}}
        ]
    }"#;
    let people = decode_anniversary_people(body).unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].full_name, "Full");
}

#[test]
fn anniversary_resource_without_id_is_malformed() {
    let body = r#"{"data":[{"attributes":{"name":"X","anniversary":"2001-06-12"}}]}"#;
    assert!(matches!(
        decode_anniversary_people(body),
        Err(CardError::MalformedResponse(_))
    ));
}

#[test]
fn household_takes_first_entry() {
    let body = r#"{"data":[{"id":"h1"},{"id":"h2"}]}"#;
    assert_eq!(
        decode_household(body).unwrap(),
        Some(HouseholdId("h1".to_owned()))
    );
    assert_eq!(decode_household(r#"{"data":[]}"#).unwrap(), None);
    assert_eq!(decode_household("{}").unwrap(), None);
    assert_eq!(
        decode_household(r#"{"data":[{"id":42}]}"#).unwrap(),
        Some(HouseholdId("42".to_owned()))
    );
}
