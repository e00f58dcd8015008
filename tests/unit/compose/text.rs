use super::*;

fn entries(names: &[&str]) -> Vec<CelebrationEntry> {
    names.iter().map(|n| CelebrationEntry::new(*n)).collect()
}

#[test]
fn birthdays_only() {
    let block = compose(&entries(&["Ana García"]), &[], "Marzo 5, 2024");
    assert_eq!(
        block.lines(),
        &[
            Line::SectionHeader("Cumpleaños".into()),
            Line::NameLine("Ana García".into()),
            Line::BlankSeparator,
            Line::DateLine("Marzo 5, 2024".into()),
        ]
    );
    assert!(!block.to_plain_text().contains(ANNIVERSARY_HEADER));
}

#[test]
fn both_sections_are_separated_by_two_blanks() {
    let block = compose(
        &entries(&["Ana García", "Pedro Sol"]),
        &entries(&["Juan & María Pérez"]),
        "Marzo 5, 2024",
    );
    assert_eq!(
        block.lines(),
        &[
            Line::SectionHeader("Cumpleaños".into()),
            Line::NameLine("Ana García".into()),
            Line::NameLine("Pedro Sol".into()),
            Line::BlankSeparator,
            Line::BlankSeparator,
            Line::SectionHeader("Aniversario".into()),
            Line::NameLine("Juan & María Pérez".into()),
            Line::BlankSeparator,
            Line::DateLine("Marzo 5, 2024".into()),
        ]
    );
    assert_eq!(
        block.to_plain_text(),
        "Cumpleaños\nAna García\nPedro Sol\n\n\nAniversario\nJuan & María Pérez\n\nMarzo 5, 2024"
    );
}

#[test]
fn anniversaries_only_has_no_birthday_header() {
    let block = compose(&[], &entries(&["Luis & Eva Mora"]), "Enero 1, 2025");
    assert_eq!(block.lines()[0], Line::SectionHeader("Aniversario".into()));
    assert_eq!(block.len(), 4);
}

#[test]
fn empty_inputs_still_produce_the_date() {
    let block = compose(&[], &[], "Julio 4, 2024");
    assert_eq!(
        block.lines(),
        &[Line::BlankSeparator, Line::DateLine("Julio 4, 2024".into())]
    );
}

#[test]
fn composing_twice_is_identical() {
    let b = entries(&["Ana", "Beto"]);
    let a = entries(&["Caro & Dani Ruiz"]);
    assert_eq!(compose(&b, &a, "x"), compose(&b, &a, "x"));
}

#[test]
fn spanish_date_labels() {
    let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    assert_eq!(today_label(d), "Marzo 5, 2024");
    let d = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    assert_eq!(today_label(d), "Diciembre 31, 2023");
    assert_eq!(month_name_es(9), Some("Septiembre"));
    assert_eq!(month_name_es(0), None);
    assert_eq!(month_name_es(13), None);
}
