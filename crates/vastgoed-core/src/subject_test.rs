use super::*;

#[test]
fn postal_code_strips_whitespace_and_uppercases() {
    let pc = PostalCode::parse(" 1015 mn ").unwrap();
    assert_eq!(pc.as_str(), "1015MN");
}

#[test]
fn postal_code_rejects_wrong_shape() {
    for raw in ["1015M", "101MNN", "ABCDEF", "1015MNX", ""] {
        assert!(
            matches!(PostalCode::parse(raw), Err(CoreError::InvalidPostalCode(_))),
            "expected {raw:?} to be rejected"
        );
    }
}

#[test]
fn postal_code_with_leading_zero_is_not_area_searchable() {
    let pc = PostalCode::parse("0123AB").unwrap();
    assert!(!pc.is_area_searchable());
    assert!(PostalCode::parse("1015MN").unwrap().is_area_searchable());
}

#[test]
fn postal_code_deserializes_through_validation() {
    let pc: PostalCode = serde_json::from_str("\"1015 mn\"").unwrap();
    assert_eq!(pc.as_str(), "1015MN");
    assert!(serde_json::from_str::<PostalCode>("\"nope\"").is_err());
}

#[test]
fn single_letter_addition_is_letter() {
    let hn = HouseNumber::parse("72", Some("A")).unwrap();
    assert_eq!(hn.number, 72);
    assert_eq!(hn.letter.as_deref(), Some("A"));
    assert_eq!(hn.suffix, None);
}

#[test]
fn lowercase_letter_is_uppercased() {
    let hn = HouseNumber::parse("72", Some("b")).unwrap();
    assert_eq!(hn.letter.as_deref(), Some("B"));
}

#[test]
fn word_addition_is_suffix() {
    let hn = HouseNumber::parse("72", Some("bis")).unwrap();
    assert_eq!(hn.letter, None);
    assert_eq!(hn.suffix.as_deref(), Some("bis"));
}

#[test]
fn digit_addition_is_suffix_not_letter() {
    let hn = HouseNumber::parse("72", Some("1")).unwrap();
    assert_eq!(hn.letter, None);
    assert_eq!(hn.suffix.as_deref(), Some("1"));
}

#[test]
fn blank_addition_sets_neither_field() {
    let hn = HouseNumber::parse("72", Some("  ")).unwrap();
    assert_eq!(hn.letter, None);
    assert_eq!(hn.suffix, None);
}

#[test]
fn trailing_text_in_number_is_used_when_no_addition_given() {
    let hn = HouseNumber::parse("72A", None).unwrap();
    assert_eq!(hn.number, 72);
    assert_eq!(hn.letter.as_deref(), Some("A"));

    let hn = HouseNumber::parse("72-2h", None).unwrap();
    assert_eq!(hn.suffix.as_deref(), Some("2h"));
}

#[test]
fn explicit_addition_wins_over_trailing_text() {
    let hn = HouseNumber::parse("72A", Some("3")).unwrap();
    assert_eq!(hn.letter, None);
    assert_eq!(hn.suffix.as_deref(), Some("3"));
}

#[test]
fn house_number_without_digits_is_rejected() {
    assert!(matches!(
        HouseNumber::parse("A12", None),
        Err(CoreError::InvalidHouseNumber(_))
    ));
}

#[test]
fn house_number_display_joins_addition_with_dash() {
    assert_eq!(HouseNumber::parse("72", Some("1")).unwrap().to_string(), "72-1");
    assert_eq!(HouseNumber::parse("72", None).unwrap().to_string(), "72");
}

#[test]
fn individual_subject_requires_postal_code_and_number() {
    assert_eq!(
        IndividualSubject::new("Street", "72", None, "Amsterdam", " "),
        Err(CoreError::MissingField("postal code"))
    );
    assert_eq!(
        IndividualSubject::new("Street", "", None, "Amsterdam", "1015MN"),
        Err(CoreError::MissingField("house number"))
    );
}

#[test]
fn individual_subject_display_address() {
    let subject =
        IndividualSubject::new("Prinsengracht", "72", Some("1"), "Amsterdam", "1015 MN").unwrap();
    assert_eq!(
        subject.display_address(),
        "Prinsengracht 72-1, 1015MN Amsterdam"
    );
}

#[test]
fn area_subject_rejects_leading_zero() {
    assert!(AreaSubject::new("0123AB").is_err());
    assert_eq!(
        AreaSubject::new("1015mn").unwrap().postal_code.as_str(),
        "1015MN"
    );
}

#[test]
fn subject_serializes_with_mode_tag() {
    let subject = Subject::Area(AreaSubject::new("1015MN").unwrap());
    let json = serde_json::to_value(&subject).unwrap();
    assert_eq!(json["mode"], "area");
    assert_eq!(json["postal_code"], "1015MN");
    assert_eq!(subject.postal_code().as_str(), "1015MN");
}
